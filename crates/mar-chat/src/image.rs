//! Image URL resolution.
//!
//! A resolver always produces a URL: a web image search result when one is
//! available, otherwise a placeholder built from the query.

use reqwest::Client;
use serde::Deserialize;
use tracing::{debug, warn};

use mar_core::config::{mask_secret, ImageConfig};

use crate::error::ChatError;

/// Turns a search phrase into an image URL.
#[async_trait::async_trait]
pub trait ImageResolver: Send + Sync {
    async fn resolve(&self, query: &str) -> String;
}

/// Strip everything except ASCII alphanumerics and whitespace, then trim.
pub fn sanitize_query(query: &str) -> String {
    query
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || c.is_whitespace())
        .collect::<String>()
        .trim()
        .to_string()
}

/// Placeholder image URL for `query` under `base`.
pub fn placeholder_url(base: &str, query: &str) -> String {
    format!("{}?{}", base, urlencoding::encode(&sanitize_query(query)))
}

#[derive(Deserialize)]
struct SearchResponse {
    #[serde(default)]
    items: Vec<SearchItem>,
}

#[derive(Deserialize)]
struct SearchItem {
    link: Option<String>,
}

/// Google Custom Search image lookup with a placeholder fallback.
pub struct WebImageResolver {
    client: Client,
    config: ImageConfig,
}

impl std::fmt::Debug for WebImageResolver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WebImageResolver")
            .field("search_url", &self.config.search_url)
            .field(
                "api_key",
                &self.config.api_key.as_deref().map(mask_secret),
            )
            .field("placeholder_url", &self.config.placeholder_url)
            .finish()
    }
}

impl WebImageResolver {
    pub fn new(config: &ImageConfig) -> Result<Self, ChatError> {
        let client = Client::builder()
            .timeout(config.timeout())
            .build()
            .map_err(|e| ChatError::NotConfigured(format!("HTTP client: {}", e)))?;
        Ok(Self {
            client,
            config: config.clone(),
        })
    }

    /// Whether both search credentials are present.
    pub fn search_enabled(&self) -> bool {
        self.config.credentials().is_some()
    }

    async fn search(&self, key: &str, cx: &str, query: &str) -> Result<String, ChatError> {
        let response = self
            .client
            .get(&self.config.search_url)
            .query(&[
                ("key", key),
                ("cx", cx),
                ("q", query),
                ("searchType", "image"),
                ("num", "1"),
                ("safe", "active"),
                ("imgSize", "medium"),
                ("imgType", "photo"),
            ])
            .send()
            .await
            .map_err(|e| ChatError::from_transport(&e, self.config.timeout()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(ChatError::ImageSearch(format!("status {}", status.as_u16())));
        }

        let body: SearchResponse = response
            .json()
            .await
            .map_err(|e| ChatError::ImageSearch(format!("bad response body: {}", e)))?;

        body.items
            .into_iter()
            .next()
            .and_then(|item| item.link)
            .filter(|link| !link.is_empty())
            .ok_or_else(|| ChatError::ImageSearch("no items".to_string()))
    }
}

#[async_trait::async_trait]
impl ImageResolver for WebImageResolver {
    async fn resolve(&self, query: &str) -> String {
        if let Some((key, cx)) = self.config.credentials() {
            match self.search(key, cx, query).await {
                Ok(link) => {
                    debug!(query, "Image search hit");
                    return link;
                }
                Err(e) => warn!(query, error = %e, "Image search failed, using placeholder"),
            }
        }
        placeholder_url(&self.config.placeholder_url, query)
    }
}
