use std::fmt;
use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::error::{MarError, Result};

/// Top-level configuration for the MAR assistant.
///
/// Loaded from `~/.mar/config.toml` by default. Secrets may be left out of
/// the file and supplied through the environment instead, see
/// [`MarConfig::with_env_overrides`].
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MarConfig {
    #[serde(default)]
    pub general: GeneralConfig,
    #[serde(default)]
    pub llm: LlmConfig,
    #[serde(default)]
    pub image: ImageConfig,
    #[serde(default)]
    pub api: ApiConfig,
    #[serde(default)]
    pub client: ClientConfig,
}

impl MarConfig {
    /// Load configuration from a TOML file.
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: MarConfig = toml::from_str(&content)?;
        info!("Configuration loaded from {}", path.display());
        Ok(config)
    }

    /// Load configuration from a TOML file, falling back to defaults if the
    /// file does not exist or cannot be parsed.
    pub fn load_or_default(path: &Path) -> Self {
        match Self::load(path) {
            Ok(config) => config,
            Err(e) => {
                warn!(
                    "Failed to load config from {}: {}. Using defaults.",
                    path.display(),
                    e
                );
                Self::default()
            }
        }
    }

    /// Save the current configuration to a TOML file.
    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content =
            toml::to_string_pretty(self).map_err(|e| MarError::Config(e.to_string()))?;
        std::fs::write(path, content)?;
        info!("Configuration saved to {}", path.display());
        Ok(())
    }

    /// Fill secrets missing from the file from environment-style lookups.
    ///
    /// Reads `GROQ_API_KEY`, `GROQ_MODEL`, `GOOGLE_API_KEY` and `GOOGLE_CSE_ID`.
    /// Values already present in the file win.
    pub fn with_env_overrides(mut self, lookup: impl Fn(&str) -> Option<String>) -> Self {
        let non_empty = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if self.llm.api_key.is_empty() {
            if let Some(key) = non_empty("GROQ_API_KEY") {
                self.llm.api_key = key;
            }
        }
        if let Some(model) = non_empty("GROQ_MODEL") {
            self.llm.model = model;
        }
        if self.image.api_key.is_none() {
            self.image.api_key = non_empty("GOOGLE_API_KEY");
        }
        if self.image.engine_id.is_none() {
            self.image.engine_id = non_empty("GOOGLE_CSE_ID");
        }
        self
    }
}

/// General application settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    /// Log level: trace, debug, info, warn, error.
    pub log_level: String,
    /// Interface the API server binds to.
    pub host: String,
    /// API server port.
    pub port: u16,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            host: "127.0.0.1".to_string(),
            port: 3030,
        }
    }
}

/// Text-generation service settings (OpenAI-compatible endpoint).
#[derive(Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LlmConfig {
    /// Base URL of the completion API.
    pub base_url: String,
    /// Model used for all three prompt calls.
    pub model: String,
    /// Bearer token. Usually supplied through `GROQ_API_KEY`.
    pub api_key: String,
    /// Per-call timeout in seconds.
    pub timeout_secs: u64,
    /// Output bound for the persona reply.
    pub reply_max_tokens: u32,
    /// Output bound for the visual-need classification.
    pub classify_max_tokens: u32,
    /// Output bound for the location lookup.
    pub location_max_tokens: u32,
}

impl LlmConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            base_url: "https://api.groq.com/openai/v1".to_string(),
            model: "llama-3.3-70b-versatile".to_string(),
            api_key: String::new(),
            timeout_secs: 30,
            reply_max_tokens: 900,
            classify_max_tokens: 900,
            location_max_tokens: 50,
        }
    }
}

// Keep the key out of logs.
impl fmt::Debug for LlmConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LlmConfig")
            .field("base_url", &self.base_url)
            .field("model", &self.model)
            .field("api_key", &mask_secret(&self.api_key))
            .field("timeout_secs", &self.timeout_secs)
            .field("reply_max_tokens", &self.reply_max_tokens)
            .field("classify_max_tokens", &self.classify_max_tokens)
            .field("location_max_tokens", &self.location_max_tokens)
            .finish()
    }
}

/// Image lookup settings.
#[derive(Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ImageConfig {
    /// Custom Search JSON API endpoint.
    pub search_url: String,
    /// Search API key (`GOOGLE_API_KEY`).
    pub api_key: Option<String>,
    /// Search engine id (`GOOGLE_CSE_ID`).
    pub engine_id: Option<String>,
    /// Placeholder image service; the sanitized query is appended as the query string.
    pub placeholder_url: String,
    /// Search call timeout in seconds.
    pub timeout_secs: u64,
}

impl ImageConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// Both search credentials, when present and non-empty.
    pub fn credentials(&self) -> Option<(&str, &str)> {
        match (self.api_key.as_deref(), self.engine_id.as_deref()) {
            (Some(key), Some(cx)) if !key.is_empty() && !cx.is_empty() => Some((key, cx)),
            _ => None,
        }
    }
}

impl Default for ImageConfig {
    fn default() -> Self {
        Self {
            search_url: "https://www.googleapis.com/customsearch/v1".to_string(),
            api_key: None,
            engine_id: None,
            placeholder_url: "https://source.unsplash.com/800x600/".to_string(),
            timeout_secs: 10,
        }
    }
}

impl fmt::Debug for ImageConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ImageConfig")
            .field("search_url", &self.search_url)
            .field("api_key", &self.api_key.as_deref().map(mask_secret))
            .field("engine_id", &self.engine_id)
            .field("placeholder_url", &self.placeholder_url)
            .field("timeout_secs", &self.timeout_secs)
            .finish()
    }
}

/// HTTP server settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
    /// Maximum requests accepted per second across all clients.
    pub rate_limit_per_sec: u64,
    /// Origins allowed by CORS.
    pub cors_origins: Vec<String>,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            rate_limit_per_sec: 20,
            cors_origins: vec![
                "http://localhost:3000".to_string(),
                "http://127.0.0.1:3000".to_string(),
            ],
        }
    }
}

/// Conversation client settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    /// Base URL of the orchestrator server.
    pub server_url: String,
    /// Timeout for one full orchestrator round trip, in seconds.
    pub timeout_secs: u64,
    /// Whether replies are spoken when a session starts.
    pub playback_enabled: bool,
}

impl ClientConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            server_url: "http://127.0.0.1:3030".to_string(),
            timeout_secs: 60,
            playback_enabled: true,
        }
    }
}

/// Mask a secret for display, keeping at most the first and last four characters.
pub fn mask_secret(secret: &str) -> String {
    let chars: Vec<char> = secret.chars().collect();
    if chars.len() <= 8 {
        return "****".to_string();
    }
    let head: String = chars[..4].iter().collect();
    let tail: String = chars[chars.len() - 4..].iter().collect();
    format!("{}...{}", head, tail)
}
