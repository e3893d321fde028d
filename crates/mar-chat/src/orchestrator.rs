//! Response orchestrator: one utterance in, one reply out.
//!
//! The reply text comes from the persona completion. An image and location
//! are attached either from the classifier's search phrase or, when it
//! declines, from the keyword lexicon.

use std::sync::Arc;

use tracing::{debug, error, info, instrument, warn};

use mar_core::config::LlmConfig;
use mar_core::{MarConfig, OrchestratorReply};

use crate::error::ChatError;
use crate::image::{ImageResolver, WebImageResolver};
use crate::lexicon;
use crate::llm::{CompletionRequest, LlmProvider};
use crate::prompts;
use crate::visual::{self, VisualNeed};
use crate::GroqProvider;

/// Per-call `max_tokens` budgets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TokenLimits {
    pub reply: u32,
    pub classify: u32,
    pub location: u32,
}

impl Default for TokenLimits {
    fn default() -> Self {
        Self {
            reply: 900,
            classify: 900,
            location: 50,
        }
    }
}

impl From<&LlmConfig> for TokenLimits {
    fn from(config: &LlmConfig) -> Self {
        Self {
            reply: config.reply_max_tokens,
            classify: config.classify_max_tokens,
            location: config.location_max_tokens,
        }
    }
}

/// Image and location attached to a reply.
#[derive(Debug, Default, PartialEq, Eq)]
struct Visuals {
    image: Option<String>,
    location: Option<String>,
}

/// Produces assistant replies from a completion provider and image resolver.
pub struct ResponseOrchestrator {
    llm: Arc<dyn LlmProvider>,
    images: Arc<dyn ImageResolver>,
    limits: TokenLimits,
}

impl ResponseOrchestrator {
    pub fn new(llm: Arc<dyn LlmProvider>, images: Arc<dyn ImageResolver>) -> Self {
        Self {
            llm,
            images,
            limits: TokenLimits::default(),
        }
    }

    #[must_use]
    pub fn with_limits(mut self, limits: TokenLimits) -> Self {
        self.limits = limits;
        self
    }

    /// Build the Groq-backed orchestrator from configuration.
    pub fn from_config(config: &MarConfig) -> Result<Self, ChatError> {
        let llm = GroqProvider::new(&config.llm)?;
        let images = WebImageResolver::new(&config.image)?;
        info!(
            model = %config.llm.model,
            image_search = images.search_enabled(),
            "Response orchestrator ready"
        );
        Ok(Self::new(Arc::new(llm), Arc::new(images)).with_limits(TokenLimits::from(&config.llm)))
    }

    /// Model serving the persona completions.
    pub fn model(&self) -> &str {
        self.llm.model()
    }

    /// Produce a reply; failures become the fixed apology.
    pub async fn respond(
        &self,
        utterance: &str,
        language_name: &str,
        language_code: &str,
    ) -> OrchestratorReply {
        match self.try_respond(utterance, language_name, language_code).await {
            Ok(reply) => reply,
            Err(e) => {
                error!(error = %e, "Failed to produce reply");
                OrchestratorReply::failed()
            }
        }
    }

    /// Produce a reply, surfacing the cause of a failed persona completion.
    ///
    /// Classification and location failures never fail the reply; they only
    /// drop the image or location they would have produced.
    #[instrument(skip(self, utterance), fields(language = %language_code, provider = self.llm.name()))]
    pub async fn try_respond(
        &self,
        utterance: &str,
        language_name: &str,
        language_code: &str,
    ) -> Result<OrchestratorReply, ChatError> {
        if utterance.trim().is_empty() {
            return Err(ChatError::EmptyMessage);
        }

        let reply_request = CompletionRequest::with_system(
            prompts::persona(language_name, language_code),
            prompts::reply_prompt(utterance),
        )
        .max_tokens(self.limits.reply);

        let (reply, need) = tokio::join!(self.llm.complete(reply_request), self.classify(utterance));
        let reply = reply?;

        let visuals = self.resolve_visuals(utterance, &need).await;
        debug!(
            has_image = visuals.image.is_some(),
            has_location = visuals.location.is_some(),
            "Reply assembled"
        );

        Ok(OrchestratorReply {
            image: visuals.image,
            location: visuals.location,
            ..OrchestratorReply::text(reply.content)
        })
    }

    /// Ask the classifier whether the utterance calls for an image.
    pub async fn classify(&self, utterance: &str) -> VisualNeed {
        let request =
            CompletionRequest::prompt(prompts::classification_prompt(utterance)).max_tokens(self.limits.classify);

        let response = match self.llm.complete(request).await {
            Ok(r) => r,
            Err(e) => {
                warn!(error = %e, "Classification call failed");
                return VisualNeed::none();
            }
        };

        match visual::parse_classification(&response.content) {
            Ok(need) => need,
            Err(e) => {
                debug!(error = %e, "Unparseable classification");
                VisualNeed::none()
            }
        }
    }

    async fn resolve_visuals(&self, utterance: &str, need: &VisualNeed) -> Visuals {
        if let Some(query) = need.query() {
            let (image, location) =
                tokio::join!(self.images.resolve(query), self.lookup_location(query));
            return Visuals {
                image: Some(image),
                location,
            };
        }

        if let Some(hit) = lexicon::scan(utterance) {
            debug!(category = %hit.category, keyword = hit.keyword, "Lexicon match");
            let image = self.images.resolve(&hit.query).await;
            return Visuals {
                image: Some(image),
                location: lexicon::location_for(&hit.query).map(str::to_string),
            };
        }

        Visuals::default()
    }

    /// Ask for the full geographic name of a search phrase.
    pub async fn lookup_location(&self, phrase: &str) -> Option<String> {
        let request =
            CompletionRequest::prompt(prompts::location_prompt(phrase)).max_tokens(self.limits.location);

        match self.llm.complete(request).await {
            Ok(response) => visual::parse_location(&response.content).unwrap_or_else(|e| {
                debug!(error = %e, "Unparseable location");
                None
            }),
            Err(e) => {
                warn!(error = %e, "Location call failed");
                None
            }
        }
    }
}
