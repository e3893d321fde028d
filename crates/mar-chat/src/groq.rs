//! Groq completion provider.
//!
//! Groq serves Llama models behind an OpenAI-compatible
//! `/chat/completions` endpoint.

use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;
use tracing::{debug, instrument};

use mar_core::config::{mask_secret, LlmConfig};

use crate::error::ChatError;
use crate::llm::{CompletionRequest, CompletionResponse, LlmProvider, Message};

/// Groq provider (OpenAI-compatible).
pub struct GroqProvider {
    client: Client,
    base_url: String,
    model: String,
    api_key: String,
    timeout: Duration,
}

impl fmt::Debug for GroqProvider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GroqProvider")
            .field("base_url", &self.base_url)
            .field("model", &self.model)
            .field("api_key", &mask_secret(&self.api_key))
            .field("timeout", &self.timeout)
            .finish()
    }
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_tokens: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
    #[serde(default)]
    model: String,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: ChatResponseMessage,
    finish_reason: Option<String>,
}

#[derive(Deserialize)]
struct ChatResponseMessage {
    content: Option<String>,
}

/// Reduce upstream error text to something safe to log.
fn sanitize_api_error(error: &str) -> String {
    let lower = error.to_lowercase();

    if lower.contains("api key")
        || lower.contains("apikey")
        || lower.contains("invalid key")
        || lower.contains("unauthorized")
        || lower.contains("authentication")
    {
        return "API authentication error. Please check your GROQ_API_KEY.".to_string();
    }

    if lower.contains("rate limit") || lower.contains("quota") {
        return "Groq rate limit exceeded. Please wait.".to_string();
    }

    if error.len() < 100 && !error.contains("gsk_") && !lower.contains("key") {
        return error.to_string();
    }

    "An API error occurred.".to_string()
}

impl GroqProvider {
    /// Create a provider from the `[llm]` configuration section.
    pub fn new(config: &LlmConfig) -> Result<Self, ChatError> {
        if config.api_key.is_empty() {
            return Err(ChatError::NotConfigured("GROQ_API_KEY not set".to_string()));
        }

        let timeout = config.timeout();
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| ChatError::NotConfigured(format!("HTTP client: {}", e)))?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            model: config.model.clone(),
            api_key: config.api_key.clone(),
            timeout,
        })
    }

    fn convert_message(msg: &Message) -> ChatMessage<'_> {
        ChatMessage {
            role: msg.role.as_str(),
            content: &msg.content,
        }
    }
}

#[async_trait::async_trait]
impl LlmProvider for GroqProvider {
    fn name(&self) -> &str {
        "groq"
    }

    fn model(&self) -> &str {
        &self.model
    }

    #[instrument(skip(self, request), fields(model = %self.model, max_tokens = ?request.max_tokens))]
    async fn complete(&self, request: CompletionRequest) -> Result<CompletionResponse, ChatError> {
        let chat_request = ChatRequest {
            model: &self.model,
            messages: request.messages.iter().map(Self::convert_message).collect(),
            max_tokens: request.max_tokens,
            temperature: request.temperature,
        };

        debug!("Sending request to Groq");

        let response = self
            .client
            .post(format!("{}/chat/completions", self.base_url))
            .bearer_auth(&self.api_key)
            .json(&chat_request)
            .send()
            .await
            .map_err(|e| ChatError::from_transport(&e, self.timeout))?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            return Err(ChatError::Api(format!(
                "{}: {}",
                status.as_u16(),
                sanitize_api_error(&error_text)
            )));
        }

        let chat_response: ChatResponse = response
            .json()
            .await
            .map_err(|e| ChatError::InvalidResponse(e.to_string()))?;

        let choice = chat_response
            .choices
            .into_iter()
            .next()
            .ok_or_else(|| ChatError::InvalidResponse("No choices in response".to_string()))?;

        debug!(finish_reason = ?choice.finish_reason, "Groq completion received");

        Ok(CompletionResponse {
            content: choice.message.content.unwrap_or_default(),
            model: chat_response.model,
            finish_reason: choice.finish_reason,
        })
    }
}
