//! Text-generation provider abstraction.
//!
//! The orchestrator only needs single-shot completions, so the trait is a
//! single `complete` call over an OpenAI-style message list.

use std::sync::Mutex;

use serde::{Deserialize, Serialize};

use crate::error::ChatError;

/// Author of a prompt message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::System => "system",
            Role::User => "user",
            Role::Assistant => "assistant",
        }
    }
}

/// One prompt message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Message {
    pub role: Role,
    pub content: String,
}

impl Message {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: Role::System,
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }
}

/// A single completion call.
#[derive(Debug, Clone, PartialEq)]
pub struct CompletionRequest {
    pub messages: Vec<Message>,
    pub max_tokens: Option<u32>,
    pub temperature: Option<f32>,
}

impl CompletionRequest {
    /// A bare user prompt.
    pub fn prompt(prompt: impl Into<String>) -> Self {
        Self {
            messages: vec![Message::user(prompt)],
            max_tokens: None,
            temperature: None,
        }
    }

    /// A user prompt preceded by a system preamble.
    pub fn with_system(system: impl Into<String>, prompt: impl Into<String>) -> Self {
        Self {
            messages: vec![Message::system(system), Message::user(prompt)],
            max_tokens: None,
            temperature: None,
        }
    }

    #[must_use]
    pub fn max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = Some(max_tokens);
        self
    }

    /// All message contents joined, used for matching in tests and logs.
    pub fn transcript(&self) -> String {
        self.messages
            .iter()
            .map(|m| m.content.as_str())
            .collect::<Vec<_>>()
            .join("\n")
    }
}

/// Generated text plus provider metadata.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompletionResponse {
    pub content: String,
    pub model: String,
    pub finish_reason: Option<String>,
}

/// Trait for text-generation providers.
#[async_trait::async_trait]
pub trait LlmProvider: Send + Sync {
    /// Provider name for logs.
    fn name(&self) -> &str;

    /// Model used when serving requests.
    fn model(&self) -> &str;

    /// Run one completion.
    async fn complete(&self, request: CompletionRequest) -> Result<CompletionResponse, ChatError>;
}

// =============================================================================
// MockProvider
// =============================================================================

#[derive(Debug, Clone)]
enum Scripted {
    Reply(String),
    Fail(String),
}

/// Scripted provider for tests.
///
/// Each rule pairs a needle with a reply; the first rule whose needle occurs
/// anywhere in the request's messages answers it. Requests matching no rule
/// get the default reply.
pub struct MockProvider {
    rules: Vec<(String, Scripted)>,
    default: Scripted,
    requests: Mutex<Vec<CompletionRequest>>,
}

impl Default for MockProvider {
    fn default() -> Self {
        Self::new()
    }
}

impl MockProvider {
    #[must_use]
    pub fn new() -> Self {
        Self {
            rules: Vec::new(),
            default: Scripted::Reply("mock response".to_string()),
            requests: Mutex::new(Vec::new()),
        }
    }

    /// Answer requests containing `needle` with `reply`.
    #[must_use]
    pub fn on_prompt(mut self, needle: impl Into<String>, reply: impl Into<String>) -> Self {
        self.rules
            .push((needle.into(), Scripted::Reply(reply.into())));
        self
    }

    /// Fail requests containing `needle` with an API error.
    #[must_use]
    pub fn fail_on(mut self, needle: impl Into<String>, error: impl Into<String>) -> Self {
        self.rules.push((needle.into(), Scripted::Fail(error.into())));
        self
    }

    /// Reply used when no rule matches.
    #[must_use]
    pub fn with_default(mut self, reply: impl Into<String>) -> Self {
        self.default = Scripted::Reply(reply.into());
        self
    }

    /// Every request received so far, in arrival order.
    pub fn requests(&self) -> Vec<CompletionRequest> {
        self.requests
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }
}

#[async_trait::async_trait]
impl LlmProvider for MockProvider {
    fn name(&self) -> &str {
        "mock"
    }

    fn model(&self) -> &str {
        "mock-model"
    }

    async fn complete(&self, request: CompletionRequest) -> Result<CompletionResponse, ChatError> {
        let transcript = request.transcript();
        self.requests
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(request);

        let scripted = self
            .rules
            .iter()
            .find(|(needle, _)| transcript.contains(needle.as_str()))
            .map(|(_, s)| s)
            .unwrap_or(&self.default);

        match scripted {
            Scripted::Reply(text) => Ok(CompletionResponse {
                content: text.clone(),
                model: "mock-model".to_string(),
                finish_reason: Some("stop".to_string()),
            }),
            Scripted::Fail(msg) => Err(ChatError::Api(msg.clone())),
        }
    }
}
