//! Shared domain and wire types.
//!
//! `ChatMessage` and `Language` belong to the conversation client,
//! `OrchestratorReply` to the response orchestrator, and the `Chat*Body`
//! types describe the JSON exchanged between the two over HTTP.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Apology returned by the orchestrator when a turn fails server-side.
pub const SERVER_APOLOGY: &str =
    "I apologize, but I encountered a technical difficulty. Please try again - I'm here to help you.";

/// Assistant message appended by the client when the orchestrator call itself fails.
pub const CLIENT_APOLOGY: &str =
    "I apologize, but I encountered a technical difficulty. Please try again.";

// =============================================================================
// Messages
// =============================================================================

/// Opaque, strictly increasing message identifier allocated by a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MessageId(u64);

impl MessageId {
    /// The first identifier handed out by a fresh session.
    pub const FIRST: MessageId = MessageId(1);

    /// The identifier following this one.
    pub fn next(self) -> Self {
        MessageId(self.0.saturating_add(1))
    }

    pub fn value(self) -> u64 {
        self.0
    }
}

impl fmt::Display for MessageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// One turn in the conversation. Never mutated after creation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub id: MessageId,
    pub text: String,
    pub is_from_user: bool,
    pub created_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
}

impl ChatMessage {
    /// A message typed or spoken by the user.
    pub fn user(id: MessageId, text: impl Into<String>) -> Self {
        Self {
            id,
            text: text.into(),
            is_from_user: true,
            created_at: Utc::now(),
            image_url: None,
            location: None,
        }
    }

    /// A reply from the assistant, optionally carrying visual context.
    pub fn assistant(
        id: MessageId,
        text: impl Into<String>,
        image_url: Option<String>,
        location: Option<String>,
    ) -> Self {
        Self {
            id,
            text: text.into(),
            is_from_user: false,
            created_at: Utc::now(),
            image_url,
            location,
        }
    }
}

// =============================================================================
// Languages
// =============================================================================

/// A selectable conversation language.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct Language {
    /// BCP-47-like tag, e.g. `en-US`.
    pub code: &'static str,
    /// Display name, also sent to the orchestrator.
    pub name: &'static str,
    /// Flag glyph shown next to the name.
    pub flag: &'static str,
}

/// The fixed set of supported languages, in menu order.
pub const LANGUAGES: &[Language] = &[
    Language { code: "en-US", name: "English", flag: "🇺🇸" },
    Language { code: "ceb-PH", name: "Cebuano", flag: "🇵🇭" },
    Language { code: "fil-PH", name: "Filipino", flag: "🇵🇭" },
    Language { code: "es-ES", name: "Spanish", flag: "🇪🇸" },
    Language { code: "fr-FR", name: "French", flag: "🇫🇷" },
    Language { code: "de-DE", name: "German", flag: "🇩🇪" },
    Language { code: "ja-JP", name: "Japanese", flag: "🇯🇵" },
    Language { code: "ko-KR", name: "Korean", flag: "🇰🇷" },
    Language { code: "zh-CN", name: "Chinese", flag: "🇨🇳" },
];

impl Language {
    /// Look up a supported language by its exact code.
    pub fn find(code: &str) -> Option<Language> {
        LANGUAGES.iter().copied().find(|l| l.code == code)
    }

    /// Primary language subtag (`fil` for `fil-PH`).
    pub fn prefix(&self) -> &'static str {
        self.code.split('-').next().unwrap_or(self.code)
    }

    /// Locale used for speech capture.
    ///
    /// Recognizers have no Cebuano or Filipino models, so both capture as US English.
    pub fn capture_code(&self) -> &'static str {
        match self.code {
            "ceb-PH" | "fil-PH" => "en-US",
            other => other,
        }
    }
}

impl Default for Language {
    fn default() -> Self {
        LANGUAGES[0]
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.flag, self.name)
    }
}

// =============================================================================
// Orchestrator reply
// =============================================================================

/// Whether an orchestrator run completed or degraded to the apology.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReplyStatus {
    Ok,
    Failed,
}

/// Result of one full orchestrator pipeline run. Transient.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrchestratorReply {
    pub message: String,
    pub image: Option<String>,
    pub location: Option<String>,
    pub status: ReplyStatus,
}

impl OrchestratorReply {
    /// A successful reply without visual context.
    pub fn text(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            image: None,
            location: None,
            status: ReplyStatus::Ok,
        }
    }

    /// The recoverable-failure reply: fixed apology, nothing else.
    pub fn failed() -> Self {
        Self {
            message: SERVER_APOLOGY.to_string(),
            image: None,
            location: None,
            status: ReplyStatus::Failed,
        }
    }

    pub fn is_failure(&self) -> bool {
        self.status == ReplyStatus::Failed
    }

    /// Wire body for a successful reply.
    pub fn into_body(self) -> ChatReplyBody {
        ChatReplyBody {
            message: self.message,
            image: self.image,
            location: self.location,
        }
    }
}

// =============================================================================
// Wire types
// =============================================================================

fn default_language_name() -> String {
    Language::default().name.to_string()
}

fn default_language_code() -> String {
    Language::default().code.to_string()
}

/// Request body for `POST /api/chat`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatRequest {
    pub message: String,
    #[serde(default = "default_language_name")]
    pub language: String,
    #[serde(default = "default_language_code")]
    pub language_code: String,
}

impl ChatRequest {
    pub fn new(message: impl Into<String>, language: &Language) -> Self {
        Self {
            message: message.into(),
            language: language.name.to_string(),
            language_code: language.code.to_string(),
        }
    }
}

/// Successful response body for `POST /api/chat`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatReplyBody {
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
}

/// Failure response body for `POST /api/chat`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatErrorBody {
    pub error: String,
}
