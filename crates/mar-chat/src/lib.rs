//! Response orchestration for the MAR assistant.
//!
//! Turns one user utterance into a reply: a persona completion, a
//! visual-need classification, and an optional image and location lookup
//! driven either by the classifier or by a fixed keyword lexicon.

pub mod error;
pub mod groq;
pub mod image;
pub mod lexicon;
pub mod llm;
pub mod orchestrator;
pub mod prompts;
pub mod visual;

pub use error::ChatError;
pub use groq::GroqProvider;
pub use image::{ImageResolver, WebImageResolver};
pub use lexicon::{Category, KeywordMatch};
pub use llm::{CompletionRequest, CompletionResponse, LlmProvider, Message, MockProvider, Role};
pub use orchestrator::{ResponseOrchestrator, TokenLimits};
pub use visual::VisualNeed;
