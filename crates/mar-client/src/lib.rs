//! Conversation client for the MAR assistant.
//!
//! Holds the in-memory conversation, drives voice capture and playback
//! through a [`SpeechBackend`], and dispatches utterances to the response
//! orchestrator through an [`OrchestratorTransport`].

pub mod client;
pub mod control;
pub mod error;
pub mod session;
pub mod speech;
pub mod suggestions;
pub mod transport;

pub use client::{ConversationClient, SubmitOutcome};
pub use control::{VoiceControl, VoiceControlState};
pub use error::ClientError;
pub use session::ConversationSession;
pub use speech::{
    CaptureEvent, PlaybackEvent, PlaybackToken, Prosody, SilentSpeech, SpeechBackend,
    SpeechUtterance, VoiceInfo,
};
pub use suggestions::{Suggestion, SuggestionOutcome, SUGGESTIONS};
pub use transport::{HttpTransport, LocalTransport, OrchestratorTransport};
