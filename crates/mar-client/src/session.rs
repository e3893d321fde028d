//! Per-conversation state owned by the client.

use mar_core::{ChatMessage, Language, MessageId};

use crate::control::VoiceControl;
use crate::speech::PlaybackToken;

/// Status line shown when a conversation starts.
pub const GREETING: &str = "Good day. I'm MAR, your personal AI assistant. I'm here to help you with anything you need - from answering questions to solving problems. How may I assist you today?";

pub const STATUS_LISTENING: &str = "Listening...";
pub const STATUS_CAPTURE_FAILED: &str = "Could not start voice recognition. Please use the chat.";
pub const STATUS_CAPTURE_UNAVAILABLE: &str =
    "Voice recognition not available. Please use the chat below.";
pub const STATUS_CAPTURE_ERROR: &str =
    "Speech recognition error. Please try again or use the chat.";
pub const STATUS_PLAYBACK_DONE: &str = "Ready to help you with anything...";
pub const STATUS_CLEARED: &str = "Conversation cleared. How can I help you today?";
pub const STATUS_SPEECH_ENABLED: &str = "Speech enabled";
pub const STATUS_SPEECH_DISABLED: &str = "Speech disabled";

/// Conversation state: history, language, playback and control flags.
///
/// The message list is append-only; [`ConversationSession::clear`] is the
/// only way entries leave it.
#[derive(Debug, Clone)]
pub struct ConversationSession {
    messages: Vec<ChatMessage>,
    pub language: Language,
    pub playback_enabled: bool,
    pub control: VoiceControl,
    pub waiting: bool,
    pub status: String,
    next_id: MessageId,
    next_playback: u64,
    /// Playback whose events are still honoured.
    pub current_playback: Option<PlaybackToken>,
}

impl Default for ConversationSession {
    fn default() -> Self {
        Self::new(true)
    }
}

impl ConversationSession {
    pub fn new(playback_enabled: bool) -> Self {
        Self {
            messages: Vec::new(),
            language: Language::default(),
            playback_enabled,
            control: VoiceControl::new(),
            waiting: false,
            status: GREETING.to_string(),
            next_id: MessageId::FIRST,
            next_playback: 0,
            current_playback: None,
        }
    }

    pub fn messages(&self) -> &[ChatMessage] {
        &self.messages
    }

    fn allocate_id(&mut self) -> MessageId {
        let id = self.next_id;
        self.next_id = id.next();
        id
    }

    pub fn push_user(&mut self, text: &str) -> ChatMessage {
        let message = ChatMessage::user(self.allocate_id(), text);
        self.messages.push(message.clone());
        message
    }

    pub fn push_assistant(
        &mut self,
        text: &str,
        image_url: Option<String>,
        location: Option<String>,
    ) -> ChatMessage {
        let message = ChatMessage::assistant(self.allocate_id(), text, image_url, location);
        self.messages.push(message.clone());
        message
    }

    /// Drop all messages. Identifiers keep increasing afterwards.
    pub fn clear(&mut self) {
        self.messages.clear();
    }

    /// Start a new playback generation, superseding any earlier one.
    pub fn begin_playback(&mut self) -> PlaybackToken {
        self.next_playback += 1;
        let token = PlaybackToken(self.next_playback);
        self.current_playback = Some(token);
        token
    }

    /// Whether events for `token` should still be applied.
    pub fn is_current_playback(&self, token: PlaybackToken) -> bool {
        self.current_playback == Some(token)
    }

    pub fn set_status(&mut self, status: impl Into<String>) {
        self.status = status.into();
    }
}
