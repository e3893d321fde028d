//! Fixed prompt suggestions offered at the start of a conversation.

use crate::client::SubmitOutcome;

/// Page that takes over commission conversations the assistant does not handle.
pub const COMMISSION_PAGE: &str = "https://www.facebook.com/marqph";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Suggestion {
    pub text: &'static str,
    pub icon: &'static str,
    /// Sent to the commission page instead of the chat.
    pub redirect: bool,
}

pub const SUGGESTIONS: [Suggestion; 4] = [
    Suggestion {
        text: "What are your current commission rates?",
        icon: "💰",
        redirect: false,
    },
    Suggestion {
        text: "Hi! I'm interested in getting a portrait commission. Can you help me?",
        icon: "🎨",
        redirect: true,
    },
    Suggestion {
        text: "I'd like to order an A4 portrait, is there a slot available?",
        icon: "📝",
        redirect: true,
    },
    Suggestion {
        text: "Do you accept rush orders for portraits?",
        icon: "⚡",
        redirect: true,
    },
];

/// What choosing a suggestion did.
#[derive(Debug, Clone, PartialEq)]
pub enum SuggestionOutcome {
    Submitted(SubmitOutcome),
    /// The caller should open this URL.
    Redirect(&'static str),
}

impl Suggestion {
    pub fn redirect_status(&self) -> String {
        format!("Redirecting to MARQ Facebook page for: \"{}\"", self.text)
    }
}
