//! Voice control state machine.
//!
//! One control surface drives capture and playback, so the four states are
//! mutually exclusive:
//! - Idle -> Listening (start capture)
//! - Listening -> Idle (capture stopped, ended or failed)
//! - Idle | Listening | Speaking -> Processing (utterance submitted)
//! - Processing -> Idle (reply or failure received)
//! - Idle -> Speaking (playback started)
//! - Speaking -> Idle (playback ended, failed or canceled)

use std::fmt;

use crate::error::ClientError;

/// Operational state of the voice control.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum VoiceControlState {
    #[default]
    Idle,
    /// Capturing speech from the microphone.
    Listening,
    /// Playing back a reply.
    Speaking,
    /// Waiting for the orchestrator.
    Processing,
}

impl fmt::Display for VoiceControlState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            VoiceControlState::Idle => write!(f, "Idle"),
            VoiceControlState::Listening => write!(f, "Listening"),
            VoiceControlState::Speaking => write!(f, "Speaking"),
            VoiceControlState::Processing => write!(f, "Processing"),
        }
    }
}

impl VoiceControlState {
    /// Returns whether a transition from `self` to `target` is valid.
    pub fn can_transition_to(&self, target: &VoiceControlState) -> bool {
        use VoiceControlState::*;
        matches!(
            (self, target),
            (Idle, Listening)
                | (Listening, Idle)
                | (Idle, Processing)
                | (Listening, Processing)
                | (Speaking, Processing)
                | (Processing, Idle)
                | (Idle, Speaking)
                | (Speaking, Idle)
        )
    }
}

/// Validated holder for the current control state.
#[derive(Debug, Clone, Default)]
pub struct VoiceControl {
    state: VoiceControlState,
}

impl VoiceControl {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn current(&self) -> VoiceControlState {
        self.state
    }

    /// Attempt to move to `target`, rejecting transitions not in the table.
    pub fn transition(&mut self, target: VoiceControlState) -> Result<(), ClientError> {
        if self.state.can_transition_to(&target) {
            tracing::debug!("Voice control: {} -> {}", self.state, target);
            self.state = target;
            Ok(())
        } else {
            Err(ClientError::InvalidTransition(format!(
                "{} -> {}",
                self.state, target
            )))
        }
    }

    /// Move to Idle from whatever state, if not already there.
    pub fn reset(&mut self) {
        if self.state != VoiceControlState::Idle {
            tracing::debug!("Voice control reset to Idle from {}", self.state);
            self.state = VoiceControlState::Idle;
        }
    }

    pub fn is(&self, state: VoiceControlState) -> bool {
        self.state == state
    }
}
