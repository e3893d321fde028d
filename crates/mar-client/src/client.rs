//! Conversation client: the operations a chat UI drives.
//!
//! Session state sits behind a mutex that is never held across an await or
//! a speech backend call, so capture and playback events can be delivered
//! while a submission is in flight.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tracing::{debug, info, warn};

use mar_core::config::ClientConfig;
use mar_core::{ChatMessage, ChatRequest, Language, CLIENT_APOLOGY};

use crate::control::VoiceControlState;
use crate::error::ClientError;
use crate::session::{
    ConversationSession, STATUS_CAPTURE_ERROR, STATUS_CAPTURE_FAILED,
    STATUS_CAPTURE_UNAVAILABLE, STATUS_CLEARED, STATUS_LISTENING, STATUS_PLAYBACK_DONE,
    STATUS_SPEECH_DISABLED, STATUS_SPEECH_ENABLED,
};
use crate::speech::{CaptureEvent, PlaybackEvent, PlaybackToken, SpeechBackend, SpeechUtterance};
use crate::suggestions::{Suggestion, SuggestionOutcome, COMMISSION_PAGE};
use crate::transport::OrchestratorTransport;

/// Result of [`ConversationClient::submit`].
#[derive(Debug, Clone, PartialEq)]
pub enum SubmitOutcome {
    /// Blank input; nothing happened.
    Ignored,
    /// Another submission is still waiting for its reply.
    Busy,
    /// The orchestrator replied; this message was appended.
    Replied(ChatMessage),
    /// The orchestrator call failed; the local apology was appended.
    Failed(ChatMessage),
}

impl SubmitOutcome {
    /// The assistant message appended by this submission, if any.
    pub fn message(&self) -> Option<&ChatMessage> {
        match self {
            SubmitOutcome::Replied(m) | SubmitOutcome::Failed(m) => Some(m),
            _ => None,
        }
    }
}

/// Releases the waiting flag if a submission is dropped before its reply.
struct PendingReply<'a> {
    session: &'a Mutex<ConversationSession>,
    armed: bool,
}

impl<'a> PendingReply<'a> {
    fn new(session: &'a Mutex<ConversationSession>) -> Self {
        Self {
            session,
            armed: true,
        }
    }

    /// The reply arrived; the caller finishes the bookkeeping.
    fn disarm(mut self) {
        self.armed = false;
    }
}

impl Drop for PendingReply<'_> {
    fn drop(&mut self) {
        if !self.armed {
            return;
        }
        let mut s = self.session.lock().unwrap_or_else(PoisonError::into_inner);
        s.waiting = false;
        if s.control.is(VoiceControlState::Processing) {
            s.control.reset();
        }
        debug!("Submission abandoned before its reply");
    }
}

enum ControlAction {
    Nothing,
    StartCapture(&'static str),
    StopCapture,
    CancelSpeech,
}

pub struct ConversationClient {
    session: Mutex<ConversationSession>,
    transport: Arc<dyn OrchestratorTransport>,
    speech: Arc<dyn SpeechBackend>,
}

impl ConversationClient {
    pub fn new(transport: Arc<dyn OrchestratorTransport>, speech: Arc<dyn SpeechBackend>) -> Self {
        Self::with_session(ConversationSession::default(), transport, speech)
    }

    pub fn from_config(
        config: &ClientConfig,
        transport: Arc<dyn OrchestratorTransport>,
        speech: Arc<dyn SpeechBackend>,
    ) -> Self {
        Self::with_session(
            ConversationSession::new(config.playback_enabled),
            transport,
            speech,
        )
    }

    pub fn with_session(
        session: ConversationSession,
        transport: Arc<dyn OrchestratorTransport>,
        speech: Arc<dyn SpeechBackend>,
    ) -> Self {
        Self {
            session: Mutex::new(session),
            transport,
            speech,
        }
    }

    fn session(&self) -> MutexGuard<'_, ConversationSession> {
        self.session.lock().unwrap_or_else(PoisonError::into_inner)
    }

    // =========================================================================
    // Snapshots
    // =========================================================================

    pub fn messages(&self) -> Vec<ChatMessage> {
        self.session().messages().to_vec()
    }

    /// Current status line.
    pub fn status(&self) -> String {
        self.session().status.clone()
    }

    pub fn language(&self) -> Language {
        self.session().language
    }

    pub fn playback_enabled(&self) -> bool {
        self.session().playback_enabled
    }

    pub fn control_state(&self) -> VoiceControlState {
        self.session().control.current()
    }

    pub fn is_waiting(&self) -> bool {
        self.session().waiting
    }

    // =========================================================================
    // Submission
    // =========================================================================

    /// Send an utterance and append the reply.
    ///
    /// Blank input is ignored and a second submission while one is
    /// outstanding is rejected; neither touches the history.
    pub async fn submit(&self, utterance: &str) -> SubmitOutcome {
        let text = utterance.trim();
        if text.is_empty() {
            return SubmitOutcome::Ignored;
        }

        let (request, previous, cancel_speech) = {
            let mut s = self.session();
            if s.waiting {
                debug!("Submission rejected, request outstanding");
                return SubmitOutcome::Busy;
            }
            let previous = s.control.current();
            let cancel_speech = s.current_playback.take().is_some();
            if let Err(e) = s.control.transition(VoiceControlState::Processing) {
                warn!(error = %e, "Unexpected control state on submit");
            }
            s.push_user(text);
            s.set_status(format!("Processing: \"{}\"", text));
            s.waiting = true;
            (ChatRequest::new(text, &s.language), previous, cancel_speech)
        };

        let pending = PendingReply::new(&self.session);

        if cancel_speech {
            self.speech.cancel_speech();
        }
        if previous == VoiceControlState::Listening {
            self.speech.stop_capture();
        }

        let result = self.transport.send(&request).await;
        pending.disarm();

        let (outcome, playback) = {
            let mut s = self.session();
            s.waiting = false;
            s.control.reset();

            let outcome = match result {
                Ok(body) => {
                    info!(has_image = body.image.is_some(), "Reply received");
                    SubmitOutcome::Replied(s.push_assistant(
                        &body.message,
                        body.image,
                        body.location,
                    ))
                }
                Err(e) => {
                    warn!(error = %e, "Orchestrator request failed");
                    SubmitOutcome::Failed(s.push_assistant(CLIENT_APOLOGY, None, None))
                }
            };

            let reply_text = outcome
                .message()
                .map(|m| m.text.clone())
                .unwrap_or_default();
            s.set_status(reply_text.clone());

            let playback = if s.playback_enabled {
                Some((s.begin_playback(), reply_text, s.language))
            } else {
                None
            };
            (outcome, playback)
        };

        if let Some((token, text, language)) = playback {
            self.play(token, &text, &language);
        }
        outcome
    }

    fn play(&self, token: PlaybackToken, text: &str, language: &Language) {
        let voices = self.speech.list_voices();
        let utterance = SpeechUtterance::compose(token, text, language, &voices);
        debug!(token = token.0, voice = ?utterance.voice, "Speaking reply");
        if let Err(e) = self.speech.speak(utterance) {
            warn!(error = %e, "Playback could not start");
            let mut s = self.session();
            if s.is_current_playback(token) {
                s.current_playback = None;
            }
        }
    }

    // =========================================================================
    // Voice control
    // =========================================================================

    /// The single control surface: stop playback, stop capture, or start
    /// capture, depending on the current state.
    pub fn press_control(&self) -> VoiceControlState {
        let capture_available = self.speech.capture_available();

        let action = {
            let mut s = self.session();
            match s.control.current() {
                VoiceControlState::Speaking => {
                    s.current_playback = None;
                    s.control.reset();
                    ControlAction::CancelSpeech
                }
                VoiceControlState::Listening => {
                    s.control.reset();
                    ControlAction::StopCapture
                }
                VoiceControlState::Processing => ControlAction::Nothing,
                VoiceControlState::Idle if !capture_available => {
                    s.set_status(STATUS_CAPTURE_UNAVAILABLE);
                    ControlAction::Nothing
                }
                VoiceControlState::Idle => match s.control.transition(VoiceControlState::Listening) {
                    Ok(()) => {
                        s.set_status(STATUS_LISTENING);
                        ControlAction::StartCapture(s.language.capture_code())
                    }
                    Err(e) => {
                        warn!(error = %e, "Cannot start capture");
                        ControlAction::Nothing
                    }
                },
            }
        };

        match action {
            ControlAction::Nothing => {}
            ControlAction::CancelSpeech => self.speech.cancel_speech(),
            ControlAction::StopCapture => self.speech.stop_capture(),
            ControlAction::StartCapture(code) => {
                if let Err(e) = self.speech.start_capture(code) {
                    warn!(error = %e, "Could not start capture");
                    let mut s = self.session();
                    if s.control.is(VoiceControlState::Listening) {
                        s.control.reset();
                    }
                    s.set_status(STATUS_CAPTURE_FAILED);
                }
            }
        }

        self.control_state()
    }

    /// Apply a capture event. A final transcript is submitted.
    pub async fn on_capture(&self, event: CaptureEvent) -> Option<SubmitOutcome> {
        {
            let mut s = self.session();
            if s.control.is(VoiceControlState::Listening) {
                s.control.reset();
            }
            if let CaptureEvent::Error(ref msg) = event {
                warn!(error = %msg, "Speech capture error");
                s.set_status(STATUS_CAPTURE_ERROR);
            }
        }

        match event {
            CaptureEvent::Transcript(text) => Some(self.submit(&text).await),
            CaptureEvent::Error(_) | CaptureEvent::End => None,
        }
    }

    /// Apply a playback event. Returns false when the event was stale.
    pub fn on_playback(&self, event: PlaybackEvent) -> bool {
        let mut s = self.session();
        if !s.is_current_playback(event.token()) {
            debug!(token = event.token().0, "Dropping stale playback event");
            return false;
        }

        match event {
            PlaybackEvent::Started(_) => {
                if let Err(e) = s.control.transition(VoiceControlState::Speaking) {
                    debug!(error = %e, "Playback started outside Idle");
                }
            }
            PlaybackEvent::Ended(_) => {
                s.current_playback = None;
                if s.control.is(VoiceControlState::Speaking) {
                    s.control.reset();
                    s.set_status(STATUS_PLAYBACK_DONE);
                }
            }
            PlaybackEvent::Error(_, msg) => {
                warn!(error = %msg, "Playback error");
                s.current_playback = None;
                if s.control.is(VoiceControlState::Speaking) {
                    s.control.reset();
                }
            }
        }
        true
    }

    /// Flip spoken replies on or off. Turning them off cancels any
    /// utterance in progress. Returns the new setting.
    pub fn toggle_playback(&self) -> bool {
        let (enabled, cancel) = {
            let mut s = self.session();
            s.playback_enabled = !s.playback_enabled;
            let enabled = s.playback_enabled;
            let cancel = !enabled && s.current_playback.take().is_some();
            if !enabled && s.control.is(VoiceControlState::Speaking) {
                s.control.reset();
            }
            s.set_status(if enabled {
                STATUS_SPEECH_ENABLED
            } else {
                STATUS_SPEECH_DISABLED
            });
            (enabled, cancel)
        };

        if cancel {
            self.speech.cancel_speech();
        }
        enabled
    }

    // =========================================================================
    // Conversation settings
    // =========================================================================

    /// Select the language for future capture, requests and playback.
    pub fn set_language(&self, code: &str) -> Result<Language, ClientError> {
        let language =
            Language::find(code).ok_or_else(|| ClientError::UnknownLanguage(code.to_string()))?;
        let mut s = self.session();
        s.language = language;
        s.set_status(format!(
            "Language changed to {}. Ready to assist you!",
            language.name
        ));
        Ok(language)
    }

    /// Empty the history. Language, playback and in-flight requests are untouched.
    pub fn clear_history(&self) {
        let mut s = self.session();
        s.clear();
        s.set_status(STATUS_CLEARED);
    }

    /// Act on a suggested prompt: submit it, or hand back the page to open.
    pub async fn choose_suggestion(&self, suggestion: &Suggestion) -> SuggestionOutcome {
        if suggestion.redirect {
            self.session().set_status(suggestion.redirect_status());
            return SuggestionOutcome::Redirect(COMMISSION_PAGE);
        }
        SuggestionOutcome::Submitted(self.submit(suggestion.text).await)
    }
}
