//! End-to-end behaviour of the conversation client against fake speech and
//! transport implementations.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use tokio::sync::Notify;

use mar_client::session::{
    GREETING, STATUS_CAPTURE_ERROR, STATUS_LISTENING, STATUS_PLAYBACK_DONE,
};
use mar_client::{
    CaptureEvent, ClientError, ConversationClient, OrchestratorTransport, PlaybackEvent,
    SpeechBackend, SpeechUtterance, SubmitOutcome, SuggestionOutcome, VoiceControlState,
    VoiceInfo, SUGGESTIONS,
};
use mar_core::{ChatReplyBody, ChatRequest, CLIENT_APOLOGY};

// =============================================================================
// Fakes
// =============================================================================

#[derive(Debug, Clone, PartialEq)]
enum SpeechCall {
    StartCapture(String),
    StopCapture,
    Speak(SpeechUtterance),
    Cancel,
}

struct RecordingSpeech {
    capture_available: bool,
    capture_fails: bool,
    calls: Mutex<Vec<SpeechCall>>,
}

impl RecordingSpeech {
    fn new() -> Self {
        Self {
            capture_available: true,
            capture_fails: false,
            calls: Mutex::new(Vec::new()),
        }
    }

    fn calls(&self) -> Vec<SpeechCall> {
        self.calls.lock().unwrap().clone()
    }

    fn spoken(&self) -> Vec<SpeechUtterance> {
        self.calls()
            .into_iter()
            .filter_map(|c| match c {
                SpeechCall::Speak(u) => Some(u),
                _ => None,
            })
            .collect()
    }

    fn last_spoken(&self) -> SpeechUtterance {
        self.spoken().pop().expect("nothing spoken")
    }
}

impl SpeechBackend for RecordingSpeech {
    fn capture_available(&self) -> bool {
        self.capture_available
    }

    fn start_capture(&self, language_code: &str) -> Result<(), ClientError> {
        self.calls
            .lock()
            .unwrap()
            .push(SpeechCall::StartCapture(language_code.to_string()));
        if self.capture_fails {
            Err(ClientError::Speech("microphone busy".to_string()))
        } else {
            Ok(())
        }
    }

    fn stop_capture(&self) {
        self.calls.lock().unwrap().push(SpeechCall::StopCapture);
    }

    fn speak(&self, utterance: SpeechUtterance) -> Result<(), ClientError> {
        self.calls.lock().unwrap().push(SpeechCall::Speak(utterance));
        Ok(())
    }

    fn cancel_speech(&self) {
        self.calls.lock().unwrap().push(SpeechCall::Cancel);
    }

    fn list_voices(&self) -> Vec<VoiceInfo> {
        vec![VoiceInfo::new("Google US English Female", "en-US")]
    }
}

/// Transport answering from a queue; optionally parks until released.
struct ScriptedTransport {
    replies: Mutex<VecDeque<Result<ChatReplyBody, ClientError>>>,
    requests: Mutex<Vec<ChatRequest>>,
    gate: Option<(Arc<Notify>, Arc<Notify>)>,
}

impl ScriptedTransport {
    fn new(replies: Vec<Result<ChatReplyBody, ClientError>>) -> Self {
        Self {
            replies: Mutex::new(replies.into()),
            requests: Mutex::new(Vec::new()),
            gate: None,
        }
    }

    fn gated(mut self, entered: Arc<Notify>, release: Arc<Notify>) -> Self {
        self.gate = Some((entered, release));
        self
    }

    fn requests(&self) -> Vec<ChatRequest> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait::async_trait]
impl OrchestratorTransport for ScriptedTransport {
    async fn send(&self, request: &ChatRequest) -> Result<ChatReplyBody, ClientError> {
        self.requests.lock().unwrap().push(request.clone());
        if let Some((entered, release)) = &self.gate {
            entered.notify_one();
            release.notified().await;
        }
        self.replies
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(ClientError::Network("no scripted reply".to_string())))
    }
}

fn reply(message: &str) -> Result<ChatReplyBody, ClientError> {
    Ok(ChatReplyBody {
        message: message.to_string(),
        image: None,
        location: None,
    })
}

fn client_with(
    replies: Vec<Result<ChatReplyBody, ClientError>>,
) -> (ConversationClient, Arc<ScriptedTransport>, Arc<RecordingSpeech>) {
    let transport = Arc::new(ScriptedTransport::new(replies));
    let speech = Arc::new(RecordingSpeech::new());
    let client = ConversationClient::new(transport.clone(), speech.clone());
    (client, transport, speech)
}

// =============================================================================
// Submission
// =============================================================================

#[tokio::test]
async fn test_blank_submission_is_ignored() {
    let (client, transport, speech) = client_with(vec![]);

    assert_eq!(client.submit("").await, SubmitOutcome::Ignored);
    assert_eq!(client.submit("   \n\t").await, SubmitOutcome::Ignored);

    assert!(client.messages().is_empty());
    assert!(transport.requests().is_empty());
    assert!(speech.calls().is_empty());
    assert_eq!(client.status(), GREETING);
}

#[tokio::test]
async fn test_submit_appends_user_and_reply() {
    let (client, transport, speech) = client_with(vec![Ok(ChatReplyBody {
        message: "Chocolate Hills are in Carmen.".to_string(),
        image: Some("https://img.example/hills.jpg".to_string()),
        location: Some("Chocolate Hills, Carmen, Bohol, Philippines".to_string()),
    })]);

    let outcome = client.submit("  Tell me about chocolate hills  ").await;
    let assistant = outcome.message().cloned().unwrap();
    assert!(matches!(outcome, SubmitOutcome::Replied(_)));

    let messages = client.messages();
    assert_eq!(messages.len(), 2);
    assert!(messages[0].is_from_user);
    assert_eq!(messages[0].text, "Tell me about chocolate hills");
    assert_eq!(messages[1], assistant);
    assert_eq!(
        messages[1].location.as_deref(),
        Some("Chocolate Hills, Carmen, Bohol, Philippines")
    );
    assert!(messages[0].id < messages[1].id);
    assert!(messages[0].created_at <= messages[1].created_at);

    let sent = transport.requests();
    assert_eq!(sent[0].message, "Tell me about chocolate hills");
    assert_eq!(sent[0].language_code, "en-US");

    assert_eq!(client.status(), "Chocolate Hills are in Carmen.");
    assert!(!client.is_waiting());
    assert_eq!(client.control_state(), VoiceControlState::Idle);
    assert_eq!(speech.last_spoken().text, "Chocolate Hills are in Carmen.");
}

#[tokio::test]
async fn test_transport_failure_appends_local_apology() {
    let (client, _transport, speech) = client_with(vec![Err(ClientError::Status {
        code: 500,
        message: "boom".to_string(),
    })]);

    let outcome = client.submit("hello").await;
    assert!(matches!(outcome, SubmitOutcome::Failed(_)));

    let messages = client.messages();
    assert_eq!(messages.len(), 2);
    assert_eq!(messages[1].text, CLIENT_APOLOGY);
    assert!(!messages[1].is_from_user);
    assert_eq!(client.status(), CLIENT_APOLOGY);
    assert!(!client.is_waiting());
    assert_eq!(speech.last_spoken().text, CLIENT_APOLOGY);
}

#[tokio::test]
async fn test_concurrent_submission_is_busy() {
    let entered = Arc::new(Notify::new());
    let release = Arc::new(Notify::new());
    let transport = Arc::new(
        ScriptedTransport::new(vec![reply("first reply")]).gated(entered.clone(), release.clone()),
    );
    let speech = Arc::new(RecordingSpeech::new());
    let client = Arc::new(ConversationClient::new(transport.clone(), speech));

    let pending = {
        let client = client.clone();
        tokio::spawn(async move { client.submit("first").await })
    };
    entered.notified().await;

    assert!(client.is_waiting());
    assert_eq!(client.control_state(), VoiceControlState::Processing);
    assert_eq!(client.status(), "Processing: \"first\"");
    assert_eq!(client.submit("second").await, SubmitOutcome::Busy);
    assert_eq!(client.messages().len(), 1);

    release.notify_one();
    let outcome = pending.await.unwrap();
    assert!(matches!(outcome, SubmitOutcome::Replied(_)));
    assert_eq!(client.messages().len(), 2);
    assert_eq!(transport.requests().len(), 1);
    assert!(!client.is_waiting());
}

#[tokio::test]
async fn test_abandoned_submission_releases_waiting() {
    let entered = Arc::new(Notify::new());
    let release = Arc::new(Notify::new());
    let transport = Arc::new(
        ScriptedTransport::new(vec![reply("second reply")]).gated(entered, release.clone()),
    );
    let speech = Arc::new(RecordingSpeech::new());
    let client = ConversationClient::new(transport.clone(), speech);

    let abandoned = tokio::time::timeout(Duration::from_millis(50), client.submit("first")).await;
    assert!(abandoned.is_err());
    assert!(!client.is_waiting());
    assert_eq!(client.control_state(), VoiceControlState::Idle);

    release.notify_one();
    match client.submit("second").await {
        SubmitOutcome::Replied(m) => assert_eq!(m.text, "second reply"),
        other => panic!("expected a reply, got {:?}", other),
    }
    assert!(!client.is_waiting());
    assert_eq!(transport.requests().len(), 2);
}

// =============================================================================
// Playback
// =============================================================================

#[tokio::test]
async fn test_playback_end_while_listening_keeps_capture_status() {
    let (client, _transport, speech) = client_with(vec![reply("Good day.")]);
    client.submit("hi").await;
    let token = speech.last_spoken().token;

    // Capture begins before the audio does.
    assert_eq!(client.press_control(), VoiceControlState::Listening);
    assert!(client.on_playback(PlaybackEvent::Started(token)));
    assert_eq!(client.control_state(), VoiceControlState::Listening);

    assert!(client.on_playback(PlaybackEvent::Ended(token)));
    assert_eq!(client.control_state(), VoiceControlState::Listening);
    assert_eq!(client.status(), STATUS_LISTENING);
}

#[tokio::test]
async fn test_playback_events_drive_state() {
    let (client, _transport, speech) = client_with(vec![reply("Good day.")]);
    client.submit("hi").await;
    let token = speech.last_spoken().token;

    assert!(client.on_playback(PlaybackEvent::Started(token)));
    assert_eq!(client.control_state(), VoiceControlState::Speaking);

    assert!(client.on_playback(PlaybackEvent::Ended(token)));
    assert_eq!(client.control_state(), VoiceControlState::Idle);
    assert_eq!(client.status(), STATUS_PLAYBACK_DONE);

    // Already finished: a repeat is stale.
    assert!(!client.on_playback(PlaybackEvent::Ended(token)));
}

#[tokio::test]
async fn test_disabling_playback_mid_utterance_cancels_it() {
    let (client, _transport, speech) = client_with(vec![reply("A long story...")]);
    client.submit("tell me a story").await;
    let token = speech.last_spoken().token;
    client.on_playback(PlaybackEvent::Started(token));
    assert_eq!(client.control_state(), VoiceControlState::Speaking);

    assert!(!client.toggle_playback());
    assert!(!client.playback_enabled());
    assert_eq!(client.control_state(), VoiceControlState::Idle);
    assert_eq!(speech.calls().last(), Some(&SpeechCall::Cancel));

    // Late events from the canceled utterance have no effect.
    let status = client.status();
    assert!(!client.on_playback(PlaybackEvent::Started(token)));
    assert!(!client.on_playback(PlaybackEvent::Ended(token)));
    assert_eq!(client.control_state(), VoiceControlState::Idle);
    assert_eq!(client.status(), status);
}

#[tokio::test]
async fn test_disabled_playback_speaks_nothing() {
    let (client, _transport, speech) = client_with(vec![reply("quiet"), reply("loud")]);
    client.toggle_playback();
    client.submit("one").await;
    assert!(speech.spoken().is_empty());

    assert!(client.toggle_playback());
    client.submit("two").await;
    assert_eq!(speech.spoken().len(), 1);
}

#[tokio::test]
async fn test_new_reply_supersedes_previous_playback() {
    let (client, _transport, speech) = client_with(vec![reply("first"), reply("second")]);
    client.submit("one").await;
    let first = speech.last_spoken().token;
    client.submit("two").await;
    let second = speech.last_spoken().token;

    assert_ne!(first, second);
    assert!(!client.on_playback(PlaybackEvent::Started(first)));
    assert!(client.on_playback(PlaybackEvent::Started(second)));
}

#[tokio::test]
async fn test_press_control_while_speaking_stops_playback() {
    let (client, _transport, speech) = client_with(vec![reply("hello there")]);
    client.submit("hi").await;
    let token = speech.last_spoken().token;
    client.on_playback(PlaybackEvent::Started(token));

    assert_eq!(client.press_control(), VoiceControlState::Idle);
    assert_eq!(speech.calls().last(), Some(&SpeechCall::Cancel));
    assert!(!client.on_playback(PlaybackEvent::Ended(token)));
}

// =============================================================================
// Capture
// =============================================================================

#[tokio::test]
async fn test_capture_round_trip() {
    let (client, transport, speech) = client_with(vec![reply("Maayong buntag!")]);
    client.set_language("ceb-PH").unwrap();

    assert_eq!(client.press_control(), VoiceControlState::Listening);
    assert_eq!(client.status(), "Listening...");
    assert_eq!(speech.calls()[0], SpeechCall::StartCapture("en-US".to_string()));

    let outcome = client
        .on_capture(CaptureEvent::Transcript("maayong buntag".to_string()))
        .await
        .unwrap();
    assert!(matches!(outcome, SubmitOutcome::Replied(_)));
    assert_eq!(client.control_state(), VoiceControlState::Idle);

    let sent = transport.requests();
    assert_eq!(sent[0].language, "Cebuano");
    assert_eq!(sent[0].language_code, "ceb-PH");

    let spoken = speech.last_spoken();
    assert_eq!(spoken.lang, "ceb-PH");
    assert_eq!(spoken.prosody.rate, 0.90);
}

#[tokio::test]
async fn test_capture_language_for_spanish() {
    let (client, _transport, speech) = client_with(vec![]);
    client.set_language("es-ES").unwrap();
    client.press_control();
    assert_eq!(speech.calls()[0], SpeechCall::StartCapture("es-ES".to_string()));
}

#[tokio::test]
async fn test_press_control_toggles_capture() {
    let (client, _transport, speech) = client_with(vec![]);
    assert_eq!(client.press_control(), VoiceControlState::Listening);
    assert_eq!(client.press_control(), VoiceControlState::Idle);
    assert_eq!(speech.calls().last(), Some(&SpeechCall::StopCapture));
}

#[tokio::test]
async fn test_capture_error_returns_to_idle() {
    let (client, _transport, _speech) = client_with(vec![]);
    client.press_control();

    let outcome = client
        .on_capture(CaptureEvent::Error("no-speech".to_string()))
        .await;
    assert!(outcome.is_none());
    assert_eq!(client.control_state(), VoiceControlState::Idle);
    assert_eq!(client.status(), STATUS_CAPTURE_ERROR);
    assert!(client.messages().is_empty());
}

#[tokio::test]
async fn test_capture_end_returns_to_idle() {
    let (client, _transport, _speech) = client_with(vec![]);
    client.press_control();
    assert!(client.on_capture(CaptureEvent::End).await.is_none());
    assert_eq!(client.control_state(), VoiceControlState::Idle);
}

#[tokio::test]
async fn test_capture_start_failure_and_unavailable() {
    let transport = Arc::new(ScriptedTransport::new(vec![]));

    let failing = Arc::new(RecordingSpeech {
        capture_fails: true,
        ..RecordingSpeech::new()
    });
    let client = ConversationClient::new(transport.clone(), failing);
    assert_eq!(client.press_control(), VoiceControlState::Idle);
    assert_eq!(
        client.status(),
        "Could not start voice recognition. Please use the chat."
    );

    let unavailable = Arc::new(RecordingSpeech {
        capture_available: false,
        ..RecordingSpeech::new()
    });
    let client = ConversationClient::new(transport, unavailable.clone());
    assert_eq!(client.press_control(), VoiceControlState::Idle);
    assert_eq!(
        client.status(),
        "Voice recognition not available. Please use the chat below."
    );
    assert!(unavailable.calls().is_empty());
}

// =============================================================================
// Settings
// =============================================================================

#[tokio::test]
async fn test_clear_history_keeps_language() {
    let (client, _transport, _speech) = client_with(vec![reply("Bonjour")]);
    client.set_language("fr-FR").unwrap();
    client.submit("salut").await;
    assert_eq!(client.messages().len(), 2);

    client.clear_history();
    assert!(client.messages().is_empty());
    assert_eq!(client.language().code, "fr-FR");
    assert_eq!(client.status(), "Conversation cleared. How can I help you today?");
}

#[tokio::test]
async fn test_unknown_language_is_rejected() {
    let (client, _transport, _speech) = client_with(vec![]);
    let err = client.set_language("xx-XX").unwrap_err();
    assert!(matches!(err, ClientError::UnknownLanguage(_)));
    assert_eq!(client.language().code, "en-US");

    let lang = client.set_language("ja-JP").unwrap();
    assert_eq!(lang.name, "Japanese");
    assert_eq!(client.status(), "Language changed to Japanese. Ready to assist you!");
}

#[tokio::test]
async fn test_suggestions() {
    let (client, transport, _speech) = client_with(vec![reply("A4 1 person ₱800")]);

    let outcome = client.choose_suggestion(&SUGGESTIONS[1]).await;
    assert_eq!(outcome, SuggestionOutcome::Redirect("https://www.facebook.com/marqph"));
    assert!(client.status().starts_with("Redirecting to MARQ Facebook page for: "));
    assert!(transport.requests().is_empty());

    let outcome = client.choose_suggestion(&SUGGESTIONS[0]).await;
    assert!(matches!(
        outcome,
        SuggestionOutcome::Submitted(SubmitOutcome::Replied(_))
    ));
    assert_eq!(
        transport.requests()[0].message,
        "What are your current commission rates?"
    );
}
