//! Speech capture and playback capability.
//!
//! Platform speech engines are event driven: the client starts capture or
//! playback through [`SpeechBackend`] and is later told what happened via
//! [`CaptureEvent`] and [`PlaybackEvent`]. Voice choice, prosody and
//! pronunciation fixes are decided here so every backend speaks alike.

use std::sync::LazyLock;

use regex::Regex;
use tracing::debug;

use mar_core::Language;

use crate::error::ClientError;

/// Identifies one playback request; events for older tokens are stale.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PlaybackToken(pub u64);

/// A synthesis voice offered by the platform.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VoiceInfo {
    pub name: String,
    /// BCP 47 locale, e.g. `en-GB`.
    pub lang: String,
}

impl VoiceInfo {
    pub fn new(name: impl Into<String>, lang: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            lang: lang.into(),
        }
    }
}

/// Rate, pitch and volume for one utterance.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Prosody {
    pub rate: f32,
    pub pitch: f32,
    pub volume: f32,
}

/// Everything a backend needs to speak one reply.
#[derive(Debug, Clone, PartialEq)]
pub struct SpeechUtterance {
    pub token: PlaybackToken,
    pub text: String,
    pub lang: &'static str,
    /// Name of the chosen voice, if the platform offered any.
    pub voice: Option<String>,
    pub prosody: Prosody,
}

impl SpeechUtterance {
    /// Prepare `text` for playback in `language` using the offered voices.
    pub fn compose(
        token: PlaybackToken,
        text: &str,
        language: &Language,
        voices: &[VoiceInfo],
    ) -> Self {
        Self {
            token,
            text: preprocess_for_speech(text, language),
            lang: language.code,
            voice: select_voice(voices, language).map(|v| v.name.clone()),
            prosody: prosody_for(language),
        }
    }
}

/// Outcome reported by a speech capture session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CaptureEvent {
    /// Final transcript of the captured speech.
    Transcript(String),
    Error(String),
    /// Capture stopped without a transcript.
    End,
}

/// Progress reported for one playback request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PlaybackEvent {
    Started(PlaybackToken),
    Ended(PlaybackToken),
    Error(PlaybackToken, String),
}

impl PlaybackEvent {
    pub fn token(&self) -> PlaybackToken {
        match self {
            PlaybackEvent::Started(t) | PlaybackEvent::Ended(t) | PlaybackEvent::Error(t, _) => *t,
        }
    }
}

/// Platform speech engine.
///
/// Capture is one-shot: a single final transcript, no interim results.
pub trait SpeechBackend: Send + Sync {
    fn capture_available(&self) -> bool;

    /// Begin capturing speech in the given locale.
    fn start_capture(&self, language_code: &str) -> Result<(), ClientError>;

    fn stop_capture(&self);

    /// Queue an utterance, replacing anything currently playing.
    fn speak(&self, utterance: SpeechUtterance) -> Result<(), ClientError>;

    fn cancel_speech(&self);

    fn list_voices(&self) -> Vec<VoiceInfo>;
}

/// Headless backend: no capture, playback accepted and discarded.
#[derive(Debug, Clone, Copy, Default)]
pub struct SilentSpeech;

impl SpeechBackend for SilentSpeech {
    fn capture_available(&self) -> bool {
        false
    }

    fn start_capture(&self, _language_code: &str) -> Result<(), ClientError> {
        Err(ClientError::Speech("capture not available".to_string()))
    }

    fn stop_capture(&self) {}

    fn speak(&self, utterance: SpeechUtterance) -> Result<(), ClientError> {
        debug!(token = utterance.token.0, chars = utterance.text.len(), "Discarding utterance");
        Ok(())
    }

    fn cancel_speech(&self) {}

    fn list_voices(&self) -> Vec<VoiceInfo> {
        Vec::new()
    }
}

// =============================================================================
// Voice selection
// =============================================================================

const ENGLISH_VOICES: &[&str] = &[
    "Google UK English Female",
    "Google US English Female",
    "Microsoft Zira Desktop - English (United States)",
    "Microsoft David Desktop - English (United States)",
    "Alex",
    "Samantha",
    "Karen",
    "Moira",
    "Daniel",
    "Fiona",
];

const PHILIPPINE_VOICES: &[&str] = &[
    "Google Filipino Female",
    "Google Filipino",
    "Microsoft Filipino Female",
    "Microsoft Filipino",
    "Google US English Female",
    "Microsoft Zira Desktop - English (United States)",
];

const SPANISH_VOICES: &[&str] = &[
    "Google español Female",
    "Google español",
    "Microsoft Helena Desktop - Spanish (Spain)",
    "Monica",
    "Paulina",
];

const FRENCH_VOICES: &[&str] = &[
    "Google français Female",
    "Google français",
    "Microsoft Hortense Desktop - French (France)",
    "Amelie",
    "Thomas",
];

fn sounds_female(name: &str) -> bool {
    let lower = name.to_lowercase();
    lower.contains("female")
        || lower.contains("woman")
        || name.contains("Zira")
        || name.contains("Helena")
        || name.contains("Hortense")
}

fn preferred_names<'a>(voices: &'a [VoiceInfo], language: &Language) -> Vec<&'a str> {
    let fixed: Option<&[&str]> = match language.code {
        code if code.starts_with("en") => Some(ENGLISH_VOICES),
        "fil-PH" | "ceb-PH" => Some(PHILIPPINE_VOICES),
        "es-ES" => Some(SPANISH_VOICES),
        "fr-FR" => Some(FRENCH_VOICES),
        _ => None,
    };
    if let Some(names) = fixed {
        return names.to_vec();
    }

    let prefix = language.prefix();
    let local: Vec<&VoiceInfo> = voices.iter().filter(|v| v.lang.starts_with(prefix)).collect();
    local
        .iter()
        .copied()
        .filter(|v| sounds_female(&v.name))
        .chain(local.iter().copied())
        .map(|v| v.name.as_str())
        .collect()
}

/// Pick the voice for `language`.
///
/// Preferred names are tried in order, matching any voice whose name
/// contains the preferred name. After that: any voice for the language, any
/// female voice, then the first voice.
pub fn select_voice<'a>(voices: &'a [VoiceInfo], language: &Language) -> Option<&'a VoiceInfo> {
    for preferred in preferred_names(voices, language) {
        if let Some(voice) = voices.iter().find(|v| v.name.contains(preferred)) {
            return Some(voice);
        }
    }

    let prefix = language.prefix();
    voices
        .iter()
        .find(|v| v.lang.starts_with(prefix))
        .or_else(|| voices.iter().find(|v| v.name.to_lowercase().contains("female")))
        .or_else(|| voices.first())
}

/// Language-specific speaking rate and pitch.
pub fn prosody_for(language: &Language) -> Prosody {
    let code = language.code;
    let (rate, pitch) = if code == "fil-PH" {
        (0.95, 0.92)
    } else if code == "ceb-PH" {
        (0.90, 0.88)
    } else if code.starts_with("es") {
        (1.05, 0.96)
    } else if code.starts_with("fr") {
        (0.98, 1.00)
    } else if code.starts_with("en") {
        (1.10, 0.94)
    } else {
        (1.00, 0.95)
    };
    Prosody {
        rate,
        pitch,
        volume: 0.9,
    }
}

// =============================================================================
// Pronunciation
// =============================================================================

fn substitutions(rules: &[(&str, &'static str)]) -> Vec<(Regex, &'static str)> {
    rules
        .iter()
        .map(|(pat, rep)| (Regex::new(pat).expect("Invalid pronunciation regex"), *rep))
        .collect()
}

static CEBUANO_RULES: LazyLock<Vec<(Regex, &'static str)>> = LazyLock::new(|| {
    substitutions(&[
        (r"(?i)\bnga\b", "ngah"),
        (r"(?i)\bang\b", "ahng"),
        (r"(?i)\bsa\b", "sah"),
        (r"(?i)\bni\b", "nee"),
        (r"(?i)\bsi\b", "see"),
        (r"(?i)\bka\b", "kah"),
        (r"(?i)\bko\b", "koh"),
        (r"(?i)\bmo\b", "moh"),
        (r"(?i)\bta\b", "tah"),
        (r"(?i)\bto\b", "toh"),
        (r"(?i)\bay\b", "ah-ee"),
        (r"(?i)\bog\b", "ohg"),
        // Prefix forms: lowercase only, any word ending.
        (r"\bug", "oog"),
        (r"(?i)\bpag\b", "pahg"),
        (r"(?i)\bmag\b", "mahg"),
        (r"\bnag", "nahg"),
        (r"(?i)\bkaayo\b", "kah-ah-yoh"),
        (r"(?i)\bmao\b", "mah-oh"),
        (r"(?i)\bjud\b", "jood"),
        (r"(?i)\bgyud\b", "gyood"),
    ])
});

static FILIPINO_RULES: LazyLock<Vec<(Regex, &'static str)>> = LazyLock::new(|| {
    substitutions(&[
        (r"(?i)\bng\b", "nahng"),
        (r"(?i)\bsa\b", "sah"),
        (r"(?i)\bna\b", "nah"),
        (r"(?i)\bka\b", "kah"),
        (r"(?i)\bko\b", "koh"),
        (r"(?i)\bmo\b", "moh"),
        (r"(?i)\btayo\b", "tah-yoh"),
        (r"(?i)\bkayo\b", "kah-yoh"),
        (r"(?i)\bsila\b", "see-lah"),
    ])
});

static REPEATED_DOTS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\.{2,}").expect("Invalid punctuation regex"));
static REPEATED_BANGS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"!{2,}").expect("Invalid punctuation regex"));
static REPEATED_QUESTIONS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\?{2,}").expect("Invalid punctuation regex"));
static WHITESPACE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s+").expect("Invalid whitespace regex"));

/// Adjust reply text so synthetic voices pronounce it naturally.
pub fn preprocess_for_speech(text: &str, language: &Language) -> String {
    let rules: &[(Regex, &str)] = match language.code {
        "ceb-PH" => CEBUANO_RULES.as_slice(),
        "fil-PH" => FILIPINO_RULES.as_slice(),
        _ => &[],
    };

    let mut out = text.to_string();
    for (re, replacement) in rules {
        out = re.replace_all(&out, *replacement).into_owned();
    }

    let out = REPEATED_DOTS.replace_all(&out, ".");
    let out = REPEATED_BANGS.replace_all(&out, "!");
    let out = REPEATED_QUESTIONS.replace_all(&out, "?");
    let out = WHITESPACE.replace_all(&out, " ");
    out.trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lang(code: &str) -> Language {
        Language::find(code).unwrap()
    }

    fn voices() -> Vec<VoiceInfo> {
        vec![
            VoiceInfo::new("Microsoft David Desktop - English (United States)", "en-US"),
            VoiceInfo::new("Google US English Female", "en-US"),
            VoiceInfo::new("Google Deutsch", "de-DE"),
            VoiceInfo::new("Anna Female", "de-DE"),
            VoiceInfo::new("Kyoko", "ja-JP"),
        ]
    }

    #[test]
    fn test_english_prefers_list_order() {
        let v = voices();
        let chosen = select_voice(&v, &lang("en-US")).unwrap();
        assert_eq!(chosen.name, "Google US English Female");
    }

    #[test]
    fn test_preferred_name_matches_by_containment() {
        let v = vec![
            VoiceInfo::new("Karen (Enhanced)", "en-AU"),
            VoiceInfo::new("Random", "en-US"),
        ];
        assert_eq!(select_voice(&v, &lang("en-US")).unwrap().name, "Karen (Enhanced)");
    }

    #[test]
    fn test_other_language_prefers_female_voice() {
        let v = voices();
        assert_eq!(select_voice(&v, &lang("de-DE")).unwrap().name, "Anna Female");
        assert_eq!(select_voice(&v, &lang("ja-JP")).unwrap().name, "Kyoko");
    }

    #[test]
    fn test_fallback_chain() {
        // No Filipino voice offered: falls through to the English entries.
        let v = voices();
        assert_eq!(
            select_voice(&v, &lang("fil-PH")).unwrap().name,
            "Google US English Female"
        );

        // Nothing for Korean, no female voice: first voice.
        let v = vec![VoiceInfo::new("Alpha", "it-IT"), VoiceInfo::new("Beta", "pt-BR")];
        assert_eq!(select_voice(&v, &lang("ko-KR")).unwrap().name, "Alpha");

        let v = vec![VoiceInfo::new("Alpha", "it-IT"), VoiceInfo::new("Zoe female", "pt-BR")];
        assert_eq!(select_voice(&v, &lang("es-ES")).unwrap().name, "Zoe female");

        assert!(select_voice(&[], &lang("en-US")).is_none());
    }

    #[test]
    fn test_prosody_table() {
        assert_eq!(prosody_for(&lang("fil-PH")).rate, 0.95);
        assert_eq!(prosody_for(&lang("ceb-PH")).pitch, 0.88);
        assert_eq!(prosody_for(&lang("es-ES")).rate, 1.05);
        assert_eq!(prosody_for(&lang("fr-FR")).pitch, 1.00);
        let en = prosody_for(&lang("en-US"));
        assert_eq!((en.rate, en.pitch, en.volume), (1.10, 0.94, 0.9));
        let zh = prosody_for(&lang("zh-CN"));
        assert_eq!((zh.rate, zh.pitch), (1.00, 0.95));
    }

    #[test]
    fn test_cebuano_pronunciation() {
        let out = preprocess_for_speech("Salamat kaayo sa imo", &lang("ceb-PH"));
        assert_eq!(out, "Salamat kah-ah-yoh sah imo");

        // Prefix rules are lowercase-only and ignore word endings.
        assert_eq!(preprocess_for_speech("ug Ug", &lang("ceb-PH")), "oog Ug");
        assert_eq!(preprocess_for_speech("nagkaon", &lang("ceb-PH")), "nahgkaon");
    }

    #[test]
    fn test_filipino_pronunciation() {
        let out = preprocess_for_speech("Salamat sa inyo, Sila ay mabait", &lang("fil-PH"));
        assert_eq!(out, "Salamat sah inyo, see-lah ay mabait");
    }

    #[test]
    fn test_english_text_only_normalized() {
        let out = preprocess_for_speech("  Wait...  really??   Yes!!! sa ", &lang("en-US"));
        assert_eq!(out, "Wait. really? Yes! sa");
    }

    #[test]
    fn test_compose_utterance() {
        let u = SpeechUtterance::compose(
            PlaybackToken(3),
            "Maayong buntag!!",
            &lang("ceb-PH"),
            &voices(),
        );
        assert_eq!(u.token, PlaybackToken(3));
        assert_eq!(u.text, "Maayong buntag!");
        assert_eq!(u.lang, "ceb-PH");
        assert_eq!(u.voice.as_deref(), Some("Google US English Female"));
        assert_eq!(u.prosody.rate, 0.90);
    }

    #[test]
    fn test_silent_backend() {
        let s = SilentSpeech;
        assert!(!s.capture_available());
        assert!(s.start_capture("en-US").is_err());
        assert!(s.list_voices().is_empty());
        let u = SpeechUtterance::compose(PlaybackToken(1), "hi", &lang("en-US"), &[]);
        assert!(s.speak(u).is_ok());
    }

    #[test]
    fn test_event_token() {
        assert_eq!(PlaybackEvent::Ended(PlaybackToken(7)).token(), PlaybackToken(7));
        assert_eq!(
            PlaybackEvent::Error(PlaybackToken(2), "x".into()).token(),
            PlaybackToken(2)
        );
    }
}
