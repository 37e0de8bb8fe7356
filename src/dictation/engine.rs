//! Speech recognition capability boundary
//!
//! The recognizer is injected behind [`SpeechEngine`] so the dictation
//! controller never reaches for a platform global. Engines report what they
//! hear as [`RecognitionEvent`]s on the stream handed out by `open`.

use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;

/// Locale used when nothing else is configured
pub const DEFAULT_LOCALE: &str = "en-US";

/// How the recognizer should be set up once opened
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecognitionConfig {
    /// Keep listening across utterances instead of stopping after one
    pub continuous: bool,
    /// Deliver partial guesses before an utterance is finalized
    pub interim_results: bool,
    /// BCP 47 locale tag
    pub locale: String,
}

impl RecognitionConfig {
    pub fn new(locale: impl Into<String>) -> Self {
        Self {
            continuous: true,
            interim_results: true,
            locale: locale.into(),
        }
    }
}

impl Default for RecognitionConfig {
    fn default() -> Self {
        Self::new(DEFAULT_LOCALE)
    }
}

/// One candidate transcription for a result slot
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Alternative {
    pub transcript: String,
    #[serde(default)]
    pub confidence: f32,
}

/// A single recognition result slot
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecognitionResult {
    /// Candidates ordered best-first
    pub alternatives: Vec<Alternative>,
    /// The engine will not revise this slot any further
    #[serde(default)]
    pub is_final: bool,
}

impl RecognitionResult {
    /// Top choice transcript, empty if the engine sent no alternatives
    pub fn best_transcript(&self) -> &str {
        self.alternatives
            .first()
            .map(|alt| alt.transcript.as_str())
            .unwrap_or("")
    }
}

/// Events raised by a recognizer
///
/// `Start` always precedes `End`, and `Result`/`Error` only occur between
/// the two.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum RecognitionEvent {
    Start,
    End,
    /// The full result list is redelivered every time; only the slots from
    /// `result_index` onward changed.
    Result {
        result_index: usize,
        results: Vec<RecognitionResult>,
    },
    Error {
        code: String,
    },
}

impl std::fmt::Display for RecognitionEvent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RecognitionEvent::Start => write!(f, "START"),
            RecognitionEvent::End => write!(f, "END"),
            RecognitionEvent::Result {
                result_index,
                results,
            } => write!(f, "RESULT ({}..{})", result_index, results.len()),
            RecognitionEvent::Error { code } => write!(f, "ERROR ({})", code),
        }
    }
}

/// Stream of events produced by an opened engine
pub type RecognitionStream = mpsc::UnboundedReceiver<RecognitionEvent>;

/// Synchronous failures from start/stop requests
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    #[error("recognizer is already running")]
    AlreadyRunning,

    #[error("recognizer is not running")]
    NotRunning,

    #[error("recognizer unavailable")]
    Unavailable,
}

/// Injected speech-to-text capability
pub trait SpeechEngine: Send {
    /// Configure the recognizer and hand out its event stream.
    ///
    /// Returns `None` when no recognizer is present on this platform. Called
    /// once per session.
    fn open(&mut self, config: &RecognitionConfig) -> Option<RecognitionStream>;

    /// Ask the recognizer to begin listening. `Start` arrives on the stream.
    fn start(&mut self) -> Result<(), EngineError>;

    /// Ask the recognizer to finalize and stop. `End` arrives on the stream.
    fn stop(&mut self) -> Result<(), EngineError>;
}

/// Engine for platforms without a recognizer
#[derive(Debug, Default)]
pub struct UnsupportedEngine;

impl SpeechEngine for UnsupportedEngine {
    fn open(&mut self, _config: &RecognitionConfig) -> Option<RecognitionStream> {
        None
    }

    fn start(&mut self) -> Result<(), EngineError> {
        Err(EngineError::Unavailable)
    }

    fn stop(&mut self) -> Result<(), EngineError> {
        Err(EngineError::Unavailable)
    }
}
