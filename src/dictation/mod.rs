//! Dictation module for speech-to-text input
//!
//! Wraps an injected recognizer and normalizes its events:
//! - engine: capability trait and recognition event types
//! - controller: idle / listening / error state and finalized segments
//! - replay: JSON-lines script recognizer

mod controller;
mod engine;
mod errors;
mod replay;

pub use controller::{Availability, DictationController, DictationState, DictationUpdate, ToggleOutcome};
pub use engine::{
    Alternative, EngineError, RecognitionConfig, RecognitionEvent, RecognitionResult,
    RecognitionStream, SpeechEngine, UnsupportedEngine,
};
pub use errors::MicErrorKind;
pub use replay::ReplayEngine;
