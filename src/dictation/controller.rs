//! Dictation controller
//!
//! Turns the recognizer's raw event stream into a normalized
//! [`DictationState`] and a sequence of finalized text segments.

use serde::Serialize;
use tracing::{debug, info, warn};

use super::engine::{RecognitionConfig, RecognitionEvent, RecognitionResult, RecognitionStream, SpeechEngine};
use super::errors::{MicErrorKind, UNSUPPORTED_NOTICE};

/// Whether a recognizer was found when the session started
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Availability {
    Unsupported,
    Available,
}

/// Normalized dictation state exposed to the shell
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DictationState {
    pub availability: Availability,
    pub listening: bool,
    pub last_error: Option<MicErrorKind>,
}

impl DictationState {
    /// Message for the current microphone error, if any
    pub fn error_message(&self) -> Option<String> {
        let kind = self.last_error.as_ref()?;
        if self.availability == Availability::Unsupported && *kind == MicErrorKind::Unsupported {
            return Some(UNSUPPORTED_NOTICE.to_string());
        }
        Some(kind.message())
    }
}

/// What a toggle request turned into
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToggleOutcome {
    /// No recognizer; nothing happened
    Unavailable,
    StartRequested,
    StopRequested,
    /// The engine refused synchronously; listening was forced off
    Refused,
}

/// Result of feeding one recognizer event through the controller
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DictationUpdate {
    Started,
    Ended,
    /// A completed utterance ready to land in the symptom buffer
    Finalized(String),
    /// Partial guess, intentionally dropped
    Interim,
    Failed(MicErrorKind),
    /// Redelivered results or events with no recognizer attached
    Ignored,
}

pub struct DictationController {
    engine: Box<dyn SpeechEngine>,
    state: DictationState,
    /// Result slots below this index were already emitted
    consumed: usize,
}

impl DictationController {
    /// Open the engine and set up the session's controller.
    ///
    /// The returned stream is `None` when no recognizer is present.
    pub fn initialize(
        mut engine: Box<dyn SpeechEngine>,
        config: &RecognitionConfig,
    ) -> (Self, Option<RecognitionStream>) {
        let stream = engine.open(config);

        let state = match stream {
            Some(_) => {
                info!(locale = %config.locale, "speech recognizer available");
                DictationState {
                    availability: Availability::Available,
                    listening: false,
                    last_error: None,
                }
            }
            None => {
                warn!("speech recognizer unavailable, dictation disabled");
                DictationState {
                    availability: Availability::Unsupported,
                    listening: false,
                    last_error: Some(MicErrorKind::Unsupported),
                }
            }
        };

        let controller = Self {
            engine,
            state,
            consumed: 0,
        };
        (controller, stream)
    }

    pub fn state(&self) -> &DictationState {
        &self.state
    }

    pub fn is_available(&self) -> bool {
        self.state.availability == Availability::Available
    }

    /// Start or stop listening.
    ///
    /// Stopping only requests it; `listening` flips when the engine's `End`
    /// event arrives.
    pub fn toggle(&mut self) -> ToggleOutcome {
        if !self.is_available() {
            return ToggleOutcome::Unavailable;
        }

        let (request, outcome) = if self.state.listening {
            (self.engine.stop(), ToggleOutcome::StopRequested)
        } else {
            self.state.last_error = None;
            (self.engine.start(), ToggleOutcome::StartRequested)
        };

        match request {
            Ok(()) => outcome,
            Err(e) => {
                // No user-visible message for this path.
                warn!(?e, "recognizer toggle failed");
                self.state.listening = false;
                ToggleOutcome::Refused
            }
        }
    }

    /// Clear the surfaced microphone error. Returns whether one was set.
    pub fn dismiss_error(&mut self) -> bool {
        self.state.last_error.take().is_some()
    }

    /// Apply one recognizer event
    pub fn handle_event(&mut self, event: RecognitionEvent) -> DictationUpdate {
        if !self.is_available() {
            return DictationUpdate::Ignored;
        }

        match event {
            RecognitionEvent::Start => {
                self.state.listening = true;
                self.state.last_error = None;
                self.consumed = 0;
                DictationUpdate::Started
            }
            RecognitionEvent::End => {
                self.state.listening = false;
                DictationUpdate::Ended
            }
            RecognitionEvent::Result {
                result_index,
                results,
            } => self.handle_results(result_index, &results),
            RecognitionEvent::Error { code } => {
                let kind = MicErrorKind::from_code(&code);
                warn!(%code, "speech recognition error");
                // Engines do not reliably raise End after an error.
                self.state.listening = false;
                self.state.last_error = Some(kind.clone());
                DictationUpdate::Failed(kind)
            }
        }
    }

    fn handle_results(&mut self, result_index: usize, results: &[RecognitionResult]) -> DictationUpdate {
        let start = result_index.max(self.consumed);
        let Some(fresh) = results.get(start..).filter(|slice| !slice.is_empty()) else {
            debug!(result_index, consumed = self.consumed, "no new recognition results");
            return DictationUpdate::Ignored;
        };

        let transcript: String = fresh.iter().map(RecognitionResult::best_transcript).collect();

        if fresh.last().is_some_and(|r| r.is_final) {
            self.consumed = results.len();
            debug!(chars = transcript.len(), "utterance finalized");
            DictationUpdate::Finalized(transcript)
        } else {
            DictationUpdate::Interim
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use tokio::sync::mpsc;

    use super::*;
    use crate::dictation::engine::{Alternative, EngineError, UnsupportedEngine};

    #[derive(Default)]
    struct Calls {
        starts: usize,
        stops: usize,
        config: Option<RecognitionConfig>,
    }

    /// Recognizer double that records requests and can refuse them
    struct FakeEngine {
        calls: Arc<Mutex<Calls>>,
        refuse: bool,
        _events: Option<mpsc::UnboundedSender<RecognitionEvent>>,
    }

    impl SpeechEngine for FakeEngine {
        fn open(&mut self, config: &RecognitionConfig) -> Option<RecognitionStream> {
            self.calls.lock().unwrap().config = Some(config.clone());
            let (tx, rx) = mpsc::unbounded_channel();
            self._events = Some(tx);
            Some(rx)
        }

        fn start(&mut self) -> Result<(), EngineError> {
            self.calls.lock().unwrap().starts += 1;
            if self.refuse {
                return Err(EngineError::AlreadyRunning);
            }
            Ok(())
        }

        fn stop(&mut self) -> Result<(), EngineError> {
            self.calls.lock().unwrap().stops += 1;
            if self.refuse {
                return Err(EngineError::NotRunning);
            }
            Ok(())
        }
    }

    fn create_controller(refuse: bool) -> (DictationController, Arc<Mutex<Calls>>) {
        let calls = Arc::new(Mutex::new(Calls::default()));
        let engine = FakeEngine {
            calls: Arc::clone(&calls),
            refuse,
            _events: None,
        };
        let (controller, stream) =
            DictationController::initialize(Box::new(engine), &RecognitionConfig::default());
        assert!(stream.is_some());
        (controller, calls)
    }

    fn slot(text: &str, is_final: bool) -> RecognitionResult {
        RecognitionResult {
            alternatives: vec![
                Alternative {
                    transcript: text.to_string(),
                    confidence: 0.9,
                },
                Alternative {
                    transcript: "ignored".to_string(),
                    confidence: 0.1,
                },
            ],
            is_final,
        }
    }

    fn result(result_index: usize, results: Vec<RecognitionResult>) -> RecognitionEvent {
        RecognitionEvent::Result {
            result_index,
            results,
        }
    }

    #[test]
    fn test_initialize_configures_engine() {
        let (controller, calls) = create_controller(false);
        let config = calls.lock().unwrap().config.clone().unwrap();
        assert!(config.continuous);
        assert!(config.interim_results);
        assert_eq!(config.locale, "en-US");
        assert!(controller.is_available());
        assert!(!controller.state().listening);
        assert_eq!(controller.state().last_error, None);
    }

    #[test]
    fn test_initialize_without_recognizer() {
        let (mut controller, stream) =
            DictationController::initialize(Box::new(UnsupportedEngine), &RecognitionConfig::default());
        assert!(stream.is_none());
        assert_eq!(controller.state().availability, Availability::Unsupported);
        assert_eq!(
            controller.state().error_message().as_deref(),
            Some(UNSUPPORTED_NOTICE)
        );
        assert_eq!(controller.toggle(), ToggleOutcome::Unavailable);
        assert_eq!(controller.handle_event(RecognitionEvent::Start), DictationUpdate::Ignored);
        assert!(!controller.state().listening);
    }

    #[test]
    fn test_toggle_stop_waits_for_end_event() {
        let (mut controller, calls) = create_controller(false);

        assert_eq!(controller.toggle(), ToggleOutcome::StartRequested);
        assert!(!controller.state().listening);
        controller.handle_event(RecognitionEvent::Start);
        assert!(controller.state().listening);

        assert_eq!(controller.toggle(), ToggleOutcome::StopRequested);
        assert!(controller.state().listening);
        controller.handle_event(RecognitionEvent::End);
        assert!(!controller.state().listening);

        let calls = calls.lock().unwrap();
        assert_eq!(calls.starts, 1);
        assert_eq!(calls.stops, 1);
    }

    #[test]
    fn test_toggle_start_clears_previous_error() {
        let (mut controller, _) = create_controller(false);
        controller.handle_event(RecognitionEvent::Error {
            code: "no-speech".to_string(),
        });
        assert!(controller.state().last_error.is_some());

        controller.toggle();
        assert_eq!(controller.state().last_error, None);
    }

    #[test]
    fn test_refused_toggle_forces_idle_silently() {
        let (mut controller, _) = create_controller(true);
        controller.state.listening = true;

        assert_eq!(controller.toggle(), ToggleOutcome::Refused);
        assert!(!controller.state().listening);
        assert_eq!(controller.state().last_error, None);
    }

    #[test]
    fn test_interim_results_are_dropped() {
        let (mut controller, _) = create_controller(false);
        controller.handle_event(RecognitionEvent::Start);

        let update = controller.handle_event(result(0, vec![slot("head", false)]));
        assert_eq!(update, DictationUpdate::Interim);
    }

    #[test]
    fn test_final_result_concatenates_new_slots() {
        let (mut controller, _) = create_controller(false);
        controller.handle_event(RecognitionEvent::Start);

        let update = controller.handle_event(result(
            0,
            vec![slot("my head", true), slot(" hurts", true)],
        ));
        assert_eq!(update, DictationUpdate::Finalized("my head hurts".to_string()));
    }

    #[test]
    fn test_redelivered_results_are_not_reprocessed() {
        let (mut controller, _) = create_controller(false);
        controller.handle_event(RecognitionEvent::Start);

        let first = vec![slot("fever", true)];
        assert_eq!(
            controller.handle_event(result(0, first.clone())),
            DictationUpdate::Finalized("fever".to_string())
        );
        // Same list redelivered with a stale resume index
        assert_eq!(controller.handle_event(result(0, first.clone())), DictationUpdate::Ignored);

        let mut second = first;
        second.push(slot("chills", true));
        assert_eq!(
            controller.handle_event(result(0, second)),
            DictationUpdate::Finalized("chills".to_string())
        );
    }

    #[test]
    fn test_start_resets_consumed_index() {
        let (mut controller, _) = create_controller(false);
        controller.handle_event(RecognitionEvent::Start);
        controller.handle_event(result(0, vec![slot("cough", true)]));
        controller.handle_event(RecognitionEvent::End);

        controller.handle_event(RecognitionEvent::Start);
        assert_eq!(
            controller.handle_event(result(0, vec![slot("rash", true)])),
            DictationUpdate::Finalized("rash".to_string())
        );
    }

    #[test]
    fn test_error_forces_listening_off() {
        let (mut controller, _) = create_controller(false);
        controller.handle_event(RecognitionEvent::Start);
        assert!(controller.state().listening);

        let update = controller.handle_event(RecognitionEvent::Error {
            code: "not-allowed".to_string(),
        });
        assert_eq!(update, DictationUpdate::Failed(MicErrorKind::PermissionDenied));
        assert!(!controller.state().listening);

        // Also when already idle
        controller.handle_event(RecognitionEvent::Error {
            code: "network".to_string(),
        });
        assert!(!controller.state().listening);
        assert_eq!(controller.state().last_error, Some(MicErrorKind::Network));
    }

    #[test]
    fn test_dismiss_error_only_clears_error() {
        let (mut controller, _) = create_controller(false);
        controller.handle_event(RecognitionEvent::Start);
        controller.state.last_error = Some(MicErrorKind::NoSpeech);

        assert!(controller.dismiss_error());
        assert_eq!(controller.state().last_error, None);
        assert!(controller.state().listening);
        assert!(!controller.dismiss_error());
    }
}
