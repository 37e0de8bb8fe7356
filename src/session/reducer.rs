//! Session reducer
//!
//! Every input (user intent, recognizer event, triage completion) passes
//! through [`Session::apply`], which updates the two controllers and
//! broadcasts the resulting [`SessionEvent`]s. The only side effect it
//! requests is a triage call, returned as a [`SubmitTicket`].

use serde::Serialize;
use tokio::sync::broadcast;
use tracing::{debug, info};

use super::display::ResultDisplay;
use super::machine::{SubmissionState, SubmitTicket, TriageSessionController};
use crate::dictation::{DictationController, DictationState, DictationUpdate, RecognitionEvent, ToggleOutcome};
use crate::events::SessionEvent;
use crate::triage::{TriageError, TriageResult};

/// What the shell can ask the session to do
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Intent {
    /// Replace the symptom text
    Edit(String),
    ToggleDictation,
    Submit,
    Reset,
    DismissMicError,
}

/// Input consumed by the session reducer
#[derive(Debug)]
pub enum SessionInput {
    User(Intent),
    Speech(RecognitionEvent),
    TriageCompleted {
        request_id: u64,
        outcome: Result<TriageResult, TriageError>,
    },
}

/// Snapshot handed to the shell for rendering
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct View {
    pub symptoms: String,
    pub dictation: DictationState,
    pub mic_error: Option<String>,
    pub submission: SubmissionState,
    pub result: Option<ResultDisplay>,
    pub can_submit: bool,
    /// Manual editing is disabled
    pub input_locked: bool,
}

pub struct Session {
    dictation: DictationController,
    triage: TriageSessionController,
    event_tx: broadcast::Sender<SessionEvent>,
}

impl Session {
    pub fn new(dictation: DictationController, event_tx: broadcast::Sender<SessionEvent>) -> Self {
        Self {
            dictation,
            triage: TriageSessionController::new(),
            event_tx,
        }
    }

    /// Apply one input. Returns a ticket when a triage request must be sent.
    pub fn apply(&mut self, input: SessionInput) -> Option<SubmitTicket> {
        match input {
            SessionInput::User(intent) => self.handle_intent(intent),
            SessionInput::Speech(event) => {
                self.handle_recognition(event);
                None
            }
            SessionInput::TriageCompleted {
                request_id,
                outcome,
            } => {
                self.handle_completion(request_id, outcome);
                None
            }
        }
    }

    fn handle_intent(&mut self, intent: Intent) -> Option<SubmitTicket> {
        debug!(?intent, "user intent");

        match intent {
            Intent::Edit(text) => match self.triage.set_symptoms(text) {
                Ok(true) => self.emit_symptoms_changed(),
                Ok(false) => {}
                Err(e) => {
                    info!(%e, "edit rejected");
                    self.emit(SessionEvent::IntentRejected {
                        message: e.to_string(),
                    });
                }
            },
            Intent::ToggleDictation => {
                if self.dictation.toggle() == ToggleOutcome::Unavailable {
                    debug!("dictation toggle ignored, no recognizer");
                }
            }
            Intent::Submit => match self.triage.submit() {
                Ok(ticket) => {
                    self.emit(SessionEvent::SubmissionStarted {
                        request_id: ticket.request_id,
                    });
                    return Some(ticket);
                }
                Err(e) => {
                    info!(%e, "submit rejected");
                    self.emit(SessionEvent::IntentRejected {
                        message: e.to_string(),
                    });
                }
            },
            Intent::Reset => {
                if self.triage.reset() {
                    self.emit(SessionEvent::SessionReset);
                }
            }
            Intent::DismissMicError => {
                if self.dictation.dismiss_error() {
                    self.emit(SessionEvent::MicErrorDismissed);
                }
            }
        }

        None
    }

    fn handle_recognition(&mut self, event: RecognitionEvent) {
        debug!(%event, "recognition event");

        match self.dictation.handle_event(event) {
            DictationUpdate::Started => self.emit(SessionEvent::DictationStarted),
            DictationUpdate::Ended => self.emit(SessionEvent::DictationEnded),
            DictationUpdate::Finalized(text) => {
                if self.triage.append_dictation(text.clone()) {
                    self.emit(SessionEvent::SegmentFinalized { text });
                    self.emit_symptoms_changed();
                }
            }
            DictationUpdate::Failed(kind) => {
                let message = kind.message();
                self.emit(SessionEvent::MicError { kind, message });
            }
            DictationUpdate::Interim | DictationUpdate::Ignored => {}
        }
    }

    fn handle_completion(&mut self, request_id: u64, outcome: Result<TriageResult, TriageError>) {
        if !self.triage.complete(request_id, outcome) {
            return;
        }

        match self.triage.submission() {
            SubmissionState::Succeeded(result) => {
                let display = ResultDisplay::from(result);
                self.emit(SessionEvent::TriageSucceeded {
                    department: display.department,
                    token: display.token,
                });
            }
            SubmissionState::Failed(message) => {
                let message = message.clone();
                self.emit(SessionEvent::TriageFailed { message });
            }
            SubmissionState::Idle | SubmissionState::Submitting => {}
        }
    }

    pub fn view(&self) -> View {
        let submission = self.triage.submission().clone();
        let result = match &submission {
            SubmissionState::Succeeded(result) => Some(ResultDisplay::from(result)),
            _ => None,
        };
        let dictation = self.dictation.state().clone();

        View {
            symptoms: self.triage.symptoms().to_string(),
            mic_error: dictation.error_message(),
            dictation,
            can_submit: self.triage.can_submit(),
            input_locked: self.triage.is_submitting(),
            submission,
            result,
        }
    }

    fn emit_symptoms_changed(&self) {
        self.emit(SessionEvent::SymptomsChanged {
            chars: self.triage.symptoms().chars().count(),
        });
    }

    fn emit(&self, event: SessionEvent) {
        debug!(%event, "emitting session event");
        // No subscribers is fine
        let _ = self.event_tx.send(event);
    }
}
