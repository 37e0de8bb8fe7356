//! Submission state machine
//!
//! Owns the symptom buffer and the submission lifecycle:
//!
//! ```text
//! Idle --submit--> Submitting --ok--> Succeeded --reset--> Idle
//!                  Submitting --err-> Failed    --reset--> Idle
//!                                     Failed    --edit---> Idle
//! ```
//!
//! Exactly one [`SubmissionState`] is active at a time and at most one
//! request is in flight.

use serde::Serialize;
use tracing::{debug, info, warn};

use super::buffer::{BufferWrite, SymptomText};
use crate::triage::{TriageError, TriageResult};

/// Used when a failure carries no description at all
pub const FALLBACK_FAILURE: &str = "System encountered an analysis error.";

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(tag = "state", content = "detail", rename_all = "snake_case")]
pub enum SubmissionState {
    #[default]
    Idle,
    Submitting,
    Succeeded(TriageResult),
    /// Display message for the failed attempt
    Failed(String),
}

impl std::fmt::Display for SubmissionState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SubmissionState::Idle => write!(f, "Idle"),
            SubmissionState::Submitting => write!(f, "Submitting"),
            SubmissionState::Succeeded(_) => write!(f, "Succeeded"),
            SubmissionState::Failed(_) => write!(f, "Failed"),
        }
    }
}

/// Why a submit request was turned down
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum SubmitRejected {
    #[error("a triage request is already in flight")]
    AlreadySubmitting,

    #[error("symptom description is empty")]
    EmptySymptoms,

    #[error("edit the symptoms or reset before submitting again")]
    AwaitingEdit,
}

/// Why a manual edit was turned down
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum EditRejected {
    #[error("input is locked while a triage request is in flight")]
    InputLocked,
}

/// An accepted submission, to be sent to the triage service
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubmitTicket {
    pub request_id: u64,
    pub symptoms: String,
}

/// Format a failed request for display
pub fn failure_message(err: &TriageError) -> String {
    let detail = err
        .service_message()
        .map(str::to_string)
        .or_else(|| {
            let description = err.to_string();
            (!description.trim().is_empty()).then_some(description)
        })
        .unwrap_or_else(|| FALLBACK_FAILURE.to_string());

    format!(
        "Error: {}. Please check if the API URL is configured correctly.",
        detail
    )
}

#[derive(Debug, Default)]
pub struct TriageSessionController {
    symptoms: SymptomText,
    submission: SubmissionState,
    next_request_id: u64,
    in_flight: Option<u64>,
}

impl TriageSessionController {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn symptoms(&self) -> &str {
        self.symptoms.as_str()
    }

    pub fn submission(&self) -> &SubmissionState {
        &self.submission
    }

    pub fn is_submitting(&self) -> bool {
        matches!(self.submission, SubmissionState::Submitting)
    }

    /// Whether `submit` would be accepted right now
    pub fn can_submit(&self) -> bool {
        matches!(
            self.submission,
            SubmissionState::Idle | SubmissionState::Succeeded(_)
        ) && self.symptoms.is_submittable()
    }

    /// Replace the whole buffer with a manual edit. Returns whether the
    /// text changed; any accepted edit re-arms a failed submission.
    pub fn set_symptoms(&mut self, text: impl Into<String>) -> Result<bool, EditRejected> {
        if self.is_submitting() {
            debug!("edit rejected while submitting");
            return Err(EditRejected::InputLocked);
        }
        let changed = self.symptoms.apply(BufferWrite::Replace(text.into()));
        self.rearm_after_failure();
        Ok(changed)
    }

    /// Append a finalized dictation segment. Accepted in every state; a
    /// request already in flight keeps the text it was sent with.
    pub fn append_dictation(&mut self, segment: impl Into<String>) -> bool {
        self.write(BufferWrite::AppendSegment(segment.into()))
    }

    fn write(&mut self, write: BufferWrite) -> bool {
        let changed = self.symptoms.apply(write);
        if changed {
            self.rearm_after_failure();
        }
        changed
    }

    fn rearm_after_failure(&mut self) {
        if matches!(self.submission, SubmissionState::Failed(_)) {
            self.transition_to(SubmissionState::Idle);
        }
    }

    /// Start a submission
    pub fn submit(&mut self) -> Result<SubmitTicket, SubmitRejected> {
        match self.submission {
            SubmissionState::Submitting => return Err(SubmitRejected::AlreadySubmitting),
            SubmissionState::Failed(_) => return Err(SubmitRejected::AwaitingEdit),
            SubmissionState::Idle | SubmissionState::Succeeded(_) => {}
        }
        if !self.symptoms.is_submittable() {
            return Err(SubmitRejected::EmptySymptoms);
        }

        self.next_request_id += 1;
        let request_id = self.next_request_id;
        self.in_flight = Some(request_id);
        self.transition_to(SubmissionState::Submitting);

        Ok(SubmitTicket {
            request_id,
            symptoms: self.symptoms.as_str().to_string(),
        })
    }

    /// Apply the outcome of request `request_id`. Returns false for
    /// completions that do not belong to the outstanding request.
    pub fn complete(
        &mut self,
        request_id: u64,
        outcome: Result<TriageResult, TriageError>,
    ) -> bool {
        if self.in_flight != Some(request_id) {
            warn!(request_id, in_flight = ?self.in_flight, "ignoring stale triage completion");
            return false;
        }
        self.in_flight = None;

        let next = match outcome {
            Ok(result) => {
                info!(
                    request_id,
                    department = %result.department,
                    urgency = %result.urgency_level,
                    token = result.token_number,
                    "triage succeeded"
                );
                SubmissionState::Succeeded(result)
            }
            Err(e) => {
                warn!(request_id, error = %e, "triage failed");
                SubmissionState::Failed(failure_message(&e))
            }
        };
        self.transition_to(next);
        true
    }

    /// Start a new case. Only meaningful after a result or a failure.
    pub fn reset(&mut self) -> bool {
        match self.submission {
            SubmissionState::Succeeded(_) | SubmissionState::Failed(_) => {
                self.symptoms.clear();
                self.transition_to(SubmissionState::Idle);
                true
            }
            SubmissionState::Idle | SubmissionState::Submitting => false,
        }
    }

    fn transition_to(&mut self, next: SubmissionState) {
        info!(from = %self.submission, to = %next, "submission transition");
        self.submission = next;
    }
}
