//! Events module for session transitions
//!
//! Structured events broadcast whenever dictation or submission state
//! changes, for the shell and for logging.

use serde::{Deserialize, Serialize};

use crate::dictation::MicErrorKind;

/// Events emitted by the session during transitions
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SessionEvent {
    /// Recognizer began listening
    DictationStarted,

    /// Recognizer stopped listening
    DictationEnded,

    /// A finalized utterance was appended to the symptoms
    SegmentFinalized {
        text: String,
    },

    /// Microphone error surfaced
    MicError {
        kind: MicErrorKind,
        message: String,
    },

    /// Microphone error dismissed by the user
    MicErrorDismissed,

    /// Symptom text changed
    SymptomsChanged {
        /// Length of the buffer in characters
        chars: usize,
    },

    /// Triage request sent
    SubmissionStarted {
        request_id: u64,
    },

    /// Triage result received
    TriageSucceeded {
        department: String,
        token: String,
    },

    /// Triage request failed
    TriageFailed {
        message: String,
    },

    /// Session returned to a blank case
    SessionReset,

    /// An edit or submit was turned down; nothing changed
    IntentRejected {
        message: String,
    },
}

impl std::fmt::Display for SessionEvent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SessionEvent::DictationStarted => write!(f, "DICTATION_STARTED"),
            SessionEvent::DictationEnded => write!(f, "DICTATION_ENDED"),
            SessionEvent::SegmentFinalized { text } => {
                write!(f, "SEGMENT_FINALIZED ({} chars)", text.chars().count())
            }
            SessionEvent::MicError { message, .. } => write!(f, "MIC_ERROR ({})", message),
            SessionEvent::MicErrorDismissed => write!(f, "MIC_ERROR_DISMISSED"),
            SessionEvent::SymptomsChanged { chars } => {
                write!(f, "SYMPTOMS_CHANGED ({} chars)", chars)
            }
            SessionEvent::SubmissionStarted { request_id } => {
                write!(f, "SUBMISSION_STARTED (#{})", request_id)
            }
            SessionEvent::TriageSucceeded { department, token } => {
                write!(f, "TRIAGE_SUCCEEDED ({} {})", department, token)
            }
            SessionEvent::TriageFailed { message } => write!(f, "TRIAGE_FAILED ({})", message),
            SessionEvent::SessionReset => write!(f, "SESSION_RESET"),
            SessionEvent::IntentRejected { message } => write!(f, "INTENT_REJECTED ({})", message),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_serialization() {
        let event = SessionEvent::TriageSucceeded {
            department: "Cardiology".to_string(),
            token: "#007".to_string(),
        };
        let json = serde_json::to_string(&event).unwrap();
        assert!(json.contains("triage_succeeded"));
        assert!(json.contains("#007"));
    }

    #[test]
    fn test_event_deserialization() {
        let json = r#"{"type":"mic_error","kind":{"kind":"no_speech"},"message":"No speech detected. Please try again."}"#;
        let event: SessionEvent = serde_json::from_str(json).unwrap();
        assert!(matches!(
            event,
            SessionEvent::MicError {
                kind: MicErrorKind::NoSpeech,
                ..
            }
        ));
    }

    #[test]
    fn test_display() {
        assert_eq!(
            SessionEvent::SubmissionStarted { request_id: 3 }.to_string(),
            "SUBMISSION_STARTED (#3)"
        );
        assert_eq!(
            SessionEvent::IntentRejected {
                message: "symptom description is empty".to_string()
            }
            .to_string(),
            "INTENT_REJECTED (symptom description is empty)"
        );
    }
}
