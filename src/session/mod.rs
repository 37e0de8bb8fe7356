//! Session module for symptom intake
//!
//! - buffer: the symptom text and its single write path
//! - machine: submission lifecycle (Idle, Submitting, Succeeded, Failed)
//! - display: urgency tiers and token labels for the shell
//! - reducer: routes user, recognizer and triage inputs to the controllers
//! - runner: async loop that owns the session and dispatches requests

mod buffer;
mod display;
mod machine;
mod reducer;
mod runner;

pub use display::{ResultDisplay, UrgencyTier};
pub use machine::SubmissionState;
pub use reducer::{Intent, Session, SessionInput, View};
pub use runner::{forward_recognition, SessionRunner};
