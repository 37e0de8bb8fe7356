//! Symptom intake core
//!
//! Captures a patient's symptom description, typed or dictated, submits it
//! to a remote triage service and exposes the assigned department, priority
//! and queue token for display.
//!
//! - dictation: controller over an injected speech recognizer
//! - session: symptom buffer, submission state machine and its runner
//! - triage: wire types and HTTP client for `POST /triage`
//! - shell: terminal presentation layer

pub mod config;
pub mod dictation;
pub mod events;
pub mod lifecycle;
pub mod session;
pub mod shell;
pub mod triage;
