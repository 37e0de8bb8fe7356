//! Triage service module
//!
//! Wire types for `POST /triage` and the HTTP client that sends it.

mod client;
mod protocol;

pub use client::{HttpTriageClient, TriageError, TriageService};
pub use protocol::{TriageResult, UrgencyLevel};
