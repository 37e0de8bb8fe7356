//! Triage service wire format
//!
//! All bodies are JSON. Field names follow the service's camelCase.

use serde::{Deserialize, Serialize};

/// Relative path of the triage endpoint
pub const TRIAGE_PATH: &str = "/triage";

/// Body of `POST /triage`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TriageRequest {
    pub symptoms: String,
}

/// Priority assigned by the service
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum UrgencyLevel {
    Emergency,
    Urgent,
    Routine,
    /// Any level this client does not know about
    #[serde(other)]
    Unrecognized,
}

impl std::fmt::Display for UrgencyLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            UrgencyLevel::Emergency => write!(f, "Emergency"),
            UrgencyLevel::Urgent => write!(f, "Urgent"),
            UrgencyLevel::Routine => write!(f, "Routine"),
            UrgencyLevel::Unrecognized => write!(f, "Unrecognized"),
        }
    }
}

/// Successful triage response
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TriageResult {
    /// Department the patient is routed to
    pub department: String,
    pub urgency_level: UrgencyLevel,
    /// Queue token handed to the patient
    pub token_number: u32,
}

/// Structured error body the service may attach to a failure
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ErrorPayload {
    #[serde(default)]
    pub message: Option<String>,
}
