//! Presentation values derived from a triage result

use serde::Serialize;

use crate::triage::{TriageResult, UrgencyLevel};

/// Visual tier for an urgency level
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum UrgencyTier {
    Emergency,
    Urgent,
    /// Routine and anything unrecognized
    Routine,
}

impl From<UrgencyLevel> for UrgencyTier {
    fn from(level: UrgencyLevel) -> Self {
        match level {
            UrgencyLevel::Emergency => UrgencyTier::Emergency,
            UrgencyLevel::Urgent => UrgencyTier::Urgent,
            UrgencyLevel::Routine | UrgencyLevel::Unrecognized => UrgencyTier::Routine,
        }
    }
}

/// `#` followed by the token zero-padded to three digits
pub fn token_label(token_number: u32) -> String {
    format!("#{:03}", token_number)
}

/// Everything the shell needs to show a result
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResultDisplay {
    pub department: String,
    pub urgency: UrgencyLevel,
    pub tier: UrgencyTier,
    pub token: String,
}

impl From<&TriageResult> for ResultDisplay {
    fn from(result: &TriageResult) -> Self {
        Self {
            department: result.department.clone(),
            urgency: result.urgency_level,
            tier: result.urgency_level.into(),
            token: token_label(result.token_number),
        }
    }
}
