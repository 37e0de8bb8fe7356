//! Microphone error classification

use serde::{Deserialize, Serialize};

/// Shown when probing finds no recognizer at all
pub const UNSUPPORTED_NOTICE: &str =
    "Speech recognition is not supported in this browser. Please use Chrome or Edge.";

/// Normalized recognizer failure
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "code", rename_all = "snake_case")]
pub enum MicErrorKind {
    PermissionDenied,
    Network,
    NoSpeech,
    AudioCaptureFailed,
    Unsupported,
    Other(String),
}

impl MicErrorKind {
    /// Map a raw engine error code
    pub fn from_code(code: &str) -> Self {
        match code {
            "not-allowed" => MicErrorKind::PermissionDenied,
            "network" => MicErrorKind::Network,
            "no-speech" => MicErrorKind::NoSpeech,
            "audio-capture" => MicErrorKind::AudioCaptureFailed,
            "not-supported" => MicErrorKind::Unsupported,
            other => MicErrorKind::Other(other.to_string()),
        }
    }

    /// Human-readable message for the shell
    pub fn message(&self) -> String {
        match self {
            MicErrorKind::PermissionDenied => {
                "Microphone access denied. Please check browser permissions.".to_string()
            }
            MicErrorKind::Network => {
                "Network error detected. Please check your connection.".to_string()
            }
            MicErrorKind::NoSpeech => "No speech detected. Please try again.".to_string(),
            MicErrorKind::AudioCaptureFailed => {
                "No microphone found or audio capture failed.".to_string()
            }
            MicErrorKind::Unsupported => {
                "Speech recognition is not supported in this browser.".to_string()
            }
            MicErrorKind::Other(code) => format!("Microphone error: {}", code),
        }
    }
}

impl std::fmt::Display for MicErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.message())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_codes() {
        assert_eq!(MicErrorKind::from_code("not-allowed"), MicErrorKind::PermissionDenied);
        assert_eq!(MicErrorKind::from_code("network"), MicErrorKind::Network);
        assert_eq!(MicErrorKind::from_code("no-speech"), MicErrorKind::NoSpeech);
        assert_eq!(
            MicErrorKind::from_code("audio-capture"),
            MicErrorKind::AudioCaptureFailed
        );
        assert_eq!(MicErrorKind::from_code("not-supported"), MicErrorKind::Unsupported);
    }

    #[test]
    fn test_unknown_code_keeps_raw_value() {
        let kind = MicErrorKind::from_code("aborted");
        assert_eq!(kind, MicErrorKind::Other("aborted".to_string()));
        assert_eq!(kind.message(), "Microphone error: aborted");
    }

    #[test]
    fn test_messages() {
        assert_eq!(
            MicErrorKind::PermissionDenied.to_string(),
            "Microphone access denied. Please check browser permissions."
        );
        assert_eq!(
            MicErrorKind::NoSpeech.message(),
            "No speech detected. Please try again."
        );
    }
}
