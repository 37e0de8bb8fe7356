//! Configuration loading and management

use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};

use crate::dictation::RecognitionConfig;

const DEFAULT_API_URL: &str = "http://localhost:5000/api";
const DEFAULT_TIMEOUT_SECS: u64 = 30;
const DEFAULT_LOCALE: &str = "en-US";
const DEFAULT_REPLAY_PACING_MS: u64 = 400;

/// Intake client configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// Base URL of the triage service; requests go to `{api_url}/triage`
    pub api_url: String,

    /// Upper bound on a single triage request
    pub request_timeout: Duration,

    /// Recognizer locale
    pub locale: String,

    /// Recorded recognition events to replay instead of a live recognizer
    pub dictation_script: Option<PathBuf>,

    /// Delay between replayed recognition events
    pub replay_pacing: Duration,
}

impl Config {
    /// Load configuration from environment and defaults
    pub fn load() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration from an arbitrary variable source
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let var = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());

        let api_url = var("TRIAGE_API_URL").unwrap_or_else(|| DEFAULT_API_URL.to_string());

        let timeout_secs = match var("TRIAGE_TIMEOUT_SECS") {
            Some(raw) => raw
                .trim()
                .parse::<u64>()
                .with_context(|| format!("TRIAGE_TIMEOUT_SECS is not a number: {raw}"))?,
            None => DEFAULT_TIMEOUT_SECS,
        };

        let pacing_ms = match var("TRIAGE_REPLAY_PACING_MS") {
            Some(raw) => raw
                .trim()
                .parse::<u64>()
                .with_context(|| format!("TRIAGE_REPLAY_PACING_MS is not a number: {raw}"))?,
            None => DEFAULT_REPLAY_PACING_MS,
        };

        Ok(Self {
            api_url,
            request_timeout: Duration::from_secs(timeout_secs),
            locale: var("TRIAGE_LOCALE").unwrap_or_else(|| DEFAULT_LOCALE.to_string()),
            dictation_script: var("TRIAGE_DICTATION_SCRIPT").map(PathBuf::from),
            replay_pacing: Duration::from_millis(pacing_ms),
        })
    }

    /// Recognizer settings for this configuration
    pub fn recognition(&self) -> RecognitionConfig {
        RecognitionConfig::new(self.locale.clone())
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn load_with(vars: &[(&str, &str)]) -> Result<Config> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn test_config_defaults() {
        let config = load_with(&[]).unwrap();
        assert_eq!(config.api_url, "http://localhost:5000/api");
        assert_eq!(config.request_timeout, Duration::from_secs(30));
        assert_eq!(config.locale, "en-US");
        assert!(config.dictation_script.is_none());
        assert_eq!(config.replay_pacing, Duration::from_millis(400));
    }

    #[test]
    fn test_config_overrides() {
        let config = load_with(&[
            ("TRIAGE_API_URL", "https://triage.example.org/v1"),
            ("TRIAGE_TIMEOUT_SECS", " 5 "),
            ("TRIAGE_LOCALE", "en-GB"),
            ("TRIAGE_DICTATION_SCRIPT", "/tmp/session.jsonl"),
        ])
        .unwrap();
        assert_eq!(config.api_url, "https://triage.example.org/v1");
        assert_eq!(config.request_timeout, Duration::from_secs(5));
        assert_eq!(config.recognition().locale, "en-GB");
        assert_eq!(
            config.dictation_script,
            Some(PathBuf::from("/tmp/session.jsonl"))
        );
    }

    #[test]
    fn test_blank_values_fall_back() {
        let config = load_with(&[("TRIAGE_API_URL", "  ")]).unwrap();
        assert_eq!(config.api_url, "http://localhost:5000/api");
    }

    #[test]
    fn test_invalid_timeout_is_rejected() {
        let err = load_with(&[("TRIAGE_TIMEOUT_SECS", "soon")]).unwrap_err();
        assert!(err.to_string().contains("TRIAGE_TIMEOUT_SECS"));
    }
}
