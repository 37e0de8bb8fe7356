//! HTTP client for the remote triage service
//!
//! One request per submission, no retries. Requests are bounded by a
//! timeout so a hung service surfaces as a failure.

use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;
use tracing::{debug, info, warn};

use super::protocol::{ErrorPayload, TriageRequest, TriageResult, TRIAGE_PATH};

/// Why a triage request did not produce a result
#[derive(Debug, thiserror::Error)]
pub enum TriageError {
    /// Non-2xx answer, possibly with a structured message
    #[error("Request failed with status code {status}")]
    Rejected { status: u16, message: Option<String> },

    #[error("timeout of {0}s exceeded")]
    Timeout(u64),

    #[error("{0}")]
    Transport(String),

    #[error("invalid triage response: {0}")]
    InvalidResponse(String),
}

impl TriageError {
    /// Message supplied by the service itself, if any
    pub fn service_message(&self) -> Option<&str> {
        match self {
            TriageError::Rejected {
                message: Some(message),
                ..
            } if !message.trim().is_empty() => Some(message.as_str()),
            _ => None,
        }
    }
}

/// Remote triage capability
#[async_trait]
pub trait TriageService: Send + Sync {
    async fn triage(&self, symptoms: &str) -> Result<TriageResult, TriageError>;
}

/// reqwest-backed [`TriageService`]
#[derive(Debug, Clone)]
pub struct HttpTriageClient {
    endpoint: String,
    client: reqwest::Client,
    timeout: Duration,
}

impl HttpTriageClient {
    /// Create a client for the service rooted at `base_url`
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .context("failed to build HTTP client")?;

        let endpoint = format!("{}{}", base_url.trim_end_matches('/'), TRIAGE_PATH);
        info!(%endpoint, timeout_secs = timeout.as_secs(), "triage client ready");

        Ok(Self {
            endpoint,
            client,
            timeout,
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Classify a reqwest failure; the timeout covers both the send and the
    /// body read.
    fn classify(&self, err: reqwest::Error) -> TriageError {
        if err.is_timeout() {
            TriageError::Timeout(self.timeout.as_secs())
        } else {
            TriageError::Transport(err.to_string())
        }
    }
}

#[async_trait]
impl TriageService for HttpTriageClient {
    async fn triage(&self, symptoms: &str) -> Result<TriageResult, TriageError> {
        let request = TriageRequest {
            symptoms: symptoms.to_string(),
        };

        debug!(endpoint = %self.endpoint, chars = symptoms.len(), "sending triage request");

        let response = self
            .client
            .post(&self.endpoint)
            .json(&request)
            .send()
            .await
            .map_err(|e| self.classify(e))?;

        let status = response.status();
        if !status.is_success() {
            let body = match response.bytes().await {
                Ok(body) => body,
                Err(e) if e.is_timeout() => return Err(self.classify(e)),
                Err(e) => {
                    warn!(status = status.as_u16(), error = %e, "failed to read rejection body");
                    Default::default()
                }
            };
            let message = serde_json::from_slice::<ErrorPayload>(&body)
                .ok()
                .and_then(|payload| payload.message);
            warn!(status = status.as_u16(), ?message, "triage service rejected request");
            return Err(TriageError::Rejected {
                status: status.as_u16(),
                message,
            });
        }

        response.json::<TriageResult>().await.map_err(|e| {
            if e.is_timeout() {
                self.classify(e)
            } else {
                TriageError::InvalidResponse(e.to_string())
            }
        })
    }
}
