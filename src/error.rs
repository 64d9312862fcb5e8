//! Error taxonomy for form submission

use std::time::Duration;
use thiserror::Error;

/// Failures that can end a network submission attempt
///
/// Validation problems and honeypot trips never become a `SubmitError`:
/// they are reported on the form itself and no request is made.
#[derive(Debug, Error)]
pub enum SubmitError {
    #[error("Network error: {0}")]
    Network(String),

    #[error("Request timeout after {0:?}")]
    Timeout(Duration),

    #[error("HTTP error! status: {status}")]
    Http { status: u16 },

    #[error("Invalid response body: {0}")]
    Decode(String),

    #[error("Bot verification failed: {0}")]
    Challenge(String),

    #[error("Invalid request: {0}")]
    InvalidRequest(String),
}

impl SubmitError {
    /// Whether another attempt may succeed where this one failed
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            SubmitError::Network(_)
                | SubmitError::Timeout(_)
                | SubmitError::Http { .. }
                | SubmitError::Decode(_)
        )
    }
}

impl From<reqwest::Error> for SubmitError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_decode() {
            SubmitError::Decode(e.to_string())
        } else if e.is_builder() {
            SubmitError::InvalidRequest(e.to_string())
        } else if let Some(status) = e.status() {
            SubmitError::Http {
                status: status.as_u16(),
            }
        } else {
            SubmitError::Network(e.to_string())
        }
    }
}
