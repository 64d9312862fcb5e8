//! Trait abstractions for the network seams to enable mocking in tests

use super::types::{SubmitRequest, SubmitResponse};
use crate::error::SubmitError;
use async_trait::async_trait;

/// Sends one submission attempt to the endpoint
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait SubmitTransport: Send + Sync {
    /// POST the payload and decode the endpoint's answer
    ///
    /// Non-2xx statuses and undecodable bodies are errors; a well-formed
    /// `success: false` body is returned as `Ok`.
    async fn send(&self, request: &SubmitRequest) -> Result<SubmitResponse, SubmitError>;
}

/// External bot-verification service issuing opaque tokens
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ChallengeProvider: Send + Sync {
    async fn execute(&self, site_key: &str, action: &str) -> Result<String, SubmitError>;
}
