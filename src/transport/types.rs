//! Request and response types crossing the network seam

use crate::payload::SubmissionPayload;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Header carrying the page's anti-forgery token
pub const CSRF_HEADER: &str = "X-CSRF-Token";

/// Everything one attempt needs to reach the endpoint
#[derive(Debug, Clone, PartialEq)]
pub struct SubmitRequest {
    pub endpoint: String,
    pub payload: SubmissionPayload,
    pub csrf_token: Option<String>,
    pub timeout: Duration,
}

/// Body returned by the endpoint
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubmitResponse {
    pub success: bool,
    #[serde(default)]
    pub message: Option<String>,
}

impl SubmitResponse {
    pub fn accepted() -> Self {
        Self {
            success: true,
            message: None,
        }
    }

    pub fn rejected(message: &str) -> Self {
        Self {
            success: false,
            message: Some(message.to_string()),
        }
    }
}

/// Resolve `endpoint` against the page URL, the way a browser resolves a
/// relative `fetch` target
pub fn resolve_endpoint(endpoint: &str, page_url: &str) -> String {
    if url::Url::parse(endpoint).is_ok() {
        return endpoint.to_string();
    }
    url::Url::parse(page_url)
        .and_then(|base| base.join(endpoint))
        .map(|u| u.to_string())
        .unwrap_or_else(|_| endpoint.to_string())
}
