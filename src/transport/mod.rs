//! Outbound network seams and the HTTP client behind them

mod client;
mod traits;
mod types;

pub use client::HttpTransport;
pub use traits::{ChallengeProvider, SubmitTransport};
pub use types::{resolve_endpoint, SubmitRequest, SubmitResponse, CSRF_HEADER};

#[cfg(test)]
pub use traits::{MockChallengeProvider, MockSubmitTransport};
