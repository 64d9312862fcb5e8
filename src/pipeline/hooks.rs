//! Callbacks fired when a submission ends

use crate::transport::SubmitResponse;

/// Observer for submission outcomes
///
/// Both methods default to doing nothing.
#[cfg_attr(test, mockall::automock)]
pub trait SubmissionHooks: Send + Sync {
    /// The endpoint accepted the submission
    fn on_success(&self, _response: &SubmitResponse) {}

    /// The submission was rejected or could not be delivered
    fn on_error(&self, _message: &str) {}
}
