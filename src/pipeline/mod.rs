//! Submission pipeline bound to one form

mod hooks;
mod state;
mod submission;

pub use hooks::SubmissionHooks;
pub use state::{SubmissionEvent, SubmissionState};
pub use submission::{
    FormSubmissionPipeline, SubmitOutcome, NETWORK_ERROR_MESSAGE, REJECTED_MESSAGE,
    SUCCESS_MESSAGE,
};
