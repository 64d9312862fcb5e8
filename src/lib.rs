//! Contact form submission pipeline
//!
//! Validates a form's fields, guards against spam and double submission,
//! serializes the data and posts it with bounded retry, then reports the
//! outcome back onto the form.

pub mod config;
pub mod error;
pub mod form;
pub mod payload;
pub mod pipeline;
pub mod transport;
pub mod validation;

pub use config::PipelineConfig;
pub use error::SubmitError;
pub use form::{ContactForm, FormField};
pub use pipeline::{FormSubmissionPipeline, SubmissionState, SubmitOutcome};
