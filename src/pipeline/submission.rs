//! Form submission pipeline
//!
//! One pipeline is bound to one form. A submission runs: in-flight guard →
//! honeypot check → validation → optional bot challenge → payload → bounded
//! retry against the transport → result reporting. The form lock is never
//! held across an await point.

use super::hooks::SubmissionHooks;
use super::state::{SubmissionEvent, SubmissionState};
use crate::config::PipelineConfig;
use crate::error::SubmitError;
use crate::form::{ContactForm, MessageKind, SelectedFile};
use crate::payload::SubmissionPayload;
use crate::transport::{
    resolve_endpoint, ChallengeProvider, SubmitRequest, SubmitResponse, SubmitTransport,
};
use crate::validation::{validate_field, validate_file, validate_form, FieldValidationResult};
use chrono::Utc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError};
use tracing::{debug, error, info, warn};

pub const SUCCESS_MESSAGE: &str = "Thank you! Your message was sent successfully.";
pub const NETWORK_ERROR_MESSAGE: &str = "Network error. Please try again later.";
pub const REJECTED_MESSAGE: &str = "An error occurred";

/// Action name passed to the bot-verification provider
const CHALLENGE_ACTION: &str = "submit";

/// What a call to [`FormSubmissionPipeline::submit`] ended with
#[derive(Debug)]
pub enum SubmitOutcome {
    /// Another submission was already in flight
    Ignored,
    /// Honeypot filled in; dropped without feedback
    SpamDropped,
    /// Validation failed; no request was made
    Invalid { first_invalid: Option<String> },
    Succeeded(SubmitResponse),
    /// The endpoint answered `success: false`
    Rejected { message: String },
    /// Retries exhausted or a non-retryable failure
    Failed(SubmitError),
}

impl SubmitOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, SubmitOutcome::Succeeded(_))
    }
}

pub struct FormSubmissionPipeline {
    config: PipelineConfig,
    form: Mutex<ContactForm>,
    state: Mutex<SubmissionState>,
    in_flight: AtomicBool,
    transport: Box<dyn SubmitTransport>,
    challenge: Option<Box<dyn ChallengeProvider>>,
    hooks: Option<Box<dyn SubmissionHooks>>,
}

/// Clears the in-flight flag and loading state however `submit` exits
struct InFlightGuard<'a> {
    pipeline: &'a FormSubmissionPipeline,
}

impl Drop for InFlightGuard<'_> {
    fn drop(&mut self) {
        self.pipeline.form().set_loading(false);
        self.pipeline.in_flight.store(false, Ordering::Release);
    }
}

impl FormSubmissionPipeline {
    /// Bind a pipeline to `form`, injecting the honeypot when enabled
    pub fn new(
        config: PipelineConfig,
        mut form: ContactForm,
        transport: Box<dyn SubmitTransport>,
    ) -> Self {
        if config.use_honeypot {
            form.install_honeypot();
        }
        Self {
            config,
            form: Mutex::new(form),
            state: Mutex::new(SubmissionState::Idle),
            in_flight: AtomicBool::new(false),
            transport,
            challenge: None,
            hooks: None,
        }
    }

    pub fn with_challenge(mut self, provider: Box<dyn ChallengeProvider>) -> Self {
        self.challenge = Some(provider);
        self
    }

    pub fn with_hooks(mut self, hooks: Box<dyn SubmissionHooks>) -> Self {
        self.hooks = Some(hooks);
        self
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Lock the bound form
    pub fn form(&self) -> MutexGuard<'_, ContactForm> {
        self.form.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn state(&self) -> SubmissionState {
        *self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn is_submitting(&self) -> bool {
        self.in_flight.load(Ordering::Acquire)
    }

    fn transition(&self, event: SubmissionEvent) {
        let mut state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        match state.on(event) {
            Some(next) => {
                debug!("Submission state {} -> {}", state.label(), next.label());
                *state = next;
            }
            None => warn!("Ignoring {:?} in state {}", event, state.label()),
        }
    }

    /// Validate the named field when it loses focus
    pub fn on_blur(&self, name: &str) -> Option<FieldValidationResult> {
        let mut form = self.form();
        form.field_mut(name).map(validate_field)
    }

    /// Update a field's value, clearing its error if it had one
    ///
    /// Only declared fields are reachable here, so a form with its own
    /// `website` field never writes into the honeypot.
    pub fn on_input(&self, name: &str, value: &str) -> bool {
        let mut form = self.form();
        match form.field_mut(name) {
            Some(field) => {
                field.set_text(value.to_string());
                if field.is_in_error() {
                    field.clear_error();
                }
                true
            }
            None => false,
        }
    }

    /// Fill the hidden honeypot input, as an autofilling bot would
    pub fn on_honeypot_input(&self, value: &str) -> bool {
        match &mut self.form().honeypot {
            Some(honeypot) => {
                honeypot.set_text(value.to_string());
                true
            }
            None => false,
        }
    }

    /// Check or uncheck a checkbox/radio, clearing its error if it had one
    pub fn on_checked(&self, name: &str, checked: bool) -> bool {
        let mut form = self.form();
        match form.field_mut(name) {
            Some(field) => {
                field.set_checked(checked);
                if field.is_in_error() {
                    field.clear_error();
                }
                true
            }
            None => false,
        }
    }

    /// Replace a file input's selection and validate it
    pub fn on_files_selected(&self, name: &str, files: Vec<SelectedFile>) -> Option<bool> {
        let mut form = self.form();
        let field = form.field_mut(name)?;
        field.set_files(files);
        Some(validate_file(field, &self.config))
    }

    /// Validate every field without submitting
    pub fn validate_form(&self) -> bool {
        validate_form(&mut self.form())
    }

    pub fn dismiss_message(&self) {
        self.form().dismiss_message();
    }

    /// Submit the form
    ///
    /// Calls made while a submission is outstanding return
    /// [`SubmitOutcome::Ignored`].
    pub async fn submit(&self) -> SubmitOutcome {
        if self
            .in_flight
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            debug!("Submission already in flight, ignoring");
            return SubmitOutcome::Ignored;
        }
        let _guard = InFlightGuard { pipeline: self };

        {
            let mut form = self.form();

            if self.config.use_honeypot && form.honeypot_tripped() {
                warn!(form = form.name(), "Honeypot triggered - possible spam");
                return SubmitOutcome::SpamDropped;
            }

            self.transition(SubmissionEvent::Submit);
            if !validate_form(&mut form) {
                let first_invalid = form.focus_first_error();
                debug!(form = form.name(), ?first_invalid, "Validation failed");
                self.transition(SubmissionEvent::ValidationFailed);
                return SubmitOutcome::Invalid { first_invalid };
            }
            self.transition(SubmissionEvent::ValidationPassed);

            form.set_loading(true);
            form.clear_messages();
        }

        let result = self.deliver().await;
        self.finish(result)
    }

    async fn deliver(&self) -> Result<SubmitResponse, SubmitError> {
        let token = self.challenge_token().await?;

        let request = {
            let form = self.form();
            SubmitRequest {
                endpoint: resolve_endpoint(&self.config.api_endpoint, &form.page_url),
                payload: SubmissionPayload::from_form(&form, token.as_deref(), Utc::now()),
                csrf_token: form.csrf_token.clone(),
                timeout: self.config.timeout(),
            }
        };

        self.submit_with_retry(&request).await
    }

    async fn challenge_token(&self) -> Result<Option<String>, SubmitError> {
        if !self.config.challenge_enabled() {
            return Ok(None);
        }
        let Some(provider) = &self.challenge else {
            debug!("Bot verification enabled but no provider is loaded");
            return Ok(None);
        };
        provider
            .execute(&self.config.recaptcha_site_key, CHALLENGE_ACTION)
            .await
            .map(Some)
    }

    /// Send the request, retrying retryable failures with linear backoff
    async fn submit_with_retry(
        &self,
        request: &SubmitRequest,
    ) -> Result<SubmitResponse, SubmitError> {
        let max_attempts = self.config.max_attempts();
        let mut attempt = 1;

        loop {
            debug!(attempt, max_attempts, endpoint = %request.endpoint, "Sending submission");

            let result = tokio::time::timeout(request.timeout, self.transport.send(request))
                .await
                .unwrap_or(Err(SubmitError::Timeout(request.timeout)));

            match result {
                Ok(response) => return Ok(response),
                Err(e) if e.is_retryable() && attempt < max_attempts => {
                    let delay = self.config.retry_delay(attempt);
                    warn!(attempt, ?delay, "Submission attempt failed: {}", e);
                    tokio::time::sleep(delay).await;
                    attempt += 1;
                }
                Err(e) => return Err(e),
            }
        }
    }

    fn finish(&self, result: Result<SubmitResponse, SubmitError>) -> SubmitOutcome {
        match result {
            Ok(response) if response.success => {
                self.handle_success(&response);
                self.transition(SubmissionEvent::Accepted);
                SubmitOutcome::Succeeded(response)
            }
            Ok(response) => {
                let message = response
                    .message
                    .filter(|m| !m.is_empty())
                    .unwrap_or_else(|| REJECTED_MESSAGE.to_string());
                self.handle_error(&message);
                self.transition(SubmissionEvent::Failed);
                SubmitOutcome::Rejected { message }
            }
            Err(e) => {
                error!("Form submission error: {}", e);
                self.handle_error(NETWORK_ERROR_MESSAGE);
                self.transition(SubmissionEvent::Failed);
                SubmitOutcome::Failed(e)
            }
        }
    }

    fn handle_success(&self, response: &SubmitResponse) {
        {
            let mut form = self.form();
            if form.has_success_element {
                form.show_success_notice();
            } else {
                form.show_message(MessageKind::Success, SUCCESS_MESSAGE);
            }
            form.reset();
            info!(
                event = "form_submit",
                form = form.name(),
                destination = %self.config.api_endpoint,
                "Form submitted"
            );
        }
        if let Some(hooks) = &self.hooks {
            hooks.on_success(response);
        }
    }

    fn handle_error(&self, message: &str) {
        {
            let mut form = self.form();
            form.show_message(MessageKind::Error, message);
            info!(event = "form_error", form = form.name(), error_message = message, "Form error");
        }
        if let Some(hooks) = &self.hooks {
            hooks.on_error(message);
        }
    }
}
