//! Field and file validation rules

use crate::config::PipelineConfig;
use crate::form::{ContactForm, FieldKind, FormField};
use regex::Regex;
use std::sync::LazyLock;

pub const REQUIRED_MESSAGE: &str = "This field is required";
pub const EMAIL_MESSAGE: &str = "Please enter a valid email address";
pub const PHONE_MESSAGE: &str = "Please enter a valid phone number";
pub const URL_MESSAGE: &str = "Please enter a valid URL";
pub const PATTERN_MESSAGE: &str = "Invalid format";

static EMAIL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("valid email regex"));

static PHONE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[\d\s\-\+\(\)]+$").expect("valid phone regex"));

/// Outcome of validating one field
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldValidationResult {
    pub valid: bool,
    pub message: Option<String>,
}

impl FieldValidationResult {
    pub fn ok() -> Self {
        Self {
            valid: true,
            message: None,
        }
    }

    pub fn invalid(message: impl Into<String>) -> Self {
        Self {
            valid: false,
            message: Some(message.into()),
        }
    }
}

/// Run the rules against a field without touching its state
///
/// Rules run in priority order and the first failure wins. The format rules
/// only look at non-empty values; length and pattern rules always apply.
pub fn check_field(field: &FormField) -> FieldValidationResult {
    let value = field.text_value();

    if field.attrs.required && value.trim().is_empty() {
        return FieldValidationResult::invalid(REQUIRED_MESSAGE);
    }
    match field.kind {
        _ if value.is_empty() => {}
        FieldKind::Email if !EMAIL_RE.is_match(value) => {
            return FieldValidationResult::invalid(EMAIL_MESSAGE);
        }
        FieldKind::Tel if !PHONE_RE.is_match(value) => {
            return FieldValidationResult::invalid(PHONE_MESSAGE);
        }
        FieldKind::Url if url::Url::parse(value).is_err() => {
            return FieldValidationResult::invalid(URL_MESSAGE);
        }
        _ => {}
    }

    let len = value.chars().count();
    if let Some(min) = field.attrs.min_length {
        if len < min {
            return FieldValidationResult::invalid(format!("At least {min} characters required"));
        }
    }
    if let Some(max) = field.attrs.max_length {
        if len > max {
            return FieldValidationResult::invalid(format!("At most {max} characters allowed"));
        }
    }

    if let Some(pattern) = &field.attrs.pattern {
        match Regex::new(pattern) {
            Ok(re) if !re.is_match(value) => {
                let message = field.attrs.title.as_deref().unwrap_or(PATTERN_MESSAGE);
                return FieldValidationResult::invalid(message);
            }
            Ok(_) => {}
            Err(e) => {
                tracing::warn!("Ignoring invalid pattern on field {}: {}", field.name, e);
            }
        }
    }

    FieldValidationResult::ok()
}

/// Validate a field and reflect the outcome in its error state
pub fn validate_field(field: &mut FormField) -> FieldValidationResult {
    field.clear_error();
    let result = check_field(field);
    if let Some(message) = &result.message {
        field.show_error(message);
    }
    result
}

/// Validate every input field, annotating all failures
pub fn validate_form(form: &mut ContactForm) -> bool {
    let mut valid = true;
    for field in form.input_fields_mut() {
        if !validate_field(field).valid {
            valid = false;
        }
    }
    valid
}

/// Check the selected files against the size ceiling and extension allow-list
///
/// The first violation is reported on the field and the selection is cleared.
pub fn validate_file(field: &mut FormField, config: &PipelineConfig) -> bool {
    if field.files().is_empty() {
        return true;
    }

    let violation = field.files().iter().find_map(|file| {
        if file.size > config.max_file_size {
            return Some(format!(
                "File \"{}\" is too large. Maximum {}MB allowed.",
                file.name,
                config.max_file_size as f64 / 1024.0 / 1024.0
            ));
        }
        let extension = file.extension();
        if !config.allows_extension(&extension) {
            return Some(format!(
                "File type \"{}\" is not allowed. Allowed types: {}",
                extension,
                config.allowed_file_types.join(", ")
            ));
        }
        None
    });

    match violation {
        Some(message) => {
            tracing::debug!("Rejected file selection on {}: {}", field.name, message);
            field.show_error(&message);
            field.clear();
            false
        }
        None => {
            field.clear_error();
            true
        }
    }
}
