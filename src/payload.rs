//! Submission payload construction

use crate::form::{ContactForm, FieldValue, SelectedFile};
use chrono::{DateTime, SecondsFormat, Utc};
use serde_json::{Map, Value};

pub const CHALLENGE_TOKEN_KEY: &str = "recaptcha_token";
pub const TIMESTAMP_KEY: &str = "timestamp";
pub const PAGE_URL_KEY: &str = "page_url";

/// One name/value entry of the form data set
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FormEntry {
    Text { name: String, value: String },
    File { name: String, file: SelectedFile },
}

impl FormEntry {
    fn text(name: &str, value: &str) -> Self {
        FormEntry::Text {
            name: name.to_string(),
            value: value.to_string(),
        }
    }
}

/// Request body for one submission
#[derive(Debug, Clone, PartialEq)]
pub enum SubmissionPayload {
    /// Sent as `application/json`; repeated names hold an array
    Json(Map<String, Value>),
    /// Sent as `multipart/form-data`, entries in form order
    Multipart(Vec<FormEntry>),
}

impl SubmissionPayload {
    pub fn is_json(&self) -> bool {
        matches!(self, SubmissionPayload::Json(_))
    }

    /// Build the payload from the form's current values
    ///
    /// The honeypot never appears. The challenge token, timestamp and page
    /// URL are appended after the fields.
    pub fn from_form(
        form: &ContactForm,
        challenge_token: Option<&str>,
        submitted_at: DateTime<Utc>,
    ) -> Self {
        let mut entries = collect_entries(form);

        if let Some(token) = challenge_token {
            entries.push(FormEntry::text(CHALLENGE_TOKEN_KEY, token));
        }
        entries.push(FormEntry::text(
            TIMESTAMP_KEY,
            &submitted_at.to_rfc3339_opts(SecondsFormat::Millis, true),
        ));
        entries.push(FormEntry::text(PAGE_URL_KEY, &form.page_url));

        if form.has_file_fields() {
            SubmissionPayload::Multipart(entries)
        } else {
            SubmissionPayload::Json(collapse_entries(entries))
        }
    }
}

fn collect_entries(form: &ContactForm) -> Vec<FormEntry> {
    let mut entries = Vec::new();
    for field in form.input_fields() {
        match &field.value {
            FieldValue::Text(value) => entries.push(FormEntry::text(&field.name, value)),
            FieldValue::Toggle {
                checked: true,
                value,
            } => entries.push(FormEntry::text(&field.name, value)),
            FieldValue::Toggle { checked: false, .. } => {}
            FieldValue::Files(files) => {
                entries.extend(files.iter().map(|file| FormEntry::File {
                    name: field.name.clone(),
                    file: file.clone(),
                }));
            }
        }
    }
    entries
}

/// Fold entries into a JSON object, turning repeated names into arrays
fn collapse_entries(entries: Vec<FormEntry>) -> Map<String, Value> {
    let mut data = Map::new();
    for entry in entries {
        let (name, value) = match entry {
            FormEntry::Text { name, value } => (name, value),
            // Only reachable without file fields, so there are none
            FormEntry::File { .. } => continue,
        };
        match data.get_mut(&name) {
            None => {
                data.insert(name, Value::String(value));
            }
            Some(Value::Array(values)) => values.push(Value::String(value)),
            Some(existing) => {
                let first = existing.take();
                *existing = Value::Array(vec![first, Value::String(value)]);
            }
        }
    }
    data
}
