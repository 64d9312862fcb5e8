//! The form a pipeline is bound to

use super::field::{FieldKind, FormField, SelectedFile};
use super::message::{FormMessage, MessageKind, SuccessNotice};
use anyhow::{Context, Result};
use serde::Deserialize;
use std::fs;
use std::path::PathBuf;
use tokio::time::Instant;

/// Name of the injected honeypot input
pub const HONEYPOT_FIELD: &str = "website";

/// In-memory model of one HTML form and its visible state
#[derive(Debug, Clone, Default)]
pub struct ContactForm {
    pub id: Option<String>,
    /// URL of the page hosting the form
    pub page_url: String,
    /// Anti-forgery token from the page's `csrf-token` meta tag
    pub csrf_token: Option<String>,
    pub fields: Vec<FormField>,
    /// Hidden input that legitimate users never fill
    pub honeypot: Option<FormField>,
    /// Whether the form ships its own `.form-success` element
    pub has_success_element: bool,
    pub success_notice: Option<SuccessNotice>,
    pub message: Option<FormMessage>,
    /// Submit button disabled and form marked `form-loading`
    pub loading: bool,
    /// Name of the field holding focus
    pub focused: Option<String>,
}

impl ContactForm {
    pub fn new(page_url: &str) -> Self {
        Self {
            page_url: page_url.to_string(),
            ..Default::default()
        }
    }

    pub fn with_field(mut self, field: FormField) -> Self {
        self.fields.push(field);
        self
    }

    pub fn with_csrf_token(mut self, token: &str) -> Self {
        self.csrf_token = Some(token.to_string());
        self
    }

    pub fn with_success_element(mut self) -> Self {
        self.has_success_element = true;
        self
    }

    /// Form name used in log events
    pub fn name(&self) -> &str {
        self.id.as_deref().unwrap_or("contact_form")
    }

    pub fn field(&self, name: &str) -> Option<&FormField> {
        self.fields.iter().find(|f| f.name == name)
    }

    pub fn field_mut(&mut self, name: &str) -> Option<&mut FormField> {
        self.fields.iter_mut().find(|f| f.name == name)
    }

    /// Fields that take part in validation and serialization
    pub fn input_fields(&self) -> impl Iterator<Item = &FormField> {
        self.fields.iter().filter(|f| f.kind != FieldKind::Submit)
    }

    pub fn input_fields_mut(&mut self) -> impl Iterator<Item = &mut FormField> {
        self.fields.iter_mut().filter(|f| f.kind != FieldKind::Submit)
    }

    pub fn has_file_fields(&self) -> bool {
        self.input_fields().any(|f| f.kind == FieldKind::File)
    }

    /// Add the hidden honeypot input if it is not already there
    pub fn install_honeypot(&mut self) {
        if self.honeypot.is_none() {
            self.honeypot = Some(FormField::text(HONEYPOT_FIELD, FieldKind::Text));
        }
    }

    pub fn honeypot_tripped(&self) -> bool {
        self.honeypot
            .as_ref()
            .is_some_and(|f| !f.text_value().is_empty())
    }

    /// Restore default values and clear every field error
    pub fn reset(&mut self) {
        for field in &mut self.fields {
            field.reset();
        }
        if let Some(honeypot) = &mut self.honeypot {
            honeypot.reset();
        }
    }

    /// Focus the first field in error, returning its name
    pub fn focus_first_error(&mut self) -> Option<String> {
        let name = self
            .fields
            .iter()
            .find(|f| f.is_in_error())
            .map(|f| f.name.clone())?;
        self.focused = Some(name.clone());
        Some(name)
    }

    pub fn set_loading(&mut self, loading: bool) {
        self.loading = loading;
    }

    /// Hide the success element and remove any banner
    pub fn clear_messages(&mut self) {
        self.success_notice = None;
        self.message = None;
    }

    /// Replace the current banner
    pub fn show_message(&mut self, kind: MessageKind, text: &str) {
        self.message = Some(FormMessage::new(kind, text));
    }

    pub fn show_success_notice(&mut self) {
        self.success_notice = Some(SuccessNotice {
            shown_at: Instant::now(),
        });
    }

    /// The close button on the banner
    pub fn dismiss_message(&mut self) {
        self.message = None;
    }

    pub fn visible_message(&self, now: Instant) -> Option<&FormMessage> {
        self.message.as_ref().filter(|m| !m.is_expired(now))
    }

    pub fn success_notice_visible(&self, now: Instant) -> bool {
        self.success_notice.is_some_and(|n| !n.is_expired(now))
    }

    /// Drop the banner and success notice once they have expired
    pub fn expire_messages(&mut self, now: Instant) {
        if self.message.as_ref().is_some_and(|m| m.is_expired(now)) {
            self.message = None;
        }
        if self.success_notice.is_some_and(|n| n.is_expired(now)) {
            self.success_notice = None;
        }
    }

    /// Build a form from its serialized description, loading any file contents
    pub fn from_definition(def: FormDefinition) -> Result<Self> {
        let mut form = ContactForm::new(&def.page_url);
        form.id = def.id;
        form.csrf_token = def.csrf_token;
        form.has_success_element = def.success_element;
        for field_def in def.fields {
            form.fields.push(field_def.into_field()?);
        }
        Ok(form)
    }
}

/// Serialized form description, as read by the binary
#[derive(Debug, Clone, Deserialize)]
pub struct FormDefinition {
    pub id: Option<String>,
    #[serde(default)]
    pub page_url: String,
    pub csrf_token: Option<String>,
    #[serde(default)]
    pub success_element: bool,
    pub fields: Vec<FieldDefinition>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct FieldDefinition {
    pub name: String,
    #[serde(default)]
    pub kind: FieldKind,
    pub value: Option<String>,
    #[serde(default)]
    pub checked: bool,
    #[serde(default)]
    pub required: bool,
    pub minlength: Option<usize>,
    pub maxlength: Option<usize>,
    pub pattern: Option<String>,
    pub title: Option<String>,
    /// Paths of files selected in a file input
    #[serde(default)]
    pub files: Vec<PathBuf>,
}

impl FieldDefinition {
    fn into_field(self) -> Result<FormField> {
        let mut field = if self.kind.is_toggle() {
            let mut f = FormField::new(&self.name, self.kind);
            if let Some(value) = &self.value {
                f.set_text(value.clone());
            }
            f.set_checked(self.checked);
            f.default_value = f.value.clone();
            f
        } else {
            let f = FormField::new(&self.name, self.kind);
            match &self.value {
                Some(value) => f.with_value(value),
                None => f,
            }
        };

        field.attrs.required = self.required;
        field.attrs.min_length = self.minlength;
        field.attrs.max_length = self.maxlength;
        field.attrs.pattern = self.pattern;
        field.attrs.title = self.title;

        if self.kind == FieldKind::File {
            let mut files = Vec::with_capacity(self.files.len());
            for path in &self.files {
                let content = fs::read(path)
                    .with_context(|| format!("Failed to read {}", path.display()))?;
                let name = path
                    .file_name()
                    .map(|n| n.to_string_lossy().into_owned())
                    .unwrap_or_default();
                files.push(SelectedFile::new(&name, content));
            }
            field.set_files(files);
        }

        Ok(field)
    }
}
