//! Form field value objects

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Input type of a form control
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldKind {
    #[default]
    Text,
    Email,
    Tel,
    Url,
    Number,
    TextArea,
    Select,
    Checkbox,
    Radio,
    Hidden,
    File,
    Submit,
}

impl FieldKind {
    /// Checkbox and radio controls only submit when checked
    pub fn is_toggle(&self) -> bool {
        matches!(self, FieldKind::Checkbox | FieldKind::Radio)
    }
}

/// A file picked in a file input
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectedFile {
    pub name: String,
    pub size: u64,
    pub mime: Option<String>,
    pub content: Vec<u8>,
}

impl SelectedFile {
    pub fn new(name: &str, content: Vec<u8>) -> Self {
        Self {
            name: name.to_string(),
            size: content.len() as u64,
            mime: None,
            content,
        }
    }

    /// Describe a file by name and size only (content not loaded)
    pub fn sized(name: &str, size: u64) -> Self {
        Self {
            name: name.to_string(),
            size,
            mime: None,
            content: Vec::new(),
        }
    }

    /// Lower-cased text after the last `.`, or the whole name when there is none
    pub fn extension(&self) -> String {
        self.name
            .rsplit('.')
            .next()
            .unwrap_or_default()
            .to_lowercase()
    }
}

/// Type-safe field values
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldValue {
    Text(String),
    Toggle { checked: bool, value: String },
    Files(Vec<SelectedFile>),
}

impl Default for FieldValue {
    fn default() -> Self {
        FieldValue::Text(String::new())
    }
}

/// Constraint attributes declared on a field
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldAttributes {
    pub required: bool,
    pub min_length: Option<usize>,
    pub max_length: Option<usize>,
    pub pattern: Option<String>,
    /// Shown instead of the generic message when `pattern` fails
    pub title: Option<String>,
}

/// Inline error element rendered next to a field
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ErrorElement {
    pub id: String,
    pub text: String,
    pub visible: bool,
}

/// Visual and accessibility error state of a field
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldErrorState {
    /// The `error` class
    pub error: bool,
    pub aria_invalid: bool,
    pub aria_describedby: Option<String>,
    /// Created on first error and kept afterwards, so its id is stable
    pub element: Option<ErrorElement>,
}

/// Represents a single form field with its configuration and value
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormField {
    pub name: String,
    pub kind: FieldKind,
    pub value: FieldValue,
    /// Value restored by a form reset
    pub default_value: FieldValue,
    pub attrs: FieldAttributes,
    pub state: FieldErrorState,
}

impl FormField {
    /// Create a new field with an empty value appropriate to its kind
    pub fn new(name: &str, kind: FieldKind) -> Self {
        let value = match kind {
            FieldKind::Checkbox | FieldKind::Radio => FieldValue::Toggle {
                checked: false,
                value: "on".to_string(),
            },
            FieldKind::File => FieldValue::Files(Vec::new()),
            _ => FieldValue::Text(String::new()),
        };
        Self {
            name: name.to_string(),
            kind,
            default_value: value.clone(),
            value,
            attrs: FieldAttributes::default(),
            state: FieldErrorState::default(),
        }
    }

    /// Create a new text-like field
    pub fn text(name: &str, kind: FieldKind) -> Self {
        Self::new(name, kind)
    }

    /// Create a checkbox that submits `value` when checked
    pub fn checkbox(name: &str, value: &str, checked: bool) -> Self {
        let mut field = Self::new(name, FieldKind::Checkbox);
        field.value = FieldValue::Toggle {
            checked,
            value: value.to_string(),
        };
        field.default_value = field.value.clone();
        field
    }

    /// Create a file input
    pub fn file(name: &str) -> Self {
        Self::new(name, FieldKind::File)
    }

    /// Set the initial value, which is also what reset restores
    pub fn with_value(mut self, value: &str) -> Self {
        self.set_text(value.to_string());
        self.default_value = self.value.clone();
        self
    }

    pub fn required(mut self) -> Self {
        self.attrs.required = true;
        self
    }

    pub fn min_length(mut self, len: usize) -> Self {
        self.attrs.min_length = Some(len);
        self
    }

    pub fn max_length(mut self, len: usize) -> Self {
        self.attrs.max_length = Some(len);
        self
    }

    pub fn pattern(mut self, pattern: &str, title: Option<&str>) -> Self {
        self.attrs.pattern = Some(pattern.to_string());
        self.attrs.title = title.map(str::to_string);
        self
    }

    /// The value as the validator sees it
    ///
    /// Unchecked toggles read as empty; file inputs read as the first file name.
    pub fn text_value(&self) -> &str {
        match &self.value {
            FieldValue::Text(s) => s,
            FieldValue::Toggle { checked: true, value } => value,
            FieldValue::Toggle { checked: false, .. } => "",
            FieldValue::Files(files) => files.first().map(|f| f.name.as_str()).unwrap_or(""),
        }
    }

    /// Set the text value (toggles take it as their submitted value)
    pub fn set_text(&mut self, text: String) {
        match &mut self.value {
            FieldValue::Toggle { value, .. } => *value = text,
            FieldValue::Files(_) => {}
            FieldValue::Text(s) => *s = text,
        }
    }

    pub fn set_checked(&mut self, on: bool) {
        if let FieldValue::Toggle { checked, .. } = &mut self.value {
            *checked = on;
        }
    }

    pub fn set_files(&mut self, files: Vec<SelectedFile>) {
        if self.kind == FieldKind::File {
            self.value = FieldValue::Files(files);
        }
    }

    /// Files currently selected (empty for non-file fields)
    pub fn files(&self) -> &[SelectedFile] {
        match &self.value {
            FieldValue::Files(files) => files,
            _ => &[],
        }
    }

    /// Clear the field value
    pub fn clear(&mut self) {
        match &mut self.value {
            FieldValue::Text(s) => s.clear(),
            FieldValue::Toggle { checked, .. } => *checked = false,
            FieldValue::Files(files) => files.clear(),
        }
    }

    /// Restore the default value and drop any error state
    pub fn reset(&mut self) {
        self.value = self.default_value.clone();
        self.clear_error();
    }

    /// Mark the field invalid and show `message` in its error element
    pub fn show_error(&mut self, message: &str) {
        let element = self.state.element.get_or_insert_with(|| ErrorElement {
            id: generate_error_id(),
            text: String::new(),
            visible: false,
        });
        element.text = message.to_string();
        element.visible = true;
        let id = element.id.clone();

        self.state.error = true;
        self.state.aria_invalid = true;
        self.state.aria_describedby = Some(id);
    }

    pub fn clear_error(&mut self) {
        self.state.error = false;
        self.state.aria_invalid = false;
        self.state.aria_describedby = None;
        if let Some(element) = &mut self.state.element {
            element.text.clear();
            element.visible = false;
        }
    }

    pub fn is_in_error(&self) -> bool {
        self.state.error
    }

    /// Message currently shown for this field, if any
    pub fn error_message(&self) -> Option<&str> {
        self.state
            .element
            .as_ref()
            .filter(|e| e.visible)
            .map(|e| e.text.as_str())
    }
}

fn generate_error_id() -> String {
    let simple = Uuid::new_v4().simple().to_string();
    format!("error-{}", &simple[..9])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_checkbox_defaults_to_on_value() {
        let field = FormField::new("newsletter", FieldKind::Checkbox);
        assert_eq!(
            field.value,
            FieldValue::Toggle {
                checked: false,
                value: "on".to_string()
            }
        );
        assert_eq!(field.text_value(), "");
    }

    #[test]
    fn test_checked_toggle_reads_its_value() {
        let field = FormField::checkbox("services", "seo", true);
        assert_eq!(field.text_value(), "seo");
    }

    #[test]
    fn test_file_text_value_is_first_name() {
        let mut field = FormField::file("attachment");
        assert_eq!(field.text_value(), "");
        field.set_files(vec![
            SelectedFile::sized("cv.pdf", 10),
            SelectedFile::sized("photo.png", 10),
        ]);
        assert_eq!(field.text_value(), "cv.pdf");
    }

    #[test]
    fn test_set_files_ignored_on_text_field() {
        let mut field = FormField::text("name", FieldKind::Text);
        field.set_files(vec![SelectedFile::sized("cv.pdf", 10)]);
        assert!(field.files().is_empty());
    }

    #[test]
    fn test_extension_lowercases_last_segment() {
        assert_eq!(SelectedFile::sized("Report.Final.PDF", 1).extension(), "pdf");
        assert_eq!(SelectedFile::sized("README", 1).extension(), "readme");
    }

    #[test]
    fn test_show_error_sets_aria_state() {
        let mut field = FormField::text("email", FieldKind::Email);
        field.show_error("bad");

        assert!(field.is_in_error());
        assert!(field.state.aria_invalid);
        let id = field.state.element.as_ref().unwrap().id.clone();
        assert!(id.starts_with("error-"));
        assert_eq!(id.len(), "error-".len() + 9);
        assert_eq!(field.state.aria_describedby.as_deref(), Some(id.as_str()));
        assert_eq!(field.error_message(), Some("bad"));
    }

    #[test]
    fn test_error_element_id_is_stable() {
        let mut field = FormField::text("email", FieldKind::Email);
        field.show_error("first");
        let first_id = field.state.element.as_ref().unwrap().id.clone();
        field.clear_error();
        field.show_error("second");
        assert_eq!(field.state.element.as_ref().unwrap().id, first_id);
    }

    #[test]
    fn test_clear_error_hides_element() {
        let mut field = FormField::text("name", FieldKind::Text);
        field.show_error("required");
        field.clear_error();

        assert!(!field.is_in_error());
        assert!(!field.state.aria_invalid);
        assert!(field.state.aria_describedby.is_none());
        assert!(field.error_message().is_none());
        assert!(field.state.element.is_some());
    }

    #[test]
    fn test_reset_restores_default() {
        let mut field = FormField::text("company", FieldKind::Text).with_value("ACME");
        field.set_text("Other".to_string());
        field.show_error("oops");
        field.reset();
        assert_eq!(field.text_value(), "ACME");
        assert!(!field.is_in_error());
    }

    #[test]
    fn test_clear_unchecks_toggle() {
        let mut field = FormField::checkbox("terms", "yes", true);
        field.clear();
        assert_eq!(field.text_value(), "");
    }
}
