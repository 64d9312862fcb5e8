//! Form domain layer
//!
//! Fields, their error and accessibility state, and the submission banner
//! of the form a pipeline is bound to.

mod contact_form;
mod field;
mod message;

pub use contact_form::{ContactForm, FieldDefinition, FormDefinition, HONEYPOT_FIELD};
pub use field::{
    ErrorElement, FieldAttributes, FieldErrorState, FieldKind, FieldValue, FormField,
    SelectedFile,
};
pub use message::{FormMessage, MessageKind, SuccessNotice};
