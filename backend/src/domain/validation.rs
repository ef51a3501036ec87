//! Per-field form validation failures.
//!
//! Form submissions report every failing field at once so a page can show
//! all messages inline next to the inputs. [`FieldErrors`] collects them and
//! converts into an [`Error`] with `details.fields`.

use serde::Serialize;
use serde_json::json;

use super::Error;

/// A single failing form field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldError {
    /// Form field name, e.g. `email`.
    pub field: &'static str,
    /// Stable machine-readable reason, e.g. `duplicate_email`.
    pub code: &'static str,
    /// Message shown next to the field.
    pub message: String,
}

/// Ordered collection of field failures.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldErrors(Vec<FieldError>);

impl FieldErrors {
    /// Empty collection.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a failure for `field`.
    pub fn push(&mut self, field: &'static str, code: &'static str, message: impl Into<String>) {
        self.0.push(FieldError {
            field,
            code,
            message: message.into(),
        });
    }

    /// Move every failure from `other` onto the end of this collection.
    pub fn append(&mut self, mut other: FieldErrors) {
        self.0.append(&mut other.0);
    }

    /// True when no field failed.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// True when `field` already has a recorded failure.
    pub fn has(&self, field: &str) -> bool {
        self.0.iter().any(|error| error.field == field)
    }

    /// Borrow the recorded failures.
    pub fn as_slice(&self) -> &[FieldError] {
        &self.0
    }

    /// `Ok(())` when empty, otherwise the collected failures.
    pub fn into_result(self) -> Result<(), Self> {
        if self.is_empty() { Ok(()) } else { Err(self) }
    }
}

impl From<FieldErrors> for Error {
    fn from(errors: FieldErrors) -> Self {
        let message = errors
            .0
            .first()
            .map_or_else(|| "invalid form submission".to_owned(), |e| e.message.clone());
        Error::invalid_request(message).with_details(json!({ "fields": errors.0 }))
    }
}
