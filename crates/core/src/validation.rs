//! Bridge between `validator` derive rules and [`CoreError`].
//!
//! Form inputs derive [`Validate`]; handlers and services call
//! [`validate_input`] so every failure surfaces as a single
//! `CoreError::Validation` carrying field-level messages.

use validator::{Validate, ValidationErrors};

use crate::error::CoreError;

/// Run the derived validation rules on `input`.
pub fn validate_input<T: Validate>(input: &T) -> Result<(), CoreError> {
    input
        .validate()
        .map_err(|errors| CoreError::Validation(describe_errors(&errors)))
}

/// Flatten `errors` into `field: message` pairs joined by `; `.
///
/// Fields are sorted so the output is stable across runs.
pub fn describe_errors(errors: &ValidationErrors) -> String {
    let mut messages: Vec<String> = errors
        .field_errors()
        .into_iter()
        .flat_map(|(field, errs)| {
            errs.iter().map(move |err| {
                let message = err
                    .message
                    .as_ref()
                    .map(|m| m.to_string())
                    .unwrap_or_else(|| err.code.to_string());
                format!("{field}: {message}")
            })
        })
        .collect();
    messages.sort();
    messages.join("; ")
}

/// Reject names that are empty once surrounding whitespace is removed.
pub fn require_non_blank(field: &str, value: &str) -> Result<(), CoreError> {
    if value.trim().is_empty() {
        Err(CoreError::Validation(format!("{field}: must not be blank")))
    } else {
        Ok(())
    }
}
