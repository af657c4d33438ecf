//! Validation utilities.

use crate::CoursesError;
use validator::{Validate, ValidationErrors};

/// Extension trait for validation.
pub trait ValidateExt: Validate {
    /// Validates the struct and returns a `CoursesError` on failure.
    fn validate_entity(&self) -> Result<(), CoursesError> {
        self.validate().map_err(validation_errors_to_courses_error)
    }

    /// Returns true if the struct passes every declared rule.
    fn is_valid(&self) -> bool {
        self.validate().is_ok()
    }
}

impl<T: Validate> ValidateExt for T {}

/// Converts `validator::ValidationErrors` to `CoursesError`.
///
/// Field messages are sorted by field name so the result is stable.
#[must_use]
pub fn validation_errors_to_courses_error(errors: ValidationErrors) -> CoursesError {
    let mut messages: Vec<String> = errors
        .field_errors()
        .iter()
        .flat_map(|(field, errors)| {
            errors.iter().map(move |error| {
                let message = error
                    .message
                    .as_ref()
                    .map_or_else(|| error.code.to_string(), ToString::to_string);
                format!("{field}: {message}")
            })
        })
        .collect();
    messages.sort();

    CoursesError::Validation(messages.join("; "))
}

/// Common validation functions.
pub mod rules {
    use validator::ValidationError;

    /// Validates that a string is not blank (not empty after trimming).
    pub fn not_blank(value: &str) -> Result<(), ValidationError> {
        if value.trim().is_empty() {
            return Err(ValidationError::new("not_blank"));
        }
        Ok(())
    }

    /// Validates that an optional string is present and not blank.
    pub fn required_text(value: Option<&str>) -> Result<(), ValidationError> {
        match value {
            Some(text) => not_blank(text),
            None => Err(ValidationError::new("required")),
        }
    }
}
