//! Field validation
//!
//! Small reusable validators attached to resource schema attributes. Each
//! validator reports a human-readable message; the caller adds the field
//! path when it builds the user-facing error.

use std::fmt;

mod validators;

pub use validators::{FieldValidator, OneOfValidator, RangeValidator, StringValidator};

/// Type alias for validation results
pub type ValidationResult<T> = Result<T, ValidationError>;

/// Validation error with field-level errors
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationError {
    pub errors: Vec<FieldError>,
}

impl ValidationError {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create with a single field error
    pub fn field(field: impl Into<String>, message: impl Into<String>) -> Self {
        let mut err = Self::new();
        err.add_field_error(field, message);
        err
    }

    pub fn add_field_error(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.errors.push(FieldError { field: field.into(), message: message.into() });
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn error_count(&self) -> usize {
        self.errors.len()
    }

    /// Get errors for a specific field
    pub fn field_errors(&self, field: &str) -> Vec<&FieldError> {
        self.errors.iter().filter(|e| e.field == field).collect()
    }

    /// Merge another validation error into this one
    pub fn merge(&mut self, other: ValidationError) {
        self.errors.extend(other.errors);
    }

    /// `Ok(())` when nothing was recorded.
    pub fn into_result(self) -> ValidationResult<()> {
        if self.is_empty() {
            Ok(())
        } else {
            Err(self)
        }
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.errors.as_slice() {
            [] => write!(f, "Validation error with no specific field errors"),
            [single] => write!(f, "Validation failed: {}: {}", single.field, single.message),
            errors => {
                write!(f, "Validation failed with {} errors: ", errors.len())?;
                for (i, error) in errors.iter().enumerate() {
                    if i > 0 {
                        write!(f, "; ")?;
                    }
                    write!(f, "{}: {}", error.field, error.message)?;
                }
                Ok(())
            }
        }
    }
}

impl std::error::Error for ValidationError {}

/// Individual field error
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldError {
    pub field: String,
    pub message: String,
}

impl FieldError {
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self { field: field.into(), message: message.into() }
    }
}
