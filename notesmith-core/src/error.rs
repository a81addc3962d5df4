//! Core error types.
//!
//! Validation is the only fallible stage of the pipeline. Escaping,
//! sanitizing, rendering, and extraction are total functions.

use thiserror::Error;

/// Input rejected by [`validate`](crate::validate::validate).
///
/// Validation errors describe defective input; they are surfaced to the
/// caller as-is and never retried.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// The value was absent or not text.
    #[error("{field} must be a string, got {found}")]
    InvalidType {
        /// Name of the rejected field
        field: &'static str,
        /// Type of the value that was supplied
        found: &'static str,
    },

    /// A title was blank after trimming.
    #[error("{field} cannot be empty")]
    EmptyInput {
        /// Name of the rejected field
        field: &'static str,
    },

    /// A title exceeded the length limit.
    #[error("{field} is too long: {length} characters (limit: {limit})")]
    TooLong {
        /// Name of the rejected field
        field: &'static str,
        /// Length of the trimmed input in characters
        length: usize,
        /// Maximum accepted length in characters
        limit: usize,
    },
}

impl ValidationError {
    /// Returns the name of the field that failed validation.
    #[must_use]
    pub const fn field(&self) -> &'static str {
        match self {
            Self::InvalidType { field, .. }
            | Self::EmptyInput { field }
            | Self::TooLong { field, .. } => *field,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn invalid_type_display() {
        let err = ValidationError::InvalidType {
            field: "title",
            found: "number",
        };
        assert_eq!(err.to_string(), "title must be a string, got number");
    }

    #[test]
    fn empty_input_display() {
        let err = ValidationError::EmptyInput { field: "folder" };
        assert_eq!(err.to_string(), "folder cannot be empty");
        assert_eq!(err.field(), "folder");
    }

    #[test]
    fn too_long_display() {
        let err = ValidationError::TooLong {
            field: "title",
            length: 300,
            limit: 255,
        };
        assert!(err.to_string().contains("300"));
        assert!(err.to_string().contains("255"));
    }
}
