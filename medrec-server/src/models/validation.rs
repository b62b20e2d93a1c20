//! Validation error types

use std::fmt;

use uuid::Uuid;

/// Validation error for domain models
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// Field is empty when it shouldn't be
    Empty { field: &'static str },

    /// Required field was not supplied
    Missing { field: &'static str },

    /// Field is shorter than its minimum length
    TooShort { field: &'static str, min: usize },

    /// Field exceeds maximum length
    TooLong { field: &'static str, max: usize },

    /// String doesn't match required format (e.g., date)
    InvalidFormat { field: &'static str, reason: &'static str },

    /// Invalid enum variant
    InvalidVariant { field: &'static str, value: String },

    /// Reference to a row that is missing, deleted, or owned by another tenant
    UnknownReference { field: &'static str, id: Uuid },
}

impl ValidationError {
    /// Name of the offending field.
    pub fn field(&self) -> &'static str {
        match self {
            Self::Empty { field }
            | Self::Missing { field }
            | Self::TooShort { field, .. }
            | Self::TooLong { field, .. }
            | Self::InvalidFormat { field, .. }
            | Self::InvalidVariant { field, .. }
            | Self::UnknownReference { field, .. } => field,
        }
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Empty { field } => write!(f, "{} cannot be empty", field),
            Self::Missing { field } => write!(f, "{} is required", field),
            Self::TooShort { field, min } => {
                write!(f, "{} must be at least {} characters", field, min)
            }
            Self::TooLong { field, max } => {
                write!(f, "{} exceeds maximum length of {} characters", field, max)
            }
            Self::InvalidFormat { field, reason } => {
                write!(f, "{}: {}", field, reason)
            }
            Self::InvalidVariant { field, value } => {
                write!(f, "invalid {} value: '{}'", field, value)
            }
            Self::UnknownReference { field, id } => {
                write!(f, "{} references unknown record '{}'", field, id)
            }
        }
    }
}

impl std::error::Error for ValidationError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display() {
        let err = ValidationError::TooLong {
            field: "medicineName",
            max: 100,
        };
        assert_eq!(
            err.to_string(),
            "medicineName exceeds maximum length of 100 characters"
        );

        let err = ValidationError::TooShort {
            field: "firstName",
            min: 2,
        };
        assert_eq!(err.to_string(), "firstName must be at least 2 characters");
    }

    #[test]
    fn field_name_is_exposed() {
        let err = ValidationError::UnknownReference {
            field: "doctor",
            id: Uuid::nil(),
        };
        assert_eq!(err.field(), "doctor");
    }
}
