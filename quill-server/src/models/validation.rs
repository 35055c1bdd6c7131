//! Validation error types

use std::fmt;

/// Validation error for user input
#[derive(Debug, Clone)]
pub enum ValidationError {
    /// Field is empty when it shouldn't be
    Empty { field: &'static str },

    /// Field exceeds maximum length
    TooLong { field: &'static str, max: usize },

    /// String doesn't match required format (e.g., email)
    InvalidFormat { field: &'static str, reason: &'static str },

    /// Value refers to something that doesn't fit (e.g., reply parent on another blog)
    InvalidVariant { field: &'static str, value: String },
}

impl ValidationError {
    /// Name of the offending input field.
    pub fn field(&self) -> &'static str {
        match self {
            Self::Empty { field }
            | Self::TooLong { field, .. }
            | Self::InvalidFormat { field, .. }
            | Self::InvalidVariant { field, .. } => field,
        }
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Empty { field } => write!(f, "{} cannot be empty", field),
            Self::TooLong { field, max } => {
                write!(f, "{} exceeds maximum length of {} characters", field, max)
            }
            Self::InvalidFormat { field, reason } => {
                write!(f, "{}: {}", field, reason)
            }
            Self::InvalidVariant { field, value } => {
                write!(f, "invalid {} value: '{}'", field, value)
            }
        }
    }
}

impl std::error::Error for ValidationError {}

/// Trim and check a free-text input against emptiness and a length cap.
pub(crate) fn bounded_text(
    s: &str,
    field: &'static str,
    max: usize,
) -> Result<String, ValidationError> {
    let trimmed = s.trim();

    if trimmed.is_empty() {
        return Err(ValidationError::Empty { field });
    }

    if trimmed.chars().count() > max {
        return Err(ValidationError::TooLong { field, max });
    }

    Ok(trimmed.to_owned())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display() {
        let err = ValidationError::TooLong {
            field: "summary",
            max: 200,
        };
        assert_eq!(
            err.to_string(),
            "summary exceeds maximum length of 200 characters"
        );
        assert_eq!(err.field(), "summary");
    }

    #[test]
    fn bounded_text_trims() {
        assert_eq!(bounded_text("  hi  ", "name", 10).unwrap(), "hi");
    }

    #[test]
    fn bounded_text_rejects_whitespace_only() {
        assert!(matches!(
            bounded_text("   ", "name", 10).unwrap_err(),
            ValidationError::Empty { field: "name" }
        ));
    }

    #[test]
    fn bounded_text_counts_chars_not_bytes() {
        assert!(bounded_text("ééééé", "name", 5).is_ok());
        assert!(matches!(
            bounded_text("éééééé", "name", 5).unwrap_err(),
            ValidationError::TooLong { max: 5, .. }
        ));
    }
}
