//! Error taxonomy for the translation engine.
//!
//! Store errors come from the backing datastore and are carried through
//! unchanged. Translation errors are what the lifecycle manager reports to its
//! callers, always wrapped in a structured result rather than returned bare.

use serde::Serialize;
use std::fmt;
use thiserror::Error;

/// A single field-level validation failure.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldError {
    /// Field name the error refers to (`language_code`, `title`, ...)
    pub field: String,
    /// Human-readable description of the problem
    pub message: String,
}

impl FieldError {
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

impl fmt::Display for FieldError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

/// Errors raised by a translation store implementation.
#[derive(Error, Debug)]
pub enum StoreError {
    /// No row with the given id exists
    #[error("translation not found: {id}")]
    NotFound { id: String },

    /// A translation for this content item and language already exists
    #[error("translation for content '{content_id}' in language '{language_code}' already exists")]
    UniqueViolation {
        content_id: String,
        language_code: String,
    },

    /// Underlying database failure
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Any other backend failure, message preserved verbatim
    #[error("store error: {0}")]
    Backend(String),
}

/// Result type for store operations
pub type StoreResult<T> = Result<T, StoreError>;

/// Errors reported by the translation lifecycle and bulk managers.
#[derive(Error, Debug)]
pub enum TranslationError {
    /// Input failed validation before reaching the store
    #[error("validation failed: {}", join_errors(.errors))]
    Validation { errors: Vec<FieldError> },

    /// Language code is not in the configured supported set
    #[error("unsupported language code: '{0}'")]
    UnsupportedLanguage(String),

    /// Creating would violate the one-translation-per-language invariant
    #[error("translation for content '{content_id}' in language '{language_code}' already exists")]
    Duplicate {
        content_id: String,
        language_code: String,
    },

    /// Failure inside the translation store
    #[error(transparent)]
    Store(StoreError),
}

impl TranslationError {
    /// Whether the error was raised before any store call was made.
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            TranslationError::Validation { .. } | TranslationError::UnsupportedLanguage(_)
        )
    }

    /// Field-level errors, empty for non-validation failures.
    pub fn field_errors(&self) -> &[FieldError] {
        match self {
            TranslationError::Validation { errors } => errors,
            _ => &[],
        }
    }
}

impl From<StoreError> for TranslationError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::UniqueViolation {
                content_id,
                language_code,
            } => TranslationError::Duplicate {
                content_id,
                language_code,
            },
            other => TranslationError::Store(other),
        }
    }
}

/// Parsing a content type tag that is not part of the registry.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("unknown content type: '{0}'")]
pub struct UnknownContentType(pub String);

fn join_errors(errors: &[FieldError]) -> String {
    errors
        .iter()
        .map(|e| e.to_string())
        .collect::<Vec<_>>()
        .join("; ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_error_lists_every_field() {
        let err = TranslationError::Validation {
            errors: vec![
                FieldError::new("title", "is required"),
                FieldError::new("content_id", "must not be empty"),
            ],
        };

        let message = err.to_string();
        assert!(message.contains("title: is required"));
        assert!(message.contains("content_id: must not be empty"));
        assert!(err.is_validation());
        assert_eq!(err.field_errors().len(), 2);
    }

    #[test]
    fn test_unique_violation_becomes_duplicate() {
        let err: TranslationError = StoreError::UniqueViolation {
            content_id: "x".to_string(),
            language_code: "en".to_string(),
        }
        .into();

        assert!(matches!(err, TranslationError::Duplicate { .. }));
        assert!(!err.is_validation());
    }

    #[test]
    fn test_store_error_message_preserved() {
        let err: TranslationError = StoreError::Backend("permission denied for table".into()).into();
        assert!(err.to_string().contains("permission denied for table"));
        assert!(err.field_errors().is_empty());
    }
}
