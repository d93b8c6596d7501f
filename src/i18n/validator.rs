//! Validation of editor input before it reaches the translation store.
//!
//! Creation requires a content id, a supported language and every required
//! field of the content type. Partial updates only reject unknown fields; a
//! required field emptied by an update is reported as a warning since
//! completeness is recomputed on read.

use crate::error::{FieldError, TranslationError};
use crate::i18n::LanguageRegistry;
use crate::model::{FieldPatch, FieldValues};
use crate::schema::ContentType;

/// Validation report containing errors and warnings about translation input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationReport {
    /// Problems that prevent the write
    pub errors: Vec<FieldError>,

    /// Non-blocking issues, surfaced to the caller alongside the result
    pub warnings: Vec<String>,
}

impl ValidationReport {
    /// Create a new empty validation report
    pub fn new() -> Self {
        Self {
            errors: Vec::new(),
            warnings: Vec::new(),
        }
    }

    /// Check if the report has any errors
    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }

    /// Check if the report has any warnings
    pub fn has_warnings(&self) -> bool {
        !self.warnings.is_empty()
    }

    /// Check if the report is clean (no errors or warnings)
    pub fn is_clean(&self) -> bool {
        !self.has_errors() && !self.has_warnings()
    }

    /// Warnings on success, a validation error otherwise.
    pub fn into_result(self) -> Result<Vec<String>, TranslationError> {
        if self.errors.is_empty() {
            Ok(self.warnings)
        } else {
            Err(TranslationError::Validation {
                errors: self.errors,
            })
        }
    }

    fn error(&mut self, field: &str, message: impl Into<String>) {
        self.errors.push(FieldError::new(field, message));
    }
}

impl Default for ValidationReport {
    fn default() -> Self {
        Self::new()
    }
}

/// Validator for translation input.
pub struct TranslationValidator;

impl TranslationValidator {
    /// Validate the input of a create operation.
    pub fn validate_create(
        languages: &LanguageRegistry,
        content_type: ContentType,
        content_id: &str,
        language_code: &str,
        fields: &FieldValues,
    ) -> ValidationReport {
        let schema = content_type.schema();
        let mut report = ValidationReport::new();

        if content_id.trim().is_empty() {
            report.error(schema.content_id_field, "must not be empty");
        }

        if !languages.is_enabled(language_code) {
            report.error(
                "language_code",
                format!("unsupported language code '{}'", language_code),
            );
        }

        for field in schema.required_fields {
            let present = fields
                .get(*field)
                .map(|value| !value.trim().is_empty())
                .unwrap_or(false);
            if !present {
                report.error(field, "is required");
            }
        }

        Self::check_unknown_fields(&mut report, content_type, fields.keys());
        report
    }

    /// Validate a partial update.
    pub fn validate_patch(content_type: ContentType, patch: &FieldPatch) -> ValidationReport {
        let schema = content_type.schema();
        let mut report = ValidationReport::new();

        if patch.is_empty() {
            report.error("fields", "no fields supplied");
            return report;
        }

        Self::check_unknown_fields(&mut report, content_type, patch.keys());

        for (field, value) in patch {
            let emptied = value
                .as_deref()
                .map(|v| v.trim().is_empty())
                .unwrap_or(true);
            if schema.is_required(field) && emptied {
                report.warnings.push(format!(
                    "Required field '{}' is empty; translation is no longer complete",
                    field
                ));
            }
        }

        report
    }

    fn check_unknown_fields<'a>(
        report: &mut ValidationReport,
        content_type: ContentType,
        names: impl Iterator<Item = &'a String>,
    ) {
        let schema = content_type.schema();
        for name in names {
            if !schema.is_translatable(name) {
                report.error(
                    name,
                    format!("is not a translatable field of {}", content_type),
                );
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn values(pairs: &[(&str, &str)]) -> FieldValues {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    // ==================== Create Tests ====================

    #[test]
    fn test_validate_create_clean() {
        let report = TranslationValidator::validate_create(
            &LanguageRegistry::default(),
            ContentType::Posts,
            "post-1",
            "pt",
            &values(&[("title", "Olá"), ("excerpt", "Resumo")]),
        );
        assert!(report.is_clean());
        assert_eq!(report.into_result().unwrap(), Vec::<String>::new());
    }

    #[test]
    fn test_validate_create_missing_required_field() {
        let report = TranslationValidator::validate_create(
            &LanguageRegistry::default(),
            ContentType::Products,
            "prod-1",
            "en",
            &values(&[("description", "A product")]),
        );
        assert_eq!(report.errors, vec![FieldError::new("name", "is required")]);
    }

    #[test]
    fn test_validate_create_blank_required_field() {
        let report = TranslationValidator::validate_create(
            &LanguageRegistry::default(),
            ContentType::Brokers,
            "b-1",
            "en",
            &values(&[("description", "   ")]),
        );
        assert!(report.has_errors());
        assert_eq!(report.errors[0].field, "description");
    }

    #[test]
    fn test_validate_create_unsupported_language() {
        let report = TranslationValidator::validate_create(
            &LanguageRegistry::default(),
            ContentType::Posts,
            "post-1",
            "fr",
            &values(&[("title", "Bonjour")]),
        );
        assert_eq!(report.errors.len(), 1);
        assert_eq!(report.errors[0].field, "language_code");
        assert!(report.errors[0].message.contains("'fr'"));
    }

    #[test]
    fn test_validate_create_empty_content_id() {
        let report = TranslationValidator::validate_create(
            &LanguageRegistry::default(),
            ContentType::Posts,
            "",
            "en",
            &values(&[("title", "Hello")]),
        );
        assert_eq!(report.errors[0].field, "post_id");
    }

    #[test]
    fn test_validate_create_unknown_field() {
        let report = TranslationValidator::validate_create(
            &LanguageRegistry::default(),
            ContentType::Posts,
            "post-1",
            "en",
            &values(&[("title", "Hello"), ("name", "wrong type")]),
        );
        assert_eq!(report.errors.len(), 1);
        assert_eq!(report.errors[0].field, "name");
    }

    #[test]
    fn test_validate_create_collects_every_error() {
        let report = TranslationValidator::validate_create(
            &LanguageRegistry::default(),
            ContentType::Posts,
            " ",
            "xx",
            &FieldValues::new(),
        );
        assert_eq!(report.errors.len(), 3);
        let err = report.into_result().unwrap_err();
        assert_eq!(err.field_errors().len(), 3);
    }

    // ==================== Patch Tests ====================

    #[test]
    fn test_validate_patch_clean() {
        let mut patch = FieldPatch::new();
        patch.insert("excerpt".to_string(), None);
        patch.insert("title".to_string(), Some("New".to_string()));

        assert!(TranslationValidator::validate_patch(ContentType::Posts, &patch).is_clean());
    }

    #[test]
    fn test_validate_patch_emptied_required_field_warns() {
        let mut patch = FieldPatch::new();
        patch.insert("title".to_string(), Some(String::new()));

        let report = TranslationValidator::validate_patch(ContentType::Posts, &patch);
        assert!(!report.has_errors());
        assert!(report.has_warnings());
        assert!(report.warnings[0].contains("title"));
    }

    #[test]
    fn test_validate_patch_unknown_field() {
        let mut patch = FieldPatch::new();
        patch.insert("title".to_string(), Some("x".to_string()));

        let report = TranslationValidator::validate_patch(ContentType::Products, &patch);
        assert_eq!(report.errors[0].field, "title");
    }

    #[test]
    fn test_validate_patch_empty() {
        let report = TranslationValidator::validate_patch(ContentType::Posts, &FieldPatch::new());
        assert!(report.has_errors());
    }
}
