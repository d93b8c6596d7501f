//! Per-language translation status for display.

use crate::completeness::is_complete;
use crate::model::Translation;
use crate::resolver::find_translation;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Status of one required language for a content item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TranslationStatus {
    pub language_code: String,
    pub has_translation: bool,
    pub is_complete: bool,
    pub last_updated: Option<DateTime<Utc>>,
}

/// One entry per required language, in the order given.
pub fn get_translation_status<S: AsRef<str>>(
    translations: &[Translation],
    required_languages: &[S],
) -> Vec<TranslationStatus> {
    required_languages
        .iter()
        .map(|code| {
            let code = code.as_ref();
            let translation = find_translation(translations, code);
            TranslationStatus {
                language_code: code.to_string(),
                has_translation: translation.is_some(),
                is_complete: translation.is_some_and(is_complete),
                last_updated: translation.map(Translation::updated_at),
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::ContentType;

    fn post(language: &str, title: &str) -> Translation {
        let mut t = Translation::blank(ContentType::Posts, "t", "p1", language, Utc::now());
        t.set_field("title", Some(title.to_string()));
        t
    }

    #[test]
    fn test_status_per_required_language() {
        let en = post("en", "Hello");
        let translations = vec![en.clone(), post("pt", "")];

        let statuses = get_translation_status(&translations, &["en", "pt", "es"]);
        assert_eq!(statuses.len(), 3);

        assert_eq!(
            statuses[0],
            TranslationStatus {
                language_code: "en".to_string(),
                has_translation: true,
                is_complete: true,
                last_updated: Some(en.updated_at()),
            }
        );
        assert!(statuses[1].has_translation);
        assert!(!statuses[1].is_complete);
        assert!(!statuses[2].has_translation);
        assert!(!statuses[2].is_complete);
        assert_eq!(statuses[2].last_updated, None);
    }

    #[test]
    fn test_status_keeps_required_order() {
        let statuses = get_translation_status(&[], &["pt", "en"]);
        let codes: Vec<_> = statuses.iter().map(|s| s.language_code.as_str()).collect();
        assert_eq!(codes, vec!["pt", "en"]);
    }

    #[test]
    fn test_status_agrees_with_completeness() {
        let translations = vec![post("en", "Hello"), post("pt", "")];
        let required = ["en", "pt", "es"];

        let statuses = get_translation_status(&translations, &required);
        let completeness = crate::completeness::get_completeness(&translations, &required);

        let complete = statuses.iter().filter(|s| s.is_complete).count();
        let missing: Vec<_> = statuses
            .iter()
            .filter(|s| !s.has_translation)
            .map(|s| s.language_code.clone())
            .collect();
        assert_eq!(complete, completeness.completed);
        assert_eq!(missing, completeness.missing);
    }
}
