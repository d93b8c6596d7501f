//! Fallback resolution of translated field values.
//!
//! Resolution order, first match wins:
//!
//! 1. the requested language's translation, if the field is non-empty
//! 2. the fallback language's translation, if different from the requested one
//! 3. the item's own untranslated attribute with the same name
//! 4. the empty "nothing found" sentinel
//!
//! Resolution is pure and never fails: absence is always expressed in the
//! returned [`TranslatedFieldResult`].

use crate::i18n::{Language, LanguageRegistry};
use crate::model::{ContentItem, Translation};
use serde::Serialize;
use std::collections::BTreeMap;

/// A resolved field value and where it came from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TranslatedFieldResult {
    /// Resolved text; empty means untranslated, never a valid empty translation
    pub value: String,
    /// Language the value was taken from
    pub language: String,
    /// The value is not in the requested language
    pub is_fallback: bool,
    /// The value comes from the default language content
    pub is_original: bool,
}

impl TranslatedFieldResult {
    fn not_found(fallback_language: &str) -> Self {
        Self {
            value: String::new(),
            language: fallback_language.to_string(),
            is_fallback: true,
            is_original: false,
        }
    }

    /// Whether any source produced a value.
    pub fn is_found(&self) -> bool {
        !self.value.is_empty()
    }
}

/// The translation for a language; with duplicates, the most recently updated one.
pub fn find_translation<'a>(
    translations: &'a [Translation],
    language_code: &str,
) -> Option<&'a Translation> {
    translations
        .iter()
        .filter(|t| t.language_code() == language_code)
        .max_by_key(|t| t.updated_at())
}

pub fn has_translation(translations: &[Translation], language_code: &str) -> bool {
    translations
        .iter()
        .any(|t| t.language_code() == language_code)
}

/// Distinct language codes present, sorted.
pub fn available_languages(translations: &[Translation]) -> Vec<&str> {
    let mut codes: Vec<&str> = translations.iter().map(|t| t.language_code()).collect();
    codes.sort_unstable();
    codes.dedup();
    codes
}

fn translated_value<'a>(
    translations: &'a [Translation],
    field: &str,
    language_code: &str,
) -> Option<&'a str> {
    find_translation(translations, language_code).and_then(|t| t.non_empty_field(field))
}

/// Resolve one field of an item for the requested language.
pub fn resolve_field(
    item: &ContentItem,
    field: &str,
    requested_language: &str,
    fallback_language: &str,
) -> TranslatedFieldResult {
    if let Some(value) = translated_value(&item.translations, field, requested_language) {
        return TranslatedFieldResult {
            value: value.to_string(),
            language: requested_language.to_string(),
            is_fallback: false,
            is_original: false,
        };
    }

    if requested_language != fallback_language {
        if let Some(value) = translated_value(&item.translations, field, fallback_language) {
            return TranslatedFieldResult {
                value: value.to_string(),
                language: fallback_language.to_string(),
                is_fallback: true,
                is_original: true,
            };
        }
    }

    if let Some(value) = item.attribute(field).filter(|v| !v.trim().is_empty()) {
        return TranslatedFieldResult {
            value: value.to_string(),
            language: fallback_language.to_string(),
            is_fallback: requested_language != fallback_language,
            is_original: true,
        };
    }

    TranslatedFieldResult::not_found(fallback_language)
}

/// Resolves fields against a fixed fallback language.
#[derive(Debug, Clone)]
pub struct FieldResolver {
    fallback: Language,
}

impl FieldResolver {
    pub fn new(fallback: Language) -> Self {
        Self { fallback }
    }

    /// Falls back to the registry's default language.
    pub fn from_registry(registry: &LanguageRegistry) -> Self {
        Self::new(registry.default_language())
    }

    pub fn fallback(&self) -> &Language {
        &self.fallback
    }

    pub fn resolve_field(
        &self,
        item: &ContentItem,
        field: &str,
        language_code: &str,
    ) -> TranslatedFieldResult {
        resolve_field(item, field, language_code, self.fallback.code())
    }

    /// Every translatable field of the item's content type.
    pub fn resolve_item(
        &self,
        item: &ContentItem,
        language_code: &str,
    ) -> BTreeMap<&'static str, TranslatedFieldResult> {
        item.content_type
            .schema()
            .translatable_fields()
            .into_iter()
            .map(|field| (field, self.resolve_field(item, field, language_code)))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::ContentType;
    use chrono::{Duration, Utc};
    use proptest::prelude::*;

    fn post(language: &str, title: &str) -> Translation {
        let mut t = Translation::blank(ContentType::Posts, format!("t-{}", language), "p1", language, Utc::now());
        t.set_field("title", Some(title.to_string()));
        t
    }

    fn item(translations: Vec<Translation>) -> ContentItem {
        let mut item = ContentItem::new(ContentType::Posts, "p1");
        item.translations = translations;
        item
    }

    // ==================== Resolution Order Tests ====================

    #[test]
    fn test_requested_language_wins() {
        let item = item(vec![post("en", "Hello"), post("pt", "Olá")]);
        let result = resolve_field(&item, "title", "pt", "en");

        assert_eq!(
            result,
            TranslatedFieldResult {
                value: "Olá".to_string(),
                language: "pt".to_string(),
                is_fallback: false,
                is_original: false,
            }
        );
    }

    #[test]
    fn test_falls_back_to_default_language() {
        let item = item(vec![post("en", "Hello")]);
        let result = resolve_field(&item, "title", "pt", "en");

        assert_eq!(result.value, "Hello");
        assert_eq!(result.language, "en");
        assert!(result.is_fallback);
        assert!(result.is_original);
    }

    #[test]
    fn test_empty_requested_value_falls_back() {
        let item = item(vec![post("en", "Hello"), post("pt", "")]);
        let result = resolve_field(&item, "title", "pt", "en");
        assert_eq!(result.value, "Hello");
        assert!(result.is_fallback);
    }

    #[test]
    fn test_legacy_attribute_used_when_no_translation() {
        let item = item(vec![]).with_attribute("title", "Legacy title");

        let result = resolve_field(&item, "title", "pt", "en");
        assert_eq!(result.value, "Legacy title");
        assert_eq!(result.language, "en");
        assert!(result.is_original);
        assert!(result.is_fallback);

        let same_language = resolve_field(&item, "title", "en", "en");
        assert!(same_language.is_original);
        assert!(!same_language.is_fallback);
    }

    #[test]
    fn test_nothing_found_sentinel() {
        let item = item(vec![post("en", "")]);
        let result = resolve_field(&item, "title", "pt", "en");

        assert_eq!(result, TranslatedFieldResult::not_found("en"));
        assert!(!result.is_found());
    }

    #[test]
    fn test_unknown_field_resolves_to_sentinel() {
        let item = item(vec![post("en", "Hello")]);
        let result = resolve_field(&item, "name", "en", "en");
        assert!(!result.is_found());
        assert_eq!(result.language, "en");
    }

    #[test]
    fn test_same_requested_and_fallback_skips_second_lookup() {
        let item = item(vec![post("pt", "Olá")]);
        let result = resolve_field(&item, "title", "en", "en");
        assert!(!result.is_found());
    }

    // ==================== Helper Tests ====================

    #[test]
    fn test_find_translation_prefers_latest_duplicate() {
        let mut older = post("en", "Old");
        older.set_updated_at(Utc::now() - Duration::hours(1));
        let newer = post("en", "New");

        let translations = vec![newer.clone(), older];
        assert_eq!(find_translation(&translations, "en"), Some(&newer));
        assert_eq!(find_translation(&translations, "pt"), None);
    }

    #[test]
    fn test_resolution_uses_latest_duplicate() {
        let mut older = post("en", "Old");
        older.set_updated_at(Utc::now() - Duration::hours(1));
        let newer = post("en", "New");
        let content = item(vec![older.clone(), newer]);

        assert_eq!(resolve_field(&content, "title", "en", "en").value, "New");

        // a blank latest duplicate does not fall back to stale text
        let blank = post("en", "");
        let content = item(vec![older, blank]);
        let result = resolve_field(&content, "title", "en", "en");
        assert!(!result.is_found());
        assert!(!crate::completeness::is_complete(
            find_translation(&content.translations, "en").expect("translation")
        ));
    }

    #[test]
    fn test_available_languages_sorted_and_distinct() {
        let translations = vec![post("pt", "a"), post("en", "b"), post("pt", "c")];
        assert_eq!(available_languages(&translations), vec!["en", "pt"]);
        assert!(has_translation(&translations, "pt"));
        assert!(!has_translation(&translations, "es"));
    }

    #[test]
    fn test_field_resolver_uses_registry_default() {
        let resolver = FieldResolver::from_registry(&LanguageRegistry::default());
        let item = item(vec![post("en", "Hello")]);

        assert_eq!(resolver.fallback(), &Language::ENGLISH);
        assert_eq!(resolver.resolve_field(&item, "title", "pt").value, "Hello");
    }

    #[test]
    fn test_resolve_item_covers_every_field() {
        let resolver = FieldResolver::new(Language::ENGLISH);
        let mut pt = post("pt", "Olá");
        pt.set_field("excerpt", Some("Resumo".to_string()));
        let item = item(vec![post("en", "Hello"), pt]);

        let resolved = resolver.resolve_item(&item, "pt");
        assert_eq!(resolved.len(), 5);
        assert_eq!(resolved["title"].value, "Olá");
        assert_eq!(resolved["excerpt"].value, "Resumo");
        assert!(!resolved["content"].is_found());
    }

    #[test]
    fn test_result_serializes_camel_case() {
        let item = item(vec![post("en", "Hello")]);
        let json = serde_json::to_value(resolve_field(&item, "title", "pt", "en")).expect("serialize");
        assert_eq!(json["isFallback"], true);
        assert_eq!(json["isOriginal"], true);
    }

    // ==================== Property Tests ====================

    fn arb_translation() -> impl Strategy<Value = Translation> {
        (
            prop::sample::select(vec!["en", "pt", "es"]),
            prop::option::of("[a-z ]{0,4}"),
        )
            .prop_map(|(language, title)| {
                let mut t = Translation::blank(ContentType::Posts, "t", "p1", language, Utc::now());
                t.set_field("title", title);
                t
            })
    }

    proptest! {
        #[test]
        fn prop_resolution_is_total_and_traceable(
            translations in prop::collection::vec(arb_translation(), 0..6),
            legacy in prop::option::of("[a-z ]{0,4}"),
            requested in prop::sample::select(vec!["en", "pt", "es", "fr"]),
            fallback in prop::sample::select(vec!["en", "pt"]),
        ) {
            let mut content = item(translations);
            if let Some(legacy) = &legacy {
                content = content.with_attribute("title", legacy.clone());
            }

            let result = resolve_field(&content, "title", requested, fallback);
            prop_assert_eq!(&result, &resolve_field(&content, "title", requested, fallback));

            let from = |code: &str| translated_value(&content.translations, "title", code);

            if !result.is_found() {
                prop_assert_eq!(result, TranslatedFieldResult::not_found(fallback));
            } else if !result.is_fallback && !result.is_original {
                prop_assert_eq!(result.language.as_str(), requested);
                prop_assert_eq!(Some(result.value.as_str()), from(requested));
            } else if from(requested).is_none() && requested != fallback && from(fallback).is_some() {
                prop_assert_eq!(result.language.as_str(), fallback);
                prop_assert_eq!(Some(result.value.as_str()), from(fallback));
            } else {
                prop_assert!(result.is_original);
                prop_assert_eq!(Some(result.value.as_str()), legacy.as_deref());
            }
        }
    }
}
