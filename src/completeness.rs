//! Completeness of translations against a set of required languages.
//!
//! A translation is complete when every required field of its content type
//! holds non-whitespace text. Per item, a language counts as completed only
//! with a complete translation, while it is reported missing only when it
//! has no translation at all; an incomplete translation is neither.
//!
//! The batch variant is coarser: an item counts once it has any translation.

use crate::model::{ContentItem, Translation};
use crate::resolver::{find_translation, has_translation};
use crate::schema::required_fields;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Per-item completeness summary.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TranslationCompleteness {
    /// Number of required languages
    pub total: usize,
    /// Required languages with a complete translation
    pub completed: usize,
    /// Required languages with no translation at all
    pub missing: Vec<String>,
    /// `completed / total * 100`, rounded
    pub percentage: u32,
}

/// Coverage across many items.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchTranslationStats {
    pub total_content: usize,
    /// Items with at least one translation
    pub with_translations: usize,
    /// Items with a translation in each language
    pub translations_by_language: BTreeMap<String, usize>,
    /// `with_translations / total_content * 100`, rounded
    pub completeness: u32,
}

pub fn is_complete(translation: &Translation) -> bool {
    required_fields(translation.content_type())
        .iter()
        .all(|field| translation.non_empty_field(field).is_some())
}

fn rounded_percentage(part: usize, total: usize) -> u32 {
    if total == 0 {
        return 0;
    }
    (part as f64 / total as f64 * 100.0).round() as u32
}

/// Distinct codes, first occurrence wins.
fn distinct<S: AsRef<str>>(languages: &[S]) -> Vec<&str> {
    let mut seen: Vec<&str> = Vec::with_capacity(languages.len());
    for code in languages {
        let code = code.as_ref();
        if !seen.contains(&code) {
            seen.push(code);
        }
    }
    seen
}

pub fn get_completeness<S: AsRef<str>>(
    translations: &[Translation],
    required_languages: &[S],
) -> TranslationCompleteness {
    let required = distinct(required_languages);

    let completed = required
        .iter()
        .filter(|code| find_translation(translations, code).is_some_and(is_complete))
        .count();

    let missing: Vec<String> = required
        .iter()
        .filter(|code| !has_translation(translations, code))
        .map(|code| code.to_string())
        .collect();

    TranslationCompleteness {
        total: required.len(),
        completed,
        missing,
        percentage: rounded_percentage(completed, required.len()),
    }
}

/// Batch statistics over many items.
///
/// Every code in `languages` appears in `translations_by_language`, with zero
/// when no item has it; other languages found on the items are added as well.
pub fn get_batch_stats<S: AsRef<str>>(items: &[ContentItem], languages: &[S]) -> BatchTranslationStats {
    let mut by_language: BTreeMap<String, usize> = distinct(languages)
        .into_iter()
        .map(|code| (code.to_string(), 0))
        .collect();

    let mut with_translations = 0;
    for item in items {
        if item.translations.is_empty() {
            continue;
        }
        with_translations += 1;

        let mut codes: Vec<&str> = item.translations.iter().map(|t| t.language_code()).collect();
        codes.sort_unstable();
        codes.dedup();
        for code in codes {
            *by_language.entry(code.to_string()).or_insert(0) += 1;
        }
    }

    BatchTranslationStats {
        total_content: items.len(),
        with_translations,
        translations_by_language: by_language,
        completeness: rounded_percentage(with_translations, items.len()),
    }
}
