//! Language registry: the configured set of languages content can be translated into.
//!
//! The registry is built from configuration rather than hard-coded, and holds
//! exactly one default language used as the fallback when a requested
//! language has no value for a field.

use crate::error::TranslationError;
use crate::i18n::Language;
use anyhow::{bail, Result};
use regex::Regex;
use std::sync::OnceLock;

/// Configuration for a supported language.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LanguageConfig {
    /// Language code (e.g., "en", "pt", "pt-BR")
    pub code: String,

    /// English name of the language (e.g., "Portuguese")
    pub name: String,

    /// Native name of the language (e.g., "Português")
    pub native_name: String,

    /// Whether this is the default/fallback language (exactly one is true)
    pub is_default: bool,

    /// Whether content may be translated into this language
    pub enabled: bool,
}

/// Registry of supported content languages.
#[derive(Debug, Clone)]
pub struct LanguageRegistry {
    languages: Vec<LanguageConfig>,
    default_index: usize,
}

static LANGUAGE_CODE_REGEX: OnceLock<Regex> = OnceLock::new();

/// Check that a code looks like `en`, `por` or `pt-BR`.
pub fn is_valid_language_code(code: &str) -> bool {
    let regex = LANGUAGE_CODE_REGEX.get_or_init(|| {
        Regex::new(r"^[a-z]{2,3}(-[A-Z]{2})?$").expect("language code pattern is valid")
    });
    regex.is_match(code)
}

impl LanguageRegistry {
    /// Build a registry from an ordered list of codes and the default code.
    ///
    /// Fails when the list is empty, contains malformed or duplicate codes, or
    /// does not include the default.
    pub fn from_codes<S: AsRef<str>>(codes: &[S], default_code: &str) -> Result<Self> {
        if codes.is_empty() {
            bail!("At least one supported language is required");
        }

        let mut languages: Vec<LanguageConfig> = Vec::with_capacity(codes.len());
        for code in codes {
            let code = code.as_ref().trim();
            if !is_valid_language_code(code) {
                bail!("Invalid language code: '{}'", code);
            }
            if languages.iter().any(|lang| lang.code == code) {
                bail!("Duplicate language code: '{}'", code);
            }

            let (name, native_name) = known_names(code).unwrap_or((code, code));
            languages.push(LanguageConfig {
                code: code.to_string(),
                name: name.to_string(),
                native_name: native_name.to_string(),
                is_default: code == default_code,
                enabled: true,
            });
        }

        let Some(default_index) = languages.iter().position(|lang| lang.is_default) else {
            bail!(
                "Default language '{}' is not in the supported set",
                default_code
            );
        };

        Ok(Self {
            languages,
            default_index,
        })
    }

    /// Get a language configuration by its code.
    pub fn get_by_code(&self, code: &str) -> Option<&LanguageConfig> {
        self.languages.iter().find(|lang| lang.code == code)
    }

    /// Get all enabled languages, in configuration order.
    pub fn list_enabled(&self) -> Vec<&LanguageConfig> {
        self.languages.iter().filter(|lang| lang.enabled).collect()
    }

    /// Get all languages (including disabled ones).
    pub fn list_all(&self) -> Vec<&LanguageConfig> {
        self.languages.iter().collect()
    }

    /// Codes of all enabled languages, in configuration order.
    pub fn enabled_codes(&self) -> Vec<String> {
        self.list_enabled()
            .into_iter()
            .map(|lang| lang.code.clone())
            .collect()
    }

    /// The default (fallback) language configuration.
    pub fn default_config(&self) -> &LanguageConfig {
        &self.languages[self.default_index]
    }

    /// The default (fallback) language.
    pub fn default_language(&self) -> Language {
        Language::new(self.default_config().code.clone())
    }

    /// Check if a language code is supported and enabled.
    pub fn is_enabled(&self, code: &str) -> bool {
        self.get_by_code(code)
            .map(|lang| lang.enabled)
            .unwrap_or(false)
    }

    /// Validate a code against the registry.
    ///
    /// An unknown or disabled code is a validation error, never a silent no-op.
    pub fn language(&self, code: &str) -> Result<Language, TranslationError> {
        match self.get_by_code(code) {
            Some(config) if config.enabled => Ok(Language::new(config.code.clone())),
            _ => Err(TranslationError::UnsupportedLanguage(code.to_string())),
        }
    }

    /// Disable a language without removing it. The default cannot be disabled.
    pub fn disable(&mut self, code: &str) -> Result<()> {
        let Some(index) = self.languages.iter().position(|lang| lang.code == code) else {
            bail!("Unknown language code: '{}'", code);
        };
        if index == self.default_index {
            bail!("Cannot disable the default language '{}'", code);
        }
        self.languages[index].enabled = false;
        Ok(())
    }
}

impl Default for LanguageRegistry {
    /// English (default) and Portuguese.
    fn default() -> Self {
        let en = Language::ENGLISH;
        let pt = Language::PORTUGUESE;
        let languages = [en.code(), pt.code()]
            .into_iter()
            .enumerate()
            .map(|(index, code)| {
                let (name, native_name) = known_names(code).unwrap_or((code, code));
                LanguageConfig {
                    code: code.to_string(),
                    name: name.to_string(),
                    native_name: native_name.to_string(),
                    is_default: index == 0,
                    enabled: true,
                }
            })
            .collect();

        Self {
            languages,
            default_index: 0,
        }
    }
}

fn known_names(code: &str) -> Option<(&'static str, &'static str)> {
    let base = code.split('-').next().unwrap_or(code);
    let names = match base {
        "en" => ("English", "English"),
        "pt" => ("Portuguese", "Português"),
        "es" => ("Spanish", "Español"),
        "fr" => ("French", "Français"),
        "de" => ("German", "Deutsch"),
        "it" => ("Italian", "Italiano"),
        _ => return None,
    };
    Some(names)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_registry_has_english_and_portuguese() {
        let registry = LanguageRegistry::default();
        let enabled = registry.list_enabled();

        assert_eq!(enabled.len(), 2);
        assert_eq!(enabled[0].code, "en");
        assert_eq!(enabled[1].code, "pt");
        assert_eq!(registry.default_config().code, "en");
    }

    #[test]
    fn test_from_codes_sets_names() {
        let registry = LanguageRegistry::from_codes(&["pt", "en", "es"], "pt").unwrap();

        let pt = registry.get_by_code("pt").unwrap();
        assert_eq!(pt.name, "Portuguese");
        assert_eq!(pt.native_name, "Português");
        assert!(pt.is_default);
        assert!(!registry.get_by_code("en").unwrap().is_default);
        assert_eq!(registry.default_language().code(), "pt");
    }

    #[test]
    fn test_from_codes_unknown_code_uses_code_as_name() {
        let registry = LanguageRegistry::from_codes(&["en", "nl"], "en").unwrap();
        let nl = registry.get_by_code("nl").unwrap();
        assert_eq!(nl.name, "nl");
        assert_eq!(nl.native_name, "nl");
    }

    #[test]
    fn test_from_codes_regional_variant() {
        let registry = LanguageRegistry::from_codes(&["en", "pt-BR"], "en").unwrap();
        assert_eq!(registry.get_by_code("pt-BR").unwrap().name, "Portuguese");
    }

    #[test]
    fn test_from_codes_rejects_missing_default() {
        let result = LanguageRegistry::from_codes(&["en", "pt"], "fr");
        assert!(result.unwrap_err().to_string().contains("Default language"));
    }

    #[test]
    fn test_from_codes_rejects_empty_list() {
        let codes: [&str; 0] = [];
        assert!(LanguageRegistry::from_codes(&codes, "en").is_err());
    }

    #[test]
    fn test_from_codes_rejects_duplicates() {
        let result = LanguageRegistry::from_codes(&["en", "pt", "en"], "en");
        assert!(result.unwrap_err().to_string().contains("Duplicate"));
    }

    #[test]
    fn test_from_codes_rejects_malformed_code() {
        assert!(LanguageRegistry::from_codes(&["en", "Portuguese"], "en").is_err());
        assert!(LanguageRegistry::from_codes(&["en", ""], "en").is_err());
    }

    #[test]
    fn test_language_rejects_unsupported_code() {
        let registry = LanguageRegistry::default();
        let err = registry.language("fr").unwrap_err();
        assert!(matches!(err, TranslationError::UnsupportedLanguage(ref code) if code == "fr"));
        assert!(registry.language("pt").is_ok());
    }

    #[test]
    fn test_language_comes_only_from_enabled_codes() {
        let registry = LanguageRegistry::from_codes(&["en", "pt-BR"], "en").unwrap();

        let language = registry.language("pt-BR").unwrap();
        assert_eq!(serde_json::to_string(&language).unwrap(), "\"pt-BR\"");
        // Well-formed but not configured
        assert!(registry.language("pt").is_err());
        assert!(registry.language("de-DE").is_err());
    }

    #[test]
    fn test_disable_language() {
        let mut registry = LanguageRegistry::default();
        registry.disable("pt").unwrap();

        assert!(!registry.is_enabled("pt"));
        assert!(registry.language("pt").is_err());
        assert_eq!(registry.list_all().len(), 2);
        assert_eq!(registry.enabled_codes(), vec!["en".to_string()]);
    }

    #[test]
    fn test_cannot_disable_default() {
        let mut registry = LanguageRegistry::default();
        assert!(registry.disable("en").is_err());
        assert!(registry.is_enabled("en"));
    }

    #[test]
    fn test_is_valid_language_code() {
        assert!(is_valid_language_code("en"));
        assert!(is_valid_language_code("pt-BR"));
        assert!(is_valid_language_code("fil"));
        assert!(!is_valid_language_code("EN"));
        assert!(!is_valid_language_code("pt_BR"));
    }
}
