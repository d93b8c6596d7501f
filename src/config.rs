use crate::i18n::{is_valid_language_code, LanguageRegistry};
use anyhow::{bail, Context, Result};
use std::time::Duration;

#[derive(Debug, Clone)]
pub struct Config {
    // Database
    pub database_url: Option<String>,
    pub database_max_connections: u32,

    // Languages
    pub supported_languages: Vec<String>,
    pub default_language: String,
    pub required_languages: Vec<String>,

    // Cache
    pub cache_ttl: Duration,
    pub cache_sweep_schedule: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            database_url: None,
            database_max_connections: 5,
            supported_languages: vec!["en".to_string(), "pt".to_string()],
            default_language: "en".to_string(),
            required_languages: vec!["en".to_string(), "pt".to_string()],
            cache_ttl: Duration::from_secs(300),
            cache_sweep_schedule: "0 * * * * *".to_string(),
        }
    }
}

fn split_codes(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}

impl Config {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Build from any variable source; unset variables take their defaults.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        let supported_languages = lookup("SUPPORTED_LANGUAGES")
            .map(|v| split_codes(&v))
            .unwrap_or(defaults.supported_languages);

        let config = Self {
            // Database
            database_url: lookup("DATABASE_URL").filter(|v| !v.trim().is_empty()),
            database_max_connections: lookup("DATABASE_MAX_CONNECTIONS")
                .map(|v| v.parse())
                .transpose()
                .context("DATABASE_MAX_CONNECTIONS must be a positive integer")?
                .unwrap_or(defaults.database_max_connections),

            // Languages
            default_language: lookup("DEFAULT_LANGUAGE")
                .map(|v| v.trim().to_string())
                .unwrap_or(defaults.default_language),
            required_languages: lookup("REQUIRED_LANGUAGES")
                .map(|v| split_codes(&v))
                .unwrap_or_else(|| supported_languages.clone()),
            supported_languages,

            // Cache
            cache_ttl: lookup("CACHE_TTL_SECS")
                .map(|v| v.parse())
                .transpose()
                .context("CACHE_TTL_SECS must be a number of seconds")?
                .map(Duration::from_secs)
                .unwrap_or(defaults.cache_ttl),
            cache_sweep_schedule: lookup("CACHE_SWEEP_SCHEDULE")
                .unwrap_or(defaults.cache_sweep_schedule),
        };

        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.supported_languages.is_empty() {
            bail!("SUPPORTED_LANGUAGES must list at least one language");
        }
        for code in self.supported_languages.iter().chain(&self.required_languages) {
            if !is_valid_language_code(code) {
                bail!("Invalid language code: '{}'", code);
            }
        }
        if !self.supported_languages.contains(&self.default_language) {
            bail!(
                "DEFAULT_LANGUAGE '{}' is not in SUPPORTED_LANGUAGES",
                self.default_language
            );
        }
        if let Some(code) = self
            .required_languages
            .iter()
            .find(|code| !self.supported_languages.contains(code))
        {
            bail!("REQUIRED_LANGUAGES contains unsupported language '{}'", code);
        }
        if self.database_max_connections == 0 {
            bail!("DATABASE_MAX_CONNECTIONS must be at least 1");
        }
        Ok(())
    }

    pub fn language_registry(&self) -> Result<LanguageRegistry> {
        LanguageRegistry::from_codes(&self.supported_languages, &self.default_language)
    }

    /// The connection string, required wherever a database is used.
    pub fn database_url(&self) -> Result<&str> {
        self.database_url
            .as_deref()
            .context("DATABASE_URL not set")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;
    use std::collections::HashMap;

    const VARS: [&str; 7] = [
        "DATABASE_URL",
        "DATABASE_MAX_CONNECTIONS",
        "SUPPORTED_LANGUAGES",
        "DEFAULT_LANGUAGE",
        "REQUIRED_LANGUAGES",
        "CACHE_TTL_SECS",
        "CACHE_SWEEP_SCHEDULE",
    ];

    fn from_map(pairs: &[(&str, &str)]) -> Result<Config> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_lookup(|name| vars.get(name).cloned())
    }

    fn clear_env() {
        for var in VARS {
            std::env::remove_var(var);
        }
    }

    #[test]
    fn test_defaults() {
        let config = from_map(&[]).expect("defaults are valid");
        assert_eq!(config.database_url, None);
        assert_eq!(config.supported_languages, vec!["en", "pt"]);
        assert_eq!(config.default_language, "en");
        assert_eq!(config.required_languages, vec!["en", "pt"]);
        assert_eq!(config.cache_ttl, Duration::from_secs(300));
        assert_eq!(config.cache_sweep_schedule, "0 * * * * *");
        assert_eq!(config.database_max_connections, 5);
    }

    #[test]
    fn test_required_languages_default_to_supported() {
        let config = from_map(&[("SUPPORTED_LANGUAGES", "en, pt ,es")]).expect("valid");
        assert_eq!(config.supported_languages, vec!["en", "pt", "es"]);
        assert_eq!(config.required_languages, vec!["en", "pt", "es"]);
    }

    #[test]
    fn test_explicit_values() {
        let config = from_map(&[
            ("DATABASE_URL", "postgres://localhost/cms"),
            ("SUPPORTED_LANGUAGES", "en,pt,pt-BR"),
            ("DEFAULT_LANGUAGE", "pt"),
            ("REQUIRED_LANGUAGES", "pt"),
            ("CACHE_TTL_SECS", "60"),
            ("DATABASE_MAX_CONNECTIONS", "10"),
        ])
        .expect("valid");

        assert_eq!(config.database_url().expect("set"), "postgres://localhost/cms");
        assert_eq!(config.default_language, "pt");
        assert_eq!(config.required_languages, vec!["pt"]);
        assert_eq!(config.cache_ttl, Duration::from_secs(60));
        assert_eq!(config.database_max_connections, 10);

        let registry = config.language_registry().expect("registry");
        assert_eq!(registry.default_language().code(), "pt");
        assert!(registry.is_enabled("pt-BR"));
    }

    #[test]
    fn test_invalid_configurations() {
        assert!(from_map(&[("SUPPORTED_LANGUAGES", "")]).is_err());
        assert!(from_map(&[("SUPPORTED_LANGUAGES", "en,PT")]).is_err());
        assert!(from_map(&[("DEFAULT_LANGUAGE", "es")]).is_err());
        assert!(from_map(&[("REQUIRED_LANGUAGES", "en,fr")]).is_err());
        assert!(from_map(&[("CACHE_TTL_SECS", "soon")]).is_err());
        assert!(from_map(&[("DATABASE_MAX_CONNECTIONS", "0")]).is_err());
    }

    #[test]
    fn test_missing_database_url_is_an_error_when_needed() {
        let config = from_map(&[("DATABASE_URL", "  ")]).expect("valid");
        let err = config.database_url().expect_err("not set");
        assert!(err.to_string().contains("DATABASE_URL"));
    }

    #[test]
    #[serial]
    fn test_from_env_reads_process_environment() {
        clear_env();
        std::env::set_var("SUPPORTED_LANGUAGES", "en,es");
        std::env::set_var("CACHE_TTL_SECS", "5");

        let config = Config::from_env().expect("valid");
        assert_eq!(config.supported_languages, vec!["en", "es"]);
        assert_eq!(config.cache_ttl, Duration::from_secs(5));

        clear_env();
    }

    #[test]
    #[serial]
    fn test_from_env_rejects_bad_default() {
        clear_env();
        std::env::set_var("DEFAULT_LANGUAGE", "english");

        let err = Config::from_env().expect_err("invalid");
        assert!(err.to_string().contains("english"));

        clear_env();
    }
}
