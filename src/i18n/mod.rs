//! Language configuration and input validation for content translations.
//!
//! # Architecture
//!
//! - `registry`: the configured set of supported languages and the default (fallback) language
//! - `language`: validated `Language` values
//! - `validator`: checks editor input before it reaches the translation store
//! - `metrics`: cache and store counters
//!
//! # Example
//!
//! ```rust,ignore
//! use content_translations::i18n::LanguageRegistry;
//!
//! let registry = LanguageRegistry::from_codes(&["en", "pt"], "en")?;
//! let portuguese = registry.language("pt")?;
//! let fallback = registry.default_language();
//! ```

mod language;
mod metrics;
mod registry;
mod validator;

pub use language::Language;
pub use metrics::{MetricsReport, TranslationMetrics};
pub use registry::{is_valid_language_code, LanguageConfig, LanguageRegistry};
pub use validator::{TranslationValidator, ValidationReport};
