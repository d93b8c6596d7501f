//! Language type: a language code validated against the registry.

use serde::Serialize;
use std::borrow::Cow;
use std::fmt;

/// A validated language.
///
/// Obtained from [`LanguageRegistry::language`](crate::i18n::LanguageRegistry::language)
/// or one of the built-in constants. It serializes as the bare code but is
/// never deserialized, so every `Language` has passed registry validation.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct Language {
    code: Cow<'static, str>,
}

impl Language {
    pub const ENGLISH: Language = Language {
        code: Cow::Borrowed("en"),
    };

    pub const PORTUGUESE: Language = Language {
        code: Cow::Borrowed("pt"),
    };

    pub(crate) fn new(code: String) -> Self {
        Self {
            code: Cow::Owned(code),
        }
    }

    /// The language code (e.g., "en", "pt").
    pub fn code(&self) -> &str {
        &self.code
    }
}

impl AsRef<str> for Language {
    fn as_ref(&self) -> &str {
        self.code()
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}
