//! Language type: a code that has already been validated against the registry.

use crate::error::TranslateError;
use crate::languages::{LanguageConfig, LanguageRegistry};

/// A validated language.
///
/// Only constructible from identifiers the registry knows, so holding a
/// `Language` means the code can go on the wire as-is.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Language {
    /// Canonical code (e.g., "en", "zh-CN", "auto")
    code: &'static str,
}

impl Language {
    /// Source-language detection.
    pub const AUTO: Language = Language { code: "auto" };

    /// Default target language.
    pub const ENGLISH: Language = Language { code: "en" };

    /// Create a Language from a code or display name.
    ///
    /// # Returns
    /// * `Ok(Language)` holding the canonical code
    /// * `Err(TranslateError::UnsupportedLanguage)` naming `identifier` as given
    ///
    /// # Example
    /// ```ignore
    /// let spanish = Language::from_identifier("Spanish")?;
    /// assert_eq!(spanish.code(), "es");
    /// ```
    pub fn from_identifier(identifier: &str) -> Result<Language, TranslateError> {
        LanguageRegistry::get()
            .find(identifier)
            .map(|config| Language { code: config.code })
            .ok_or_else(|| TranslateError::UnsupportedLanguage(identifier.to_string()))
    }

    /// Canonical code as sent in `sl`/`tl`/`hl`.
    pub fn code(&self) -> &'static str {
        self.code
    }

    /// Registry entry for this language.
    ///
    /// Falls back to the code itself as the name if the constant was not in
    /// the table, which cannot happen for the built-in constants.
    fn config(&self) -> LanguageConfig {
        LanguageRegistry::get()
            .get_by_code(self.code)
            .cloned()
            .unwrap_or(LanguageConfig {
                code: self.code,
                name: self.code,
            })
    }

    /// English display name.
    pub fn name(&self) -> &'static str {
        self.config().name
    }

    pub fn is_auto(&self) -> bool {
        self.code == Language::AUTO.code
    }
}

impl Default for Language {
    fn default() -> Self {
        Language::AUTO
    }
}

impl std::fmt::Display for Language {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.code)
    }
}
