//! Language registry and validated language codes.
//!
//! # Architecture
//!
//! - `registry`: Single source of truth for every language the service accepts
//! - `language`: Copyable `Language` value holding a canonical code
//!
//! # Example
//!
//! ```rust,ignore
//! use translate_gateway::languages::{self, Language};
//!
//! assert!(languages::is_supported("Spanish"));
//! let code = languages::resolve_code("spanish")?; // "es"
//! let german = Language::from_identifier("de")?;
//! ```

mod language;
mod registry;

use std::collections::BTreeMap;

use crate::error::TranslateError;

pub use language::Language;
pub use registry::{LanguageConfig, LanguageRegistry};

/// Check whether an identifier names a supported language.
///
/// Matches canonical codes and display names, ignoring case.
pub fn is_supported(identifier: &str) -> bool {
    LanguageRegistry::get().find(identifier).is_some()
}

/// Resolve a code or display name to its canonical code.
pub fn resolve_code(identifier: &str) -> Result<&'static str, TranslateError> {
    LanguageRegistry::get()
        .find(identifier)
        .map(|config| config.code)
        .ok_or_else(|| TranslateError::UnsupportedLanguage(identifier.to_string()))
}

/// Read-only dump of the registry as `{ code: display name }`, including `auto`.
pub fn list() -> BTreeMap<&'static str, &'static str> {
    LanguageRegistry::get()
        .list_all()
        .into_iter()
        .map(|config| (config.code, config.name))
        .collect()
}
