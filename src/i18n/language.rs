//! Language types: validated codes and per-language metadata.
//!
//! A `LanguageCode` can only be obtained from a `LanguageRegistry`, so any
//! code the store holds is already known to be supported.

use serde::Serialize;
use std::fmt;

/// A language code that has been validated against a registry.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct LanguageCode(String);

impl LanguageCode {
    /// Only the registry mints codes.
    pub(crate) fn new(code: &str) -> Self {
        LanguageCode(code.to_string())
    }

    /// Get the code as a string slice (e.g., "tr", "en").
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for LanguageCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl PartialEq<str> for LanguageCode {
    fn eq(&self, other: &str) -> bool {
        self.0 == other
    }
}

impl PartialEq<&str> for LanguageCode {
    fn eq(&self, other: &&str) -> bool {
        self.0 == *other
    }
}

/// Configuration for a supported language.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LanguageConfig {
    /// ISO 639-1 language code (e.g., "tr", "en", "de")
    pub code: String,

    /// English name of the language (e.g., "Turkish", "German")
    pub name: String,

    /// Native name of the language (e.g., "Türkçe", "Deutsch")
    pub native_name: String,

    /// Full locale used for the document language (e.g., "tr-TR")
    pub locale: String,

    /// Flag shown next to the language switcher entry
    pub flag: String,

    /// Whether this language can be selected
    pub enabled: bool,
}

impl LanguageConfig {
    pub fn new(code: &str, name: &str, native_name: &str, locale: &str, flag: &str) -> Self {
        Self {
            code: code.to_ascii_lowercase(),
            name: name.to_string(),
            native_name: native_name.to_string(),
            locale: locale.to_string(),
            flag: flag.to_string(),
            enabled: true,
        }
    }

    /// Minimal entry for a code with no known metadata; names fall back to the code.
    pub fn bare(code: &str) -> Self {
        let code = code.trim().to_ascii_lowercase();
        Self::new(&code, &code, &code, &code, "")
    }

    /// Mark the language as disabled.
    pub fn disabled(mut self) -> Self {
        self.enabled = false;
        self
    }
}
