//! Language registry: the supported set and the default language.
//!
//! The registry is an owned value handed to the store at construction, so
//! tests and embedders can configure their own set of languages.

use crate::i18n::{LanguageCode, LanguageConfig, TranslationError};
use anyhow::{bail, Result};

/// The set of languages a store accepts, plus the one it degrades to.
#[derive(Debug, Clone)]
pub struct LanguageRegistry {
    languages: Vec<LanguageConfig>,
    default_code: String,
}

impl LanguageRegistry {
    /// Build a registry from explicit language configurations.
    ///
    /// # Errors
    /// Fails if the default language is missing or disabled, or if a code
    /// appears twice.
    pub fn new(languages: Vec<LanguageConfig>, default_code: &str) -> Result<Self> {
        let default_code = default_code.trim().to_ascii_lowercase();

        for (i, lang) in languages.iter().enumerate() {
            if lang.code.is_empty() {
                bail!("Language code must not be empty");
            }
            if languages[..i].iter().any(|other| other.code == lang.code) {
                bail!("Duplicate language code: '{}'", lang.code);
            }
        }

        match languages.iter().find(|lang| lang.code == default_code) {
            Some(lang) if lang.enabled => {}
            Some(_) => bail!("Default language '{}' is disabled", default_code),
            None => bail!("Default language '{}' is not in the supported set", default_code),
        }

        Ok(Self {
            languages,
            default_code,
        })
    }

    /// Build a registry from bare codes, filling in metadata for the
    /// languages the campaign site ships with.
    pub fn from_codes(codes: &[String], default_code: &str) -> Result<Self> {
        let known = known_languages();
        let languages = codes
            .iter()
            .map(|code| code.trim().to_ascii_lowercase())
            .filter(|code| !code.is_empty())
            .map(|code| {
                known
                    .iter()
                    .find(|lang| lang.code == code)
                    .cloned()
                    .unwrap_or_else(|| LanguageConfig::bare(&code))
            })
            .collect();

        Self::new(languages, default_code)
    }

    /// Turkish (default), English and German.
    pub fn campaign_defaults() -> Self {
        Self {
            languages: known_languages(),
            default_code: "tr".to_string(),
        }
    }

    /// Validate a code against the supported set.
    ///
    /// Codes are matched case-insensitively. Disabled and unknown codes are
    /// rejected with `UnsupportedLanguage`.
    pub fn validate(&self, code: &str) -> Result<LanguageCode, TranslationError> {
        let normalized = code.trim().to_ascii_lowercase();
        match self.get_by_code(&normalized) {
            Some(config) if config.enabled => Ok(LanguageCode::new(&config.code)),
            _ => Err(TranslationError::UnsupportedLanguage(code.to_string())),
        }
    }

    /// The language every failed load degrades to.
    pub fn default_language(&self) -> LanguageCode {
        LanguageCode::new(&self.default_code)
    }

    /// Get a language configuration by its code.
    pub fn get_by_code(&self, code: &str) -> Option<&LanguageConfig> {
        self.languages.iter().find(|lang| lang.code == code)
    }

    /// Get all enabled languages.
    pub fn list_enabled(&self) -> Vec<&LanguageConfig> {
        self.languages.iter().filter(|lang| lang.enabled).collect()
    }

    /// Check if a language code is supported and enabled.
    pub fn is_enabled(&self, code: &str) -> bool {
        self.get_by_code(code)
            .map(|lang| lang.enabled)
            .unwrap_or(false)
    }

    /// Pick a language from a browser-style locale such as `"en-US"`.
    ///
    /// Only the primary subtag is considered. Anything unsupported (or no
    /// locale at all) yields the default language.
    pub fn detect(&self, locale: Option<&str>) -> LanguageCode {
        locale
            .map(|locale| {
                locale
                    .split(['-', '_', '.'])
                    .next()
                    .unwrap_or_default()
                    .to_ascii_lowercase()
            })
            .filter(|primary| self.is_enabled(primary))
            .map(|primary| LanguageCode::new(&primary))
            .unwrap_or_else(|| self.default_language())
    }
}

fn known_languages() -> Vec<LanguageConfig> {
    vec![
        LanguageConfig::new("tr", "Turkish", "Türkçe", "tr-TR", "🇹🇷"),
        LanguageConfig::new("en", "English", "English", "en-US", "🇬🇧"),
        LanguageConfig::new("de", "German", "Deutsch", "de-DE", "🇩🇪"),
    ]
}
