use crate::i18n::{FileSource, HttpSource, LanguageRegistry, StoreSettings, TranslationSource};
use anyhow::{Context, Result};
use std::sync::Arc;
use std::time::Duration;

#[derive(Debug, Clone)]
pub struct Config {
    // Translation documents: an http(s) base URL or a local directory
    pub translations_source: String,

    // Languages
    pub default_language: String,
    pub supported_languages: Vec<String>,
    pub browser_locale: Option<String>,

    // Cache & validation
    pub cache_ttl_secs: u64,
    pub required_sections: Vec<String>,

    // Persisted preference
    pub preference_file: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        Ok(Self {
            translations_source: std::env::var("TRANSLATIONS_SOURCE")
                .unwrap_or_else(|_| "lang".to_string()),

            default_language: std::env::var("DEFAULT_LANGUAGE")
                .unwrap_or_else(|_| "tr".to_string()),
            supported_languages: std::env::var("SUPPORTED_LANGUAGES")
                .map(|v| parse_list(&v))
                .unwrap_or_else(|_| vec!["tr".to_string(), "en".to_string(), "de".to_string()]),
            browser_locale: std::env::var("BROWSER_LOCALE")
                .or_else(|_| std::env::var("LANG"))
                .ok()
                .filter(|v| !v.is_empty()),

            cache_ttl_secs: match std::env::var("TRANSLATION_CACHE_TTL_SECS") {
                Ok(v) => v
                    .parse()
                    .context("TRANSLATION_CACHE_TTL_SECS must be a number of seconds")?,
                Err(_) => 24 * 60 * 60,
            },
            required_sections: std::env::var("REQUIRED_SECTIONS")
                .map(|v| parse_list(&v))
                .unwrap_or_else(|_| StoreSettings::default().required_sections),

            preference_file: std::env::var("PREFERENCE_FILE")
                .unwrap_or_else(|_| ".campaign-i18n.json".to_string()),
        })
    }

    pub fn store_settings(&self) -> StoreSettings {
        StoreSettings {
            cache_ttl: Duration::from_secs(self.cache_ttl_secs),
            required_sections: self.required_sections.clone(),
        }
    }

    pub fn registry(&self) -> Result<LanguageRegistry> {
        LanguageRegistry::from_codes(&self.supported_languages, &self.default_language)
            .context("Invalid language configuration")
    }

    /// HTTP source for URLs, file source for anything else.
    pub fn source(&self, client: reqwest::Client) -> Arc<dyn TranslationSource> {
        if self.translations_source.starts_with("http://")
            || self.translations_source.starts_with("https://")
        {
            Arc::new(HttpSource::new(client, &self.translations_source))
        } else {
            Arc::new(FileSource::new(&self.translations_source))
        }
    }
}

/// Split a comma-separated list, dropping blanks.
fn parse_list(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    const VARS: &[&str] = &[
        "TRANSLATIONS_SOURCE",
        "DEFAULT_LANGUAGE",
        "SUPPORTED_LANGUAGES",
        "BROWSER_LOCALE",
        "LANG",
        "TRANSLATION_CACHE_TTL_SECS",
        "REQUIRED_SECTIONS",
        "PREFERENCE_FILE",
    ];

    fn clear_env() {
        for var in VARS {
            std::env::remove_var(var);
        }
    }

    #[test]
    #[serial]
    fn test_from_env_defaults() {
        clear_env();
        let config = Config::from_env().expect("Should succeed");

        assert_eq!(config.translations_source, "lang");
        assert_eq!(config.default_language, "tr");
        assert_eq!(config.supported_languages, vec!["tr", "en", "de"]);
        assert_eq!(config.browser_locale, None);
        assert_eq!(config.cache_ttl_secs, 86400);
        assert_eq!(
            config.required_sections,
            vec!["hero", "donation", "buttons", "contact"]
        );
        assert_eq!(config.preference_file, ".campaign-i18n.json");
    }

    #[test]
    #[serial]
    fn test_from_env_overrides() {
        clear_env();
        std::env::set_var("TRANSLATIONS_SOURCE", "https://cdn.example.com/lang");
        std::env::set_var("DEFAULT_LANGUAGE", "en");
        std::env::set_var("SUPPORTED_LANGUAGES", "en, de ,,fr");
        std::env::set_var("LANG", "de_DE.UTF-8");
        std::env::set_var("TRANSLATION_CACHE_TTL_SECS", "60");
        std::env::set_var("REQUIRED_SECTIONS", "hero");

        let config = Config::from_env().expect("Should succeed");
        clear_env();

        assert_eq!(config.supported_languages, vec!["en", "de", "fr"]);
        assert_eq!(config.browser_locale.as_deref(), Some("de_DE.UTF-8"));
        assert_eq!(config.store_settings().cache_ttl, Duration::from_secs(60));
        assert_eq!(config.store_settings().required_sections, vec!["hero"]);

        let registry = config.registry().expect("Should succeed");
        assert_eq!(registry.default_language(), "en");
        assert!(registry.is_enabled("fr"));
    }

    #[test]
    #[serial]
    fn test_browser_locale_takes_precedence_over_lang() {
        clear_env();
        std::env::set_var("BROWSER_LOCALE", "en-US");
        std::env::set_var("LANG", "de_DE.UTF-8");

        let config = Config::from_env().expect("Should succeed");
        clear_env();

        assert_eq!(config.browser_locale.as_deref(), Some("en-US"));
    }

    #[test]
    #[serial]
    fn test_invalid_ttl() {
        clear_env();
        std::env::set_var("TRANSLATION_CACHE_TTL_SECS", "a day");

        let result = Config::from_env();
        clear_env();

        assert!(result.unwrap_err().to_string().contains("TRANSLATION_CACHE_TTL_SECS"));
    }

    #[test]
    #[serial]
    fn test_registry_rejects_unknown_default() {
        clear_env();
        std::env::set_var("DEFAULT_LANGUAGE", "fr");

        let config = Config::from_env().expect("Should succeed");
        clear_env();

        assert!(config.registry().is_err());
    }

    #[test]
    fn test_source_selection() {
        let mut config = Config {
            translations_source: "https://cdn.example.com/lang".to_string(),
            default_language: "tr".to_string(),
            supported_languages: vec!["tr".to_string()],
            browser_locale: None,
            cache_ttl_secs: 60,
            required_sections: vec![],
            preference_file: "prefs.json".to_string(),
        };
        let registry = config.registry().unwrap();
        let tr = registry.default_language();

        let http = config.source(reqwest::Client::new());
        assert_eq!(http.describe(&tr), "https://cdn.example.com/lang/tr.json");

        config.translations_source = "data/translations".to_string();
        let file = config.source(reqwest::Client::new());
        assert!(file.describe(&tr).ends_with("tr.json"));
        assert!(file.describe(&tr).starts_with("data"));
    }

    #[test]
    fn test_parse_list() {
        assert_eq!(parse_list(" a, b ,,c "), vec!["a", "b", "c"]);
        assert!(parse_list("").is_empty());
    }
}
