//! Error taxonomy for loading and switching languages.
//!
//! A missing translation key is deliberately absent here: resolving an
//! unknown key returns the key itself.

use thiserror::Error;

/// Why a single fetch of a translation document failed.
///
/// Cloneable so one in-flight outcome can be handed to every caller that
/// joined it.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum FetchError {
    #[error("network error: {0}")]
    Network(String),

    #[error("translation source returned {status} for {url}")]
    Status { status: u16, url: String },

    #[error("malformed translation document: {0}")]
    Malformed(String),

    #[error("failed to read translation file: {0}")]
    Io(String),
}

impl FetchError {
    /// Transient failures worth another attempt: network errors, 429 and 5xx.
    pub fn is_transient(&self) -> bool {
        match self {
            FetchError::Network(_) => true,
            FetchError::Status { status, .. } => *status == 429 || *status >= 500,
            FetchError::Malformed(_) | FetchError::Io(_) => false,
        }
    }
}

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum TranslationError {
    #[error("unsupported language: '{0}'")]
    UnsupportedLanguage(String),

    #[error("failed to load translations for '{lang}': {cause}")]
    TranslationLoadFailed {
        lang: String,
        #[source]
        cause: FetchError,
    },
}
