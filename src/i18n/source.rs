//! Translation sources: where a language's document comes from.
//!
//! Each language lives in one JSON document named after its code
//! (`<base>/<code>.json`), served over HTTP or read from a directory.

use crate::i18n::{FetchError, LanguageCode};
use crate::retry::{with_retry_if, RetryConfig};
use futures::future::{BoxFuture, FutureExt};
use serde_json::Value;
use std::path::PathBuf;
use tracing::debug;

/// Something that can produce the raw translation document for a language.
pub trait TranslationSource: Send + Sync {
    /// Fetch and decode the document for `lang`. No validation beyond JSON.
    fn fetch<'a>(&'a self, lang: &'a LanguageCode) -> BoxFuture<'a, Result<Value, FetchError>>;

    /// Human-readable location of the document for `lang`, for logs.
    fn describe(&self, lang: &LanguageCode) -> String;
}

/// Fetches `<base_url>/<code>.json` over HTTP.
#[derive(Debug, Clone)]
pub struct HttpSource {
    client: reqwest::Client,
    base_url: String,
    retry: RetryConfig,
}

impl HttpSource {
    pub fn new(client: reqwest::Client, base_url: &str) -> Self {
        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            retry: RetryConfig::translation_fetch(),
        }
    }

    /// Override the retry policy for transient failures.
    pub fn with_retry(mut self, retry: RetryConfig) -> Self {
        self.retry = retry;
        self
    }

    fn url_for(&self, lang: &LanguageCode) -> String {
        format!("{}/{}.json", self.base_url, lang)
    }

    async fn fetch_once(&self, url: &str) -> Result<Value, FetchError> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| FetchError::Network(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status {
                status: status.as_u16(),
                url: url.to_string(),
            });
        }

        let body = response
            .text()
            .await
            .map_err(|e| FetchError::Network(e.to_string()))?;

        serde_json::from_str(&body).map_err(|e| FetchError::Malformed(e.to_string()))
    }
}

impl TranslationSource for HttpSource {
    fn fetch<'a>(&'a self, lang: &'a LanguageCode) -> BoxFuture<'a, Result<Value, FetchError>> {
        async move {
            let url = self.url_for(lang);
            let url = url.as_str();
            debug!("Fetching translations from {}", url);

            with_retry_if(
                &self.retry,
                &format!("Fetch {}", url),
                || self.fetch_once(url),
                FetchError::is_transient,
            )
            .await
        }
        .boxed()
    }

    fn describe(&self, lang: &LanguageCode) -> String {
        self.url_for(lang)
    }
}

/// Reads `<dir>/<code>.json` from the local filesystem.
#[derive(Debug, Clone)]
pub struct FileSource {
    dir: PathBuf,
}

impl FileSource {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    fn path_for(&self, lang: &LanguageCode) -> PathBuf {
        self.dir.join(format!("{}.json", lang))
    }
}

impl TranslationSource for FileSource {
    fn fetch<'a>(&'a self, lang: &'a LanguageCode) -> BoxFuture<'a, Result<Value, FetchError>> {
        async move {
            let path = self.path_for(lang);
            debug!("Reading translations from {}", path.display());

            let contents = tokio::fs::read_to_string(&path)
                .await
                .map_err(|e| FetchError::Io(format!("{}: {}", path.display(), e)))?;

            serde_json::from_str(&contents).map_err(|e| FetchError::Malformed(e.to_string()))
        }
        .boxed()
    }

    fn describe(&self, lang: &LanguageCode) -> String {
        self.path_for(lang).display().to_string()
    }
}
