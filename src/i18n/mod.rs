//! Internationalization (i18n) module for the campaign site.
//!
//! Translation documents are loaded per language, validated, cached with an
//! expiry and resolved by dotted key. All mutable state (cache, active
//! language, observers) lives in a single `TranslationStore` handle.
//!
//! # Architecture
//!
//! - `registry`: supported languages and the default one
//! - `language`: validated `LanguageCode` and language metadata
//! - `table`: `TranslationTable` and key resolution with `{{name}}` interpolation
//! - `validator`: structural validation of fetched documents
//! - `source`: where documents come from (HTTP or a directory)
//! - `preference`: the persisted language preference
//! - `store`: caching, single-flight loads, language switching
//! - `bindings`: key → update callback map for resyncing content
//! - `metrics`: cache and fetch counters
//!
//! # Example
//!
//! ```rust,ignore
//! use campaign_i18n::i18n::*;
//!
//! let store = TranslationStore::create(
//!     StoreSettings::default(),
//!     LanguageRegistry::campaign_defaults(),
//!     Arc::new(FileSource::new("lang")),
//!     Arc::new(MemoryPreferenceStore::new()),
//!     Some("en-US"),
//! );
//! store.initialize().await?;
//! let title = store.resolve("hero.title", None);
//! ```

mod bindings;
mod error;
mod language;
mod metrics;
mod preference;
mod registry;
mod source;
mod store;
mod table;
mod validator;

pub use bindings::ContentBindings;
pub use error::{FetchError, TranslationError};
pub use language::{LanguageCode, LanguageConfig};
pub use metrics::{MetricsReport, TranslationMetrics};
pub use preference::{FilePreferenceStore, MemoryPreferenceStore, PreferenceStore, PREFERENCE_KEY};
pub use registry::LanguageRegistry;
pub use source::{FileSource, HttpSource, TranslationSource};
pub use store::{
    CacheStats, ChangeOutcome, LanguageChange, Observer, StoreSettings, SubscriptionId,
    TranslationStore,
};
pub use table::{interpolate, resolve, Params, TranslationTable};
pub use validator::{TranslationValidator, ValidationReport};
