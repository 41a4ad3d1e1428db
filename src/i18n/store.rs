//! Translation store: cached tables, the active language, and change
//! notification.
//!
//! Each language's cache entry moves through
//! `Absent -> Loading -> Cached(fresh) -> Cached(stale) -> Absent`.
//! While an entry is `Loading`, every caller joins the same shared fetch, so
//! at most one fetch per language is outstanding. A failed fetch returns the
//! entry to `Absent`; the next call retries from scratch.
//!
//! State lives behind a `std::sync::Mutex` that is never held across an
//! await. The fetch itself writes its result back into the cache exactly
//! once, inside the shared future.

use crate::i18n::{
    LanguageCode, LanguageRegistry, MetricsReport, Params, PreferenceStore, TranslationError,
    TranslationMetrics, TranslationSource, TranslationTable, TranslationValidator,
};
use chrono::{DateTime, Utc};
use futures::future::{join_all, BoxFuture, FutureExt, Shared};
use serde::Serialize;
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::{Duration, Instant};
use tracing::{debug, error, info, warn};

type SharedLoad = Shared<BoxFuture<'static, Result<Arc<TranslationTable>, TranslationError>>>;

/// Callback invoked after content should be resynced.
pub type Observer = Arc<dyn Fn(&LanguageChange) + Send + Sync>;

/// Tunables that are configuration rather than logic.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreSettings {
    /// How long a fetched table is served without refetching
    pub cache_ttl: Duration,

    /// Top-level sections every document is expected to carry
    pub required_sections: Vec<String>,
}

impl Default for StoreSettings {
    fn default() -> Self {
        Self {
            cache_ttl: Duration::from_secs(24 * 60 * 60),
            required_sections: ["hero", "donation", "buttons", "contact"]
                .iter()
                .map(|s| s.to_string())
                .collect(),
        }
    }
}

/// Sent to observers once a language has been applied.
#[derive(Debug, Clone)]
pub struct LanguageChange {
    pub previous: LanguageCode,
    pub current: LanguageCode,
    pub table: Arc<TranslationTable>,
}

/// Result of [`TranslationStore::set_active_language`].
#[derive(Debug, Clone)]
pub enum ChangeOutcome {
    /// The language was applied, persisted and announced.
    Changed(LanguageChange),
    /// The requested language was already active.
    Unchanged,
    /// A later change was applied first; this one was dropped.
    Superseded,
}

/// Handle returned by [`TranslationStore::subscribe`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

#[derive(Debug, Clone, Serialize)]
pub struct CacheStats {
    pub entries: usize,
    pub fresh: usize,
    pub languages: Vec<LanguageCode>,
    pub oldest_fetch: Option<DateTime<Utc>>,
}

struct CacheEntry {
    table: Arc<TranslationTable>,
    fetched_at: Instant,
    fetched_at_utc: DateTime<Utc>,
}

impl CacheEntry {
    fn new(table: Arc<TranslationTable>) -> Self {
        Self {
            table,
            fetched_at: Instant::now(),
            fetched_at_utc: Utc::now(),
        }
    }

    fn is_fresh(&self, ttl: Duration) -> bool {
        self.fetched_at.elapsed() < ttl
    }
}

struct InFlight {
    generation: u64,
    load: SharedLoad,
}

struct State {
    cache: HashMap<LanguageCode, CacheEntry>,
    in_flight: HashMap<LanguageCode, InFlight>,
    /// Bumped by `clear_cache`; fetches from an older generation never repopulate the cache
    generation: u64,
    active: LanguageCode,
    active_table: Option<Arc<TranslationTable>>,
    /// Last change sequence number handed out / applied
    change_seq: u64,
    applied_seq: u64,
    observers: Vec<(SubscriptionId, Observer)>,
    next_subscription: u64,
}

struct Inner {
    registry: LanguageRegistry,
    source: Arc<dyn TranslationSource>,
    preferences: Arc<dyn PreferenceStore>,
    validator: TranslationValidator,
    settings: StoreSettings,
    metrics: TranslationMetrics,
    state: Mutex<State>,
    /// Sequence number of the last saved preference; serializes saves
    /// without holding `state` during file I/O
    persisted_seq: Mutex<u64>,
}

impl Inner {
    fn state(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Fetch, validate and settle one load. Runs inside the shared future.
    async fn fetch_and_settle(
        self: Arc<Self>,
        lang: LanguageCode,
        generation: u64,
    ) -> Result<Arc<TranslationTable>, TranslationError> {
        self.metrics.record_fetch();
        debug!("Fetching translations for {} from {}", lang, self.source.describe(&lang));

        let result = match self.source.fetch(&lang).await {
            Ok(document) => self.validator.check(&lang, document).map(Arc::new),
            Err(e) => Err(e),
        };

        let mut state = self.state();
        if state
            .in_flight
            .get(&lang)
            .is_some_and(|in_flight| in_flight.generation == generation)
        {
            state.in_flight.remove(&lang);
        }
        let current_generation = state.generation == generation;

        match result {
            Ok(table) => {
                if current_generation {
                    state.cache.insert(lang.clone(), CacheEntry::new(Arc::clone(&table)));
                }
                info!(
                    "Loaded translations for {} ({} strings)",
                    lang,
                    table.leaf_count()
                );
                Ok(table)
            }
            Err(cause) => {
                self.metrics.record_fetch_failure();
                if current_generation {
                    state.cache.remove(&lang);
                }
                warn!("Failed to load translations for {}: {}", lang, cause);
                Err(TranslationError::TranslationLoadFailed {
                    lang: lang.to_string(),
                    cause,
                })
            }
        }
    }
}

/// Cached translation tables plus the active language.
///
/// Cloning yields another handle to the same store.
#[derive(Clone)]
pub struct TranslationStore {
    inner: Arc<Inner>,
}

impl TranslationStore {
    /// Create a store. No I/O happens until a load is requested.
    ///
    /// The active language starts as the persisted preference if it is still
    /// supported, otherwise the language detected from `detected_locale`,
    /// otherwise the registry default.
    pub fn create(
        settings: StoreSettings,
        registry: LanguageRegistry,
        source: Arc<dyn TranslationSource>,
        preferences: Arc<dyn PreferenceStore>,
        detected_locale: Option<&str>,
    ) -> Self {
        let active = match preferences.load() {
            Some(saved) => registry.validate(&saved).unwrap_or_else(|_| {
                warn!("Ignoring unsupported saved language preference '{}'", saved);
                registry.detect(detected_locale)
            }),
            None => registry.detect(detected_locale),
        };
        debug!("Initial language: {}", active);

        let state = State {
            cache: HashMap::new(),
            in_flight: HashMap::new(),
            generation: 0,
            active,
            active_table: None,
            change_seq: 0,
            applied_seq: 0,
            observers: Vec::new(),
            next_subscription: 0,
        };

        Self {
            inner: Arc::new(Inner {
                validator: TranslationValidator::new(settings.required_sections.clone()),
                registry,
                source,
                preferences,
                settings,
                metrics: TranslationMetrics::new(),
                state: Mutex::new(state),
                persisted_seq: Mutex::new(0),
            }),
        }
    }

    pub fn registry(&self) -> &LanguageRegistry {
        &self.inner.registry
    }

    pub fn settings(&self) -> &StoreSettings {
        &self.inner.settings
    }

    pub fn active_language(&self) -> LanguageCode {
        self.inner.state().active.clone()
    }

    /// Table of the active language, once one has been applied.
    pub fn active_table(&self) -> Option<Arc<TranslationTable>> {
        self.inner.state().active_table.clone()
    }

    /// Load the active language and make it current.
    ///
    /// If it cannot be loaded the store switches to the default language.
    /// Only a failure of the default language itself is returned.
    pub async fn initialize(&self) -> Result<Arc<TranslationTable>, TranslationError> {
        let (requested, seq) = {
            let mut state = self.inner.state();
            state.change_seq += 1;
            (state.active.clone(), state.change_seq)
        };

        let (lang, table) = match self.load_exact(&requested).await {
            Ok(table) => (requested.clone(), table),
            Err(err) => {
                let default = self.inner.registry.default_language();
                if requested == default {
                    error!("Translation initialization failed: {}", err);
                    return Err(err);
                }
                warn!("{}; falling back to default language {}", err, default);
                self.inner.metrics.record_fallback();
                let table = self.load_exact(&default).await?;
                (default, table)
            }
        };

        let change = {
            let mut state = self.inner.state();
            Self::apply(&mut state, seq, lang.clone(), Arc::clone(&table))
        };
        match change {
            Some(change) => {
                info!("Translations initialized with language: {}", lang);
                self.notify(&change);
            }
            None => debug!("Initialization superseded by a language change"),
        }

        Ok(table)
    }

    /// Load the table for `code`.
    ///
    /// Fresh cache entries are returned without I/O and overlapping callers
    /// share one fetch. If the fetch fails for a language other than the
    /// default, the default language's table is returned instead.
    pub async fn load(&self, code: &str) -> Result<Arc<TranslationTable>, TranslationError> {
        let lang = self.inner.registry.validate(code)?;

        match self.load_exact(&lang).await {
            Ok(table) => Ok(table),
            Err(err) => {
                let default = self.inner.registry.default_language();
                if lang == default {
                    return Err(err);
                }
                warn!("{}; falling back to default language {}", err, default);
                self.inner.metrics.record_fallback();
                self.load_exact(&default).await
            }
        }
    }

    /// Load exactly `lang`, without degrading to the default language.
    async fn load_exact(
        &self,
        lang: &LanguageCode,
    ) -> Result<Arc<TranslationTable>, TranslationError> {
        let load = {
            let mut state = self.inner.state();

            if let Some(entry) = state.cache.get(lang) {
                if entry.is_fresh(self.inner.settings.cache_ttl) {
                    self.inner.metrics.record_cache_hit();
                    debug!("Translations for {} served from cache", lang);
                    return Ok(Arc::clone(&entry.table));
                }
                debug!("Cached translations for {} are stale", lang);
            }
            self.inner.metrics.record_cache_miss();

            match state.in_flight.get(lang) {
                Some(in_flight) => {
                    debug!("Joining in-flight load for {}", lang);
                    in_flight.load.clone()
                }
                None => {
                    let generation = state.generation;
                    let load = Arc::clone(&self.inner)
                        .fetch_and_settle(lang.clone(), generation)
                        .boxed()
                        .shared();
                    state.in_flight.insert(
                        lang.clone(),
                        InFlight {
                            generation,
                            load: load.clone(),
                        },
                    );
                    load
                }
            }
        };

        load.await
    }

    /// Switch the active language.
    ///
    /// Unlike [`load`](Self::load), a failure here does not degrade to the
    /// default language: the error is returned and the previous language
    /// stays active. When several changes overlap, the most recently
    /// requested one that succeeds wins.
    ///
    /// Requesting the active language is a no-op only once its table has
    /// been applied. Before `initialize` (or after `dispose`) the table is
    /// loaded and announced with `previous == current`.
    pub async fn set_active_language(&self, code: &str) -> Result<ChangeOutcome, TranslationError> {
        let lang = self.inner.registry.validate(code)?;

        let seq = {
            let mut state = self.inner.state();
            state.change_seq += 1;
            let seq = state.change_seq;
            if state.active == lang && state.active_table.is_some() {
                // Still counts as the latest request: pending changes are dropped
                state.applied_seq = seq;
                return Ok(ChangeOutcome::Unchanged);
            }
            seq
        };

        let table = self.load_exact(&lang).await.map_err(|err| {
            warn!("Language change to {} failed: {}", lang, err);
            err
        })?;

        let change = {
            let mut state = self.inner.state();
            Self::apply(&mut state, seq, lang.clone(), table)
        };

        match change {
            Some(change) => {
                self.persist(seq, &change.current);
                info!("Language changed: {} -> {}", change.previous, change.current);
                self.notify(&change);
                Ok(ChangeOutcome::Changed(change))
            }
            None => {
                debug!("Language change to {} superseded by a later request", lang);
                Ok(ChangeOutcome::Superseded)
            }
        }
    }

    fn apply(
        state: &mut State,
        seq: u64,
        lang: LanguageCode,
        table: Arc<TranslationTable>,
    ) -> Option<LanguageChange> {
        if seq <= state.applied_seq {
            return None;
        }
        state.applied_seq = seq;
        let previous = std::mem::replace(&mut state.active, lang.clone());
        state.active_table = Some(Arc::clone(&table));
        Some(LanguageChange {
            previous,
            current: lang,
            table,
        })
    }

    /// Save the preference for an applied change. A later change that was
    /// saved first wins; the older save is skipped.
    fn persist(&self, seq: u64, lang: &LanguageCode) {
        let mut persisted = self
            .inner
            .persisted_seq
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        if seq < *persisted {
            debug!("Skipping preference save for {}: a later change was saved", lang);
            return;
        }
        *persisted = seq;
        if let Err(e) = self.inner.preferences.save(lang.as_str()) {
            warn!("Failed to persist language preference: {:#}", e);
        }
    }

    /// Resolve a key against the active language's table.
    ///
    /// Before any language has been applied every key resolves to itself.
    pub fn resolve(&self, key: &str, params: Option<&Params>) -> String {
        match self.active_table() {
            Some(table) => table.resolve(key, params),
            None => key.to_string(),
        }
    }

    /// Register an observer for applied language changes.
    pub fn subscribe<F>(&self, observer: F) -> SubscriptionId
    where
        F: Fn(&LanguageChange) + Send + Sync + 'static,
    {
        let mut state = self.inner.state();
        state.next_subscription += 1;
        let id = SubscriptionId(state.next_subscription);
        let observer: Observer = Arc::new(observer);
        state.observers.push((id, observer));
        id
    }

    /// Remove an observer. Returns `false` if it was not registered.
    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        let mut state = self.inner.state();
        let before = state.observers.len();
        state.observers.retain(|(existing, _)| *existing != id);
        state.observers.len() != before
    }

    fn notify(&self, change: &LanguageChange) {
        // Observers run without the lock held so they may call back into the store
        let observers: Vec<Observer> = self
            .inner
            .state()
            .observers
            .iter()
            .map(|(_, observer)| Arc::clone(observer))
            .collect();
        for observer in observers {
            observer(change);
        }
    }

    /// Drop every cached table. Later loads fetch again.
    pub fn clear_cache(&self) {
        let mut state = self.inner.state();
        state.cache.clear();
        state.in_flight.clear();
        state.generation += 1;
        info!("Translation cache cleared");
    }

    /// Load several languages concurrently, skipping failures.
    ///
    /// Returns the languages that are now cached.
    pub async fn preload(&self, codes: &[&str]) -> Vec<LanguageCode> {
        let langs: Vec<LanguageCode> = codes
            .iter()
            .filter_map(|code| match self.inner.registry.validate(code) {
                Ok(lang) => Some(lang),
                Err(e) => {
                    warn!("Skipping preload: {}", e);
                    None
                }
            })
            .collect();

        let results = join_all(langs.iter().map(|lang| self.load_exact(lang))).await;

        let loaded: Vec<LanguageCode> = langs
            .into_iter()
            .zip(results)
            .filter_map(|(lang, result)| match result {
                Ok(_) => Some(lang),
                Err(e) => {
                    warn!("Failed to preload translations: {}", e);
                    None
                }
            })
            .collect();

        info!(
            "Preloaded translations for: {}",
            loaded
                .iter()
                .map(LanguageCode::as_str)
                .collect::<Vec<_>>()
                .join(", ")
        );
        loaded
    }

    pub fn cache_stats(&self) -> CacheStats {
        let state = self.inner.state();
        let ttl = self.inner.settings.cache_ttl;

        let mut languages: Vec<LanguageCode> = state.cache.keys().cloned().collect();
        languages.sort();

        CacheStats {
            entries: state.cache.len(),
            fresh: state.cache.values().filter(|entry| entry.is_fresh(ttl)).count(),
            languages,
            oldest_fetch: state.cache.values().map(|entry| entry.fetched_at_utc).min(),
        }
    }

    pub fn metrics(&self) -> MetricsReport {
        self.inner.metrics.report()
    }

    /// Release cached tables, pending loads and observers.
    ///
    /// The active language is kept; the store can be initialized again.
    pub fn dispose(&self) {
        let mut state = self.inner.state();
        state.cache.clear();
        state.in_flight.clear();
        state.generation += 1;
        state.observers.clear();
        state.active_table = None;
        debug!("Translation store disposed");
    }
}
