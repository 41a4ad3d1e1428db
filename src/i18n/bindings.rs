//! Content bindings: the caller's explicit map from translation key to the
//! code that updates whatever displays it.
//!
//! The store knows nothing about presentation. Bindings are applied to a
//! table directly, or registered as an observer so every applied language
//! change resyncs the bound content.

use crate::i18n::{LanguageChange, Params, TranslationTable};
use tracing::debug;

type Update = Box<dyn Fn(&str) + Send + Sync>;

struct Binding {
    key: String,
    params: Option<Params>,
    update: Update,
}

#[derive(Default)]
pub struct ContentBindings {
    bindings: Vec<Binding>,
}

impl ContentBindings {
    pub fn new() -> Self {
        Self::default()
    }

    /// Bind `key` to an update callback.
    pub fn bind<F>(&mut self, key: &str, update: F) -> &mut Self
    where
        F: Fn(&str) + Send + Sync + 'static,
    {
        self.bindings.push(Binding {
            key: key.to_string(),
            params: None,
            update: Box::new(update),
        });
        self
    }

    /// Bind `key` with fixed interpolation values (e.g. donation amounts).
    pub fn bind_with_params<F>(&mut self, key: &str, params: Params, update: F) -> &mut Self
    where
        F: Fn(&str) + Send + Sync + 'static,
    {
        self.bindings.push(Binding {
            key: key.to_string(),
            params: Some(params),
            update: Box::new(update),
        });
        self
    }

    pub fn len(&self) -> usize {
        self.bindings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }

    /// Push resolved text into every binding whose key exists in `table`.
    ///
    /// Bindings for missing keys are left untouched so existing content
    /// stays visible. Returns the number of callbacks invoked.
    pub fn apply(&self, table: &TranslationTable) -> usize {
        let mut applied = 0;
        for binding in &self.bindings {
            if table.get(&binding.key).is_none() {
                debug!("No translation for bound key '{}'", binding.key);
                continue;
            }
            let text = table.resolve(&binding.key, binding.params.as_ref());
            (binding.update)(&text);
            applied += 1;
        }
        applied
    }

    /// Turn the bindings into a store observer.
    pub fn into_observer(self) -> impl Fn(&LanguageChange) + Send + Sync + 'static {
        move |change: &LanguageChange| {
            let applied = self.apply(&change.table);
            debug!(
                "Resynced {}/{} bound entries for {}",
                applied,
                self.len(),
                change.current
            );
        }
    }
}
