//! Persisted language preference.
//!
//! The preference is a single string stored under a fixed key. It is read
//! once when a store is created and written after every successful change.

use anyhow::{Context, Result};
use serde_json::{Map, Value};
use std::path::PathBuf;
use std::sync::Mutex;
use tracing::warn;

/// Key the preference is stored under.
pub const PREFERENCE_KEY: &str = "preferred_language";

pub trait PreferenceStore: Send + Sync {
    /// The last saved language code, if any.
    fn load(&self) -> Option<String>;

    /// Persist a language code, replacing the previous value.
    fn save(&self, code: &str) -> Result<()>;
}

/// Preference kept in a small JSON file alongside other keys.
#[derive(Debug, Clone)]
pub struct FilePreferenceStore {
    path: PathBuf,
    key: String,
}

impl FilePreferenceStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            key: PREFERENCE_KEY.to_string(),
        }
    }

    pub fn with_key(mut self, key: &str) -> Self {
        self.key = key.to_string();
        self
    }

    fn read_map(&self) -> Result<Map<String, Value>> {
        let contents = std::fs::read_to_string(&self.path)
            .with_context(|| format!("Failed to read preferences at {}", self.path.display()))?;
        let value: Value = serde_json::from_str(&contents)
            .with_context(|| format!("Failed to parse preferences at {}", self.path.display()))?;
        match value {
            Value::Object(map) => Ok(map),
            _ => anyhow::bail!("Preferences at {} are not a JSON object", self.path.display()),
        }
    }
}

impl PreferenceStore for FilePreferenceStore {
    fn load(&self) -> Option<String> {
        if !self.path.exists() {
            return None;
        }
        match self.read_map() {
            Ok(map) => map.get(&self.key).and_then(Value::as_str).map(str::to_string),
            Err(e) => {
                warn!("Ignoring unreadable language preference: {:#}", e);
                None
            }
        }
    }

    fn save(&self, code: &str) -> Result<()> {
        // Keep unrelated keys; start over if the file is unreadable
        let mut map = if self.path.exists() {
            self.read_map().unwrap_or_default()
        } else {
            Map::new()
        };
        map.insert(self.key.clone(), Value::String(code.to_string()));

        let contents = serde_json::to_string_pretty(&Value::Object(map))
            .context("Failed to serialize preferences")?;
        std::fs::write(&self.path, contents)
            .with_context(|| format!("Failed to write preferences at {}", self.path.display()))
    }
}

/// In-process preference, for tests and embedders without storage.
#[derive(Debug, Default)]
pub struct MemoryPreferenceStore {
    value: Mutex<Option<String>>,
}

impl MemoryPreferenceStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_value(code: &str) -> Self {
        Self {
            value: Mutex::new(Some(code.to_string())),
        }
    }
}

impl PreferenceStore for MemoryPreferenceStore {
    fn load(&self) -> Option<String> {
        self.value
            .lock()
            .map(|value| value.clone())
            .unwrap_or_else(|poisoned| poisoned.into_inner().clone())
    }

    fn save(&self, code: &str) -> Result<()> {
        let mut value = self
            .value
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        *value = Some(code.to_string());
        Ok(())
    }
}
