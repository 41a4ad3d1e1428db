//! Translation tables and key resolution.

use crate::i18n::FetchError;
use regex::{Captures, Regex};
use serde_json::{Map, Value};
use std::collections::HashMap;
use std::sync::OnceLock;

/// Placeholder values for `{{name}}` interpolation.
pub type Params = HashMap<String, String>;

static PLACEHOLDER_REGEX: OnceLock<Regex> = OnceLock::new();

fn placeholder_regex() -> &'static Regex {
    PLACEHOLDER_REGEX.get_or_init(|| Regex::new(r"\{\{(\w+)\}\}").expect("Invalid placeholder regex"))
}

/// One language's key→text mapping.
///
/// Top-level keys are section names (`hero`, `donation`, ...). Each value is
/// a leaf string or a nested object.
#[derive(Debug, Clone, PartialEq)]
pub struct TranslationTable {
    root: Map<String, Value>,
}

impl TranslationTable {
    /// Wrap a decoded document. Anything but a JSON object is malformed.
    pub fn from_value(value: Value) -> Result<Self, FetchError> {
        match value {
            Value::Object(root) => Ok(Self { root }),
            other => Err(FetchError::Malformed(format!(
                "expected a JSON object, got {}",
                json_kind(&other)
            ))),
        }
    }

    /// Walk a dotted key. Returns `None` if any segment is missing.
    fn lookup(&self, key: &str) -> Option<&Value> {
        let mut segments = key.split('.');
        let mut current = self.root.get(segments.next()?)?;
        for segment in segments {
            current = current.as_object()?.get(segment)?;
        }
        Some(current)
    }

    /// Get the leaf string for a dotted key, if there is one.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.lookup(key).and_then(Value::as_str)
    }

    /// Top-level section names.
    pub fn sections(&self) -> impl Iterator<Item = &str> {
        self.root.keys().map(String::as_str)
    }

    /// A section counts as present when it exists and is not null.
    pub fn has_section(&self, name: &str) -> bool {
        self.root.get(name).map(|v| !v.is_null()).unwrap_or(false)
    }

    /// Number of leaf strings across all nesting levels.
    pub fn leaf_count(&self) -> usize {
        fn count(value: &Value) -> usize {
            match value {
                Value::String(_) => 1,
                Value::Object(map) => map.values().map(count).sum(),
                _ => 0,
            }
        }
        self.root.values().map(count).sum()
    }

    /// Resolve a key against this table. See [`resolve`].
    pub fn resolve(&self, key: &str, params: Option<&Params>) -> String {
        resolve(self, key, params)
    }
}

/// Resolve a dotted key to display text.
///
/// A missing segment or a non-string value yields `key` unchanged. With
/// `params`, each `{{name}}` is replaced by `params["name"]`; placeholders
/// without a value stay verbatim.
pub fn resolve(table: &TranslationTable, key: &str, params: Option<&Params>) -> String {
    match table.get(key) {
        Some(text) => match params {
            Some(params) => interpolate(text, params),
            None => text.to_string(),
        },
        None => key.to_string(),
    }
}

/// Replace `{{name}}` placeholders with values from `params`.
pub fn interpolate(text: &str, params: &Params) -> String {
    placeholder_regex()
        .replace_all(text, |caps: &Captures| match params.get(&caps[1]) {
            Some(value) => value.clone(),
            None => caps[0].to_string(),
        })
        .into_owned()
}

pub(crate) fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
