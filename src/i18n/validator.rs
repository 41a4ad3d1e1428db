//! Structural validation of translation documents.
//!
//! A document must be a JSON object. Required sections are agreed with the
//! content owner; a missing one is reported as a warning and does not stop
//! the document from being used.

use crate::i18n::table::json_kind;
use crate::i18n::{FetchError, LanguageCode, TranslationTable};
use serde_json::Value;
use tracing::warn;

/// Validation report containing errors and warnings about a document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationReport {
    /// Problems that make the document unusable
    pub errors: Vec<String>,

    /// Non-critical issues worth logging
    pub warnings: Vec<String>,
}

impl ValidationReport {
    /// Create a new empty validation report
    pub fn new() -> Self {
        Self {
            errors: Vec::new(),
            warnings: Vec::new(),
        }
    }

    /// Check if the report has any errors
    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }

    /// Check if the report has any warnings
    pub fn has_warnings(&self) -> bool {
        !self.warnings.is_empty()
    }

    /// Check if the report is clean (no errors or warnings)
    pub fn is_clean(&self) -> bool {
        !self.has_errors() && !self.has_warnings()
    }
}

impl Default for ValidationReport {
    fn default() -> Self {
        Self::new()
    }
}

/// Validator for translation document structure.
#[derive(Debug, Clone, Default)]
pub struct TranslationValidator {
    required_sections: Vec<String>,
}

impl TranslationValidator {
    pub fn new(required_sections: Vec<String>) -> Self {
        Self { required_sections }
    }

    pub fn required_sections(&self) -> &[String] {
        &self.required_sections
    }

    /// Inspect a decoded document without consuming it.
    ///
    /// This function checks that:
    /// - the document is a non-null JSON object (error otherwise)
    /// - every required section is present and not null (warning)
    /// - every top-level value is a section object or a leaf string (warning)
    pub fn validate(&self, document: &Value) -> ValidationReport {
        let mut report = ValidationReport::new();

        let Some(root) = document.as_object() else {
            report.errors.push(format!(
                "Document must be a JSON object, got {}",
                json_kind(document)
            ));
            return report;
        };

        let missing: Vec<&str> = self
            .required_sections
            .iter()
            .filter(|section| root.get(section.as_str()).map_or(true, Value::is_null))
            .map(String::as_str)
            .collect();
        if !missing.is_empty() {
            report
                .warnings
                .push(format!("Missing required sections: {:?}", missing));
        }

        for (name, value) in root {
            if !(value.is_object() || value.is_string() || value.is_null()) {
                report.warnings.push(format!(
                    "Section '{}' is a {}, expected an object or string",
                    name,
                    json_kind(value)
                ));
            }
        }

        report
    }

    /// Validate a document for `lang` and turn it into a table.
    ///
    /// Warnings are logged; only errors fail the load.
    pub fn check(&self, lang: &LanguageCode, document: Value) -> Result<TranslationTable, FetchError> {
        let report = self.validate(&document);

        if report.has_warnings() {
            warn!(
                "Translation validation warnings for {}: {:?}",
                lang, report.warnings
            );
        }
        if report.has_errors() {
            return Err(FetchError::Malformed(report.errors.join("; ")));
        }

        TranslationTable::from_value(document)
    }
}
