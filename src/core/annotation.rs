use std::collections::HashMap;

use crate::parsing::ParseError;

/// Key/value pairs from an annotator's summary report.
///
/// Values are kept as text because the report mixes counts (`CDS: 4140`)
/// with free-form fields (`organism: Escherichia coli strain`).
/// Use [`AnnotationSummary::count`] to read a value as a validated integer.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AnnotationSummary {
    entries: HashMap<String, String>,
}

impl AnnotationSummary {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a metric, replacing any earlier value for the same key
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.entries.insert(key.into(), value.into());
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries.get(key).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Read a metric as a non-negative integer count.
    ///
    /// # Errors
    ///
    /// Returns `ParseError::MissingKey` if the metric is absent, or
    /// `ParseError::InvalidCount` if its value is not an unsigned integer.
    pub fn count(&self, key: &str) -> Result<u64, ParseError> {
        let value = self
            .get(key)
            .ok_or_else(|| ParseError::MissingKey(key.to_string()))?;

        value.parse().map_err(|_| ParseError::InvalidCount {
            key: key.to_string(),
            value: value.to_string(),
        })
    }
}
