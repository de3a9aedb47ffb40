//! Question label dictionary.
//!
//! Survey columns carry short codes (`SOC5B`, `DEM2`); reports show the
//! question text next to the code. The dictionary is an explicit value
//! handed to whatever needs label text.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Mapping from column code to human-readable question text.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct QuestionLabels {
    labels: BTreeMap<String, String>,
}

impl QuestionLabels {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds or replaces the label for a column code.
    #[must_use]
    pub fn with_label(mut self, code: impl Into<String>, text: impl Into<String>) -> Self {
        self.insert(code, text);
        self
    }

    pub fn insert(&mut self, code: impl Into<String>, text: impl Into<String>) {
        self.labels.insert(code.into(), text.into());
    }

    /// Label text for a column code; lookup falls back to a case-insensitive match.
    pub fn get(&self, code: &str) -> Option<&str> {
        if let Some(text) = self.labels.get(code) {
            return Some(text.as_str());
        }
        self.labels
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(code))
            .map(|(_, text)| text.as_str())
    }

    /// Label text, or the code itself when no label is configured.
    pub fn describe<'a>(&'a self, code: &'a str) -> &'a str {
        self.get(code).unwrap_or(code)
    }

    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for QuestionLabels {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            labels: iter
                .into_iter()
                .map(|(code, text)| (code.into(), text.into()))
                .collect(),
        }
    }
}
