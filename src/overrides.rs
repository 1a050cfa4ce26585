//! Curated translations that take precedence over machine translation.
//!
//! The tables live in `data/overrides.json`; a copy is embedded in the binary
//! so the upgrade job works without the file on disk.

use crate::error::{MigrationError, Result};
use crate::level::LocalizedText;
use serde::Deserialize;
use std::collections::HashMap;
use std::path::Path;
use tracing::debug;

const BUNDLED_OVERRIDES: &str = include_str!("../data/overrides.json");

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OverrideTables {
    /// Category labels keyed by their Chinese text.
    #[serde(default)]
    categories: HashMap<String, LocalizedText>,
    /// Replacements for English tile text, keyed by the text being replaced.
    #[serde(default)]
    english_tile_text: HashMap<String, String>,
}

impl OverrideTables {
    /// Load the tables embedded at build time.
    pub fn bundled() -> Result<Self> {
        Self::parse(BUNDLED_OVERRIDES)
    }

    /// Load tables from `path`, or the bundled copy when no path is given.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => {
                let raw = std::fs::read_to_string(path).map_err(|source| MigrationError::Io {
                    path: path.to_path_buf(),
                    source,
                })?;
                let tables = Self::parse(&raw)?;
                debug!(
                    "Loaded {} category and {} tile text overrides from {}",
                    tables.categories.len(),
                    tables.english_tile_text.len(),
                    path.display()
                );
                Ok(tables)
            }
            None => Self::bundled(),
        }
    }

    pub fn parse(raw: &str) -> Result<Self> {
        let tables: Self =
            serde_json::from_str(raw).map_err(|e| MigrationError::Overrides(e.to_string()))?;

        for (label, text) in &tables.categories {
            if let Some(code) = text.first_missing() {
                return Err(MigrationError::Overrides(format!(
                    "category '{}' has no '{}' entry",
                    label, code
                )));
            }
        }

        Ok(tables)
    }

    pub fn category(&self, zh_label: &str) -> Option<&LocalizedText> {
        self.categories.get(zh_label)
    }

    /// Remember a resolved category for the rest of the run.
    pub fn remember_category(&mut self, zh_label: &str, text: LocalizedText) {
        self.categories.insert(zh_label.to_string(), text);
    }

    /// Apply the English tile text table; unknown text is returned as-is.
    pub fn english_tile_text<'a>(&'a self, text: &'a str) -> &'a str {
        self.english_tile_text
            .get(text)
            .map(String::as_str)
            .unwrap_or(text)
    }

    pub fn category_count(&self) -> usize {
        self.categories.len()
    }
}
