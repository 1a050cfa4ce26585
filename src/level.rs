//! Level document shapes.
//!
//! `Legacy*` types describe the ad-hoc shape older level files were authored
//! in; they are only ever read. The normalized types are what the schema
//! upgrade writes.

use crate::language::SUPPORTED_LANGUAGES;
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::collections::BTreeMap;

/// Schema version stamped on upgraded level files.
pub const SCHEMA_VERSION: u32 = 2;

/// Text keyed by language code.
///
/// Serializes supported languages first in `ko, zh, en, ja` order and any
/// other code afterwards alphabetically, so rewritten files diff cleanly.
/// Entries whose value is `null` are dropped while reading.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LocalizedText(BTreeMap<String, String>);

impl LocalizedText {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, code: &str) -> Option<&str> {
        self.0.get(code).map(String::as_str)
    }

    pub fn insert(&mut self, code: impl Into<String>, text: impl Into<String>) {
        self.0.insert(code.into(), text.into());
    }

    pub fn contains(&self, code: &str) -> bool {
        self.0.contains_key(code)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// First supported language with no entry, if any.
    pub fn first_missing(&self) -> Option<&'static str> {
        SUPPORTED_LANGUAGES
            .iter()
            .copied()
            .find(|code| !self.contains(code))
    }

    /// Copy non-empty entries, stripped of surrounding whitespace.
    ///
    /// When `only_supported` is set, codes outside the four level languages
    /// are dropped.
    pub fn cleaned(&self, only_supported: bool) -> Self {
        let entries = self
            .0
            .iter()
            .filter(|(code, _)| !only_supported || SUPPORTED_LANGUAGES.contains(&code.as_str()))
            .map(|(code, text)| (code.clone(), text.trim().to_string()))
            .filter(|(_, text)| !text.is_empty())
            .collect();
        Self(entries)
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for LocalizedText {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(
            iter.into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }
}

impl Serialize for LocalizedText {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for code in SUPPORTED_LANGUAGES {
            if let Some(text) = self.0.get(code) {
                map.serialize_entry(code, text)?;
            }
        }
        for (code, text) in &self.0 {
            if !SUPPORTED_LANGUAGES.contains(&code.as_str()) {
                map.serialize_entry(code, text)?;
            }
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for LocalizedText {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let entries = BTreeMap::<String, Option<String>>::deserialize(deserializer)?;
        Ok(Self(
            entries
                .into_iter()
                .filter_map(|(code, text)| Some((code, text?)))
                .collect(),
        ))
    }
}

// ==================== Normalized shape ====================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Level {
    pub id: String,
    pub difficulty: serde_json::Value,
    pub version: u32,
    pub language: Vec<String>,
    #[serde(rename = "tutorialSteps")]
    pub tutorial_steps: Vec<LocalizedText>,
    pub groups: Vec<Group>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Group {
    pub id: String,
    pub category: LocalizedText,
    #[serde(rename = "colorPreset", skip_serializing_if = "Option::is_none")]
    pub color_preset: Option<String>,
    pub tiles: Vec<Tile>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Tile {
    pub id: String,
    pub text: LocalizedText,
}

// ==================== Legacy shape ====================

/// A field that is either free text or already split by language.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum LegacyText {
    Plain(String),
    Localized(LocalizedText),
}

#[derive(Debug, Clone, Deserialize)]
pub struct LegacyLevel {
    pub id: String,
    pub difficulty: serde_json::Value,
    #[serde(rename = "tutorialSteps", default)]
    pub tutorial_steps: Option<Vec<LegacyText>>,
    #[serde(default)]
    pub groups: Vec<LegacyGroup>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LegacyGroup {
    pub id: String,
    pub category: LegacyText,
    #[serde(rename = "colorPreset", default)]
    pub color_preset: Option<String>,
    #[serde(default)]
    pub tiles: Vec<LegacyTile>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LegacyTile {
    pub id: String,
    #[serde(default)]
    pub text: Option<LegacyText>,
    #[serde(rename = "languageCode", default)]
    pub language_code: Option<String>,
    #[serde(default)]
    pub translations: LocalizedText,
}
