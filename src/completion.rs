//! Translation completion job.
//!
//! Fills in missing `en`/`ja` tile translations from the tile's `zh` text and
//! keeps each level's `languageProfile` in sync with the languages its tiles
//! actually carry. Level files are handled as raw JSON so fields this job
//! does not know about survive untouched, in their original order.

use crate::error::{MigrationError, Result};
use crate::language::{
    normalize_language_codes, translator_code, DEFAULT_DEFINITION_LANGUAGES,
    DEFAULT_GAME_LANGUAGE, MAX_DEFINITION_LANGUAGES, MIN_DEFINITION_LANGUAGES, SOURCE_LANGUAGE,
};
use crate::report::{FileOutcome, RunReport};
use crate::retry::RetryConfig;
use crate::storage::{display_name, list_level_files, read_json, write_json};
use crate::translation::{translate_with_retry, Translator};
use serde_json::{Map, Value};
use std::collections::BTreeSet;
use std::path::Path;
use tracing::{debug, info};

/// Languages filled in from `zh` when a tile lacks them.
const COMPLETION_TARGETS: [&str; 2] = ["en", "ja"];

/// How many normalized codes seed `definitions.defaults`.
const DEFAULT_DEFINITION_COUNT: usize = 2;

pub struct CompletionJob<'a, T: Translator + ?Sized> {
    translator: &'a T,
    retry: RetryConfig,
    dry_run: bool,
    translations: usize,
}

impl<'a, T: Translator + ?Sized> CompletionJob<'a, T> {
    pub fn new(translator: &'a T) -> Self {
        Self {
            translator,
            retry: RetryConfig::translation(),
            dry_run: false,
            translations: 0,
        }
    }

    pub fn with_retry_config(mut self, retry: RetryConfig) -> Self {
        self.retry = retry;
        self
    }

    /// Compute every change but never write files.
    pub fn with_dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    /// Process every `level-*.json` file in `dir`, in name order.
    pub async fn run(&mut self, dir: &Path) -> Result<RunReport> {
        let files = list_level_files(dir)?;
        if files.is_empty() {
            return Err(MigrationError::NoInput {
                dir: dir.to_path_buf(),
            });
        }

        info!("Completing translations for {} level files", files.len());

        let mut report = RunReport::default();
        for path in &files {
            let outcome = self.process_file(path).await?;
            report.record(display_name(path), outcome);
        }
        report.translations = self.translations;

        Ok(report)
    }

    /// Complete one level file, rewriting it only if something changed.
    pub async fn process_file(&mut self, path: &Path) -> Result<FileOutcome> {
        let name = display_name(path);
        let mut document: Value = read_json(path)?;

        let changed = self.complete_level(&mut document).await.map_err(|e| match e {
            MigrationError::Json { source, .. } => MigrationError::Json {
                path: path.to_path_buf(),
                source,
            },
            other => other,
        })?;

        if !changed {
            info!("Skipped {} (no changes)", name);
            return Ok(FileOutcome::Skipped);
        }

        if self.dry_run {
            info!("Would update {} (dry run)", name);
        } else {
            write_json(path, &document)?;
            info!("Updated {}", name);
        }
        Ok(FileOutcome::Updated)
    }

    /// Apply translation completion and profile repair to a level document.
    ///
    /// Returns whether the document changed.
    pub async fn complete_level(&mut self, document: &mut Value) -> Result<bool> {
        let root = document.as_object_mut().ok_or_else(|| MigrationError::Json {
            path: Default::default(),
            source: serde::de::Error::custom("level document must be a JSON object"),
        })?;

        let mut changed = false;
        let mut observed = BTreeSet::new();

        if let Some(groups) = root.get_mut("groups").and_then(Value::as_array_mut) {
            for group in groups {
                let Some(tiles) = group.get_mut("tiles").and_then(Value::as_array_mut) else {
                    continue;
                };
                for tile in tiles {
                    let Some(translations) =
                        tile.get_mut("translations").and_then(Value::as_object_mut)
                    else {
                        continue;
                    };
                    changed |= self.complete_tile(translations).await?;
                    observed.extend(translations.keys().cloned());
                }
            }
        }

        let normalized = normalize_language_codes(&observed);
        let first_tile_language = first_tile_language(root);

        let profile = object_entry(root, "languageProfile", &mut changed);
        repair_game_profile(
            object_entry(profile, "game", &mut changed),
            first_tile_language.as_deref(),
            &mut changed,
        );
        repair_definitions_profile(
            object_entry(profile, "definitions", &mut changed),
            &normalized,
            &mut changed,
        );

        Ok(changed)
    }

    async fn complete_tile(&mut self, translations: &mut Map<String, Value>) -> Result<bool> {
        let Some(source) = translations
            .get(SOURCE_LANGUAGE)
            .and_then(Value::as_str)
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string)
        else {
            return Ok(false);
        };

        let mut changed = false;
        for dest in COMPLETION_TARGETS {
            if has_text(translations, dest) {
                continue;
            }
            let translated = self.translate(&source, dest).await?;
            debug!("Translated '{}' -> {} '{}'", source, dest, translated);
            translations.insert(dest.to_string(), Value::String(translated));
            changed = true;
        }
        Ok(changed)
    }

    async fn translate(&mut self, text: &str, dest: &str) -> Result<String> {
        let translated = translate_with_retry(
            self.translator,
            &self.retry,
            text,
            translator_code(SOURCE_LANGUAGE),
            dest,
        )
        .await?;
        self.translations += 1;
        Ok(translated)
    }
}

fn has_text(map: &Map<String, Value>, key: &str) -> bool {
    map.get(key)
        .and_then(Value::as_str)
        .map(|s| !s.trim().is_empty())
        .unwrap_or(false)
}

/// `languageCode` of the first group's first tile that declares one.
fn first_tile_language(root: &Map<String, Value>) -> Option<String> {
    root.get("groups")?
        .as_array()?
        .iter()
        .filter_map(|group| group.get("tiles")?.as_array()?.first())
        .filter_map(|tile| tile.get("languageCode")?.as_str())
        .find(|code| !code.is_empty())
        .map(str::to_string)
}

/// Get `map[key]` as an object, creating or replacing it when needed.
fn object_entry<'m>(
    map: &'m mut Map<String, Value>,
    key: &str,
    changed: &mut bool,
) -> &'m mut Map<String, Value> {
    let slot = map.entry(key.to_string()).or_insert(Value::Null);
    if !slot.is_object() {
        *slot = Value::Object(Map::new());
        *changed = true;
    }
    slot.as_object_mut().expect("slot holds an object")
}

fn string_array(codes: &[String]) -> Value {
    Value::Array(codes.iter().cloned().map(Value::String).collect())
}

fn repair_game_profile(
    game: &mut Map<String, Value>,
    first_tile_language: Option<&str>,
    changed: &mut bool,
) {
    let default = match game.get("default").and_then(Value::as_str) {
        Some(code) => code.to_string(),
        None => {
            let code = first_tile_language.unwrap_or(DEFAULT_GAME_LANGUAGE).to_string();
            game.insert("default".to_string(), Value::String(code.clone()));
            *changed = true;
            code
        }
    };

    let has_options = game
        .get("options")
        .and_then(Value::as_array)
        .map(|options| !options.is_empty())
        .unwrap_or(false);
    if !has_options {
        game.insert("options".to_string(), string_array(&[default]));
        *changed = true;
    }
}

fn repair_definitions_profile(
    definitions: &mut Map<String, Value>,
    normalized: &[String],
    changed: &mut bool,
) {
    let options = string_array(normalized);
    if !normalized.is_empty() && definitions.get("options") != Some(&options) {
        definitions.insert("options".to_string(), options);
        *changed = true;
    }

    let has_defaults = definitions
        .get("defaults")
        .and_then(Value::as_array)
        .map(|defaults| !defaults.is_empty())
        .unwrap_or(false);
    if !has_defaults {
        let defaults: Vec<String> = if normalized.is_empty() {
            DEFAULT_DEFINITION_LANGUAGES.iter().map(|c| c.to_string()).collect()
        } else {
            normalized.iter().take(DEFAULT_DEFINITION_COUNT).cloned().collect()
        };
        definitions.insert("defaults".to_string(), string_array(&defaults));
        *changed = true;
    }

    let mut min = definitions.get("min").and_then(Value::as_u64);
    let mut max = definitions.get("max").and_then(Value::as_u64);
    if min.is_none() {
        definitions.insert("min".to_string(), MIN_DEFINITION_LANGUAGES.into());
        min = Some(MIN_DEFINITION_LANGUAGES);
        *changed = true;
    }
    if max.is_none() {
        definitions.insert("max".to_string(), MAX_DEFINITION_LANGUAGES.into());
        max = Some(MAX_DEFINITION_LANGUAGES);
        *changed = true;
    }

    if let (Some(min), Some(max)) = (min, max) {
        if min > max {
            definitions.insert("min".to_string(), max.into());
            definitions.insert("max".to_string(), min.into());
            *changed = true;
        }
    }
}
