//! Schema upgrade job.
//!
//! Rebuilds legacy level files into the normalized four-language shape. Only
//! an explicit list of files is touched, and every touched file is rewritten
//! from scratch.

use crate::error::{MigrationError, Result};
use crate::language::{translator_code, SOURCE_LANGUAGE, SUPPORTED_LANGUAGES};
use crate::level::{
    Group, LegacyGroup, LegacyLevel, LegacyText, LegacyTile, Level, LocalizedText, Tile,
    SCHEMA_VERSION,
};
use crate::overrides::OverrideTables;
use crate::report::{FileOutcome, RunReport};
use crate::retry::RetryConfig;
use crate::storage::{display_name, read_json, write_json};
use crate::translation::{translate_with_retry, Translator};
use std::path::Path;
use tracing::{debug, info, warn};

pub struct UpgradeJob<'a, T: Translator + ?Sized> {
    translator: &'a T,
    overrides: OverrideTables,
    retry: RetryConfig,
    dry_run: bool,
    translations: usize,
}

impl<'a, T: Translator + ?Sized> UpgradeJob<'a, T> {
    /// `overrides` doubles as the run's category cache; labels translated on
    /// demand are added to it and never written back to disk.
    pub fn new(translator: &'a T, overrides: OverrideTables) -> Self {
        Self {
            translator,
            overrides,
            retry: RetryConfig::translation(),
            dry_run: false,
            translations: 0,
        }
    }

    pub fn with_retry_config(mut self, retry: RetryConfig) -> Self {
        self.retry = retry;
        self
    }

    pub fn with_dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    /// Upgrade each named file in `dir`. Names that do not exist are skipped.
    pub async fn run(&mut self, dir: &Path, targets: &[String]) -> Result<RunReport> {
        info!("Upgrading up to {} level files in {}", targets.len(), dir.display());

        let mut report = RunReport::default();
        for name in targets {
            let path = dir.join(name);
            if !path.is_file() {
                warn!("Skipping {} (not found)", name);
                report.missing.push(name.clone());
                continue;
            }
            let outcome = self.process_file(&path).await?;
            report.record(name.clone(), outcome);
        }
        report.translations = self.translations;

        if report.updated.is_empty() {
            return Err(MigrationError::NoInput {
                dir: dir.to_path_buf(),
            });
        }

        Ok(report)
    }

    /// Upgrade one level file. Nothing is written if any tile fails validation.
    pub async fn process_file(&mut self, path: &Path) -> Result<FileOutcome> {
        let name = display_name(path);
        let legacy: LegacyLevel = read_json(path)?;

        let level = self.upgrade_level(&legacy, &name).await?;

        if self.dry_run {
            info!("Would upgrade {} (dry run)", name);
        } else {
            write_json(path, &level)?;
            info!("Upgraded {}", name);
        }
        Ok(FileOutcome::Updated)
    }

    pub async fn upgrade_level(&mut self, legacy: &LegacyLevel, level_name: &str) -> Result<Level> {
        let mut tutorial_steps = Vec::new();
        for step in legacy.tutorial_steps.iter().flatten() {
            match step {
                LegacyText::Localized(text) => tutorial_steps.push(text.cleaned(true)),
                LegacyText::Plain(text) if text.trim().is_empty() => {
                    debug!("Dropping empty tutorial step in {}", level_name);
                }
                LegacyText::Plain(text) => {
                    tutorial_steps.push(self.translate_from_source(text.trim()).await?);
                }
            }
        }

        let mut groups = Vec::with_capacity(legacy.groups.len());
        for group in &legacy.groups {
            groups.push(self.upgrade_group(group, level_name).await?);
        }

        Ok(Level {
            id: legacy.id.clone(),
            difficulty: legacy.difficulty.clone(),
            version: SCHEMA_VERSION,
            language: SUPPORTED_LANGUAGES.iter().map(|c| c.to_string()).collect(),
            tutorial_steps,
            groups,
        })
    }

    async fn upgrade_group(&mut self, group: &LegacyGroup, level_name: &str) -> Result<Group> {
        let category = self.resolve_category(&group.category).await?;

        let mut tiles = Vec::with_capacity(group.tiles.len());
        for tile in &group.tiles {
            let text = self.resolve_tile_text(tile).await?;
            if let Some(language) = text.first_missing() {
                return Err(MigrationError::MissingTranslation {
                    level: level_name.to_string(),
                    group: group.id.clone(),
                    tile: tile.id.clone(),
                    language: language.to_string(),
                });
            }
            tiles.push(Tile {
                id: tile.id.clone(),
                text,
            });
        }

        Ok(Group {
            id: group.id.clone(),
            category,
            color_preset: group.color_preset.clone(),
            tiles,
        })
    }

    /// Resolve a category to a four-language label.
    ///
    /// Priority: a map whose `zh` label has an override, a string label with
    /// an override, then machine translation of the string label.
    pub async fn resolve_category(&mut self, category: &LegacyText) -> Result<LocalizedText> {
        match category {
            LegacyText::Localized(text) => {
                if let Some(known) = text.get(SOURCE_LANGUAGE).and_then(|zh| self.overrides.category(zh)) {
                    return Ok(known.clone());
                }
                warn!(
                    "Category {:?} matches no override; keeping it unchanged",
                    text.get(SOURCE_LANGUAGE).unwrap_or_default()
                );
                Ok(text.clone())
            }
            LegacyText::Plain(label) => {
                let label = label.trim();
                if let Some(known) = self.overrides.category(label) {
                    return Ok(known.clone());
                }
                let text = self.translate_from_source(label).await?;
                self.overrides.remember_category(label, text.clone());
                Ok(text)
            }
        }
    }

    /// Resolve a tile's text to a map over the supported languages.
    ///
    /// A per-language map is taken as authored. Free text is merged with the
    /// tile's `translations`, and languages still missing are translated from
    /// `zh` when present. The English override table applies to `en` only.
    pub async fn resolve_tile_text(&mut self, tile: &LegacyTile) -> Result<LocalizedText> {
        let mut text = match &tile.text {
            Some(LegacyText::Localized(text)) => text.cleaned(true),
            plain => {
                let mut text = LocalizedText::new();
                if let (Some(LegacyText::Plain(base)), Some(code)) = (plain, &tile.language_code) {
                    text.insert(code.as_str(), base.as_str());
                }
                for (code, value) in tile.translations.iter() {
                    text.insert(code, value);
                }
                let mut text = text.cleaned(true);
                self.fill_from_source(&mut text).await?;
                text
            }
        };

        let english = text
            .get("en")
            .map(|en| self.overrides.english_tile_text(en).trim().to_string());
        if let Some(english) = english {
            text.insert("en", english);
        }

        Ok(text)
    }

    async fn fill_from_source(&mut self, text: &mut LocalizedText) -> Result<()> {
        let Some(source) = text.get(SOURCE_LANGUAGE).map(str::to_string) else {
            return Ok(());
        };
        for code in SUPPORTED_LANGUAGES {
            if !text.contains(code) {
                let translated = self.translate(&source, code).await?;
                text.insert(code, translated);
            }
        }
        Ok(())
    }

    /// Treat `text` as Chinese and translate it to every other supported language.
    async fn translate_from_source(&mut self, text: &str) -> Result<LocalizedText> {
        let mut localized = LocalizedText::new();
        localized.insert(SOURCE_LANGUAGE, text);
        for code in ["en", "ko", "ja"] {
            let translated = self.translate(text, code).await?;
            localized.insert(code, translated);
        }
        Ok(localized)
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
        debug!("Translated '{}' -> {} '{}'", text, dest, translated);
        Ok(translated)
    }
}
