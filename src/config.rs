use anyhow::{bail, Context, Result};
use std::ops::RangeInclusive;
use std::path::PathBuf;

/// Levels rewritten by the schema upgrade unless `UPGRADE_LEVELS` says otherwise.
pub const DEFAULT_UPGRADE_LEVELS: RangeInclusive<u32> = 2..=20;

#[derive(Debug, Clone)]
pub struct Config {
    // Storage
    pub levels_dir: PathBuf,
    pub overrides_file: Option<PathBuf>,
    pub upgrade_levels: RangeInclusive<u32>,

    // OpenAI
    pub openai_api_key: String,
    pub openai_model: String,
    pub openai_api_url: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        Ok(Self {
            // Storage
            levels_dir: std::env::var("LEVELS_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from("public/levels")),
            overrides_file: std::env::var("OVERRIDES_FILE").ok().map(PathBuf::from),
            upgrade_levels: match std::env::var("UPGRADE_LEVELS") {
                Ok(value) => parse_level_range(&value)
                    .with_context(|| format!("Invalid UPGRADE_LEVELS value '{}'", value))?,
                Err(_) => DEFAULT_UPGRADE_LEVELS,
            },

            // OpenAI
            openai_api_key: std::env::var("OPENAI_API_KEY")
                .context("OPENAI_API_KEY not set")?,
            openai_model: std::env::var("OPENAI_MODEL")
                .unwrap_or_else(|_| "gpt-4o-mini".to_string()),
            openai_api_url: std::env::var("OPENAI_API_URL")
                .unwrap_or_else(|_| "https://api.openai.com/v1/chat/completions".to_string()),
        })
    }

    /// File names the schema upgrade targets, e.g. `level-002.json`.
    pub fn upgrade_targets(&self) -> Vec<String> {
        self.upgrade_levels.clone().map(level_file_name).collect()
    }
}

/// Build the file name for a level index (`7` -> `level-007.json`).
pub fn level_file_name(index: u32) -> String {
    format!("level-{:03}.json", index)
}

/// Parse `first-last` (inclusive) or a single index.
fn parse_level_range(value: &str) -> Result<RangeInclusive<u32>> {
    let value = value.trim();
    let (first, last) = match value.split_once('-') {
        Some((first, last)) => (first.trim(), last.trim()),
        None => (value, value),
    };

    let first: u32 = first.parse().context("range start is not a number")?;
    let last: u32 = last.parse().context("range end is not a number")?;
    if first > last {
        bail!("range start {} is after range end {}", first, last);
    }

    Ok(first..=last)
}
