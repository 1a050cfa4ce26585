//! Reading and writing level files on disk.
//!
//! Files are UTF-8 JSON with 2-space indentation, non-ASCII characters kept
//! literal and a trailing newline. Writes land in a sibling temp file that is
//! renamed over the target.

use crate::error::{MigrationError, Result};
use regex::Regex;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

fn level_file_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"^level-\d+\.json$").expect("valid level file regex"))
}

/// Check whether a file name follows the `level-<index>.json` pattern.
pub fn is_level_file_name(name: &str) -> bool {
    level_file_pattern().is_match(name)
}

/// List level files in `dir`, sorted by name.
///
/// A directory that does not exist holds no level files.
pub fn list_level_files(dir: &Path) -> Result<Vec<PathBuf>> {
    let entries = match fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
        Err(source) => {
            return Err(MigrationError::Io {
                path: dir.to_path_buf(),
                source,
            })
        }
    };

    let mut files = Vec::new();
    for entry in entries {
        let entry = entry.map_err(|source| MigrationError::Io {
            path: dir.to_path_buf(),
            source,
        })?;
        let path = entry.path();
        let is_match = path
            .file_name()
            .and_then(|n| n.to_str())
            .map(is_level_file_name)
            .unwrap_or(false);
        if is_match && path.is_file() {
            files.push(path);
        }
    }

    files.sort();
    Ok(files)
}

/// File name of `path` for logs and error messages.
pub fn display_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

pub fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let raw = fs::read_to_string(path).map_err(|source| MigrationError::Io {
        path: path.to_path_buf(),
        source,
    })?;

    serde_json::from_str(&raw).map_err(|source| MigrationError::Json {
        path: path.to_path_buf(),
        source,
    })
}

/// Render a value the way level files are stored.
pub fn to_level_json<T: Serialize>(value: &T) -> serde_json::Result<String> {
    let mut rendered = serde_json::to_string_pretty(value)?;
    rendered.push('\n');
    Ok(rendered)
}

pub fn write_json<T: Serialize>(path: &Path, value: &T) -> Result<()> {
    let rendered = to_level_json(value).map_err(|source| MigrationError::Json {
        path: path.to_path_buf(),
        source,
    })?;

    let mut tmp_name = path.as_os_str().to_owned();
    tmp_name.push(".tmp");
    let tmp_path = PathBuf::from(tmp_name);

    fs::write(&tmp_path, rendered).map_err(|source| MigrationError::Io {
        path: tmp_path.clone(),
        source,
    })?;
    fs::rename(&tmp_path, path).map_err(|source| MigrationError::Io {
        path: path.to_path_buf(),
        source,
    })
}
