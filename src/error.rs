//! Error taxonomy shared by both migration jobs.

use std::path::PathBuf;
use thiserror::Error;

/// Failure reported by a translation backend.
///
/// Every variant is treated as transient: callers retry with
/// [`RetryConfig::translation`](crate::retry::RetryConfig::translation)
/// before giving up.
#[derive(Debug, Error)]
pub enum TranslationError {
    #[error("translation request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("translation API error ({status}): {body}")]
    Api { status: u16, body: String },

    #[error("translation response contained no text")]
    EmptyResponse,

    #[error("translation backend unavailable: {0}")]
    Unavailable(String),
}

/// Errors that abort a migration run.
#[derive(Debug, Error)]
pub enum MigrationError {
    #[error(transparent)]
    Translation(#[from] TranslationError),

    #[error("missing '{language}' translation in {level}:{group}:{tile}")]
    MissingTranslation {
        level: String,
        group: String,
        tile: String,
        language: String,
    },

    #[error("no level files found in {}", dir.display())]
    NoInput { dir: PathBuf },

    #[error("I/O error on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid level JSON in {}: {source}", path.display())]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("invalid override table: {0}")]
    Overrides(String),
}

pub type Result<T, E = MigrationError> = std::result::Result<T, E>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_translation_message_identifies_tile() {
        let err = MigrationError::MissingTranslation {
            level: "level-003.json".to_string(),
            group: "g1".to_string(),
            tile: "t4".to_string(),
            language: "ja".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "missing 'ja' translation in level-003.json:g1:t4"
        );
    }

    #[test]
    fn test_no_input_message_includes_dir() {
        let err = MigrationError::NoInput {
            dir: PathBuf::from("public/levels"),
        };
        assert!(err.to_string().contains("public/levels"));
    }

    #[test]
    fn test_translation_error_is_transparent() {
        let err: MigrationError = TranslationError::Api {
            status: 503,
            body: "busy".to_string(),
        }
        .into();
        assert_eq!(err.to_string(), "translation API error (503): busy");
    }
}
