//! Offline migrations for the game's per-level JSON files.
//!
//! - [`completion`] fills missing tile translations and repairs each level's
//!   language profile.
//! - [`upgrade`] rewrites legacy level files into the four-language schema.

pub mod completion;
pub mod config;
pub mod error;
pub mod language;
pub mod level;
pub mod overrides;
pub mod report;
pub mod retry;
pub mod storage;
pub mod translation;
pub mod upgrade;
