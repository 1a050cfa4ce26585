//! Language codes used by level files.
//!
//! Level files identify languages by short codes (`ko`, `zh`, `en`, `ja`).
//! The translation backend expects the Chinese source as `zh-cn`, so this
//! module also owns the mapping between the two code spaces.

use std::collections::BTreeSet;

/// Languages every migrated level carries, in canonical order.
pub const SUPPORTED_LANGUAGES: [&str; 4] = ["ko", "zh", "en", "ja"];

/// Language whose text seeds every machine translation.
pub const SOURCE_LANGUAGE: &str = "zh";

pub const DEFAULT_GAME_LANGUAGE: &str = "ko";
pub const DEFAULT_DEFINITION_LANGUAGES: [&str; 1] = ["zh"];
pub const MIN_DEFINITION_LANGUAGES: u64 = 1;
pub const MAX_DEFINITION_LANGUAGES: u64 = 3;

/// Check whether a code is one of the four supported level languages.
pub fn is_supported(code: &str) -> bool {
    SUPPORTED_LANGUAGES.contains(&code)
}

/// Map a level-file code to the code the translation backend expects.
pub fn translator_code(code: &str) -> &str {
    match code {
        "zh" => "zh-cn",
        other => other,
    }
}

/// English name of a language, used when prompting the translation model.
///
/// Accepts both level-file and translator codes. Unknown codes are returned
/// unchanged so the model still gets something meaningful.
pub fn language_name(code: &str) -> &str {
    match code {
        "ko" => "Korean",
        "zh" | "zh-cn" => "Simplified Chinese",
        "en" => "English",
        "ja" => "Japanese",
        other => other,
    }
}

/// Deduplicate language codes and put them in menu order.
///
/// Supported languages come first in `ko, zh, en, ja` order; any other code
/// follows, sorted alphabetically. The output depends only on the set of
/// codes given, never on their order.
pub fn normalize_language_codes<I, S>(codes: I) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let unique: BTreeSet<String> = codes
        .into_iter()
        .map(|c| c.as_ref().to_string())
        .filter(|c| !c.is_empty())
        .collect();

    let mut ordered: Vec<String> = unique.into_iter().collect();
    ordered.sort_by(|a, b| rank(a).cmp(&rank(b)).then_with(|| a.cmp(b)));
    ordered
}

fn rank(code: &str) -> usize {
    SUPPORTED_LANGUAGES
        .iter()
        .position(|c| *c == code)
        .unwrap_or(SUPPORTED_LANGUAGES.len())
}
