// src/normalize.rs
//! Text normalization shared by every matching step.
//!
//! All keyword, rubro, product, client and exclusion comparisons run over
//! text that went through [`normalize`] first, so matching is insensitive
//! to accents, case and stray whitespace.

use once_cell::sync::OnceCell;
use regex::Regex;
use unicode_normalization::char::is_combining_mark;
use unicode_normalization::UnicodeNormalization;

/// Normalize a free-text field for matching: NFD-decompose, strip combining
/// marks (removes tildes/diacritics), collapse whitespace runs to a single
/// space, trim and lowercase.
///
/// Total over all inputs and idempotent; never fails.
pub fn normalize(text: &str) -> String {
    let stripped: String = text.nfd().filter(|c| !is_combining_mark(*c)).collect();

    static RE_WS: OnceCell<Regex> = OnceCell::new();
    let re_ws = RE_WS.get_or_init(|| Regex::new(r"\s+").unwrap());
    re_ws
        .replace_all(&stripped, " ")
        .trim()
        .to_lowercase()
}

/// Pass-through variant for optional fields: missing stays missing.
pub fn normalize_opt(text: Option<&str>) -> Option<String> {
    text.map(normalize)
}

/// Tokenize normalized text on word boundaries (`\w+` runs).
pub fn word_tokens(text: &str) -> Vec<String> {
    static RE_WORD: OnceCell<Regex> = OnceCell::new();
    let re = RE_WORD.get_or_init(|| Regex::new(r"\w+").unwrap());
    re.find_iter(text).map(|m| m.as_str().to_string()).collect()
}
