//! Punctuation-aware tokenization shared by every baseline metric.
//!
//! A token is either a maximal run of word characters (Unicode letters,
//! numbers, and `_`) or a single other non-whitespace character. Combining
//! marks such as Arabic harakat are not word characters, so each one is a
//! token of its own. Whitespace never produces a token.

use once_cell::sync::Lazy;
use regex::Regex;

static TOKEN_REGEX: Lazy<Regex> = Lazy::new(|| Regex::new(r"[\p{L}\p{N}_]+|\S").unwrap());

/// Split `text` into word and punctuation tokens.
///
/// The input is trimmed first. Multi-character punctuation such as `"..."`
/// yields one token per character.
pub fn tokenize(text: &str) -> Vec<&str> {
    TOKEN_REGEX
        .find_iter(text.trim())
        .map(|m| m.as_str())
        .collect()
}

/// Number of tokens in `text`.
pub fn token_count(text: &str) -> usize {
    TOKEN_REGEX.find_iter(text.trim()).count()
}
