//! Title normalization.
//!
//! Text is NFC-normalized so composed and decomposed Hangul compare equal,
//! lowercased, stripped of punctuation and symbols, then split on whitespace.

use std::collections::BTreeSet;

use unicode_normalization::UnicodeNormalization;

/// A normalized word plus whether it was capitalized where it appeared.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Word {
    pub text: String,
    pub capitalized: bool,
}

/// Normalize `text` into its set of comparable tokens.
pub fn tokenize(text: &str) -> BTreeSet<String> {
    words(text).into_iter().map(|w| w.text).collect()
}

/// Normalize `text` into an ordered word sequence.
pub fn words(text: &str) -> Vec<Word> {
    let composed: String = text.nfc().collect();
    composed
        .split_whitespace()
        .filter_map(|raw| {
            let kept: String = raw.chars().filter(|c| c.is_alphanumeric()).collect();
            if kept.is_empty() {
                return None;
            }
            let capitalized = kept.chars().next().is_some_and(char::is_uppercase);
            Some(Word {
                text: kept.to_lowercase(),
                capitalized,
            })
        })
        .collect()
}
