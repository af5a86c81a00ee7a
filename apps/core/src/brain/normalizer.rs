//! Text normalization.
//!
//! Canonicalizes raw text before any comparison: lowercase, diacritics
//! stripped, everything that is not a letter or digit turned into a single
//! space, trimmed.

use regex::Regex;
use std::fmt;
use std::sync::LazyLock;
use unicode_normalization::char::is_combining_mark;
use unicode_normalization::UnicodeNormalization;

// NOTE: expect() is acceptable here, the pattern is a compile-time constant
static NON_ALPHANUMERIC: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"[^\p{L}\p{N}]+").expect("Invalid regex: non-alphanumeric run")
});

/// Text that went through [`normalize`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct NormalizedText(String);

impl NormalizedText {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Words of the normalized text, in order.
    pub fn words(&self) -> impl Iterator<Item = &str> {
        self.0.split(' ').filter(|w| !w.is_empty())
    }

    /// Substring test on the normalized form.
    pub fn contains(&self, needle: &str) -> bool {
        self.0.contains(needle)
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl fmt::Display for NormalizedText {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for NormalizedText {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Normalize raw text. Total and idempotent: empty or punctuation-only input
/// yields an empty result.
pub fn normalize(text: &str) -> NormalizedText {
    let folded: String = text
        .to_lowercase()
        .nfd()
        .filter(|c| !is_combining_mark(*c))
        .collect();

    let spaced = NON_ALPHANUMERIC.replace_all(&folded, " ");
    NormalizedText(spaced.trim().to_string())
}
