//! Tokenization with stopword filtering.
//!
//! Splits normalized text into content words. The Italian and English
//! stopword tables are always consulted together; there is no language
//! detection. Entries are stored already normalized (no accents).

use super::normalizer::{normalize, NormalizedText};
use std::collections::HashSet;
use std::sync::LazyLock;

/// Stopwords for Italian language
const STOPWORDS_IT: &[&str] = &[
    "il", "lo", "la", "i", "gli", "le", "un", "uno", "una", "di", "del", "dello", "della", "dei",
    "degli", "delle", "a", "al", "allo", "alla", "ai", "agli", "alle", "da", "dal", "dalla", "in",
    "nel", "nello", "nella", "nei", "negli", "nelle", "con", "su", "sul", "sulla", "per", "tra",
    "fra", "e", "ed", "o", "ma", "che", "chi", "cui", "non", "si", "mi", "ti", "ci", "vi", "ne",
    "io", "tu", "lui", "lei", "noi", "voi", "loro", "mio", "mia", "tuo", "tua", "suo", "sua",
    "questo", "questa", "quello", "quella", "come", "dove", "quando", "perche", "quale", "quali",
    "sono", "sei", "ho", "hai", "ha", "abbiamo", "avete", "hanno", "c", "l", "gia", "piu",
];

/// Stopwords for English language
const STOPWORDS_EN: &[&str] = &[
    "the", "a", "an", "and", "or", "but", "of", "to", "in", "on", "at", "for", "with", "from",
    "by", "is", "are", "was", "be", "do", "does", "can", "could", "would", "i", "you", "he",
    "she", "it", "we", "they", "me", "my", "your", "our", "this", "that", "what", "where",
    "when", "how", "who", "s", "please", "there",
];

static STOPWORDS: LazyLock<HashSet<String>> = LazyLock::new(|| {
    STOPWORDS_IT
        .iter()
        .chain(STOPWORDS_EN.iter())
        .map(|word| normalize(word).into_string())
        .filter(|word| !word.is_empty())
        .collect()
});

/// Check if a normalized word is a stopword in either language
pub fn is_stopword(word: &str) -> bool {
    STOPWORDS.contains(word)
}

/// Ordered content words of an utterance. Duplicates are kept.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TokenSequence(Vec<String>);

impl TokenSequence {
    /// Tokens from text that is already normalized.
    pub fn from_normalized(text: &NormalizedText) -> Self {
        Self(
            text.words()
                .filter(|word| !is_stopword(word))
                .map(str::to_string)
                .collect(),
        )
    }

    pub fn as_slice(&self) -> &[String] {
        &self.0
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn into_vec(self) -> Vec<String> {
        self.0
    }
}

/// Normalize `text` and split it into content words.
pub fn tokenize(text: &str) -> TokenSequence {
    TokenSequence::from_normalized(&normalize(text))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_english_stopwords_removed() {
        assert_eq!(tokenize("the wifi password").into_vec(), vec!["wifi", "password"]);
    }

    #[test]
    fn test_italian_stopwords_removed() {
        let tokens = tokenize("Qual è la password del wifi?").into_vec();
        assert_eq!(tokens, vec!["qual", "password", "wifi"]);
    }

    #[test]
    fn test_accented_stopword_matches() {
        // "perché" normalizes to "perche", which is in the table
        assert_eq!(tokenize("Perché?").into_vec(), Vec::<String>::new());
    }

    #[test]
    fn test_both_tables_always_consulted() {
        let tokens = tokenize("the chiave della stanza and the key").into_vec();
        assert_eq!(tokens, vec!["chiave", "stanza", "key"]);
    }

    #[test]
    fn test_order_and_duplicates_preserved() {
        let tokens = tokenize("taxi Taxi TAXI bus").into_vec();
        assert_eq!(tokens, vec!["taxi", "taxi", "taxi", "bus"]);
    }

    #[test]
    fn test_empty_text() {
        assert!(tokenize("").is_empty());
        assert!(tokenize("   ").is_empty());
        assert!(tokenize("the a an").is_empty());
    }

    #[test]
    fn test_table_sizes() {
        assert!(STOPWORDS_IT.len() >= 75);
        assert!(STOPWORDS_EN.len() >= 40);
    }

    #[test]
    fn test_stopwords_are_normalized() {
        for word in STOPWORDS.iter() {
            assert_eq!(normalize(word).as_str(), word.as_str());
            assert!(!word.contains(' '), "stopword {:?} spans two words", word);
        }
    }
}
