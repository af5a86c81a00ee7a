//! Keyword scoring.
//!
//! A keyword phrase is scored against an utterance with two strategies and
//! the better one wins:
//! 1. Substring containment of the whole phrase in the normalized utterance
//! 2. Fuzzy similarity (normalized Levenshtein) against each content token
//!
//! Every score lies in `[0, 1]`.

use super::normalizer::NormalizedText;
use super::tokenizer::TokenSequence;

/// Default base score of a substring hit.
pub const DEFAULT_SUBSTRING_BASE: f64 = 0.95;
/// Default bonus per keyword character on a substring hit.
pub const DEFAULT_LENGTH_WEIGHT: f64 = 0.01;

/// Levenshtein distance with unit costs, computed over characters.
///
/// Only the previous row of the DP table is kept.
pub fn levenshtein(a: &str, b: &str) -> usize {
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();

    if a.is_empty() {
        return b.len();
    }
    if b.is_empty() {
        return a.len();
    }

    let mut previous: Vec<usize> = (0..=b.len()).collect();
    let mut current = vec![0; b.len() + 1];

    for (i, ca) in a.iter().enumerate() {
        current[0] = i + 1;
        for (j, cb) in b.iter().enumerate() {
            let cost = usize::from(ca != cb);
            current[j + 1] = (previous[j + 1] + 1) // deletion
                .min(current[j] + 1) // insertion
                .min(previous[j] + cost); // substitution
        }
        std::mem::swap(&mut previous, &mut current);
    }

    previous[b.len()]
}

/// `1 - distance / max_len`. Zero when either side is empty.
pub fn similarity(a: &str, b: &str) -> f64 {
    let len_a = a.chars().count();
    let len_b = b.chars().count();
    if len_a == 0 || len_b == 0 {
        return 0.0;
    }

    let distance = levenshtein(a, b) as f64;
    1.0 - distance / len_a.max(len_b) as f64
}

/// Scores one keyword phrase against an utterance.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SimilarityScorer {
    substring_base: f64,
    length_weight: f64,
}

impl Default for SimilarityScorer {
    fn default() -> Self {
        Self::new(DEFAULT_SUBSTRING_BASE, DEFAULT_LENGTH_WEIGHT)
    }
}

impl SimilarityScorer {
    pub fn new(substring_base: f64, length_weight: f64) -> Self {
        Self {
            substring_base,
            length_weight,
        }
    }

    /// Score of a whole-phrase hit, capped at 1.0.
    pub fn substring_score(&self, keyword: &str) -> f64 {
        let length = keyword.chars().count() as f64;
        (self.substring_base + length * self.length_weight).clamp(0.0, 1.0)
    }

    /// Best fuzzy similarity between the keyword and any single token.
    pub fn token_score(&self, tokens: &TokenSequence, keyword: &str) -> f64 {
        tokens
            .iter()
            .map(|token| similarity(token, keyword))
            .fold(0.0, f64::max)
    }

    /// Keyword score: the max of the substring and token strategies.
    pub fn score(&self, utterance: &NormalizedText, tokens: &TokenSequence, keyword: &str) -> f64 {
        let substring = if !keyword.is_empty() && utterance.contains(keyword) {
            self.substring_score(keyword)
        } else {
            0.0
        };

        substring.max(self.token_score(tokens, keyword))
    }
}
