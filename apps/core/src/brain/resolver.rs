//! Intent resolution.
//!
//! Scores every intent of a [`KeywordIndex`] against an utterance and keeps
//! the best one if it clears the acceptance threshold. The first intent (in
//! index order) reaching the top score wins ties.

use super::keyword_index::{IntentId, KeywordIndex};
use super::normalizer::normalize;
use super::similarity::{SimilarityScorer, DEFAULT_LENGTH_WEIGHT, DEFAULT_SUBSTRING_BASE};
use super::tokenizer::TokenSequence;
use serde::{Deserialize, Serialize};
use tracing::debug;
use validator::Validate;

/// Default minimum score for accepting an intent.
pub const DEFAULT_THRESHOLD: f64 = 0.78;

/// Empirical matching constants. The defaults were tuned on the shipped
/// keyword and stopword tables; other catalogs may need different values.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase", default)]
pub struct MatchTuning {
    /// Minimum intent score to accept a match.
    #[validate(range(min = 0.0, max = 1.0))]
    pub threshold: f64,
    /// Base score of a whole-phrase substring hit.
    #[validate(range(min = 0.0, max = 1.0))]
    pub substring_base: f64,
    /// Extra score per keyword character on a substring hit.
    #[validate(range(min = 0.0, max = 1.0))]
    pub length_weight: f64,
}

impl Default for MatchTuning {
    fn default() -> Self {
        Self {
            threshold: DEFAULT_THRESHOLD,
            substring_base: DEFAULT_SUBSTRING_BASE,
            length_weight: DEFAULT_LENGTH_WEIGHT,
        }
    }
}

/// Outcome of a resolution: the accepted intent, if any, and the best score
/// seen (also reported when it fell below the threshold).
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MatchResult {
    pub intent: Option<IntentId>,
    pub score: f64,
}

impl MatchResult {
    fn none() -> Self {
        Self {
            intent: None,
            score: 0.0,
        }
    }

    pub fn is_match(&self) -> bool {
        self.intent.is_some()
    }
}

/// Resolves utterances against a keyword index.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct IntentResolver {
    scorer: SimilarityScorer,
    threshold: f64,
}

impl Default for IntentResolver {
    fn default() -> Self {
        Self::new(MatchTuning::default())
    }
}

impl IntentResolver {
    pub fn new(tuning: MatchTuning) -> Self {
        Self {
            scorer: SimilarityScorer::new(tuning.substring_base, tuning.length_weight),
            threshold: tuning.threshold,
        }
    }

    pub fn threshold(&self) -> f64 {
        self.threshold
    }

    /// Best intent for `utterance`, or `None` below the threshold.
    pub fn resolve(&self, index: &KeywordIndex, utterance: &str) -> Option<IntentId> {
        self.evaluate(index, utterance).intent
    }

    /// Like [`resolve`](Self::resolve) but also reports the best score.
    pub fn evaluate(&self, index: &KeywordIndex, utterance: &str) -> MatchResult {
        let normalized = normalize(utterance);
        if normalized.is_empty() {
            return MatchResult::none();
        }
        let tokens = TokenSequence::from_normalized(&normalized);

        let mut best: Option<(&IntentId, f64)> = None;
        for record in index.iter() {
            let intent_score = record
                .keywords()
                .iter()
                .map(|keyword| self.scorer.score(&normalized, &tokens, keyword))
                .fold(0.0, f64::max);

            // strict: earlier intents keep ties
            if best.map_or(true, |(_, score)| intent_score > score) {
                best = Some((record.id(), intent_score));
            }
        }

        let Some((intent, score)) = best else {
            return MatchResult::none();
        };

        debug!(
            utterance = %normalized,
            best_intent = %intent,
            score,
            threshold = self.threshold,
            "Intent scored"
        );

        // a zero score never selects an intent, whatever the threshold
        MatchResult {
            intent: (score > 0.0 && score >= self.threshold).then(|| intent.clone()),
            score,
        }
    }
}

/// Resolve with the default tuning.
pub fn resolve(index: &KeywordIndex, utterance: &str) -> Option<IntentId> {
    IntentResolver::default().resolve(index, utterance)
}
