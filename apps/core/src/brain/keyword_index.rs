//! Keyword index.
//!
//! An arena of immutable intent records, kept in the order the intents were
//! declared. Each keyword phrase is normalized but not tokenized, so a phrase
//! like "wi-fi" is stored as "wi fi" and matched as a unit.

use super::normalizer::normalize;
use serde::{Deserialize, Serialize};
use std::borrow::Borrow;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

/// Identifier of an intent, as written in the configuration.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct IntentId(Arc<str>);

impl IntentId {
    pub fn new(id: impl Into<Arc<str>>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for IntentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl Borrow<str> for IntentId {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl From<&str> for IntentId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

/// One intent and its normalized keyword phrases.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IntentRecord {
    id: IntentId,
    keywords: Vec<String>,
}

impl IntentRecord {
    pub fn id(&self) -> &IntentId {
        &self.id
    }

    pub fn keywords(&self) -> &[String] {
        &self.keywords
    }
}

/// Read-only keyword index. Safe to share across threads.
#[derive(Debug, Clone, Default)]
pub struct KeywordIndex {
    records: Vec<IntentRecord>,
    positions: HashMap<IntentId, usize>,
}

impl KeywordIndex {
    /// Build the index from intents in declaration order.
    ///
    /// Phrases that normalize to nothing are dropped. If an intent id shows up
    /// twice, the later phrases are appended to the first record, which keeps
    /// its original position.
    pub fn build<I, K, P, S>(intents: I) -> Self
    where
        I: IntoIterator<Item = (K, P)>,
        K: AsRef<str>,
        P: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut index = Self::default();

        for (id, phrases) in intents {
            let keywords = phrases
                .into_iter()
                .map(|phrase| normalize(phrase.as_ref()).into_string())
                .filter(|phrase| !phrase.is_empty());

            match index.positions.get(id.as_ref()) {
                Some(&position) => index.records[position].keywords.extend(keywords),
                None => {
                    let id = IntentId::new(id.as_ref());
                    index.positions.insert(id.clone(), index.records.len());
                    index.records.push(IntentRecord {
                        id,
                        keywords: keywords.collect(),
                    });
                }
            }
        }

        index
    }

    /// Records in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = &IntentRecord> {
        self.records.iter()
    }

    pub fn get(&self, id: &str) -> Option<&IntentRecord> {
        self.positions.get(id).map(|&position| &self.records[position])
    }

    pub fn contains(&self, id: &str) -> bool {
        self.positions.contains_key(id)
    }

    /// Number of intents.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Total number of stored keyword phrases.
    pub fn keyword_count(&self) -> usize {
        self.records.iter().map(|r| r.keywords.len()).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_phrases_normalized_not_tokenized() {
        let index = KeywordIndex::build([("wifi", vec!["Wi-Fi", "PASSWORD", "rete wireless"])]);
        let record = index.get("wifi").unwrap();
        assert_eq!(record.keywords(), &["wi fi", "password", "rete wireless"]);
    }

    #[test]
    fn test_empty_phrases_discarded() {
        let index = KeywordIndex::build([("checkin", vec!["", "  ", "?!", "check-in"])]);
        assert_eq!(index.get("checkin").unwrap().keywords(), &["check in"]);
    }

    #[test]
    fn test_insertion_order_kept() {
        let index = KeywordIndex::build([
            ("zeta", vec!["z"]),
            ("alpha", vec!["a"]),
            ("mid", vec!["m"]),
        ]);
        let ids: Vec<&str> = index.iter().map(|r| r.id().as_str()).collect();
        assert_eq!(ids, vec!["zeta", "alpha", "mid"]);
    }

    #[test]
    fn test_intent_without_keywords_kept() {
        let index = KeywordIndex::build([("empty", Vec::<&str>::new()), ("blank", vec![" "])]);
        assert_eq!(index.len(), 2);
        assert_eq!(index.keyword_count(), 0);
    }

    #[test]
    fn test_duplicate_ids_merged_in_place() {
        let index = KeywordIndex::build([
            ("taxi", vec!["taxi"]),
            ("bus", vec!["bus"]),
            ("taxi", vec!["cab"]),
        ]);
        assert_eq!(index.len(), 2);
        assert_eq!(index.iter().next().unwrap().id().as_str(), "taxi");
        assert_eq!(index.get("taxi").unwrap().keywords(), &["taxi", "cab"]);
    }
}
