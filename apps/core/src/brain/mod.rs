//! # Brain Module
//!
//! Keyword-based intent resolution. No external language service, no model:
//! the user's utterance is matched against the keyword phrases of each intent.
//!
//! ## Components
//! - `normalizer`: case, diacritics, punctuation and whitespace folding
//! - `tokenizer`: content words with Italian and English stopwords removed
//! - `keyword_index`: immutable per-intent keyword phrases, in declaration order
//! - `similarity`: substring and Levenshtein scoring of a single keyword
//! - `resolver`: best intent above the acceptance threshold

pub mod keyword_index;
pub mod normalizer;
pub mod resolver;
pub mod similarity;
pub mod tokenizer;

pub use keyword_index::{IntentId, IntentRecord, KeywordIndex};
pub use normalizer::{normalize, NormalizedText};
pub use resolver::{resolve, IntentResolver, MatchResult, MatchTuning, DEFAULT_THRESHOLD};
pub use similarity::{levenshtein, similarity, SimilarityScorer};
pub use tokenizer::{is_stopword, tokenize, TokenSequence};
