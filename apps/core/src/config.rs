//! Chatbot configuration document.
//!
//! A JSON document with the keyword phrases of every intent and the canned
//! response of every intent:
//!
//! ```json
//! {
//!   "keywords":  { "wifi": ["wifi", "password"] },
//!   "responses": {
//!     "wifi":    { "type": "text", "content": "La password è ..." },
//!     "default": { "type": "text", "content": "Non ho capito." }
//!   }
//! }
//! ```
//!
//! The Italian key names `parole_chiave` and `risposte` are accepted too.
//! The order of the `keywords` object is kept, it decides ties between
//! intents.

use crate::brain::MatchTuning;
use crate::error::AppError;
use crate::models::{QuickReply, Response};
use serde::de::{MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::collections::{HashMap, HashSet};
use std::fmt;
use std::path::Path;
use tracing::{info, warn};
use validator::Validate;

/// Id of the response used when no intent matches.
pub const DEFAULT_RESPONSE_ID: &str = "default";

/// Keyword phrases per intent, in document order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OrderedKeywords(Vec<(String, Vec<String>)>);

impl OrderedKeywords {
    pub fn iter(&self) -> impl Iterator<Item = (&str, &[String])> {
        self.0.iter().map(|(id, phrases)| (id.as_str(), phrases.as_slice()))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<K, P, S> FromIterator<(K, P)> for OrderedKeywords
where
    K: Into<String>,
    P: IntoIterator<Item = S>,
    S: Into<String>,
{
    fn from_iter<I: IntoIterator<Item = (K, P)>>(iter: I) -> Self {
        Self(
            iter.into_iter()
                .map(|(id, phrases)| (id.into(), phrases.into_iter().map(Into::into).collect()))
                .collect(),
        )
    }
}

struct OrderedKeywordsVisitor;

impl<'de> Visitor<'de> for OrderedKeywordsVisitor {
    type Value = OrderedKeywords;

    fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
        formatter.write_str("a map from intent id to a list of keyword phrases")
    }

    fn visit_map<A>(self, mut map: A) -> Result<Self::Value, A::Error>
    where
        A: MapAccess<'de>,
    {
        let mut seen = HashSet::new();
        let mut entries = Vec::with_capacity(map.size_hint().unwrap_or(0));
        while let Some((id, phrases)) = map.next_entry::<String, Vec<String>>()? {
            if !seen.insert(id.clone()) {
                return Err(serde::de::Error::custom(format!("duplicate intent id `{}`", id)));
            }
            entries.push((id, phrases));
        }
        Ok(OrderedKeywords(entries))
    }
}

impl<'de> Deserialize<'de> for OrderedKeywords {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        deserializer.deserialize_map(OrderedKeywordsVisitor)
    }
}

impl Serialize for OrderedKeywords {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for (id, phrases) in &self.0 {
            map.serialize_entry(id, phrases)?;
        }
        map.end()
    }
}

/// The full chatbot configuration.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct ChatbotConfig {
    /// Keyword phrases per intent.
    #[serde(alias = "parole_chiave")]
    pub keywords: OrderedKeywords,
    /// Response per intent id. Must contain `default`.
    #[serde(alias = "risposte")]
    pub responses: HashMap<String, Response>,
    /// Response id shown once when a session opens.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub greeting: Option<String>,
    /// Shortcut buttons offered at the start of a session.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    #[validate(nested)]
    pub quick_replies: Vec<QuickReply>,
    /// Matching constants.
    #[serde(default)]
    #[validate(nested)]
    pub tuning: MatchTuning,
}

impl ChatbotConfig {
    /// Parse and check a configuration document.
    pub fn from_json_str(document: &str) -> Result<Self, AppError> {
        let config: ChatbotConfig = serde_json::from_str(document)
            .map_err(|e| AppError::ConfigMalformed(e.to_string()))?;
        config.check()?;
        Ok(config)
    }

    /// Read, parse and check the configuration file at `path`.
    pub async fn load(path: &Path) -> Result<Self, AppError> {
        let document = tokio::fs::read_to_string(path).await.map_err(|e| {
            warn!("Cannot read chatbot configuration {:?}: {}", path, e);
            AppError::ConfigMissing(path.to_path_buf())
        })?;

        let config = Self::from_json_str(&document)?;
        info!(
            "Loaded chatbot configuration from {:?}: {} intents, {} responses",
            path,
            config.keywords.len(),
            config.responses.len()
        );
        Ok(config)
    }

    /// Check the invariants serde cannot express.
    pub fn check(&self) -> Result<(), AppError> {
        if !self.responses.contains_key(DEFAULT_RESPONSE_ID) {
            return Err(AppError::ConfigMalformed(format!(
                "missing mandatory `{}` response",
                DEFAULT_RESPONSE_ID
            )));
        }

        if let Some(greeting) = &self.greeting {
            if !self.responses.contains_key(greeting) {
                return Err(AppError::ConfigMalformed(format!(
                    "greeting refers to unknown response `{}`",
                    greeting
                )));
            }
        }

        self.validate()
            .map_err(|e| AppError::ConfigMalformed(e.to_string()))
    }

    /// Intents that have keywords but no response of their own.
    pub fn unanswered_intents(&self) -> Vec<&str> {
        self.keywords
            .iter()
            .map(|(id, _)| id)
            .filter(|id| !self.responses.contains_key(*id))
            .collect()
    }
}
