//! Knowledge base and the swappable handle hosts resolve through.
//!
//! A [`KnowledgeBase`] is built once from a [`ChatbotConfig`] and never
//! mutated. Reloading builds a new one and swaps it into the
//! [`EngineHandle`]; resolutions already running keep the `Arc` they started
//! with.

use crate::brain::{IntentId, IntentResolver, KeywordIndex, MatchResult};
use crate::config::{ChatbotConfig, DEFAULT_RESPONSE_ID};
use crate::error::AppError;
use crate::models::{QuickReply, Response};
use serde::Serialize;
use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;
use tokio::sync::watch;
use tracing::{info, instrument, warn};

/// Immutable intents, keywords and responses.
#[derive(Debug, Clone)]
pub struct KnowledgeBase {
    index: KeywordIndex,
    resolver: IntentResolver,
    responses: HashMap<IntentId, Response>,
    default_response: Response,
    greeting: Option<Response>,
    quick_replies: Vec<QuickReply>,
}

/// The response picked for an utterance.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Answer {
    /// Matched intent, `None` when the default response was used.
    pub intent: Option<IntentId>,
    /// Best intent score seen.
    pub score: f64,
    /// True when `response` is the `default` fallback.
    pub fallback: bool,
    pub response: Response,
}

/// Build the keyword index and response catalog from a configuration.
pub fn build_index(config: &ChatbotConfig) -> Result<KnowledgeBase, AppError> {
    KnowledgeBase::build(config)
}

/// Resolve an utterance against a knowledge base.
pub fn resolve(knowledge: &KnowledgeBase, utterance: &str) -> Option<IntentId> {
    knowledge.resolve(utterance)
}

impl KnowledgeBase {
    pub fn build(config: &ChatbotConfig) -> Result<Self, AppError> {
        config.check()?;
        for id in config.unanswered_intents() {
            warn!("Intent `{}` has keywords but no response, it will answer with `default`", id);
        }

        let index = KeywordIndex::build(config.keywords.iter());
        let responses: HashMap<IntentId, Response> = config
            .responses
            .iter()
            .map(|(id, response)| (IntentId::new(id.as_str()), response.clone()))
            .collect();

        let default_response = responses
            .get(DEFAULT_RESPONSE_ID)
            .cloned()
            .ok_or_else(|| AppError::ConfigMalformed("missing mandatory `default` response".to_string()))?;

        let greeting = config
            .greeting
            .as_deref()
            .and_then(|id| responses.get(id))
            .cloned();

        info!(
            "Keyword index built: {} intents, {} keywords",
            index.len(),
            index.keyword_count()
        );

        Ok(Self {
            index,
            resolver: IntentResolver::new(config.tuning),
            responses,
            default_response,
            greeting,
            quick_replies: config.quick_replies.clone(),
        })
    }

    /// Read the configuration at `path` and build from it.
    pub async fn load(path: &Path) -> Result<Self, AppError> {
        let config = ChatbotConfig::load(path).await?;
        Self::build(&config)
    }

    pub fn index(&self) -> &KeywordIndex {
        &self.index
    }

    pub fn resolve(&self, utterance: &str) -> Option<IntentId> {
        self.resolver.resolve(&self.index, utterance)
    }

    pub fn evaluate(&self, utterance: &str) -> MatchResult {
        self.resolver.evaluate(&self.index, utterance)
    }

    /// Response of an intent, or `default` when there is none.
    pub fn response_for(&self, intent: Option<&IntentId>) -> &Response {
        intent
            .and_then(|id| self.responses.get(id))
            .unwrap_or(&self.default_response)
    }

    pub fn default_response(&self) -> &Response {
        &self.default_response
    }

    pub fn greeting(&self) -> Option<&Response> {
        self.greeting.as_ref()
    }

    pub fn quick_replies(&self) -> &[QuickReply] {
        &self.quick_replies
    }

    /// Resolve and pick the response to show.
    pub fn answer(&self, utterance: &str) -> Answer {
        let result = self.evaluate(utterance);
        let fallback = !result.is_match()
            || result
                .intent
                .as_ref()
                .is_some_and(|id| !self.responses.contains_key(id));
        let response = self.response_for(result.intent.as_ref()).clone();
        Answer {
            intent: result.intent,
            score: result.score,
            fallback,
            response,
        }
    }
}

/// Shared, atomically replaceable access to the current knowledge base.
///
/// Holds nothing until a valid configuration is installed; chat input is
/// refused in that state.
#[derive(Clone)]
pub struct EngineHandle {
    current: Arc<watch::Sender<Option<Arc<KnowledgeBase>>>>,
}

impl Default for EngineHandle {
    fn default() -> Self {
        Self::disabled()
    }
}

impl EngineHandle {
    /// A handle with no knowledge base; chat stays disabled until [`install`](Self::install).
    pub fn disabled() -> Self {
        let (sender, _) = watch::channel(None);
        Self {
            current: Arc::new(sender),
        }
    }

    pub fn new(knowledge: KnowledgeBase) -> Self {
        let handle = Self::disabled();
        handle.install(knowledge);
        handle
    }

    /// The knowledge base in effect right now.
    pub fn current(&self) -> Option<Arc<KnowledgeBase>> {
        self.current.borrow().clone()
    }

    pub fn is_enabled(&self) -> bool {
        self.current.borrow().is_some()
    }

    /// Swap in a new knowledge base for all subsequent calls.
    pub fn install(&self, knowledge: KnowledgeBase) -> Arc<KnowledgeBase> {
        let knowledge = Arc::new(knowledge);
        self.current.send_replace(Some(knowledge.clone()));
        knowledge
    }

    /// Notified on every swap.
    pub fn subscribe(&self) -> watch::Receiver<Option<Arc<KnowledgeBase>>> {
        self.current.subscribe()
    }

    /// Rebuild from `path` and swap it in. On failure the previous knowledge
    /// base stays active.
    #[instrument(skip(self))]
    pub async fn reload(&self, path: &Path) -> Result<Arc<KnowledgeBase>, AppError> {
        let knowledge = KnowledgeBase::load(path).await?;
        let installed = self.install(knowledge);
        info!("Chatbot configuration reloaded from {:?}", path);
        Ok(installed)
    }

    /// Answer through the current knowledge base.
    pub fn answer(&self, utterance: &str) -> Result<Answer, AppError> {
        let knowledge = self.current().ok_or(AppError::ChatDisabled)?;
        Ok(knowledge.answer(utterance))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(document: &str) -> ChatbotConfig {
        ChatbotConfig::from_json_str(document).unwrap()
    }

    fn wifi_config() -> ChatbotConfig {
        config(
            r#"{
                "keywords": {"wifi": ["wifi", "password"], "orphan": ["parcheggio"]},
                "responses": {
                    "wifi": {"type": "text", "content": "Rete MusArt"},
                    "default": {"type": "text", "content": "Non ho capito"}
                }
            }"#,
        )
    }

    #[test]
    fn test_answer_matched_intent() {
        let knowledge = build_index(&wifi_config()).unwrap();
        let answer = knowledge.answer("what's the wifi password");
        assert_eq!(answer.intent.as_ref().map(IntentId::as_str), Some("wifi"));
        assert!(!answer.fallback);
        assert_eq!(answer.response, Response::text("Rete MusArt"));
    }

    #[test]
    fn test_answer_falls_back_to_default() {
        let knowledge = build_index(&wifi_config()).unwrap();
        let answer = knowledge.answer("asdkjalsd");
        assert_eq!(answer.intent, None);
        assert!(answer.fallback);
        assert_eq!(answer.response, Response::text("Non ho capito"));
    }

    #[test]
    fn test_intent_without_response_uses_default() {
        let knowledge = build_index(&wifi_config()).unwrap();
        let answer = knowledge.answer("dov'è il parcheggio");
        assert_eq!(answer.intent.as_ref().map(IntentId::as_str), Some("orphan"));
        assert!(answer.fallback);
        assert_eq!(&answer.response, knowledge.default_response());
    }

    #[test]
    fn test_module_level_resolve() {
        let knowledge = build_index(&wifi_config()).unwrap();
        assert_eq!(resolve(&knowledge, "WIFI?").unwrap().as_str(), "wifi");
        assert_eq!(resolve(&knowledge, ""), None);
    }

    #[test]
    fn test_disabled_handle_refuses_chat() {
        let handle = EngineHandle::disabled();
        assert!(!handle.is_enabled());
        assert!(matches!(handle.answer("wifi"), Err(AppError::ChatDisabled)));
    }

    #[test]
    fn test_swap_keeps_old_snapshot() {
        let handle = EngineHandle::new(build_index(&wifi_config()).unwrap());
        let before = handle.current().unwrap();

        let replacement = config(
            r#"{
                "keywords": {"taxi": ["taxi"]},
                "responses": {
                    "taxi": {"type": "text", "content": "Radio taxi"},
                    "default": {"type": "text", "content": "?"}
                }
            }"#,
        );
        handle.install(build_index(&replacement).unwrap());

        assert_eq!(before.resolve("wifi").unwrap().as_str(), "wifi");
        assert_eq!(before.resolve("taxi"), None);

        let after = handle.answer("taxi").unwrap();
        assert_eq!(after.intent.unwrap().as_str(), "taxi");
        assert_eq!(handle.answer("wifi").unwrap().intent, None);
    }

    #[test]
    fn test_subscribers_see_swaps() {
        let handle = EngineHandle::disabled();
        let mut receiver = handle.subscribe();
        handle.install(build_index(&wifi_config()).unwrap());
        assert!(receiver.has_changed().unwrap());
        assert!(receiver.borrow_and_update().is_some());
    }

    #[tokio::test]
    async fn test_failed_reload_keeps_previous() {
        let handle = EngineHandle::new(build_index(&wifi_config()).unwrap());
        let err = handle
            .reload(Path::new("/nonexistent/responses.json"))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::ConfigMissing(_)));
        assert_eq!(handle.answer("wifi").unwrap().intent.unwrap().as_str(), "wifi");
    }
}
