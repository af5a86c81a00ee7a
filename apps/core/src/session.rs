//! Per-user chat session.
//!
//! Owns the UI state that belongs to one conversation window: whether the
//! greeting was shown, the quick replies on offer, whether the chat panel is
//! open, and the transcript. Nothing here is global; hosts keep one session
//! per user and pass it the knowledge base for each turn.

use crate::actors::QuestionRecorderHandle;
use crate::brain::IntentId;
use crate::engine::{Answer, KnowledgeBase};
use crate::models::QuickReply;
use crate::render::{RenderContext, RenderedMessage, Renderer};
use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::debug;
use uuid::Uuid;

/// One user message and what the bot made of it.
#[derive(Debug, Clone, Serialize)]
pub struct Exchange {
    pub utterance: String,
    pub intent: Option<IntentId>,
    pub score: f64,
    pub fallback: bool,
    pub at: DateTime<Utc>,
}

/// Result of one chat turn.
#[derive(Debug, Clone, Serialize)]
pub struct Turn {
    pub user: RenderedMessage,
    pub bot: RenderedMessage,
    pub answer: Answer,
}

#[derive(Debug, Clone)]
pub struct ChatSession {
    id: Uuid,
    greeting_shown: bool,
    quick_replies: Vec<QuickReply>,
    quick_replies_visible: bool,
    visible: bool,
    transcript: Vec<Exchange>,
}

impl ChatSession {
    /// New session offering the quick replies of `knowledge`.
    pub fn new(knowledge: &KnowledgeBase) -> Self {
        Self {
            id: Uuid::new_v4(),
            greeting_shown: false,
            quick_replies: knowledge.quick_replies().to_vec(),
            quick_replies_visible: true,
            visible: true,
            transcript: Vec::new(),
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn greeting_shown(&self) -> bool {
        self.greeting_shown
    }

    pub fn is_visible(&self) -> bool {
        self.visible
    }

    pub fn set_visible(&mut self, visible: bool) {
        self.visible = visible;
    }

    /// Open or close the chat panel. Returns the new visibility.
    pub fn toggle_visibility(&mut self) -> bool {
        self.visible = !self.visible;
        self.visible
    }

    pub fn quick_replies(&self) -> &[QuickReply] {
        &self.quick_replies
    }

    pub fn quick_replies_visible(&self) -> bool {
        self.quick_replies_visible && !self.quick_replies.is_empty()
    }

    /// Offer the quick replies again under the next bot message.
    pub fn show_quick_replies(&mut self) {
        self.quick_replies_visible = true;
    }

    /// The quick reply at `position` (1-based, as displayed).
    pub fn quick_reply(&self, position: usize) -> Option<&QuickReply> {
        position.checked_sub(1).and_then(|i| self.quick_replies.get(i))
    }

    pub fn transcript(&self) -> &[Exchange] {
        &self.transcript
    }

    fn render_context(&self) -> RenderContext<'_> {
        RenderContext {
            quick_replies: if self.quick_replies_visible() {
                &self.quick_replies
            } else {
                &[]
            },
        }
    }

    /// The greeting message, the first time only.
    pub fn open<R: Renderer>(&mut self, knowledge: &KnowledgeBase, renderer: &R) -> Option<RenderedMessage> {
        if self.greeting_shown {
            return None;
        }
        let greeting = knowledge.greeting()?;
        self.greeting_shown = true;
        Some(renderer.render(greeting, &self.render_context()))
    }

    /// Runs one turn: records the raw text, resolves it and renders both
    /// sides. Blank input is ignored.
    pub fn handle<R: Renderer>(
        &mut self,
        text: &str,
        knowledge: &KnowledgeBase,
        recorder: Option<&QuestionRecorderHandle>,
        renderer: &R,
    ) -> Option<Turn> {
        let utterance = text.trim();
        if utterance.is_empty() {
            return None;
        }

        if let Some(recorder) = recorder {
            recorder.record(utterance);
        }

        let user = renderer.render_user_message(utterance);
        let answer = knowledge.answer(utterance);

        // quick replies go away once the user starts typing
        self.quick_replies_visible = false;
        let bot = renderer.render(&answer.response, &self.render_context());

        debug!(
            session = %self.id,
            intent = answer.intent.as_ref().map(IntentId::as_str),
            score = answer.score,
            "Chat turn handled"
        );

        self.transcript.push(Exchange {
            utterance: utterance.to_string(),
            intent: answer.intent.clone(),
            score: answer.score,
            fallback: answer.fallback,
            at: Utc::now(),
        });

        Some(Turn { user, bot, answer })
    }
}
