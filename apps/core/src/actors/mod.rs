//! Actors running next to the chat engine.
//!
//! - `recorder`: persists raw user questions without blocking the chat

pub mod messages;
pub mod recorder;
pub mod traits;

pub use recorder::QuestionRecorderHandle;
pub use traits::QuestionStore;
