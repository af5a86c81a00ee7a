//! Welcome Book chatbot core.
//!
//! Routes a free-text guest question to one of the canned answers of the
//! chatbot configuration, using keyword matching only (see [`brain`]).
//! Around the engine: the configuration document, response rendering,
//! per-user sessions, the question log and the HTTP API.

pub mod actors;
pub mod brain;
pub mod config;
pub mod database;
pub mod engine;
pub mod error;
pub mod fs_manager;
pub mod models;
pub mod render;
pub mod server;
pub mod session;
pub mod telemetry;

pub use config::ChatbotConfig;
pub use engine::{build_index, resolve, Answer, EngineHandle, KnowledgeBase};
pub use error::AppError;
pub use models::Response;
pub use session::ChatSession;

#[cfg(test)]
mod tests;
