use crate::error::AppError;
use crate::models::Question;
use async_trait::async_trait;

/// Storage backend for raw user questions.
///
/// This trait abstracts where questions end up, so the recorder can write to
/// SQLite in production and to an in-memory or failing store in tests.
#[async_trait]
pub trait QuestionStore: Send + Sync + 'static {
    /// Persists one question exactly as the user typed it.
    async fn save(&self, text: String) -> Result<Question, AppError>;

    /// Returns every stored question, newest first.
    async fn list(&self) -> Result<Vec<Question>, AppError>;
}
