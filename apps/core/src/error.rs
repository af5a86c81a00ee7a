use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Application-wide error type, consolidating all possible errors into a single enum.
#[derive(Debug, Error)]
pub enum AppError {
    /// The chatbot configuration file does not exist or cannot be opened.
    #[error("Configuration missing: {}", .0.display())]
    ConfigMissing(PathBuf),

    /// The chatbot configuration was read but is not a valid document.
    #[error("Configuration malformed: {0}")]
    ConfigMalformed(String),

    /// Represents errors originating from the database, typically from `sqlx`.
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Represents standard input/output errors.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// Represents data validation errors (e.g., invalid input format).
    #[error("Validation error: {0}")]
    Validation(String),

    /// A question could not be recorded.
    #[error("Persistence error: {0}")]
    Persistence(String),

    /// Represents errors specific to the actor system, such as communication failures.
    #[error("Actor error: {0}")]
    Actor(String),

    /// Chat input is refused because no valid configuration is loaded.
    #[error("Chat is disabled until a valid configuration is loaded")]
    ChatDisabled,

    /// Represents errors from operations that did not complete in time.
    #[error("Operation timed out: {0}")]
    Timeout(String),
}

impl From<tokio::time::error::Elapsed> for AppError {
    fn from(err: tokio::time::error::Elapsed) -> Self {
        AppError::Timeout(format!("Operation timed out: {}", err))
    }
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        AppError::Validation(format!("JSON error: {}", err))
    }
}

impl From<validator::ValidationErrors> for AppError {
    fn from(err: validator::ValidationErrors) -> Self {
        AppError::Validation(format!("Validation errors: {}", err))
    }
}

impl From<sqlx::migrate::MigrateError> for AppError {
    fn from(err: sqlx::migrate::MigrateError) -> Self {
        AppError::Database(sqlx::Error::Migrate(Box::new(err)))
    }
}

impl AppError {
    /// True for the configuration problems that keep chat input disabled.
    pub fn is_config_error(&self) -> bool {
        matches!(self, AppError::ConfigMissing(_) | AppError::ConfigMalformed(_))
    }
}
