use crate::actors::traits::QuestionStore;
use crate::error::AppError;
use crate::fs_manager::PortablePathManager;
use crate::models::Question;
use async_trait::async_trait;
use chrono::Utc;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};
use std::path::Path;
use std::str::FromStr;
use tracing::info;

/// Open the question log at its portable location.
pub async fn init_db() -> Result<SqlitePool, AppError> {
    init_db_at(&PortablePathManager::db_path()).await
}

/// Open (creating if needed) the SQLite database at `db_path` and apply migrations.
pub async fn init_db_at(db_path: &Path) -> Result<SqlitePool, AppError> {
    let db_url = format!("sqlite://{}", db_path.to_string_lossy());

    info!("Initializing database at: {}", db_url);

    let options = SqliteConnectOptions::from_str(&db_url)?.create_if_missing(true);

    let pool = SqlitePoolOptions::new()
        .max_connections(5)
        .connect_with(options)
        .await?;

    sqlx::migrate!("./migrations").run(&pool).await?;

    info!("Database initialized and migrations applied.");

    Ok(pool)
}

// --- Questions ---

pub async fn save_question(pool: &SqlitePool, text: &str) -> Result<Question, sqlx::Error> {
    let timestamp = Utc::now().timestamp();

    sqlx::query_as::<_, Question>(
        r#"
        INSERT INTO questions (text, timestamp)
        VALUES (?, ?)
        RETURNING id, text, timestamp
        "#,
    )
    .bind(text)
    .bind(timestamp)
    .fetch_one(pool)
    .await
}

/// All recorded questions, newest first.
pub async fn list_questions(pool: &SqlitePool) -> Result<Vec<Question>, sqlx::Error> {
    sqlx::query_as::<_, Question>(
        r#"
        SELECT id, text, timestamp
        FROM questions
        ORDER BY timestamp DESC, id DESC
        "#,
    )
    .fetch_all(pool)
    .await
}

pub async fn count_questions(pool: &SqlitePool) -> Result<i64, sqlx::Error> {
    sqlx::query_scalar("SELECT COUNT(*) FROM questions")
        .fetch_one(pool)
        .await
}

/// [`QuestionStore`] backed by the SQLite question log.
#[derive(Debug, Clone)]
pub struct SqliteQuestionStore {
    pool: SqlitePool,
}

impl SqliteQuestionStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }
}

#[async_trait]
impl QuestionStore for SqliteQuestionStore {
    async fn save(&self, text: String) -> Result<Question, AppError> {
        Ok(save_question(&self.pool, &text).await?)
    }

    async fn list(&self) -> Result<Vec<Question>, AppError> {
        Ok(list_questions(&self.pool).await?)
    }
}
