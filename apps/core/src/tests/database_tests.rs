//! Database Module Tests
//!
//! Question log persistence on a temporary SQLite file.

use crate::actors::QuestionStore;
use crate::database::{self, SqliteQuestionStore};
use sqlx::sqlite::SqlitePool;
use tempfile::{tempdir, TempDir};

/// Create a test database; the directory must outlive the pool.
async fn create_test_pool() -> (TempDir, SqlitePool) {
    let dir = tempdir().expect("Failed to create temp dir");
    let pool = database::init_db_at(&dir.path().join("test.sqlite"))
        .await
        .expect("Failed to open test database");
    (dir, pool)
}

#[cfg(test)]
mod question_tests {
    use super::*;

    #[tokio::test]
    async fn test_save_question() {
        let (_dir, pool) = create_test_pool().await;

        let question = database::save_question(&pool, "Dov'è la spiaggia?")
            .await
            .expect("Failed to save question");

        assert!(question.id > 0);
        assert_eq!(question.text, "Dov'è la spiaggia?");
        assert!(question.timestamp > 0);
    }

    #[tokio::test]
    async fn test_text_stored_verbatim() {
        let (_dir, pool) = create_test_pool().await;

        let raw = "  WIFI?? Password  per favore 🙏 ";
        database::save_question(&pool, raw).await.unwrap();

        let questions = database::list_questions(&pool).await.unwrap();
        assert_eq!(questions.len(), 1);
        assert_eq!(questions[0].text, raw);
    }

    #[tokio::test]
    async fn test_list_newest_first() {
        let (_dir, pool) = create_test_pool().await;

        for text in ["prima", "seconda", "terza"] {
            database::save_question(&pool, text).await.unwrap();
        }

        let texts: Vec<String> = database::list_questions(&pool)
            .await
            .unwrap()
            .into_iter()
            .map(|q| q.text)
            .collect();
        // same-second inserts fall back to id order
        assert_eq!(texts, vec!["terza", "seconda", "prima"]);
    }

    #[tokio::test]
    async fn test_list_orders_by_timestamp() {
        let (_dir, pool) = create_test_pool().await;

        sqlx::query("INSERT INTO questions (text, timestamp) VALUES (?, ?), (?, ?)")
            .bind("recent")
            .bind(2_000_i64)
            .bind("old")
            .bind(1_000_i64)
            .execute(&pool)
            .await
            .unwrap();

        let questions = database::list_questions(&pool).await.unwrap();
        assert_eq!(questions[0].text, "recent");
        assert_eq!(questions[1].text, "old");
    }

    #[tokio::test]
    async fn test_count_and_empty_list() {
        let (_dir, pool) = create_test_pool().await;

        assert!(database::list_questions(&pool).await.unwrap().is_empty());
        assert_eq!(database::count_questions(&pool).await.unwrap(), 0);

        database::save_question(&pool, "ciao").await.unwrap();
        database::save_question(&pool, "ciao").await.unwrap();
        assert_eq!(database::count_questions(&pool).await.unwrap(), 2);
    }

    #[tokio::test]
    async fn test_reopen_keeps_questions() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("questions.sqlite");

        let pool = database::init_db_at(&path).await.unwrap();
        database::save_question(&pool, "persisted").await.unwrap();
        pool.close().await;

        let pool = database::init_db_at(&path).await.unwrap();
        let questions = database::list_questions(&pool).await.unwrap();
        assert_eq!(questions.len(), 1);
        assert_eq!(questions[0].text, "persisted");
    }
}

#[cfg(test)]
mod store_tests {
    use super::*;

    #[tokio::test]
    async fn test_sqlite_store_save_and_list() {
        let (_dir, pool) = create_test_pool().await;
        let store = SqliteQuestionStore::new(pool);

        let saved = store.save("A che ora è la colazione?".to_string()).await.unwrap();
        let listed = store.list().await.unwrap();

        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].id, saved.id);
        assert_eq!(database::count_questions(store.pool()).await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_closed_pool_reports_database_error() {
        let (_dir, pool) = create_test_pool().await;
        let store = SqliteQuestionStore::new(pool.clone());
        pool.close().await;

        let err = store.save("lost".to_string()).await.unwrap_err();
        assert!(matches!(err, crate::error::AppError::Database(_)));
    }
}
