//! Server Tests
//!
//! HTTP handlers called directly with their extractors.

use crate::actors::QuestionRecorderHandle;
use crate::engine::{EngineHandle, KnowledgeBase};
use crate::error::AppError;
use crate::models::{NewQuestion, Response};
use crate::server::{self, AppState, ChatRequest};
use crate::tests::actor_tests::MockQuestionStore;
use crate::ChatbotConfig;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use std::path::PathBuf;
use std::sync::Arc;
use tempfile::NamedTempFile;

const CONFIG: &str = r#"{
    "keywords": {
        "wifi": ["wifi", "password"],
        "breakfast": ["colazione"]
    },
    "responses": {
        "wifi": {"type": "text", "content": "Rete <MusArt>"},
        "breakfast": {"type": "link", "content": "Menu", "url": "https://example.org/menu"},
        "default": {"type": "text", "content": "Non ho capito"}
    }
}"#;

fn knowledge(document: &str) -> KnowledgeBase {
    KnowledgeBase::build(&ChatbotConfig::from_json_str(document).unwrap()).unwrap()
}

fn state(engine: EngineHandle, config_path: PathBuf) -> (AppState, Arc<MockQuestionStore>) {
    let store = Arc::new(MockQuestionStore::new());
    let state = AppState {
        engine,
        store: store.clone(),
        recorder: QuestionRecorderHandle::spawn(store.clone()),
        config_path,
    };
    (state, store)
}

fn config_file(document: &str) -> NamedTempFile {
    let file = NamedTempFile::new().unwrap();
    std::fs::write(file.path(), document).unwrap();
    file
}

#[cfg(test)]
mod chat_tests {
    use super::*;

    #[tokio::test]
    async fn test_chat_resolves_and_records() {
        let (state, store) = state(EngineHandle::new(knowledge(CONFIG)), PathBuf::new());

        let Json(reply) = server::chat(
            State(state.clone()),
            Json(ChatRequest {
                text: "  Qual è la password del WiFi?  ".to_string(),
            }),
        )
        .await
        .unwrap();

        assert_eq!(reply.intent.as_ref().unwrap().as_str(), "wifi");
        assert!(!reply.fallback);
        assert_eq!(reply.response, Response::text("Rete <MusArt>"));
        assert!(reply.html.contains("Rete &lt;MusArt&gt;"));

        state.recorder.flush().await.unwrap();
        assert_eq!(store.texts(), vec!["Qual è la password del WiFi?"]);
    }

    #[tokio::test]
    async fn test_chat_falls_back_to_default() {
        let (state, _store) = state(EngineHandle::new(knowledge(CONFIG)), PathBuf::new());

        let Json(reply) = server::chat(
            State(state),
            Json(ChatRequest {
                text: "asdkjalsd".to_string(),
            }),
        )
        .await
        .unwrap();

        assert!(reply.intent.is_none());
        assert!(reply.fallback);
        assert_eq!(reply.response, Response::text("Non ho capito"));
    }

    #[tokio::test]
    async fn test_chat_disabled_without_config() {
        let (state, store) = state(EngineHandle::disabled(), PathBuf::new());

        let err = server::chat(
            State(state.clone()),
            Json(ChatRequest {
                text: "wifi".to_string(),
            }),
        )
        .await
        .unwrap_err();

        assert!(matches!(err, AppError::ChatDisabled));
        assert_eq!(err.into_response().status(), StatusCode::SERVICE_UNAVAILABLE);

        state.recorder.flush().await.unwrap();
        assert!(store.texts().is_empty());
    }

    #[tokio::test]
    async fn test_chat_rejects_blank_text() {
        let (state, _store) = state(EngineHandle::new(knowledge(CONFIG)), PathBuf::new());

        let err = server::chat(
            State(state),
            Json(ChatRequest {
                text: "   ".to_string(),
            }),
        )
        .await
        .unwrap_err();

        assert_eq!(err.into_response().status(), StatusCode::BAD_REQUEST);
    }
}

#[cfg(test)]
mod question_tests {
    use super::*;

    #[tokio::test]
    async fn test_save_question_created() {
        let (state, store) = state(EngineHandle::disabled(), PathBuf::new());

        let (status, Json(body)) = server::save_question(
            State(state.clone()),
            Json(NewQuestion {
                text: "C'è il parcheggio?".to_string(),
            }),
        )
        .await
        .unwrap();

        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(body.message, "Question saved");
        assert_eq!(store.texts(), vec!["C'è il parcheggio?"]);

        let Json(listed) = server::list_questions(State(state)).await.unwrap();
        assert_eq!(listed.len(), 1);
    }

    #[tokio::test]
    async fn test_save_question_rejects_empty() {
        let (state, store) = state(EngineHandle::disabled(), PathBuf::new());

        for text in ["", "   "] {
            let err = server::save_question(
                State(state.clone()),
                Json(NewQuestion { text: text.to_string() }),
            )
            .await
            .unwrap_err();
            assert_eq!(err.into_response().status(), StatusCode::BAD_REQUEST);
        }
        assert!(store.texts().is_empty());
    }

    #[tokio::test]
    async fn test_store_failure_maps_to_server_error() {
        let store = Arc::new(MockQuestionStore::failing());
        let state = AppState {
            engine: EngineHandle::disabled(),
            store: store.clone(),
            recorder: QuestionRecorderHandle::spawn(store.clone()),
            config_path: PathBuf::new(),
        };

        let err = server::save_question(
            State(state),
            Json(NewQuestion {
                text: "ciao".to_string(),
            }),
        )
        .await
        .unwrap_err();

        assert_eq!(err.into_response().status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(store.attempts.load(std::sync::atomic::Ordering::SeqCst), 1);
    }
}

#[cfg(test)]
mod admin_tests {
    use super::*;

    #[tokio::test]
    async fn test_reload_enables_chat() {
        let file = config_file(CONFIG);
        let (state, _store) = state(EngineHandle::disabled(), file.path().to_path_buf());

        let Json(health) = server::healthz(State(state.clone())).await;
        assert!(!health.chat_enabled);

        let Json(reloaded) = server::reload(State(state.clone())).await.unwrap();
        assert_eq!(reloaded.intents, 2);
        assert_eq!(reloaded.keywords, 3);

        let Json(health) = server::healthz(State(state)).await;
        assert_eq!(health.status, "ok");
        assert!(health.chat_enabled);
    }

    #[tokio::test]
    async fn test_failed_reload_keeps_previous_index() {
        let file = config_file(r#"{"keywords": {"wifi": ["wifi"]}, "responses": {}}"#);
        let (state, _store) = state(EngineHandle::new(knowledge(CONFIG)), file.path().to_path_buf());

        let err = server::reload(State(state.clone())).await.unwrap_err();
        assert_eq!(err.into_response().status(), StatusCode::UNPROCESSABLE_ENTITY);

        let Json(reply) = server::chat(
            State(state),
            Json(ChatRequest {
                text: "colazione".to_string(),
            }),
        )
        .await
        .unwrap();
        assert_eq!(reply.intent.unwrap().as_str(), "breakfast");
    }

    #[tokio::test]
    async fn test_reload_missing_file() {
        let (state, _store) = state(EngineHandle::disabled(), PathBuf::from("/nonexistent/responses.json"));

        let err = server::reload(State(state.clone())).await.unwrap_err();
        assert!(matches!(err, AppError::ConfigMissing(_)));
        assert!(!state.engine.is_enabled());
    }
}
