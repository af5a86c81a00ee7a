//! HTTP API.
//!
//! - `POST /api/questions`: record a raw question
//! - `GET  /api/questions`: every recorded question, newest first
//! - `POST /api/chat`: answer an utterance (recorded in the background)
//! - `POST /api/admin/reload`: rebuild the keyword index from the config file
//! - `GET  /healthz`: liveness and whether chat is enabled

use crate::actors::{QuestionRecorderHandle, QuestionStore};
use crate::brain::IntentId;
use crate::engine::EngineHandle;
use crate::error::AppError;
use crate::models::{NewQuestion, Question, Response};
use crate::render::{HtmlRenderer, RenderContext, Renderer};
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{error, info, warn};
use validator::Validate;

/// Shared state of the HTTP handlers.
#[derive(Clone)]
pub struct AppState {
    pub engine: EngineHandle,
    pub store: Arc<dyn QuestionStore>,
    pub recorder: QuestionRecorderHandle,
    /// Configuration file re-read on reload.
    pub config_path: PathBuf,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageBody {
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorBody {
    pub error: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct ChatRequest {
    #[validate(length(min = 1, max = 2000))]
    pub text: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChatReply {
    pub intent: Option<IntentId>,
    pub score: f64,
    pub fallback: bool,
    pub response: Response,
    pub html: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReloadReply {
    pub intents: usize,
    pub keywords: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HealthReply {
    pub status: &'static str,
    pub chat_enabled: bool,
}

impl IntoResponse for AppError {
    fn into_response(self) -> axum::response::Response {
        let status = match &self {
            AppError::Validation(_) => StatusCode::BAD_REQUEST,
            AppError::ConfigMissing(_) | AppError::ConfigMalformed(_) => StatusCode::UNPROCESSABLE_ENTITY,
            AppError::ChatDisabled => StatusCode::SERVICE_UNAVAILABLE,
            AppError::Timeout(_) => StatusCode::GATEWAY_TIMEOUT,
            AppError::Database(_) | AppError::Io(_) | AppError::Persistence(_) | AppError::Actor(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };

        let message = if status == StatusCode::INTERNAL_SERVER_ERROR {
            error!("Request failed: {}", self);
            "Server error".to_string()
        } else {
            self.to_string()
        };

        (status, Json(ErrorBody { error: message })).into_response()
    }
}

/// Builds the API router.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/healthz", get(healthz))
        .route("/api/questions", post(save_question).get(list_questions))
        .route("/api/chat", post(chat))
        .route("/api/admin/reload", post(reload))
        .with_state(state)
}

/// Serves the API until Ctrl-C.
pub async fn serve(addr: SocketAddr, state: AppState) -> Result<(), AppError> {
    let app = router(state);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!("Server listening on http://{}", addr);
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!("Failed to listen for Ctrl-C: {}", e);
        std::future::pending::<()>().await;
    }
}

pub async fn healthz(State(state): State<AppState>) -> Json<HealthReply> {
    Json(HealthReply {
        status: "ok",
        chat_enabled: state.engine.is_enabled(),
    })
}

pub async fn save_question(
    State(state): State<AppState>,
    Json(payload): Json<NewQuestion>,
) -> Result<(StatusCode, Json<MessageBody>), AppError> {
    payload.validate()?;
    if payload.text.trim().is_empty() {
        return Err(AppError::Validation("question text is empty".to_string()));
    }

    state.store.save(payload.text).await?;
    Ok((
        StatusCode::CREATED,
        Json(MessageBody {
            message: "Question saved".to_string(),
        }),
    ))
}

pub async fn list_questions(State(state): State<AppState>) -> Result<Json<Vec<Question>>, AppError> {
    Ok(Json(state.store.list().await?))
}

pub async fn chat(
    State(state): State<AppState>,
    Json(payload): Json<ChatRequest>,
) -> Result<Json<ChatReply>, AppError> {
    payload.validate()?;
    let utterance = payload.text.trim();
    if utterance.is_empty() {
        return Err(AppError::Validation("message is empty".to_string()));
    }

    let answer = state.engine.answer(utterance)?;
    // recorded whatever the outcome; never waited on
    state.recorder.record(utterance);

    let html = HtmlRenderer.render(&answer.response, &RenderContext::default()).body;
    Ok(Json(ChatReply {
        intent: answer.intent,
        score: answer.score,
        fallback: answer.fallback,
        response: answer.response,
        html,
    }))
}

pub async fn reload(State(state): State<AppState>) -> Result<Json<ReloadReply>, AppError> {
    let knowledge = state.engine.reload(&state.config_path).await?;
    Ok(Json(ReloadReply {
        intents: knowledge.index().len(),
        keywords: knowledge.index().keyword_count(),
    }))
}
