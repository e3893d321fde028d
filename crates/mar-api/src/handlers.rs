//! Route handlers.

use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::Json;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use mar_chat::ChatError;
use mar_core::{ChatReplyBody, ChatRequest};

use crate::error::ApiError;
use crate::state::AppState;

/// Response body for `GET /health`.
#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub uptime_secs: u64,
    pub model: String,
}

/// GET /health
pub async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        uptime_secs: state.start_time.elapsed().as_secs(),
        model: state.orchestrator.model().to_string(),
    })
}

/// POST /api/chat: one orchestrator turn.
///
/// A failed turn is a 500 carrying the apology as its `error`.
pub async fn chat(
    State(state): State<AppState>,
    payload: Result<Json<ChatRequest>, JsonRejection>,
) -> Result<Json<ChatReplyBody>, ApiError> {
    let Json(request) = payload.map_err(|rejection| {
        warn!(error = %rejection.body_text(), "Rejected chat request body");
        ApiError::from(rejection)
    })?;

    if request.message.trim().is_empty() {
        return Err(ChatError::EmptyMessage.into());
    }

    info!(
        language = %request.language_code,
        chars = request.message.chars().count(),
        "Chat request"
    );

    let reply = state
        .orchestrator
        .respond(&request.message, &request.language, &request.language_code)
        .await;

    if reply.is_failure() {
        return Err(ApiError::Internal(reply.message));
    }
    Ok(Json(reply.into_body()))
}
