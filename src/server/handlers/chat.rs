use std::sync::Arc;

use axum::extract::State;
use axum::response::IntoResponse;
use axum::Json;
use serde::{Deserialize, Serialize};

use crate::core::errors::ApiError;
use crate::state::AppState;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: String,
    pub content: String,
}

#[derive(Debug, Deserialize)]
pub struct ChatRequest {
    pub prompt: String,
    /// Accepted for client compatibility; retrieval is stateless.
    #[serde(default)]
    pub history: Option<Vec<ChatMessage>>,
    #[serde(default)]
    pub session_id: Option<String>,
    #[serde(default)]
    pub max_sources: Option<usize>,
}

#[derive(Debug, Serialize)]
pub struct ChatResponse {
    pub answer: String,
    pub sources: Vec<String>,
    pub confidence: Option<f32>,
    pub session_id: Option<String>,
}

pub async fn chat(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<ChatRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let limit = resolve_source_limit(
        payload.max_sources,
        state.pipeline.top_k(),
        state.settings.rag.max_sources,
    )?;

    if let Some(history) = payload.history.as_ref() {
        tracing::debug!("Ignoring {} history messages", history.len());
    }

    let answer = state
        .pipeline
        .answer_with_limit(&payload.prompt, payload.session_id.as_deref(), limit)
        .await?;

    Ok(Json(ChatResponse {
        answer: answer.text,
        sources: answer.sources,
        confidence: answer.confidence,
        session_id: payload.session_id,
    }))
}

fn resolve_source_limit(
    requested: Option<usize>,
    default: usize,
    max: usize,
) -> Result<usize, ApiError> {
    match requested {
        None => Ok(default),
        Some(k) if (1..=max).contains(&k) => Ok(k),
        Some(k) => Err(ApiError::BadRequest(format!(
            "max_sources must be between 1 and {} (got {})",
            max, k
        ))),
    }
}
