use std::sync::Arc;

use axum::extract::State;
use axum::Json;
use serde::{Deserialize, Serialize};

use crate::errors::AppError;
use crate::services::conversation;
use crate::state::AppState;

#[derive(Deserialize)]
pub struct ChatRequest {
    pub session_id: Option<String>,
    pub message: String,
}

#[derive(Serialize)]
pub struct ChatResponse {
    pub session_id: String,
    pub reply: String,
    pub intent: String,
}

// POST /api/chat
pub async fn send_message(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<ChatRequest>,
) -> Result<Json<ChatResponse>, AppError> {
    let message = payload.message.trim().to_string();
    if message.is_empty() {
        return Err(AppError::BadRequest("message is required".to_string()));
    }

    let session_id = payload
        .session_id
        .filter(|s| !s.trim().is_empty())
        .unwrap_or_else(|| uuid::Uuid::new_v4().to_string());

    let output = conversation::process_message(&state, &session_id, &message).await;

    Ok(Json(ChatResponse {
        session_id,
        reply: output.reply,
        intent: output.intent,
    }))
}

#[derive(Deserialize)]
pub struct StopRequest {
    pub session_id: String,
}

// POST /api/chat/stop
pub async fn stop_generation(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<StopRequest>,
) -> Json<serde_json::Value> {
    let stopped = conversation::stop_generation(&state, &payload.session_id);
    Json(serde_json::json!({ "stopped": stopped }))
}
