use std::sync::Arc;

use axum::extract::State;
use axum::http::HeaderMap;
use axum::Json;

use crate::db::queries;
use crate::errors::AppError;
use crate::state::AppState;

pub(crate) fn check_auth(headers: &HeaderMap, expected_token: &str) -> Result<(), AppError> {
    let auth = headers
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .unwrap_or("");

    let token = auth.strip_prefix("Bearer ").unwrap_or("");
    if token != expected_token {
        return Err(AppError::Unauthorized);
    }
    Ok(())
}

// GET /api/admin/appointments
pub async fn get_appointments(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> Result<Json<serde_json::Value>, AppError> {
    check_auth(&headers, &state.config.admin_token)?;

    let appointments = {
        let db = state.db.lock().unwrap();
        queries::load_appointments(&db)?
    };

    Ok(Json(serde_json::to_value(appointments).unwrap_or_default()))
}

// GET /api/admin/accounts
pub async fn get_accounts(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> Result<Json<serde_json::Value>, AppError> {
    check_auth(&headers, &state.config.admin_token)?;

    let accounts = {
        let db = state.db.lock().unwrap();
        queries::load_accounts(&db)?
    };

    Ok(Json(serde_json::to_value(accounts).unwrap_or_default()))
}

// GET /api/admin/stats
pub async fn get_stats(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> Result<Json<serde_json::Value>, AppError> {
    check_auth(&headers, &state.config.admin_token)?;

    let stats = {
        let db = state.db.lock().unwrap();
        queries::client_stats(&db)?
    };

    Ok(Json(serde_json::to_value(stats).unwrap_or_default()))
}
