// handlers/health.rs - GET /health and GET /db_check handlers

use axum::{extract::State, Json};
use serde_json::{json, Value};

use crate::error::ApiError;
use crate::state::AppState;

/// GET /health - liveness, no token required
pub async fn health() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}

/// GET /db_check - round-trip query against the issue store
pub async fn db_check(State(state): State<AppState>) -> Result<Json<Value>, ApiError> {
    let status = state.store.check_connectivity().await;

    if !status.reachable {
        return Err(ApiError::internal_server_error(status.message));
    }

    Ok(Json(json!({ "status": "ok", "message": status.message })))
}
