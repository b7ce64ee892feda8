/*
 * Responsibility
 * - GET /health (liveness)
 * - Reachable without a token: the gate marks it Invalid and the handler ignores that
 */
use axum::{Json, extract::State, http::StatusCode, response::IntoResponse};
use serde_json::json;

use crate::state::AppState;

pub async fn health(State(state): State<AppState>) -> impl IntoResponse {
    (
        StatusCode::OK,
        Json(json!({
            "status": "ok",
            "token_cache": state.auth.cache_backend().unwrap_or("none"),
        })),
    )
}
