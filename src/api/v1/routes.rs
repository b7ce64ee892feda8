/*
 * Responsibility
 * - URL layout of v1
 * - Every route sits behind the keystone gate (applied in app.rs); whether a
 *   route needs a confirmed identity is decided by its extractors
 */
use axum::{Router, routing::get};

use crate::state::AppState;

use crate::api::v1::handlers::{health::health, whoami::whoami};

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/health", get(health))
        .route("/whoami", get(whoami))
}
