use std::sync::Arc;

use axum::{extract::State, http::StatusCode, routing::get, Router};
use finbot_storage_sqlite::get_connection;

use crate::main_lib::AppState;

pub async fn healthz() -> &'static str {
    "ok"
}

/// Ready once a pooled database connection can be checked out.
pub async fn readyz(State(state): State<Arc<AppState>>) -> (StatusCode, &'static str) {
    match get_connection(&state.pool) {
        Ok(_) => (StatusCode::OK, "ok"),
        Err(e) => {
            tracing::warn!("Readiness check failed: {}", e);
            (StatusCode::SERVICE_UNAVAILABLE, "unavailable")
        }
    }
}

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/healthz", get(healthz))
        .route("/readyz", get(readyz))
}
