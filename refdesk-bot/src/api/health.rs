//! Liveness endpoint for the update intake

use axum::{extract::State, routing::get, Json, Router};
use serde::Serialize;

use crate::AppState;

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub module: &'static str,
    pub version: &'static str,
    /// Short commit hash baked in by the build script
    pub build: &'static str,
    /// Records currently held by the store
    pub records: usize,
}

/// GET /health (open, no token)
pub async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    let records = state.dispatcher.lock().await.store().len();
    Json(HealthResponse {
        status: "ok",
        module: env!("CARGO_PKG_NAME"),
        version: env!("CARGO_PKG_VERSION"),
        build: env!("GIT_HASH"),
        records,
    })
}

pub fn health_routes() -> Router<AppState> {
    Router::new().route("/health", get(health_check))
}
