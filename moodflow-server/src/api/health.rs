//! Health check endpoint

use crate::AppState;
use axum::{extract::State, routing::get, Json, Router};
use chrono::Utc;
use serde_json::json;

pub fn health_routes() -> Router<AppState> {
    Router::new().route("/health", get(health))
}

/// GET /health
async fn health(State(state): State<AppState>) -> Json<serde_json::Value> {
    let uptime = (Utc::now() - state.startup_time).num_seconds().max(0);
    Json(json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
        "uptime_seconds": uptime,
    }))
}
