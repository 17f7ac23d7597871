//! Session history endpoint

use crate::AppState;
use axum::{extract::State, routing::get, Json, Router};
use moodflow_common::HistorySession;
use serde::Serialize;

pub fn history_routes() -> Router<AppState> {
    Router::new().route("/api/history", get(history))
}

/// GET /api/history response
#[derive(Debug, Serialize)]
pub struct HistoryResponse {
    /// Every recorded session, oldest first
    pub sessions: Vec<HistorySession>,
    /// Display window: most recent first, capped
    pub recent: Vec<HistorySession>,
}

/// GET /api/history
async fn history(State(state): State<AppState>) -> Json<HistoryResponse> {
    Json(HistoryResponse {
        sessions: state.history.read_all(),
        recent: state.history.recent(),
    })
}
