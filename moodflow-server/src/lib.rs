//! moodflow-server library interface
//!
//! Exposes the application state and router for integration testing.

pub mod analysis;
pub mod api;
pub mod catalog;
pub mod classify;
pub mod error;
pub mod recommender;

pub use crate::error::{ApiError, ApiResult};

use axum::extract::DefaultBodyLimit;
use axum::Router;
use catalog::{CatalogClient, UserCatalogClient};
use chrono::{DateTime, Utc};
use moodflow_common::config::AppConfig;
use moodflow_common::history::HistoryStore;
use recommender::PlaylistEngine;
use std::sync::Arc;
use tokio::sync::RwLock;
use tower_http::trace::TraceLayer;

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    /// Resolved configuration
    pub config: Arc<AppConfig>,
    /// Anonymous catalog client (client-credentials flow)
    pub catalog: Arc<CatalogClient>,
    /// User catalog client (authorization-code flow)
    pub user: Arc<UserCatalogClient>,
    /// Playlist/recommendation engine
    pub engine: Arc<PlaylistEngine>,
    /// Session history store
    pub history: Arc<HistoryStore>,
    /// CSRF nonce for the in-flight login redirect, if any
    pub pending_auth_state: Arc<RwLock<Option<String>>>,
    /// Service startup timestamp for uptime reporting
    pub startup_time: DateTime<Utc>,
}

impl AppState {
    pub fn new(config: AppConfig) -> Result<Self, catalog::CatalogError> {
        let catalog = Arc::new(CatalogClient::new(config.catalog.clone())?);
        let user = Arc::new(UserCatalogClient::new(config.catalog.clone())?);
        let engine = Arc::new(PlaylistEngine::new(Arc::clone(&catalog)));
        let history = Arc::new(HistoryStore::new(config.history.path.clone()));

        Ok(Self {
            config: Arc::new(config),
            catalog,
            user,
            engine,
            history,
            pending_auth_state: Arc::new(RwLock::new(None)),
            startup_time: Utc::now(),
        })
    }
}

/// Build the application router
pub fn build_router(state: AppState) -> Router {
    let upload_limit = state.config.audio.max_upload_bytes;

    Router::new()
        .merge(api::ui_routes())
        .merge(api::analyze_routes())
        .merge(api::catalog_routes())
        .merge(api::playlist_routes())
        .merge(api::auth_routes())
        .merge(api::history_routes())
        .merge(api::health_routes())
        .layer(DefaultBodyLimit::max(upload_limit))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
