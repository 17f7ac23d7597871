//! Playlist save endpoint

use crate::error::{ApiError, ApiResult};
use crate::AppState;
use axum::{extract::State, routing::post, Json, Router};
use serde::{Deserialize, Serialize};

pub fn playlist_routes() -> Router<AppState> {
    Router::new().route("/api/playlist", post(save_playlist))
}

/// POST /api/playlist request
#[derive(Debug, Deserialize)]
pub struct SavePlaylistRequest {
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub public: bool,
    pub uris: Vec<String>,
}

/// POST /api/playlist response
#[derive(Debug, Serialize)]
pub struct SavePlaylistResponse {
    pub id: String,
    pub name: String,
    pub url: Option<String>,
    pub tracks_added: usize,
}

/// POST /api/playlist
///
/// Creates a playlist under the authenticated account and adds the given
/// track URIs. Requires a completed login; 401 otherwise.
async fn save_playlist(
    State(state): State<AppState>,
    Json(request): Json<SavePlaylistRequest>,
) -> ApiResult<Json<SavePlaylistResponse>> {
    if request.name.trim().is_empty() {
        return Err(ApiError::BadRequest("Playlist name is required".to_string()));
    }
    if request.uris.is_empty() {
        return Err(ApiError::BadRequest(
            "At least one track URI is required".to_string(),
        ));
    }
    if !state.user.is_authenticated().await {
        return Err(ApiError::Unauthorized(
            "Log in with /auth/login before saving playlists".to_string(),
        ));
    }

    let playlist = state
        .user
        .create_playlist(&request.name, &request.description, request.public)
        .await?;

    let playlist_id = playlist
        .id
        .clone()
        .ok_or_else(|| ApiError::Internal("Catalog returned a playlist without an id".to_string()))?;

    state.user.add_tracks(&playlist_id, &request.uris).await?;

    tracing::info!(
        playlist_id = %playlist_id,
        tracks = request.uris.len(),
        "Saved playlist to user account"
    );

    Ok(Json(SavePlaylistResponse {
        id: playlist_id,
        name: playlist.name,
        url: playlist.url,
        tracks_added: request.uris.len(),
    }))
}
