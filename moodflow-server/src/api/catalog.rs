//! Catalog panel endpoints
//!
//! Thin handlers over the public catalog client. Each returns a JSON
//! collection; catalog failures propagate as explicit gateway errors
//! rather than silently rendering empty panels.

use crate::catalog::models::{ArtistSummary, AudioFeatures, TrackSummary};
use crate::error::ApiResult;
use crate::AppState;
use axum::{
    extract::{Path, Query, State},
    routing::get,
    Json, Router,
};
use moodflow_common::Mood;
use serde::{Deserialize, Serialize};

pub fn catalog_routes() -> Router<AppState> {
    Router::new()
        .route("/api/artists", get(artists))
        .route("/api/tracks", get(tracks))
        .route("/api/albums", get(albums))
        .route("/api/playlists", get(playlists))
        .route("/api/recommendations", get(recommendations))
        .route("/api/discover", get(discover))
        .route("/api/related-artists/:id", get(related_artists))
}

#[derive(Debug, Deserialize)]
struct GenreQuery {
    genre: String,
    limit: Option<u32>,
}

impl GenreQuery {
    fn limit_or(&self, default: u32) -> u32 {
        self.limit.unwrap_or(default).clamp(1, 50)
    }
}

/// GET /api/artists?genre=&limit=
async fn artists(
    State(state): State<AppState>,
    Query(query): Query<GenreQuery>,
) -> ApiResult<Json<Vec<ArtistSummary>>> {
    let artists = state
        .catalog
        .search_artists(&query.genre, query.limit_or(6))
        .await?;
    Ok(Json(artists))
}

/// GET /api/tracks?genre=&limit=
async fn tracks(
    State(state): State<AppState>,
    Query(query): Query<GenreQuery>,
) -> ApiResult<Json<Vec<TrackSummary>>> {
    let tracks = state
        .catalog
        .search_tracks(&query.genre, query.limit_or(8))
        .await?;
    Ok(Json(tracks))
}

/// GET /api/albums?genre=&limit=
async fn albums(
    State(state): State<AppState>,
    Query(query): Query<GenreQuery>,
) -> ApiResult<Json<Vec<crate::catalog::models::AlbumSummary>>> {
    let albums = state
        .catalog
        .search_albums(&query.genre, query.limit_or(8))
        .await?;
    Ok(Json(albums))
}

/// GET /api/playlists?genre=&limit=
async fn playlists(
    State(state): State<AppState>,
    Query(query): Query<GenreQuery>,
) -> ApiResult<Json<Vec<crate::catalog::models::PlaylistSummary>>> {
    let playlists = state
        .catalog
        .search_playlists(&query.genre, query.limit_or(8))
        .await?;
    Ok(Json(playlists))
}

#[derive(Debug, Deserialize)]
struct RecommendationsQuery {
    genre: String,
    mood: Mood,
    limit: Option<u32>,
}

/// One recommended track with its catalog acoustic summary, when known
#[derive(Debug, Serialize)]
struct RecommendedTrack {
    #[serde(flatten)]
    track: TrackSummary,
    audio_features: Option<AudioFeatures>,
}

/// GET /api/recommendations?genre=&mood=&limit=
///
/// Recommendation path of the playlist engine, enriched with per-track
/// audio features (absent entries filtered upstream).
async fn recommendations(
    State(state): State<AppState>,
    Query(query): Query<RecommendationsQuery>,
) -> ApiResult<Json<Vec<RecommendedTrack>>> {
    let limit = query.limit.unwrap_or(10).clamp(1, 50);
    let tracks = state.engine.build(&query.genre, query.mood, limit).await?;

    let ids: Vec<String> = tracks.iter().filter_map(|t| t.id.clone()).collect();
    let features = match state.catalog.audio_features(&ids).await {
        Ok(features) => features,
        Err(e) => {
            // enrichment is optional; the playlist itself already succeeded
            tracing::warn!(error = %e, "Audio-features enrichment failed");
            Vec::new()
        }
    };

    let enriched = tracks
        .into_iter()
        .map(|track| {
            let audio_features = track
                .id
                .as_deref()
                .and_then(|id| features.iter().find(|f| f.id == id).cloned());
            RecommendedTrack {
                track,
                audio_features,
            }
        })
        .collect();

    Ok(Json(enriched))
}

#[derive(Debug, Deserialize)]
struct DiscoverQuery {
    genre: String,
    seed_track: Option<String>,
    limit: Option<usize>,
}

#[derive(Debug, Serialize)]
struct DiscoverResponse {
    tracks: Vec<TrackSummary>,
    queries_run: usize,
    failed_searches: usize,
}

/// GET /api/discover?genre=&seed_track=&limit=
///
/// Strategy search path. Sub-search failures are skipped but surfaced in
/// `failed_searches` so an empty result is distinguishable from a broken
/// one.
async fn discover(
    State(state): State<AppState>,
    Query(query): Query<DiscoverQuery>,
) -> ApiResult<Json<DiscoverResponse>> {
    let limit = query.limit.unwrap_or(25).clamp(1, 50);
    let result = state
        .engine
        .discover(&query.genre, query.seed_track.as_deref(), limit)
        .await;

    Ok(Json(DiscoverResponse {
        tracks: result.tracks,
        queries_run: result.queries_run,
        failed_searches: result.failed_searches,
    }))
}

/// GET /api/related-artists/{id}
async fn related_artists(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<Vec<ArtistSummary>>> {
    let artists = state.catalog.related_artists(&id).await?;
    Ok(Json(artists))
}
