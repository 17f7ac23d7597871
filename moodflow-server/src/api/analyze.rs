//! Upload analysis endpoint
//!
//! POST /api/analyze takes a multipart audio upload, runs the full
//! pipeline (decode → extract → classify → seed resolution), appends a
//! history record, and returns everything the UI needs to render the
//! analysis card.

use crate::analysis::{decode_audio_bytes, FeatureExtractor};
use crate::catalog::genres::resolve_seed_genre;
use crate::classify::{predict_genre, predict_mood};
use crate::error::{ApiError, ApiResult};
use crate::recommender::{engine::mood_targets, explain_recommendation};
use crate::AppState;
use axum::{
    extract::{Multipart, State},
    routing::post,
    Json, Router,
};
use moodflow_common::{FeatureVector, Genre, HistorySession, Mood};
use serde::Serialize;

pub fn analyze_routes() -> Router<AppState> {
    Router::new().route("/api/analyze", post(analyze))
}

/// POST /api/analyze response
#[derive(Debug, Serialize)]
pub struct AnalyzeResponse {
    pub features: FeatureVector,
    pub mood: Mood,
    pub genre_guess: Genre,
    pub seed_genre: String,
    pub explanation: String,
    pub duration_seconds: f64,
    pub session: HistorySession,
}

/// POST /api/analyze
async fn analyze(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> ApiResult<Json<AnalyzeResponse>> {
    let mut upload: Option<(Vec<u8>, Option<String>)> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::BadRequest(format!("Malformed multipart body: {e}")))?
    {
        if field.name() != Some("file") {
            continue;
        }
        let extension = field
            .file_name()
            .and_then(|name| name.rsplit_once('.'))
            .map(|(_, ext)| ext.to_ascii_lowercase());
        let bytes = field
            .bytes()
            .await
            .map_err(|e| ApiError::BadRequest(format!("Upload read failed: {e}")))?;
        upload = Some((bytes.to_vec(), extension));
        break;
    }

    let Some((bytes, extension)) = upload else {
        return Err(ApiError::BadRequest(
            "Missing multipart field 'file'".to_string(),
        ));
    };
    if bytes.is_empty() {
        return Err(ApiError::BadRequest("Uploaded file is empty".to_string()));
    }

    tracing::info!(
        bytes = bytes.len(),
        extension = extension.as_deref().unwrap_or("?"),
        "Analyzing uploaded clip"
    );

    // Decode and extraction are CPU-bound; keep them off the runtime
    let sample_rate = state.config.audio.sample_rate;
    let (features, duration_seconds) = tokio::task::spawn_blocking(move || {
        let decoded = decode_audio_bytes(bytes, extension.as_deref(), sample_rate)?;
        let extractor = FeatureExtractor::new(decoded.sample_rate);
        let features = extractor.extract(&decoded.samples)?;
        Ok::<_, crate::analysis::AnalysisError>((features, decoded.duration_seconds))
    })
    .await
    .map_err(|e| ApiError::Internal(format!("Analysis task failed: {e}")))??;

    let mood = predict_mood(&features);
    let genre_guess = predict_genre(&features);
    let seed_genre = resolve_seed_genre(genre_guess.as_str());

    let explanation =
        explain_recommendation(mood, seed_genre, &mood_targets(mood), &features);

    let session = state.history.append(mood, seed_genre)?;

    tracing::info!(
        mood = %mood,
        genre_guess = %genre_guess,
        seed_genre = %seed_genre,
        "Analysis complete"
    );

    Ok(Json(AnalyzeResponse {
        features,
        mood,
        genre_guess,
        seed_genre: seed_genre.to_string(),
        explanation,
        duration_seconds,
        session,
    }))
}
