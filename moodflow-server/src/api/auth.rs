//! Authorization-code flow endpoints
//!
//! GET /auth/login redirects the browser to the catalog's authorize page
//! with a one-shot CSRF nonce; GET /auth/callback exchanges the returned
//! code for a session. The session lives in process state.

use crate::catalog::models::UserProfile;
use crate::error::{ApiError, ApiResult};
use crate::AppState;
use axum::{
    extract::{Query, State},
    response::Redirect,
    routing::get,
    Json, Router,
};
use serde::Deserialize;
use uuid::Uuid;

pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/auth/login", get(login))
        .route("/auth/callback", get(callback))
        .route("/api/me", get(me))
}

/// GET /auth/login
async fn login(State(state): State<AppState>) -> ApiResult<Redirect> {
    let nonce = Uuid::new_v4().to_string();
    let url = state.user.authorize_url(&nonce)?;
    *state.pending_auth_state.write().await = Some(nonce);

    tracing::info!("Redirecting to catalog authorize page");
    Ok(Redirect::temporary(&url))
}

#[derive(Debug, Deserialize)]
struct CallbackQuery {
    code: Option<String>,
    state: Option<String>,
    error: Option<String>,
}

/// GET /auth/callback?code=&state=
async fn callback(
    State(state): State<AppState>,
    Query(query): Query<CallbackQuery>,
) -> ApiResult<Redirect> {
    if let Some(error) = query.error {
        return Err(ApiError::Unauthorized(format!(
            "Catalog login was denied: {error}"
        )));
    }

    let expected = state.pending_auth_state.write().await.take();
    if expected.is_none() || expected != query.state {
        return Err(ApiError::BadRequest(
            "Login state mismatch, start again from /auth/login".to_string(),
        ));
    }

    let code = query
        .code
        .ok_or_else(|| ApiError::BadRequest("Missing authorization code".to_string()))?;

    let profile = state.user.complete_login(&code).await?;
    tracing::info!(user_id = %profile.id, "User logged in");

    Ok(Redirect::temporary("/?login=ok"))
}

/// GET /api/me
async fn me(State(state): State<AppState>) -> ApiResult<Json<UserProfile>> {
    let profile = state.user.me().await?;
    Ok(Json(profile))
}
