//! API error types
//!
//! Every failure reaching the HTTP boundary is an explicit, typed error
//! with a machine-readable code. Catalog failures map to gateway-class
//! statuses so "the catalog had nothing" (a 200 with an empty collection)
//! never looks the same as "the catalog call failed".

use crate::analysis::AnalysisError;
use crate::catalog::CatalogError;
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

/// API error type
#[derive(Debug, Error)]
pub enum ApiError {
    /// Invalid request (400)
    #[error("Invalid request: {0}")]
    BadRequest(String),

    /// Missing or invalid user session (401)
    #[error("Not authenticated: {0}")]
    Unauthorized(String),

    /// Resource not found (404)
    #[error("Resource not found: {0}")]
    NotFound(String),

    /// Audio decode/extraction failure (400)
    #[error("Analysis failed: {0}")]
    Analysis(#[from] AnalysisError),

    /// Catalog service call failure (502/503)
    #[error("Catalog call failed: {0}")]
    Catalog(#[from] CatalogError),

    /// Internal server error (500)
    #[error("Internal server error: {0}")]
    Internal(String),

    /// moodflow-common error
    #[error("Common error: {0}")]
    Common(#[from] moodflow_common::Error),

    /// Generic error
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error_code, message) = match self {
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, "BAD_REQUEST", msg),
            ApiError::Unauthorized(msg) => (StatusCode::UNAUTHORIZED, "NOT_AUTHENTICATED", msg),
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, "NOT_FOUND", msg),
            ApiError::Analysis(ref err) => {
                (StatusCode::BAD_REQUEST, "ANALYSIS_FAILED", err.to_string())
            }
            ApiError::Catalog(CatalogError::NotAuthenticated) => (
                StatusCode::UNAUTHORIZED,
                "NOT_AUTHENTICATED",
                "Log in to the catalog service first".to_string(),
            ),
            ApiError::Catalog(CatalogError::RateLimited) => (
                StatusCode::SERVICE_UNAVAILABLE,
                "CATALOG_RATE_LIMITED",
                "Catalog rate limit exceeded".to_string(),
            ),
            ApiError::Catalog(ref err) => {
                (StatusCode::BAD_GATEWAY, "CATALOG_ERROR", err.to_string())
            }
            ApiError::Internal(msg) => (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR", msg),
            ApiError::Common(ref err) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "INTERNAL_ERROR",
                err.to_string(),
            ),
            ApiError::Other(ref err) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "INTERNAL_ERROR",
                err.to_string(),
            ),
        };

        let body = Json(json!({
            "error": {
                "code": error_code,
                "message": message,
            }
        }));

        (status, body).into_response()
    }
}

/// Result type for API handlers
pub type ApiResult<T> = Result<T, ApiError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn catalog_failure_maps_to_gateway_status() {
        let response =
            ApiError::Catalog(CatalogError::NetworkError("boom".into())).into_response();
        assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
    }

    #[test]
    fn missing_session_maps_to_unauthorized() {
        let response = ApiError::Catalog(CatalogError::NotAuthenticated).into_response();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[test]
    fn analysis_failure_is_a_client_error() {
        let response = ApiError::Analysis(AnalysisError::EmptyAudio).into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }
}
