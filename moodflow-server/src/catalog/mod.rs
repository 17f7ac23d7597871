//! Catalog service boundary (Spotify Web API)
//!
//! Two clients share the wire models: [`client::CatalogClient`] uses the
//! client-credentials flow for anonymous search and recommendations;
//! [`user::UserCatalogClient`] runs the authorization-code flow for
//! profile reads and playlist writes.
//!
//! Failures are explicit result values. An `Ok` empty collection means the
//! service had nothing; an `Err` means the call itself failed, with the
//! kind preserved so callers can tell network trouble from auth trouble
//! from rate limiting. No retry, no backoff.

pub mod client;
pub mod genres;
pub mod models;
pub mod user;

pub use client::CatalogClient;
pub use user::UserCatalogClient;

use thiserror::Error;

/// Base URL for OAuth token and authorize endpoints
pub const ACCOUNTS_BASE_URL: &str = "https://accounts.spotify.com";
/// Base URL for catalog data endpoints
pub const API_BASE_URL: &str = "https://api.spotify.com/v1";

pub(crate) const USER_AGENT: &str = "moodflow/0.1.0 (+https://github.com/moodflow/moodflow)";
pub(crate) const HTTP_TIMEOUT_SECS: u64 = 30;

/// Catalog client errors
#[derive(Debug, Error)]
pub enum CatalogError {
    /// Transport-level failure (DNS, TLS, timeout, connection reset)
    #[error("Network error: {0}")]
    NetworkError(String),

    /// Credentials rejected or missing
    #[error("Catalog auth failed: {0}")]
    AuthFailed(String),

    /// Service returned HTTP 429
    #[error("Catalog rate limit exceeded")]
    RateLimited,

    /// Personalized call attempted without a user session
    #[error("Not authenticated with the catalog service")]
    NotAuthenticated,

    /// Service returned a non-success status
    #[error("Catalog API error {0}: {1}")]
    ApiError(u16, String),

    /// Response body did not match the expected shape
    #[error("Catalog response parse error: {0}")]
    ParseError(String),
}

impl CatalogError {
    pub(crate) fn from_reqwest(e: reqwest::Error) -> Self {
        if e.is_decode() {
            CatalogError::ParseError(e.to_string())
        } else {
            CatalogError::NetworkError(e.to_string())
        }
    }
}

/// Map a non-success response status to the matching error kind,
/// consuming the body for diagnostics.
pub(crate) async fn error_for_status(response: reqwest::Response) -> CatalogError {
    let status = response.status();
    match status.as_u16() {
        401 | 403 => CatalogError::AuthFailed(format!("HTTP {status}")),
        429 => CatalogError::RateLimited,
        code => {
            let body = response.text().await.unwrap_or_default();
            CatalogError::ApiError(code, body)
        }
    }
}
