//! Authenticated catalog client (authorization-code flow)
//!
//! Drives the login redirect, the code-for-token exchange against the
//! fixed local redirect URI, and the personalized operations: profile
//! read, playlist creation, and adding tracks. The session lives in
//! process state for the lifetime of the server; tokens refresh in place
//! when a refresh token is available.

use super::models::{PlaylistObject, PlaylistSummary, TokenResponse, UserProfile};
use super::{error_for_status, CatalogError, ACCOUNTS_BASE_URL, API_BASE_URL, HTTP_TIMEOUT_SECS, USER_AGENT};
use moodflow_common::config::CatalogConfig;
use serde_json::json;
use std::time::{Duration, Instant};
use tokio::sync::RwLock;

/// Refresh the session token this long before expiry
const TOKEN_RENEWAL_MARGIN: Duration = Duration::from_secs(60);

/// One logged-in catalog session
#[derive(Debug, Clone)]
pub struct UserSession {
    access_token: String,
    refresh_token: Option<String>,
    expires_at: Instant,
    pub profile: UserProfile,
}

/// Catalog client bound to a (possibly absent) user session
pub struct UserCatalogClient {
    http: reqwest::Client,
    config: CatalogConfig,
    session: RwLock<Option<UserSession>>,
}

impl UserCatalogClient {
    pub fn new(config: CatalogConfig) -> Result<Self, CatalogError> {
        let http = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(Duration::from_secs(HTTP_TIMEOUT_SECS))
            .build()
            .map_err(|e| CatalogError::NetworkError(e.to_string()))?;

        Ok(Self {
            http,
            config,
            session: RwLock::new(None),
        })
    }

    /// The authorize URL the browser is redirected to; `state` is the
    /// caller's CSRF nonce, echoed back on the callback.
    pub fn authorize_url(&self, state: &str) -> Result<String, CatalogError> {
        let url = reqwest::Url::parse_with_params(
            &format!("{ACCOUNTS_BASE_URL}/authorize"),
            &[
                ("client_id", self.config.client_id.as_str()),
                ("response_type", "code"),
                ("redirect_uri", self.config.redirect_uri.as_str()),
                ("scope", self.config.scopes.as_str()),
                ("state", state),
            ],
        )
        .map_err(|e| CatalogError::ParseError(e.to_string()))?;
        Ok(url.into())
    }

    /// Exchange the callback code for tokens and load the profile,
    /// replacing any previous session.
    pub async fn complete_login(&self, code: &str) -> Result<UserProfile, CatalogError> {
        let token = self
            .token_request(&[
                ("grant_type", "authorization_code"),
                ("code", code),
                ("redirect_uri", self.config.redirect_uri.as_str()),
            ])
            .await?;

        let profile = self.fetch_profile(&token.access_token).await?;

        tracing::info!(user_id = %profile.id, "Catalog login complete");

        let session = UserSession {
            access_token: token.access_token,
            refresh_token: token.refresh_token,
            expires_at: Instant::now() + Duration::from_secs(token.expires_in.max(1)),
            profile: profile.clone(),
        };
        *self.session.write().await = Some(session);

        Ok(profile)
    }

    /// Whether a session is currently held
    pub async fn is_authenticated(&self) -> bool {
        self.session.read().await.is_some()
    }

    /// Profile of the logged-in user
    pub async fn me(&self) -> Result<UserProfile, CatalogError> {
        let session = self.session.read().await;
        session
            .as_ref()
            .map(|s| s.profile.clone())
            .ok_or(CatalogError::NotAuthenticated)
    }

    /// Create a playlist under the logged-in account
    pub async fn create_playlist(
        &self,
        name: &str,
        description: &str,
        public: bool,
    ) -> Result<PlaylistSummary, CatalogError> {
        let (token, user_id) = self.session_token().await?;

        let response = self
            .http
            .post(format!("{API_BASE_URL}/users/{user_id}/playlists"))
            .bearer_auth(&token)
            .json(&json!({
                "name": name,
                "description": description,
                "public": public,
            }))
            .send()
            .await
            .map_err(CatalogError::from_reqwest)?;

        if !response.status().is_success() {
            return Err(error_for_status(response).await);
        }

        let playlist: PlaylistObject = response
            .json()
            .await
            .map_err(|e| CatalogError::ParseError(e.to_string()))?;

        tracing::info!(
            playlist = %playlist.name.as_deref().unwrap_or("?"),
            "Created playlist"
        );

        Ok(playlist.into())
    }

    /// Add track URIs to an existing playlist
    pub async fn add_tracks(
        &self,
        playlist_id: &str,
        uris: &[String],
    ) -> Result<(), CatalogError> {
        let (token, _) = self.session_token().await?;

        let response = self
            .http
            .post(format!("{API_BASE_URL}/playlists/{playlist_id}/tracks"))
            .bearer_auth(&token)
            .json(&json!({ "uris": uris }))
            .send()
            .await
            .map_err(CatalogError::from_reqwest)?;

        if !response.status().is_success() {
            return Err(error_for_status(response).await);
        }

        tracing::info!(playlist_id = %playlist_id, count = uris.len(), "Added tracks to playlist");
        Ok(())
    }

    /// A usable access token plus the session's user id, refreshing the
    /// token first when it is close to expiry.
    async fn session_token(&self) -> Result<(String, String), CatalogError> {
        {
            let session = self.session.read().await;
            let session = session.as_ref().ok_or(CatalogError::NotAuthenticated)?;
            if Instant::now() + TOKEN_RENEWAL_MARGIN < session.expires_at {
                return Ok((session.access_token.clone(), session.profile.id.clone()));
            }
        }

        self.refresh_session().await?;

        let session = self.session.read().await;
        let session = session.as_ref().ok_or(CatalogError::NotAuthenticated)?;
        Ok((session.access_token.clone(), session.profile.id.clone()))
    }

    /// Renew the session using its refresh token
    async fn refresh_session(&self) -> Result<(), CatalogError> {
        let refresh_token = {
            let session = self.session.read().await;
            let session = session.as_ref().ok_or(CatalogError::NotAuthenticated)?;
            session
                .refresh_token
                .clone()
                .ok_or_else(|| CatalogError::AuthFailed("Session expired, log in again".to_string()))?
        };

        tracing::debug!("Refreshing user session token");

        let token = self
            .token_request(&[
                ("grant_type", "refresh_token"),
                ("refresh_token", refresh_token.as_str()),
            ])
            .await?;

        let mut session = self.session.write().await;
        if let Some(session) = session.as_mut() {
            session.access_token = token.access_token;
            session.expires_at = Instant::now() + Duration::from_secs(token.expires_in.max(1));
            // the service may rotate the refresh token
            if token.refresh_token.is_some() {
                session.refresh_token = token.refresh_token;
            }
        }

        Ok(())
    }

    /// POST to the accounts token endpoint with basic client auth
    async fn token_request(&self, form: &[(&str, &str)]) -> Result<TokenResponse, CatalogError> {
        if !self.config.is_configured() {
            return Err(CatalogError::AuthFailed(
                "Catalog credentials not configured".to_string(),
            ));
        }

        let response = self
            .http
            .post(format!("{ACCOUNTS_BASE_URL}/api/token"))
            .basic_auth(&self.config.client_id, Some(&self.config.client_secret))
            .form(form)
            .send()
            .await
            .map_err(CatalogError::from_reqwest)?;

        if !response.status().is_success() {
            return Err(error_for_status(response).await);
        }

        response
            .json()
            .await
            .map_err(|e| CatalogError::ParseError(e.to_string()))
    }

    async fn fetch_profile(&self, token: &str) -> Result<UserProfile, CatalogError> {
        let response = self
            .http
            .get(format!("{API_BASE_URL}/me"))
            .bearer_auth(token)
            .send()
            .await
            .map_err(CatalogError::from_reqwest)?;

        if !response.status().is_success() {
            return Err(error_for_status(response).await);
        }

        response
            .json()
            .await
            .map_err(|e| CatalogError::ParseError(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_client() -> UserCatalogClient {
        let config = CatalogConfig {
            client_id: "test-client".to_string(),
            client_secret: "test-secret".to_string(),
            redirect_uri: "http://127.0.0.1:8787/auth/callback".to_string(),
            ..CatalogConfig::default()
        };
        UserCatalogClient::new(config).unwrap()
    }

    #[test]
    fn authorize_url_carries_oauth_parameters() {
        let client = test_client();
        let url = client.authorize_url("nonce-123").unwrap();

        assert!(url.starts_with("https://accounts.spotify.com/authorize?"));
        assert!(url.contains("client_id=test-client"));
        assert!(url.contains("response_type=code"));
        assert!(url.contains("state=nonce-123"));
        // redirect URI is percent-encoded
        assert!(url.contains("redirect_uri=http%3A%2F%2F127.0.0.1%3A8787%2Fauth%2Fcallback"));
    }

    #[tokio::test]
    async fn personalized_calls_require_a_session() {
        let client = test_client();
        assert!(!client.is_authenticated().await);
        assert!(matches!(client.me().await, Err(CatalogError::NotAuthenticated)));
        assert!(matches!(
            client.add_tracks("p1", &[]).await,
            Err(CatalogError::NotAuthenticated)
        ));
    }
}
