//! Public catalog client (client-credentials flow)
//!
//! Good for anonymous search, recommendations, related artists, and batch
//! audio features. No user login, no playlist writes. The bearer token is
//! cached and renewed shortly before expiry; every call reports failure as
//! an explicit [`CatalogError`].

use super::models::{
    ArtistObject, ArtistSummary, AudioFeatures, AudioFeaturesResponse, AlbumSummary,
    PlaylistSummary, RecommendationsResponse, RelatedArtistsResponse, SearchResponse,
    TargetParams, TokenResponse, TrackObject, TrackSummary,
};
use super::{error_for_status, CatalogError, ACCOUNTS_BASE_URL, API_BASE_URL, HTTP_TIMEOUT_SECS, USER_AGENT};
use moodflow_common::config::CatalogConfig;
use serde::de::DeserializeOwned;
use std::time::{Duration, Instant};
use tokio::sync::Mutex;

/// Renew the cached token this long before it actually expires
const TOKEN_RENEWAL_MARGIN: Duration = Duration::from_secs(60);

#[derive(Debug, Clone)]
struct CachedToken {
    access_token: String,
    expires_at: Instant,
}

impl CachedToken {
    fn is_fresh(&self) -> bool {
        Instant::now() + TOKEN_RENEWAL_MARGIN < self.expires_at
    }
}

/// Anonymous catalog client
pub struct CatalogClient {
    http: reqwest::Client,
    config: CatalogConfig,
    token: Mutex<Option<CachedToken>>,
}

impl CatalogClient {
    /// Build a client from an explicit configuration object. Credentials
    /// are validated lazily, on the first call that needs a token.
    pub fn new(config: CatalogConfig) -> Result<Self, CatalogError> {
        let http = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(Duration::from_secs(HTTP_TIMEOUT_SECS))
            .build()
            .map_err(|e| CatalogError::NetworkError(e.to_string()))?;

        Ok(Self {
            http,
            config,
            token: Mutex::new(None),
        })
    }

    /// Current bearer token, fetching or renewing as needed
    async fn access_token(&self) -> Result<String, CatalogError> {
        let mut cached = self.token.lock().await;

        if let Some(token) = cached.as_ref() {
            if token.is_fresh() {
                return Ok(token.access_token.clone());
            }
        }

        if !self.config.is_configured() {
            return Err(CatalogError::AuthFailed(
                "Catalog credentials not configured".to_string(),
            ));
        }

        tracing::debug!("Requesting client-credentials token");

        let response = self
            .http
            .post(format!("{ACCOUNTS_BASE_URL}/api/token"))
            .basic_auth(&self.config.client_id, Some(&self.config.client_secret))
            .form(&[("grant_type", "client_credentials")])
            .send()
            .await
            .map_err(CatalogError::from_reqwest)?;

        if !response.status().is_success() {
            return Err(error_for_status(response).await);
        }

        let token: TokenResponse = response
            .json()
            .await
            .map_err(|e| CatalogError::ParseError(e.to_string()))?;

        let entry = CachedToken {
            access_token: token.access_token.clone(),
            expires_at: Instant::now() + Duration::from_secs(token.expires_in.max(1)),
        };
        *cached = Some(entry);

        Ok(token.access_token)
    }

    /// Authenticated GET returning a deserialized JSON body
    async fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, String)],
    ) -> Result<T, CatalogError> {
        let token = self.access_token().await?;

        let response = self
            .http
            .get(format!("{API_BASE_URL}{path}"))
            .bearer_auth(token)
            .query(query)
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

    async fn search(
        &self,
        query: &str,
        kind: &str,
        limit: u32,
    ) -> Result<SearchResponse, CatalogError> {
        self.get_json(
            "/search",
            &[
                ("q", query.to_string()),
                ("type", kind.to_string()),
                ("limit", limit.to_string()),
                ("market", self.config.market.clone()),
            ],
        )
        .await
    }

    /// Artists tagged with a genre
    pub async fn search_artists(
        &self,
        genre: &str,
        limit: u32,
    ) -> Result<Vec<ArtistSummary>, CatalogError> {
        let response = self.search(&format!("genre:{genre}"), "artist", limit).await?;
        Ok(page_to_summaries(response.artists))
    }

    /// Tracks tagged with a genre
    pub async fn search_tracks(
        &self,
        genre: &str,
        limit: u32,
    ) -> Result<Vec<TrackSummary>, CatalogError> {
        self.search_tracks_query(&format!("genre:{genre}"), limit).await
    }

    /// Tracks for an arbitrary search query (artist/year/keyword forms)
    pub async fn search_tracks_query(
        &self,
        query: &str,
        limit: u32,
    ) -> Result<Vec<TrackSummary>, CatalogError> {
        let response = self.search(query, "track", limit).await?;
        Ok(page_to_summaries(response.tracks))
    }

    /// Albums tagged with a genre
    pub async fn search_albums(
        &self,
        genre: &str,
        limit: u32,
    ) -> Result<Vec<AlbumSummary>, CatalogError> {
        let response = self.search(&format!("genre:{genre}"), "album", limit).await?;
        Ok(page_to_summaries(response.albums))
    }

    /// Playlists matching a genre keyword (plain keyword search; the
    /// service does not tag playlists with genres)
    pub async fn search_playlists(
        &self,
        genre: &str,
        limit: u32,
    ) -> Result<Vec<PlaylistSummary>, CatalogError> {
        let response = self.search(genre, "playlist", limit).await?;
        Ok(page_to_summaries(response.playlists))
    }

    /// First artist match for a free-text name, if any
    pub async fn find_artist(&self, name: &str) -> Result<Option<ArtistSummary>, CatalogError> {
        let response = self.search(&format!("artist:{name}"), "artist", 1).await?;
        Ok(page_to_summaries(response.artists).into_iter().next())
    }

    /// Track lookup by id
    pub async fn track(&self, id: &str) -> Result<TrackSummary, CatalogError> {
        let track: TrackObject = self.get_json(&format!("/tracks/{id}"), &[]).await?;
        Ok(track.into())
    }

    /// Artist lookup by id (full object, including genre tags)
    pub async fn artist(&self, id: &str) -> Result<ArtistSummary, CatalogError> {
        let artist: ArtistObject = self.get_json(&format!("/artists/{id}"), &[]).await?;
        Ok(artist.into())
    }

    /// Artists related to the given artist id
    pub async fn related_artists(
        &self,
        artist_id: &str,
    ) -> Result<Vec<ArtistSummary>, CatalogError> {
        let response: RelatedArtistsResponse = self
            .get_json(&format!("/artists/{artist_id}/related-artists"), &[])
            .await?;
        Ok(response.artists.into_iter().map(Into::into).collect())
    }

    /// Recommendation endpoint with optional target parameters
    pub async fn recommend_tracks(
        &self,
        seed_genres: &[&str],
        limit: u32,
        targets: &TargetParams,
    ) -> Result<Vec<TrackSummary>, CatalogError> {
        let mut query = vec![
            ("seed_genres", seed_genres.join(",")),
            ("limit", limit.to_string()),
            ("market", self.config.market.clone()),
        ];
        query.extend(targets.query_pairs());

        let response: RecommendationsResponse = self.get_json("/recommendations", &query).await?;
        Ok(response.tracks.into_iter().map(Into::into).collect())
    }

    /// Batch audio features. Null entries (ids the service does not know)
    /// are filtered out; order of the remaining entries is preserved.
    pub async fn audio_features(
        &self,
        track_ids: &[String],
    ) -> Result<Vec<AudioFeatures>, CatalogError> {
        if track_ids.is_empty() {
            return Ok(Vec::new());
        }

        let response: AudioFeaturesResponse = self
            .get_json("/audio-features", &[("ids", track_ids.join(","))])
            .await?;

        Ok(response.audio_features.into_iter().flatten().collect())
    }
}

/// Flatten an optional page of optional items into summaries
fn page_to_summaries<T, S: From<T>>(page: Option<super::models::Paging<T>>) -> Vec<S> {
    page.unwrap_or_default()
        .present()
        .into_iter()
        .map(Into::into)
        .collect()
}
