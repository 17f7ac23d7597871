//! Catalog wire models and UI-facing summaries
//!
//! Every field the app reads off the wire is optional-with-default: the
//! upstream schema is not trusted to be complete, and search item arrays
//! can carry explicit nulls. Summaries are the flattened records the UI
//! and the recommender work with.

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Wire models (deserialization only)
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Image {
    #[serde(default)]
    pub url: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ExternalUrls {
    #[serde(default)]
    pub spotify: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ArtistObject {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub images: Vec<Image>,
    #[serde(default)]
    pub genres: Vec<String>,
    #[serde(default)]
    pub external_urls: ExternalUrls,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct AlbumObject {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub images: Vec<Image>,
    #[serde(default)]
    pub artists: Vec<ArtistObject>,
    #[serde(default)]
    pub release_date: Option<String>,
    #[serde(default)]
    pub total_tracks: Option<u32>,
    #[serde(default)]
    pub external_urls: ExternalUrls,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct TrackObject {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub uri: Option<String>,
    #[serde(default)]
    pub artists: Vec<ArtistObject>,
    #[serde(default)]
    pub album: Option<AlbumObject>,
    #[serde(default)]
    pub preview_url: Option<String>,
    #[serde(default)]
    pub popularity: Option<u32>,
    #[serde(default)]
    pub external_urls: ExternalUrls,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct PlaylistOwner {
    #[serde(default)]
    pub display_name: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct PlaylistObject {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub images: Vec<Image>,
    #[serde(default)]
    pub owner: Option<PlaylistOwner>,
    #[serde(default)]
    pub external_urls: ExternalUrls,
}

/// One page of search results. Item arrays may contain explicit nulls
/// (observed for playlist searches), so items deserialize as options.
#[derive(Debug, Clone, Deserialize)]
pub struct Paging<T> {
    #[serde(default = "Vec::new")]
    pub items: Vec<Option<T>>,
}

impl<T> Default for Paging<T> {
    fn default() -> Self {
        Self { items: Vec::new() }
    }
}

impl<T> Paging<T> {
    /// The non-null items, order preserved
    pub fn present(self) -> Vec<T> {
        self.items.into_iter().flatten().collect()
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct SearchResponse {
    #[serde(default)]
    pub artists: Option<Paging<ArtistObject>>,
    #[serde(default)]
    pub tracks: Option<Paging<TrackObject>>,
    #[serde(default)]
    pub albums: Option<Paging<AlbumObject>>,
    #[serde(default)]
    pub playlists: Option<Paging<PlaylistObject>>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RecommendationsResponse {
    #[serde(default)]
    pub tracks: Vec<TrackObject>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RelatedArtistsResponse {
    #[serde(default)]
    pub artists: Vec<ArtistObject>,
}

/// Batch audio-features payload; entries are null for unknown ids
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AudioFeaturesResponse {
    #[serde(default)]
    pub audio_features: Vec<Option<AudioFeatures>>,
}

/// Per-track acoustic summary from the catalog service (0-1 scales
/// except tempo)
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AudioFeatures {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub energy: Option<f64>,
    #[serde(default)]
    pub valence: Option<f64>,
    #[serde(default)]
    pub danceability: Option<f64>,
    #[serde(default)]
    pub tempo: Option<f64>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UserProfile {
    pub id: String,
    #[serde(default)]
    pub display_name: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TokenResponse {
    pub access_token: String,
    #[serde(default)]
    pub expires_in: u64,
    #[serde(default)]
    pub refresh_token: Option<String>,
}

// ---------------------------------------------------------------------------
// Target parameters
// ---------------------------------------------------------------------------

/// Numeric hints (0-1 scale) passed to a recommendation call to bias
/// results toward a desired acoustic quality
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct TargetParams {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub target_energy: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub target_valence: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub target_danceability: Option<f64>,
}

impl TargetParams {
    pub fn is_empty(&self) -> bool {
        *self == TargetParams::default()
    }

    /// Query-string pairs for the recommendation endpoint
    pub fn query_pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = Vec::new();
        if let Some(v) = self.target_energy {
            pairs.push(("target_energy", v.to_string()));
        }
        if let Some(v) = self.target_valence {
            pairs.push(("target_valence", v.to_string()));
        }
        if let Some(v) = self.target_danceability {
            pairs.push(("target_danceability", v.to_string()));
        }
        pairs
    }
}

// ---------------------------------------------------------------------------
// UI-facing summaries
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize)]
pub struct ArtistSummary {
    pub id: Option<String>,
    pub name: String,
    pub url: Option<String>,
    pub image: Option<String>,
    pub genres: Vec<String>,
}

impl From<ArtistObject> for ArtistSummary {
    fn from(artist: ArtistObject) -> Self {
        Self {
            id: artist.id,
            name: artist.name.unwrap_or_else(|| "Unknown".to_string()),
            url: artist.external_urls.spotify,
            image: artist.images.into_iter().next().map(|i| i.url),
            genres: artist.genres,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct TrackSummary {
    pub id: Option<String>,
    pub title: String,
    pub artist: String,
    pub url: Option<String>,
    pub preview: Option<String>,
    pub cover: Option<String>,
    pub uri: Option<String>,
    pub popularity: u32,
    pub release_date: Option<String>,
}

impl From<TrackObject> for TrackSummary {
    fn from(track: TrackObject) -> Self {
        let artist = track
            .artists
            .first()
            .and_then(|a| a.name.clone())
            .unwrap_or_else(|| "Unknown".to_string());
        let (cover, release_date) = match track.album {
            Some(album) => (
                album.images.into_iter().next().map(|i| i.url),
                album.release_date,
            ),
            None => (None, None),
        };
        Self {
            id: track.id,
            title: track.name.unwrap_or_else(|| "Unknown".to_string()),
            artist,
            url: track.external_urls.spotify,
            preview: track.preview_url,
            cover,
            uri: track.uri,
            popularity: track.popularity.unwrap_or(0),
            release_date,
        }
    }
}

impl TrackSummary {
    /// Release year parsed from the leading `YYYY` of the release date
    pub fn release_year(&self) -> Option<i32> {
        self.release_date
            .as_deref()
            .and_then(|d| d.get(0..4))
            .and_then(|y| y.parse().ok())
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct AlbumSummary {
    pub id: Option<String>,
    pub name: String,
    pub artist: String,
    pub url: Option<String>,
    pub image: Option<String>,
    pub release_date: Option<String>,
    pub total_tracks: u32,
}

impl From<AlbumObject> for AlbumSummary {
    fn from(album: AlbumObject) -> Self {
        Self {
            id: album.id,
            name: album.name.unwrap_or_else(|| "Unknown".to_string()),
            artist: album
                .artists
                .first()
                .and_then(|a| a.name.clone())
                .unwrap_or_else(|| "Unknown".to_string()),
            url: album.external_urls.spotify,
            image: album.images.into_iter().next().map(|i| i.url),
            release_date: album.release_date,
            total_tracks: album.total_tracks.unwrap_or(0),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct PlaylistSummary {
    pub id: Option<String>,
    pub name: String,
    pub url: Option<String>,
    pub image: Option<String>,
    pub owner: String,
}

impl From<PlaylistObject> for PlaylistSummary {
    fn from(playlist: PlaylistObject) -> Self {
        Self {
            id: playlist.id,
            name: playlist.name.unwrap_or_else(|| "Unknown".to_string()),
            url: playlist.external_urls.spotify,
            image: playlist.images.into_iter().next().map(|i| i.url),
            owner: playlist
                .owner
                .and_then(|o| o.display_name)
                .unwrap_or_default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn paging_filters_nulls_preserving_order() {
        let json = r#"{"items": [
            {"id": "a", "name": "First"},
            null,
            {"id": "b", "name": "Second"},
            null
        ]}"#;
        let page: Paging<PlaylistObject> = serde_json::from_str(json).unwrap();
        let present = page.present();
        assert_eq!(present.len(), 2);
        assert_eq!(present[0].id.as_deref(), Some("a"));
        assert_eq!(present[1].id.as_deref(), Some("b"));
    }

    #[test]
    fn audio_features_nulls_deserialize() {
        let json = r#"{"audio_features": [
            {"id": "x", "energy": 0.8},
            null,
            {"id": "y", "valence": 0.2}
        ]}"#;
        let response: AudioFeaturesResponse = serde_json::from_str(json).unwrap();
        let present: Vec<_> = response.audio_features.into_iter().flatten().collect();
        assert_eq!(present.len(), 2);
        assert_eq!(present[0].id, "x");
        assert_eq!(present[1].id, "y");
    }

    #[test]
    fn sparse_track_fills_defaults() {
        let track: TrackObject = serde_json::from_str(r#"{"id": "t1"}"#).unwrap();
        let summary = TrackSummary::from(track);
        assert_eq!(summary.title, "Unknown");
        assert_eq!(summary.artist, "Unknown");
        assert_eq!(summary.popularity, 0);
        assert_eq!(summary.release_year(), None);
    }

    #[test]
    fn release_year_parses_date_prefixes() {
        let mut track = TrackSummary::from(TrackObject::default());
        track.release_date = Some("2024-03-01".to_string());
        assert_eq!(track.release_year(), Some(2024));

        track.release_date = Some("1999".to_string());
        assert_eq!(track.release_year(), Some(1999));

        track.release_date = Some("??".to_string());
        assert_eq!(track.release_year(), None);
    }

    #[test]
    fn target_params_query_pairs() {
        let targets = TargetParams {
            target_energy: Some(0.85),
            target_valence: None,
            target_danceability: Some(0.75),
        };
        let pairs = targets.query_pairs();
        assert_eq!(pairs.len(), 2);
        assert_eq!(pairs[0].0, "target_energy");
        assert!(!targets.is_empty());
        assert!(TargetParams::default().is_empty());
    }
}
