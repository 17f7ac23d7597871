//! Playlist assembly
//!
//! The recommendation path is one catalog call biased by mood targets.
//! The discover path expands a per-genre strategy into a query plan, runs
//! it with bounded, order-preserving concurrency, then applies the
//! deterministic merge contract: dedupe by id (first occurrence wins),
//! drop the seed track, sort by (recent-release, popularity) descending,
//! truncate.

use super::strategies::strategy_for;
use crate::catalog::models::{TargetParams, TrackSummary};
use crate::catalog::{CatalogClient, CatalogError};
use chrono::{Datelike, Utc};
use futures::stream::{self, StreamExt};
use moodflow_common::Mood;
use std::collections::HashSet;
use std::sync::Arc;

/// Fixed worker limit for the discover fan-out
const MAX_CONCURRENT_SEARCHES: usize = 4;
/// Cap on artist-focused queries per discover call
const MAX_ARTIST_QUERIES: usize = 15;

/// Mood → recommendation target parameters
pub fn mood_targets(mood: Mood) -> TargetParams {
    match mood {
        Mood::Energetic => TargetParams {
            target_energy: Some(0.85),
            target_danceability: Some(0.75),
            target_valence: Some(0.65),
        },
        Mood::Happy => TargetParams {
            target_valence: Some(0.8),
            target_energy: Some(0.7),
            target_danceability: None,
        },
        Mood::Calm => TargetParams {
            target_energy: Some(0.25),
            target_valence: Some(0.55),
            target_danceability: None,
        },
        // no targets defined for the remaining moods
        Mood::Sad | Mood::Neutral => TargetParams::default(),
    }
}

/// Result of a discover run. `failed_searches` separates "a sub-search
/// errored and was skipped" from "the catalog had nothing".
#[derive(Debug)]
pub struct DiscoverResult {
    pub tracks: Vec<TrackSummary>,
    pub queries_run: usize,
    pub failed_searches: usize,
}

/// Builds playlist-sized track lists from mood and genre labels
pub struct PlaylistEngine {
    catalog: Arc<CatalogClient>,
}

impl PlaylistEngine {
    pub fn new(catalog: Arc<CatalogClient>) -> Self {
        Self { catalog }
    }

    /// Recommendation path: one catalog recommendation call with the
    /// mood's target parameters.
    pub async fn build(
        &self,
        seed_genre: &str,
        mood: Mood,
        limit: u32,
    ) -> Result<Vec<TrackSummary>, CatalogError> {
        let targets = mood_targets(mood);
        tracing::debug!(
            seed_genre = %seed_genre,
            mood = %mood,
            has_targets = !targets.is_empty(),
            "Building recommendation playlist"
        );
        self.catalog
            .recommend_tracks(&[seed_genre], limit, &targets)
            .await
    }

    /// Discover path: strategy-driven catalog searches, merged under the
    /// deterministic dedupe-then-rank contract.
    pub async fn discover(
        &self,
        seed_genre: &str,
        seed_track_id: Option<&str>,
        limit: usize,
    ) -> DiscoverResult {
        let mut failed_searches = 0usize;

        // Context from the seed track, best effort: its lead artist can
        // refine both the genre and the artist-focused queries.
        let mut seed_artist: Option<String> = None;
        let mut genre = seed_genre.to_string();
        if let Some(track_id) = seed_track_id {
            match self.catalog.track(track_id).await {
                Ok(track) => {
                    seed_artist = Some(track.artist.clone());
                }
                Err(e) => {
                    tracing::warn!(track_id = %track_id, error = %e, "Seed track lookup failed");
                    failed_searches += 1;
                }
            }
        }
        if let Some(artist_name) = seed_artist.as_deref() {
            match self.catalog.find_artist(artist_name).await {
                Ok(Some(artist)) => {
                    if let Some(tag) = artist.genres.first() {
                        genre = tag.clone();
                    }
                }
                Ok(None) => {}
                Err(e) => {
                    tracing::warn!(artist = %artist_name, error = %e, "Seed artist lookup failed");
                    failed_searches += 1;
                }
            }
        }

        let strategy = strategy_for(&genre);
        tracing::debug!(
            genre = %genre,
            artist_search = strategy.use_artist_search,
            year_filter = strategy.use_year_filter,
            "Using discover strategy"
        );

        let queries = self
            .build_query_plan(&genre, seed_artist.as_deref(), &mut failed_searches)
            .await;
        let queries_run = queries.len();

        // Bounded fan-out; `buffered` keeps completion results in query
        // order, which the dedupe pass depends on.
        let results: Vec<Result<Vec<TrackSummary>, CatalogError>> = stream::iter(queries)
            .map(|(query, limit)| {
                let catalog = Arc::clone(&self.catalog);
                async move { catalog.search_tracks_query(&query, limit).await }
            })
            .buffered(MAX_CONCURRENT_SEARCHES)
            .collect()
            .await;

        let mut merged: Vec<TrackSummary> = Vec::new();
        for result in results {
            match result {
                Ok(tracks) => merged.extend(tracks),
                Err(e) => {
                    tracing::warn!(error = %e, "Discover sub-search failed, skipping");
                    failed_searches += 1;
                }
            }
        }

        let tracks = merge_tracks(merged, seed_track_id, limit);

        tracing::info!(
            genre = %genre,
            tracks = tracks.len(),
            queries_run,
            failed_searches,
            "Discover complete"
        );

        DiscoverResult {
            tracks,
            queries_run,
            failed_searches,
        }
    }

    /// Expand a strategy into concrete (query, limit) pairs
    async fn build_query_plan(
        &self,
        genre: &str,
        seed_artist: Option<&str>,
        failed_searches: &mut usize,
    ) -> Vec<(String, u32)> {
        let strategy = strategy_for(genre);
        let current_year = Utc::now().year();
        let year_range = format!("{}-{}", current_year - 1, current_year);
        let mut queries: Vec<(String, u32)> = Vec::new();

        if strategy.use_artist_search {
            let mut artists: Vec<String> = Vec::new();
            if let Some(name) = seed_artist {
                artists.push(name.to_string());
                artists.extend(
                    self.related_artist_names(name, strategy.max_related_artists, failed_searches)
                        .await,
                );
            }
            if artists.len() < 5 {
                artists.extend(
                    strategy
                        .seed_artists
                        .iter()
                        .take(10)
                        .map(|s| s.to_string()),
                );
            }

            for artist in artists.into_iter().take(MAX_ARTIST_QUERIES) {
                let query = if strategy.use_year_filter {
                    format!("artist:\"{artist}\" year:{year_range}")
                } else {
                    format!("artist:\"{artist}\"")
                };
                queries.push((query, 5));
            }
        } else if strategy.use_year_filter {
            for year in [current_year, current_year - 1] {
                queries.push((format!("genre:{genre} year:{year}"), 25));
            }
            if let Some(name) = seed_artist {
                for related in self.related_artist_names(name, 5, failed_searches).await {
                    queries.push((format!("artist:\"{related}\" year:{year_range}"), 5));
                }
            }
        } else {
            for keyword in &strategy.mood_keywords {
                queries.push((format!("genre:{genre} {keyword}"), 15));
            }
            queries.push((format!("genre:{genre}"), 30));
            if let Some(name) = seed_artist {
                for related in self.related_artist_names(name, 5, failed_searches).await {
                    queries.push((format!("artist:\"{related}\""), 5));
                }
            }
        }

        queries
    }

    /// Names of artists related to `artist_name`, best effort
    async fn related_artist_names(
        &self,
        artist_name: &str,
        max: usize,
        failed_searches: &mut usize,
    ) -> Vec<String> {
        let artist = match self.catalog.find_artist(artist_name).await {
            Ok(Some(artist)) => artist,
            Ok(None) => return Vec::new(),
            Err(e) => {
                tracing::warn!(artist = %artist_name, error = %e, "Artist search failed");
                *failed_searches += 1;
                return Vec::new();
            }
        };

        let Some(artist_id) = artist.id else {
            return Vec::new();
        };

        match self.catalog.related_artists(&artist_id).await {
            Ok(related) => related.into_iter().take(max).map(|a| a.name).collect(),
            Err(e) => {
                tracing::warn!(artist_id = %artist_id, error = %e, "Related artists failed");
                *failed_searches += 1;
                Vec::new()
            }
        }
    }
}

/// The deterministic merge contract: dedupe by id keeping the first
/// occurrence, drop tracks without an id and the seed track, rank by
/// (recent-release, popularity) descending, truncate.
pub fn merge_tracks(
    tracks: Vec<TrackSummary>,
    seed_track_id: Option<&str>,
    limit: usize,
) -> Vec<TrackSummary> {
    let current_year = Utc::now().year();
    let is_recent =
        |track: &TrackSummary| track.release_year().is_some_and(|y| y >= current_year - 1);

    let mut seen: HashSet<String> = HashSet::new();
    let mut merged: Vec<TrackSummary> = Vec::new();
    for track in tracks {
        let Some(id) = track.id.clone() else { continue };
        if seed_track_id == Some(id.as_str()) {
            continue;
        }
        if seen.insert(id) {
            merged.push(track);
        }
    }

    merged.sort_by(|a, b| {
        is_recent(b)
            .cmp(&is_recent(a))
            .then(b.popularity.cmp(&a.popularity))
    });
    merged.truncate(limit);
    merged
}

#[cfg(test)]
mod tests {
    use super::*;

    fn track(id: &str, popularity: u32, release_date: Option<&str>) -> TrackSummary {
        TrackSummary {
            id: Some(id.to_string()),
            title: format!("track-{id}"),
            artist: "artist".to_string(),
            url: None,
            preview: None,
            cover: None,
            uri: Some(format!("spotify:track:{id}")),
            popularity,
            release_date: release_date.map(|d| d.to_string()),
        }
    }

    #[test]
    fn mood_targets_table() {
        let energetic = mood_targets(Mood::Energetic);
        assert_eq!(energetic.target_energy, Some(0.85));
        assert_eq!(energetic.target_danceability, Some(0.75));
        assert_eq!(energetic.target_valence, Some(0.65));

        assert_eq!(mood_targets(Mood::Happy).target_valence, Some(0.8));
        assert_eq!(mood_targets(Mood::Calm).target_energy, Some(0.25));
        assert!(mood_targets(Mood::Neutral).is_empty());
        assert!(mood_targets(Mood::Sad).is_empty());
    }

    #[test]
    fn merge_dedupes_keeping_first_occurrence() {
        let current = Utc::now().year();
        let recent = format!("{current}-01-01");
        let tracks = vec![
            track("a", 10, Some(recent.as_str())),
            track("b", 90, None),
            track("a", 99, None), // duplicate id, different payload
        ];
        let merged = merge_tracks(tracks, None, 10);
        assert_eq!(merged.len(), 2);
        // first occurrence of "a" (popularity 10) was kept
        let a = merged.iter().find(|t| t.id.as_deref() == Some("a")).unwrap();
        assert_eq!(a.popularity, 10);
    }

    #[test]
    fn merge_excludes_the_seed_track() {
        let tracks = vec![track("seed", 100, None), track("x", 1, None)];
        let merged = merge_tracks(tracks, Some("seed"), 10);
        assert_eq!(merged.len(), 1);
        assert_eq!(merged[0].id.as_deref(), Some("x"));
    }

    #[test]
    fn merge_drops_tracks_without_an_id() {
        let mut anonymous = track("x", 50, None);
        anonymous.id = None;
        let merged = merge_tracks(vec![anonymous, track("y", 1, None)], None, 10);
        assert_eq!(merged.len(), 1);
    }

    #[test]
    fn ranking_puts_recent_releases_first_then_popularity() {
        let current = Utc::now().year();
        let recent = format!("{current}-05-01");
        let last_year = format!("{}-11-20", current - 1);
        let tracks = vec![
            track("old-popular", 95, Some("2001-01-01")),
            track("recent-quiet", 20, Some(last_year.as_str())),
            track("recent-popular", 80, Some(recent.as_str())),
            track("old-quiet", 5, None),
        ];

        let merged = merge_tracks(tracks, None, 10);
        let ids: Vec<_> = merged.iter().map(|t| t.id.as_deref().unwrap()).collect();
        assert_eq!(
            ids,
            vec!["recent-popular", "recent-quiet", "old-popular", "old-quiet"]
        );
    }

    #[test]
    fn merge_truncates_to_limit() {
        let tracks: Vec<TrackSummary> =
            (0..20).map(|i| track(&format!("t{i}"), i, None)).collect();
        let merged = merge_tracks(tracks, None, 7);
        assert_eq!(merged.len(), 7);
        // popularity descending within the non-recent group
        assert_eq!(merged[0].popularity, 19);
    }
}
