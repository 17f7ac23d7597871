//! Seed-genre vocabulary and classifier-label remapping
//!
//! The catalog service only accepts genre query strings from a fixed
//! vocabulary. Classifier output maps onto it through a small remap table
//! (labels the classifier uses but the service does not know), falling
//! back to `pop` for anything else.

use once_cell::sync::Lazy;
use std::collections::{HashMap, HashSet};

/// Fallback seed when a label has no usable mapping
pub const FALLBACK_SEED: &str = "pop";

/// The catalog service's accepted seed-genre vocabulary
pub static SEED_GENRES: Lazy<HashSet<&'static str>> = Lazy::new(|| {
    [
        "acoustic", "afrobeat", "alt-rock", "alternative", "ambient", "anime", "bluegrass",
        "blues", "bossanova", "brazil", "breakbeat", "british", "chicago-house", "chill",
        "classical", "club", "comedy", "country", "dance", "dancehall", "deep-house",
        "detroit-techno", "disco", "dub", "dubstep", "edm", "electronic", "emo", "folk", "funk",
        "gospel", "grunge", "guitar", "happy", "hard-rock", "hardcore", "hip-hop", "house",
        "indie", "industrial", "j-pop", "j-rock", "jazz", "k-pop", "latin", "metal",
        "minimal-techno", "new-age", "opera", "party", "piano", "pop", "power-pop",
        "progressive-house", "punk", "punk-rock", "r-n-b", "rainy-day", "reggae", "reggaeton",
        "rock", "romance", "sad", "soul", "soundtracks", "study", "summer", "techno", "trance",
        "trip-hop", "work-out",
    ]
    .into_iter()
    .collect()
});

/// Classifier label → seed genre remap, for labels outside the vocabulary
static GENRE_REMAP: Lazy<HashMap<&'static str, &'static str>> = Lazy::new(|| {
    [
        ("lofi", "chill"),
        ("metalcore", "metal"),
        ("trap", "hip-hop"),
        ("alt-rock", "alternative"),
        ("indie-rock", "indie"),
        ("electropop", "pop"),
        ("house-edm", "house"),
    ]
    .into_iter()
    .collect()
});

/// Resolve a classifier label (or any free-form genre string) to a valid
/// seed genre: remap first, then vocabulary membership, else the fallback.
pub fn resolve_seed_genre(label: &str) -> &'static str {
    let label = label.trim().to_lowercase();
    let candidate = GENRE_REMAP
        .get(label.as_str())
        .copied()
        .unwrap_or(label.as_str());

    SEED_GENRES.get(candidate).copied().unwrap_or(FALLBACK_SEED)
}

#[cfg(test)]
mod tests {
    use super::*;
    use moodflow_common::Genre;

    #[test]
    fn direct_vocabulary_members_pass_through() {
        assert_eq!(resolve_seed_genre("rock"), "rock");
        assert_eq!(resolve_seed_genre("jazz"), "jazz");
        assert_eq!(resolve_seed_genre("AMBIENT"), "ambient");
    }

    #[test]
    fn remapped_labels_resolve() {
        assert_eq!(resolve_seed_genre("lofi"), "chill");
        assert_eq!(resolve_seed_genre("trap"), "hip-hop");
    }

    #[test]
    fn unknown_labels_fall_back_to_pop() {
        assert_eq!(resolve_seed_genre("post-vaporwave"), "pop");
        assert_eq!(resolve_seed_genre(""), "pop");
    }

    #[test]
    fn every_classifier_label_resolves_to_a_valid_seed() {
        for genre in Genre::ALL {
            let seed = resolve_seed_genre(genre.as_str());
            assert!(SEED_GENRES.contains(seed), "{genre} resolved to invalid seed {seed}");
        }
    }
}
