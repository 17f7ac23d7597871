//! Per-genre search strategies
//!
//! The catalog's genre tags are unreliable for some scenes (K-pop, J-pop,
//! Latin, ...), so those genres search by curated seed artists instead.
//! Fast-moving genres add year filters for freshness; a few "vibe" genres
//! add mood keywords. Everything here is a static table; the engine turns
//! a strategy into a concrete query plan.

use once_cell::sync::Lazy;
use std::collections::{HashMap, HashSet};

/// Curated top artists for genres whose catalog genre tags are unreliable
static GENRE_SEED_ARTISTS: Lazy<HashMap<&'static str, Vec<&'static str>>> = Lazy::new(|| {
    HashMap::from([
        (
            "k-pop",
            vec![
                "BTS", "BLACKPINK", "Stray Kids", "NewJeans", "Jungkook", "Jimin", "TWICE",
                "SEVENTEEN", "Enhypen", "TXT",
            ],
        ),
        (
            "j-pop",
            vec![
                "Yoasobi", "Official HIGE DANdism", "Ado", "King Gnu", "Eve", "Kenshi Yonezu",
                "LiSA", "Aimer",
            ],
        ),
        (
            "anime",
            vec![
                "LiSA", "Aimer", "Yoasobi", "Kenshi Yonezu", "Eve", "Asian Kung-Fu Generation",
                "Unison Square Garden",
            ],
        ),
        (
            "latin",
            vec![
                "Bad Bunny", "Karol G", "Peso Pluma", "Feid", "Rauw Alejandro", "Myke Towers",
                "Rosalía", "J Balvin",
            ],
        ),
        (
            "reggaeton",
            vec![
                "Bad Bunny", "Karol G", "Daddy Yankee", "Ozuna", "Nicky Jam", "Maluma",
                "J Balvin", "Rauw Alejandro",
            ],
        ),
        (
            "afrobeat",
            vec![
                "Burna Boy", "Wizkid", "Tems", "Rema", "Asake", "Ayra Starr", "Fireboy DML",
                "Omah Lay",
            ],
        ),
        (
            "brazil",
            vec![
                "Anitta", "Ludmilla", "Pabllo Vittar", "Mc Don Juan", "Alok", "Vintage Culture",
            ],
        ),
    ])
});

/// Genres that benefit from year filtering for freshness
static TIME_SENSITIVE_GENRES: Lazy<HashSet<&'static str>> = Lazy::new(|| {
    [
        "edm", "house", "techno", "dubstep", "trap", "hip-hop", "pop", "k-pop", "j-pop", "latin",
        "reggaeton", "afrobeat",
    ]
    .into_iter()
    .collect()
});

/// Genres that benefit from mood/vibe keywords
static MOOD_BASED_GENRES: Lazy<HashMap<&'static str, Vec<&'static str>>> = Lazy::new(|| {
    HashMap::from([
        ("chill", vec!["relaxing", "calm", "study"]),
        ("sad", vec!["melancholic", "emotional", "heartbreak"]),
        ("happy", vec!["upbeat", "feel good", "positive"]),
        ("party", vec!["dance", "club", "party"]),
        ("work-out", vec!["gym", "workout", "motivation", "energy"]),
    ])
});

/// The search plan shape for one genre
#[derive(Debug, Clone)]
pub struct SearchStrategy {
    pub use_artist_search: bool,
    pub seed_artists: Vec<&'static str>,
    pub use_year_filter: bool,
    pub mood_keywords: Vec<&'static str>,
    pub prioritize_related_artists: bool,
    pub max_related_artists: usize,
}

/// The optimal search strategy for a given genre
pub fn strategy_for(genre: &str) -> SearchStrategy {
    let artist_focused = GENRE_SEED_ARTISTS.contains_key(genre);
    SearchStrategy {
        use_artist_search: artist_focused,
        seed_artists: GENRE_SEED_ARTISTS.get(genre).cloned().unwrap_or_default(),
        use_year_filter: TIME_SENSITIVE_GENRES.contains(genre),
        mood_keywords: MOOD_BASED_GENRES.get(genre).cloned().unwrap_or_default(),
        prioritize_related_artists: artist_focused,
        max_related_artists: if artist_focused { 8 } else { 5 },
    }
}
