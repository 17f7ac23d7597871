//! Core data model: feature vectors, mood/genre labels, history records

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Default energy when the descriptor is absent from a feature vector
pub const DEFAULT_ENERGY: f64 = 0.5;
/// Default tempo (BPM) when the descriptor is absent
pub const DEFAULT_TEMPO_BPM: f64 = 120.0;
/// Default spectral centroid (Hz) when the descriptor is absent
pub const DEFAULT_SPECTRAL_CENTROID: f64 = 2000.0;

/// Named scalar descriptors extracted from one audio clip.
///
/// Produced once per uploaded clip and immutable afterwards. Different
/// pipeline variants populate different key subsets, so consumers read
/// through [`FeatureVector::get_or`] with a per-key default rather than
/// assuming presence.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FeatureVector(BTreeMap<String, f64>);

impl FeatureVector {
    pub fn new() -> Self {
        Self(BTreeMap::new())
    }

    pub fn insert(&mut self, name: impl Into<String>, value: f64) {
        self.0.insert(name.into(), value);
    }

    pub fn get(&self, name: &str) -> Option<f64> {
        self.0.get(name).copied()
    }

    /// Read a descriptor, falling back to `default` when absent
    pub fn get_or(&self, name: &str, default: f64) -> f64 {
        self.get(name).unwrap_or(default)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, f64)> {
        self.0.iter().map(|(k, v)| (k.as_str(), *v))
    }
}

impl FromIterator<(String, f64)> for FeatureVector {
    fn from_iter<T: IntoIterator<Item = (String, f64)>>(iter: T) -> Self {
        Self(iter.into_iter().collect())
    }
}

/// Coarse mood label derived from threshold rules
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Mood {
    Happy,
    Energetic,
    Sad,
    Calm,
    Neutral,
}

impl Mood {
    pub const ALL: [Mood; 5] = [
        Mood::Happy,
        Mood::Energetic,
        Mood::Sad,
        Mood::Calm,
        Mood::Neutral,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Mood::Happy => "happy",
            Mood::Energetic => "energetic",
            Mood::Sad => "sad",
            Mood::Calm => "calm",
            Mood::Neutral => "neutral",
        }
    }
}

impl std::fmt::Display for Mood {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Mood {
    type Err = crate::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Mood::ALL
            .into_iter()
            .find(|m| m.as_str() == s)
            .ok_or_else(|| crate::Error::InvalidInput(format!("Unknown mood: {s}")))
    }
}

/// Coarse genre label derived from threshold rules.
///
/// This is the classifier's own vocabulary, not the catalog service's seed
/// vocabulary; the two are bridged by a remap table in the server crate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Genre {
    Edm,
    Rock,
    Lofi,
    Ambient,
    Jazz,
    Pop,
}

impl Genre {
    pub const ALL: [Genre; 6] = [
        Genre::Edm,
        Genre::Rock,
        Genre::Lofi,
        Genre::Ambient,
        Genre::Jazz,
        Genre::Pop,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Genre::Edm => "edm",
            Genre::Rock => "rock",
            Genre::Lofi => "lofi",
            Genre::Ambient => "ambient",
            Genre::Jazz => "jazz",
            Genre::Pop => "pop",
        }
    }
}

impl std::fmt::Display for Genre {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One analysis session as persisted in the history log.
///
/// `genre` holds the resolved seed-genre string (which may fall outside the
/// classifier's [`Genre`] vocabulary after remapping).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistorySession {
    pub mood: Mood,
    pub genre: String,
    pub timestamp: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn feature_vector_defaults_apply_only_when_absent() {
        let mut features = FeatureVector::new();
        assert_eq!(features.get_or("energy", DEFAULT_ENERGY), 0.5);

        features.insert("energy", 0.9);
        assert_eq!(features.get_or("energy", DEFAULT_ENERGY), 0.9);
        assert_eq!(features.get("tempo_bpm"), None);
    }

    #[test]
    fn labels_serialize_lowercase() {
        assert_eq!(serde_json::to_string(&Mood::Happy).unwrap(), "\"happy\"");
        assert_eq!(serde_json::to_string(&Genre::Lofi).unwrap(), "\"lofi\"");
    }

    #[test]
    fn mood_round_trips_through_from_str() {
        for mood in Mood::ALL {
            assert_eq!(mood.as_str().parse::<Mood>().unwrap(), mood);
        }
        assert!("upbeat".parse::<Mood>().is_err());
    }

    #[test]
    fn history_session_serializes_expected_fields() {
        let session = HistorySession {
            mood: Mood::Calm,
            genre: "chill".to_string(),
            timestamp: Utc::now(),
        };
        let value = serde_json::to_value(&session).unwrap();
        assert_eq!(value["mood"], "calm");
        assert_eq!(value["genre"], "chill");
        assert!(value["timestamp"].is_string());
    }
}
