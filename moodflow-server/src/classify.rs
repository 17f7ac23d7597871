//! Mood and genre classification
//!
//! Both classifiers are a single canonical, versioned rule table: an
//! ordered sequence of {predicate, label} pairs evaluated top to bottom,
//! first match wins. Rules are not mutually exclusive by construction, so
//! the ordering is part of the behavior, not an implementation detail.
//!
//! The classifiers are total: every missing descriptor falls back to a
//! fixed default, and the final table entry is an unconditional fallback,
//! so any feature vector (including an empty one) maps to a label.

use moodflow_common::model::{
    FeatureVector, Genre, Mood, DEFAULT_ENERGY, DEFAULT_SPECTRAL_CENTROID, DEFAULT_TEMPO_BPM,
};

/// Descriptor snapshot the rule predicates read, with defaults applied
#[derive(Debug, Clone, Copy)]
pub struct Snapshot {
    pub energy: f64,
    pub tempo: f64,
    pub centroid: f64,
}

impl Snapshot {
    fn from_features(features: &FeatureVector) -> Self {
        Self {
            energy: features.get_or("energy", DEFAULT_ENERGY),
            tempo: features.get_or("tempo_bpm", DEFAULT_TEMPO_BPM),
            centroid: features.get_or("spectral_centroid_mean", DEFAULT_SPECTRAL_CENTROID),
        }
    }
}

/// Ordered first-match-wins rule table
struct RuleTable<L: Copy + 'static> {
    version: u32,
    rules: &'static [(fn(Snapshot) -> bool, L)],
    fallback: L,
}

impl<L: Copy + 'static> RuleTable<L> {
    fn classify(&self, features: &FeatureVector) -> L {
        let snapshot = Snapshot::from_features(features);
        self.rules
            .iter()
            .find(|(predicate, _)| predicate(snapshot))
            .map(|&(_, label)| label)
            .unwrap_or(self.fallback)
    }
}

/// Mood rules, version 1.
///
/// High energy splits on tempo (fast → happy, slower → energetic); low
/// energy splits on tempo (slow → sad, otherwise calm); the mid band is
/// neutral. All comparisons are strict.
static MOOD_RULES: RuleTable<Mood> = RuleTable {
    version: 1,
    rules: &[
        (|s| s.energy > 0.7 && s.tempo > 120.0, Mood::Happy),
        (|s| s.energy > 0.7, Mood::Energetic),
        (|s| s.energy < 0.4 && s.tempo < 100.0, Mood::Sad),
        (|s| s.energy < 0.4, Mood::Calm),
    ],
    fallback: Mood::Neutral,
};

/// Genre rules, version 1.
static GENRE_RULES: RuleTable<Genre> = RuleTable {
    version: 1,
    rules: &[
        (|s| s.energy > 0.8 && s.tempo > 130.0, Genre::Edm),
        (|s| s.energy > 0.7, Genre::Rock),
        (|s| s.centroid < 1500.0 && s.tempo < 100.0, Genre::Lofi),
        (|s| s.energy < 0.4, Genre::Ambient),
        (|s| s.tempo < 90.0, Genre::Jazz),
    ],
    fallback: Genre::Pop,
};

/// Classify the mood of a clip from its feature vector. Never fails.
pub fn predict_mood(features: &FeatureVector) -> Mood {
    MOOD_RULES.classify(features)
}

/// Classify the coarse genre of a clip from its feature vector. Never fails.
pub fn predict_genre(features: &FeatureVector) -> Genre {
    GENRE_RULES.classify(features)
}

/// Version of the active rule tables (mood, genre)
pub fn rule_versions() -> (u32, u32) {
    (MOOD_RULES.version, GENRE_RULES.version)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn features(pairs: &[(&str, f64)]) -> FeatureVector {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), *v))
            .collect()
    }

    #[test]
    fn empty_features_hit_the_fallbacks() {
        let empty = FeatureVector::new();
        // defaults (energy 0.5, tempo 120) fail every threshold
        assert_eq!(predict_mood(&empty), Mood::Neutral);
        assert_eq!(predict_genre(&empty), Genre::Pop);
    }

    #[test]
    fn energy_threshold_is_strict() {
        // energy exactly at the threshold is NOT high energy
        let boundary = features(&[("energy", 0.7), ("tempo_bpm", 121.0)]);
        assert_eq!(predict_mood(&boundary), Mood::Neutral);

        let above = features(&[("energy", 0.71), ("tempo_bpm", 121.0)]);
        assert_eq!(predict_mood(&above), Mood::Happy);
    }

    #[test]
    fn tempo_splits_high_energy_moods() {
        let fast = features(&[("energy", 0.8), ("tempo_bpm", 121.0)]);
        assert_eq!(predict_mood(&fast), Mood::Happy);

        // tempo exactly 120 falls to the second rule
        let at_threshold = features(&[("energy", 0.8), ("tempo_bpm", 120.0)]);
        assert_eq!(predict_mood(&at_threshold), Mood::Energetic);
    }

    #[test]
    fn low_energy_moods() {
        assert_eq!(
            predict_mood(&features(&[("energy", 0.3), ("tempo_bpm", 90.0)])),
            Mood::Sad
        );
        assert_eq!(
            predict_mood(&features(&[("energy", 0.3), ("tempo_bpm", 110.0)])),
            Mood::Calm
        );
    }

    #[test]
    fn genre_rule_order_matters() {
        // satisfies both the edm and rock predicates; edm is listed first
        let both = features(&[("energy", 0.9), ("tempo_bpm", 140.0)]);
        assert_eq!(predict_genre(&both), Genre::Edm);

        // high energy but slow tempo: rock, not edm
        let slow = features(&[("energy", 0.9), ("tempo_bpm", 120.0)]);
        assert_eq!(predict_genre(&slow), Genre::Rock);
    }

    #[test]
    fn genre_branches() {
        assert_eq!(
            predict_genre(&features(&[
                ("energy", 0.5),
                ("tempo_bpm", 80.0),
                ("spectral_centroid_mean", 1200.0),
            ])),
            Genre::Lofi
        );
        assert_eq!(
            predict_genre(&features(&[("energy", 0.3), ("tempo_bpm", 110.0)])),
            Genre::Ambient
        );
        assert_eq!(
            predict_genre(&features(&[("energy", 0.5), ("tempo_bpm", 85.0)])),
            Genre::Jazz
        );
        assert_eq!(
            predict_genre(&features(&[("energy", 0.5), ("tempo_bpm", 110.0)])),
            Genre::Pop
        );
    }

    #[test]
    fn classifiers_are_total_and_deterministic() {
        // sweep a grid well outside the sensible range; every point must
        // classify, to a stable label
        for energy in [-10.0, 0.0, 0.39, 0.4, 0.7, 0.71, 1.0, 99.0, f64::NAN] {
            for tempo in [-5.0, 0.0, 89.9, 120.0, 130.1, 500.0] {
                let input = features(&[("energy", energy), ("tempo_bpm", tempo)]);
                let mood_a = predict_mood(&input);
                let mood_b = predict_mood(&input);
                assert_eq!(mood_a, mood_b);
                assert!(Mood::ALL.contains(&mood_a));

                let genre_a = predict_genre(&input);
                assert!(Genre::ALL.contains(&genre_a));
                assert_eq!(genre_a, predict_genre(&input));
            }
        }
    }

    #[test]
    fn unrelated_keys_are_ignored() {
        let input = features(&[("mfcc_mean", -20.0), ("zcr_mean", 0.4)]);
        assert_eq!(predict_mood(&input), Mood::Neutral);
        assert_eq!(predict_genre(&input), Genre::Pop);
    }

    #[test]
    fn rule_tables_are_versioned() {
        assert_eq!(rule_versions(), (1, 1));
    }
}
