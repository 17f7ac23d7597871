//! Recommendation explanation
//!
//! Renders a short human-readable line pairing the mood's target
//! parameters against the values actually measured from the upload.

use crate::catalog::models::TargetParams;
use moodflow_common::{FeatureVector, Mood};

/// Explain why a recommendation set looks the way it does
pub fn explain_recommendation(
    mood: Mood,
    seed_genre: &str,
    targets: &TargetParams,
    features: &FeatureVector,
) -> String {
    let mut parts = vec![
        format!("**Mood:** {mood}"),
        format!("**Genre seed:** {seed_genre}"),
    ];

    if let (Some(target), Some(measured)) = (targets.target_energy, features.get("energy")) {
        parts.push(format!("Energy {measured:.2} (target {target:.2})"));
    }
    if let (Some(target), Some(measured)) = (targets.target_valence, features.get("valence")) {
        parts.push(format!("Valence {measured:.2} (target {target:.2})"));
    }
    if let (Some(target), Some(measured)) =
        (targets.target_danceability, features.get("danceability"))
    {
        parts.push(format!("Danceability {measured:.2} (target {target:.2})"));
    }
    if let Some(tempo) = features.get("tempo_bpm") {
        parts.push(format!("Tempo ≈{tempo:.0} BPM"));
    }

    parts.join(" • ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::recommender::engine::mood_targets;

    #[test]
    fn always_names_mood_and_seed() {
        let text =
            explain_recommendation(Mood::Neutral, "pop", &TargetParams::default(), &FeatureVector::new());
        assert!(text.contains("**Mood:** neutral"));
        assert!(text.contains("**Genre seed:** pop"));
    }

    #[test]
    fn pairs_targets_with_measured_values_when_both_exist() {
        let mut features = FeatureVector::new();
        features.insert("energy", 0.91);
        features.insert("tempo_bpm", 128.0);

        let targets = mood_targets(Mood::Energetic);
        let text = explain_recommendation(Mood::Energetic, "edm", &targets, &features);

        assert!(text.contains("Energy 0.91 (target 0.85)"));
        assert!(text.contains("Tempo ≈128 BPM"));
        // no measured valence/danceability, so no line for them
        assert!(!text.contains("Valence"));
        assert!(!text.contains("Danceability"));
    }
}
