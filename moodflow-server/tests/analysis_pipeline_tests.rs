//! End-to-end analysis pipeline tests
//!
//! Synthesizes real WAV fixtures with hound and drives them through the
//! decode → extract → classify pipeline, both directly and over HTTP.

use axum::body::Body;
use axum::http::{Request, StatusCode};
use http_body_util::BodyExt;
use moodflow_common::config::AppConfig;
use moodflow_common::{Genre, Mood};
use moodflow_server::analysis::{decode_audio_bytes, FeatureExtractor};
use moodflow_server::classify::{predict_genre, predict_mood};
use moodflow_server::{build_router, AppState};
use tower::ServiceExt;

const SAMPLE_RATE: u32 = 22050;

/// Render samples into an in-memory 16-bit mono WAV
fn wav_fixture(samples: &[f32], sample_rate: u32) -> Vec<u8> {
    let spec = hound::WavSpec {
        channels: 1,
        sample_rate,
        bits_per_sample: 16,
        sample_format: hound::SampleFormat::Int,
    };
    let mut cursor = std::io::Cursor::new(Vec::new());
    {
        let mut writer = hound::WavWriter::new(&mut cursor, spec).unwrap();
        for &s in samples {
            writer
                .write_sample((s.clamp(-1.0, 1.0) * i16::MAX as f32) as i16)
                .unwrap();
        }
        writer.finalize().unwrap();
    }
    cursor.into_inner()
}

fn sine(frequency: f32, duration_secs: f32, sample_rate: u32) -> Vec<f32> {
    let num_samples = (duration_secs * sample_rate as f32) as usize;
    (0..num_samples)
        .map(|i| {
            let t = i as f32 / sample_rate as f32;
            (2.0 * std::f32::consts::PI * frequency * t).sin() * 0.5
        })
        .collect()
}

#[test]
fn pipeline_produces_labels_from_wav_bytes() {
    let bytes = wav_fixture(&sine(440.0, 2.0, SAMPLE_RATE), SAMPLE_RATE);

    let decoded = decode_audio_bytes(bytes, Some("wav"), SAMPLE_RATE).unwrap();
    let features = FeatureExtractor::new(decoded.sample_rate)
        .extract(&decoded.samples)
        .unwrap();

    for key in [
        "tempo_bpm",
        "spectral_centroid_mean",
        "zcr_mean",
        "mfcc_mean",
        "mfcc_std",
        "energy",
    ] {
        assert!(features.get(key).is_some(), "missing descriptor {key}");
    }

    let mood = predict_mood(&features);
    let genre = predict_genre(&features);
    assert!(Mood::ALL.contains(&mood));
    assert!(Genre::ALL.contains(&genre));
}

#[test]
fn pipeline_is_deterministic_end_to_end() {
    let bytes = wav_fixture(&sine(330.0, 2.0, SAMPLE_RATE), SAMPLE_RATE);

    let run = |bytes: Vec<u8>| {
        let decoded = decode_audio_bytes(bytes, Some("wav"), SAMPLE_RATE).unwrap();
        FeatureExtractor::new(decoded.sample_rate)
            .extract(&decoded.samples)
            .unwrap()
    };

    assert_eq!(run(bytes.clone()), run(bytes));
}

#[test]
fn higher_sample_rate_input_is_resampled_for_analysis() {
    let bytes = wav_fixture(&sine(440.0, 2.0, 44100), 44100);
    let decoded = decode_audio_bytes(bytes, Some("wav"), SAMPLE_RATE).unwrap();
    assert_eq!(decoded.sample_rate, SAMPLE_RATE);

    let features = FeatureExtractor::new(decoded.sample_rate)
        .extract(&decoded.samples)
        .unwrap();
    // the tone survives the rate change
    let centroid = features.get("spectral_centroid_mean").unwrap();
    assert!(centroid > 100.0 && centroid < 1500.0, "centroid {centroid}");
}

#[tokio::test]
async fn analyze_endpoint_runs_the_pipeline_and_appends_history() {
    let dir = tempfile::tempdir().unwrap();
    let mut config = AppConfig::default();
    config.history.path = dir.path().join("sessions.json");
    let state = AppState::new(config).unwrap();
    let history = state.history.clone();
    let app = build_router(state);

    let wav = wav_fixture(&sine(440.0, 2.0, SAMPLE_RATE), SAMPLE_RATE);

    let boundary = "MOODFLOWWAVBOUNDARY";
    let mut body = Vec::new();
    body.extend_from_slice(
        format!(
            "--{boundary}\r\n\
             Content-Disposition: form-data; name=\"file\"; filename=\"clip.wav\"\r\n\
             Content-Type: audio/wav\r\n\r\n"
        )
        .as_bytes(),
    );
    body.extend_from_slice(&wav);
    body.extend_from_slice(format!("\r\n--{boundary}--\r\n").as_bytes());

    let request = Request::builder()
        .method("POST")
        .uri("/api/analyze")
        .header(
            "content-type",
            format!("multipart/form-data; boundary={boundary}"),
        )
        .body(Body::from(body))
        .unwrap();

    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let body: serde_json::Value = serde_json::from_slice(&bytes).unwrap();

    assert!(body["mood"].is_string());
    assert!(body["genre_guess"].is_string());
    assert!(body["seed_genre"].is_string());
    assert!(body["features"]["tempo_bpm"].is_number());
    assert!(body["explanation"].as_str().unwrap().contains("**Mood:**"));

    // the session landed in the history file
    let sessions = history.read_all();
    assert_eq!(sessions.len(), 1);
    assert_eq!(sessions[0].genre, body["seed_genre"].as_str().unwrap());
}
