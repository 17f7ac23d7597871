//! Audio analysis pipeline
//!
//! Uploaded bytes are decoded to mono f32 at the analysis sample rate
//! (22050 Hz), then summarized into a small set of named scalar
//! descriptors. Decode failure is explicit; there is no recovery path for
//! unsupported or corrupt audio.

pub mod decoder;
pub mod features;

pub use decoder::{decode_audio_bytes, DecodedAudio};
pub use features::FeatureExtractor;

use thiserror::Error;

/// Analysis errors
#[derive(Debug, Error)]
pub enum AnalysisError {
    /// Container/codec probe failed or the payload is not audio
    #[error("Unsupported or corrupt audio: {0}")]
    UnsupportedAudio(String),

    /// Decoding started but a packet could not be decoded
    #[error("Decode failed: {0}")]
    DecodeFailed(String),

    /// Decoded stream carried no usable samples
    #[error("Audio stream is empty")]
    EmptyAudio,

    /// Clip shorter than one analysis frame
    #[error("Audio too short for analysis: {samples} samples, need at least {required}")]
    TooShort { samples: usize, required: usize },

    /// Resampling to the analysis rate failed
    #[error("Resample failed: {0}")]
    ResampleFailed(String),
}
