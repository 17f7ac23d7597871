//! Audio decoding
//!
//! Decodes an uploaded byte stream (mp3/wav/ogg/flac, anything symphonia
//! probes) to mono f32 PCM and resamples to the analysis rate.

use super::AnalysisError;
use rubato::{
    Resampler, SincFixedIn, SincInterpolationParameters, SincInterpolationType, WindowFunction,
};
use symphonia::core::audio::{AudioBuffer, AudioBufferRef, Signal};
use symphonia::core::codecs::{DecoderOptions, CODEC_TYPE_NULL};
use symphonia::core::conv::FromSample;
use symphonia::core::formats::FormatOptions;
use symphonia::core::io::MediaSourceStream;
use symphonia::core::meta::MetadataOptions;
use symphonia::core::probe::Hint;
use symphonia::core::sample::Sample;

/// Input chunk size fed to the resampler
const RESAMPLE_CHUNK: usize = 1024;

/// Decoded audio, mono, at the requested sample rate
#[derive(Debug)]
pub struct DecodedAudio {
    /// Mono samples (f32, nominally [-1.0, 1.0])
    pub samples: Vec<f32>,
    /// Sample rate of `samples` in Hz
    pub sample_rate: u32,
    /// Channel count of the source stream
    pub source_channels: usize,
    /// Duration in seconds
    pub duration_seconds: f64,
}

/// Decode audio bytes to mono f32 at `target_rate`.
///
/// `extension_hint` is the upload's file extension, if known; it speeds up
/// the format probe but is not trusted.
pub fn decode_audio_bytes(
    bytes: Vec<u8>,
    extension_hint: Option<&str>,
    target_rate: u32,
) -> Result<DecodedAudio, AnalysisError> {
    let byte_len = bytes.len();
    let mss = MediaSourceStream::new(Box::new(std::io::Cursor::new(bytes)), Default::default());

    let mut hint = Hint::new();
    if let Some(ext) = extension_hint {
        hint.with_extension(ext);
    }

    let probed = symphonia::default::get_probe()
        .format(
            &hint,
            mss,
            &FormatOptions::default(),
            &MetadataOptions::default(),
        )
        .map_err(|e| AnalysisError::UnsupportedAudio(e.to_string()))?;

    let mut format = probed.format;

    let track = format
        .tracks()
        .iter()
        .find(|t| t.codec_params.codec != CODEC_TYPE_NULL)
        .ok_or_else(|| AnalysisError::UnsupportedAudio("No audio track found".to_string()))?;

    let track_id = track.id;
    let source_rate = track
        .codec_params
        .sample_rate
        .ok_or_else(|| AnalysisError::UnsupportedAudio("Sample rate unknown".to_string()))?;
    let source_channels = track
        .codec_params
        .channels
        .map(|c| c.count())
        .unwrap_or(1);

    tracing::debug!(
        bytes = byte_len,
        sample_rate = source_rate,
        channels = source_channels,
        "Probed uploaded audio"
    );

    let mut decoder = symphonia::default::get_codecs()
        .make(&track.codec_params, &DecoderOptions::default())
        .map_err(|e| AnalysisError::UnsupportedAudio(e.to_string()))?;

    let mut samples: Vec<f32> = Vec::new();

    loop {
        let packet = match format.next_packet() {
            Ok(packet) => packet,
            Err(symphonia::core::errors::Error::IoError(e))
                if e.kind() == std::io::ErrorKind::UnexpectedEof =>
            {
                break;
            }
            Err(e) => return Err(AnalysisError::DecodeFailed(e.to_string())),
        };

        if packet.track_id() != track_id {
            continue;
        }

        let decoded = decoder
            .decode(&packet)
            .map_err(|e| AnalysisError::DecodeFailed(e.to_string()))?;

        mix_to_mono(&decoded, &mut samples);
    }

    if samples.is_empty() {
        return Err(AnalysisError::EmptyAudio);
    }

    let samples = if source_rate == target_rate {
        samples
    } else {
        resample(&samples, source_rate, target_rate)?
    };

    let duration_seconds = samples.len() as f64 / target_rate as f64;

    tracing::debug!(
        total_samples = samples.len(),
        duration_seconds = format!("{:.2}", duration_seconds),
        "Audio decode complete"
    );

    Ok(DecodedAudio {
        samples,
        sample_rate: target_rate,
        source_channels,
        duration_seconds,
    })
}

/// Average all channels of one decoded buffer into `out`
fn mix_to_mono(decoded: &AudioBufferRef, out: &mut Vec<f32>) {
    fn mix<S>(buf: &AudioBuffer<S>, out: &mut Vec<f32>)
    where
        S: Sample,
        f32: FromSample<S>,
    {
        let channels = buf.spec().channels.count();
        let frames = buf.frames();
        out.reserve(frames);
        for frame in 0..frames {
            let mut sum = 0.0f32;
            for ch in 0..channels {
                sum += f32::from_sample(buf.chan(ch)[frame]);
            }
            out.push(sum / channels as f32);
        }
    }

    match decoded {
        AudioBufferRef::U8(buf) => mix(buf.as_ref(), out),
        AudioBufferRef::U16(buf) => mix(buf.as_ref(), out),
        AudioBufferRef::U24(buf) => mix(buf.as_ref(), out),
        AudioBufferRef::U32(buf) => mix(buf.as_ref(), out),
        AudioBufferRef::S8(buf) => mix(buf.as_ref(), out),
        AudioBufferRef::S16(buf) => mix(buf.as_ref(), out),
        AudioBufferRef::S24(buf) => mix(buf.as_ref(), out),
        AudioBufferRef::S32(buf) => mix(buf.as_ref(), out),
        AudioBufferRef::F32(buf) => mix(buf.as_ref(), out),
        AudioBufferRef::F64(buf) => mix(buf.as_ref(), out),
    }
}

/// Resample mono samples from `from_rate` to `to_rate`
fn resample(samples: &[f32], from_rate: u32, to_rate: u32) -> Result<Vec<f32>, AnalysisError> {
    let params = SincInterpolationParameters {
        sinc_len: 128,
        f_cutoff: 0.95,
        interpolation: SincInterpolationType::Linear,
        oversampling_factor: 128,
        window: WindowFunction::BlackmanHarris2,
    };

    let mut resampler = SincFixedIn::<f32>::new(
        to_rate as f64 / from_rate as f64,
        2.0,
        params,
        RESAMPLE_CHUNK,
        1,
    )
    .map_err(|e| AnalysisError::ResampleFailed(e.to_string()))?;

    let mut out: Vec<f32> = Vec::with_capacity(
        (samples.len() as f64 * to_rate as f64 / from_rate as f64) as usize + RESAMPLE_CHUNK,
    );

    for chunk in samples.chunks(RESAMPLE_CHUNK) {
        let frames = if chunk.len() == RESAMPLE_CHUNK {
            resampler
                .process(&[chunk], None)
                .map_err(|e| AnalysisError::ResampleFailed(e.to_string()))?
        } else {
            resampler
                .process_partial(Some(&[chunk]), None)
                .map_err(|e| AnalysisError::ResampleFailed(e.to_string()))?
        };
        out.extend_from_slice(&frames[0]);
    }

    // flush whatever the filter still holds
    let tail = resampler
        .process_partial::<&[f32]>(None, None)
        .map_err(|e| AnalysisError::ResampleFailed(e.to_string()))?;
    out.extend_from_slice(&tail[0]);

    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn wav_bytes(samples: &[f32], sample_rate: u32) -> Vec<u8> {
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
    fn decodes_wav_without_resampling() {
        let bytes = wav_bytes(&sine(440.0, 1.0, 22050), 22050);
        let decoded = decode_audio_bytes(bytes, Some("wav"), 22050).unwrap();

        assert_eq!(decoded.sample_rate, 22050);
        assert_eq!(decoded.source_channels, 1);
        assert!((decoded.duration_seconds - 1.0).abs() < 0.05);
    }

    #[test]
    fn resamples_to_target_rate() {
        let bytes = wav_bytes(&sine(440.0, 1.0, 44100), 44100);
        let decoded = decode_audio_bytes(bytes, Some("wav"), 22050).unwrap();

        assert_eq!(decoded.sample_rate, 22050);
        // duration is preserved through the rate change
        assert!((decoded.duration_seconds - 1.0).abs() < 0.1);
    }

    #[test]
    fn garbage_bytes_are_rejected() {
        let result = decode_audio_bytes(b"definitely not audio".to_vec(), None, 22050);
        assert!(matches!(result, Err(AnalysisError::UnsupportedAudio(_))));
    }

    #[test]
    fn linear_resample_sanity() {
        let samples = sine(440.0, 2.0, 44100);
        let out = resample(&samples, 44100, 22050).unwrap();
        let expected = samples.len() / 2;
        let tolerance = expected / 10;
        assert!(
            out.len().abs_diff(expected) < tolerance,
            "resampled length {} too far from {}",
            out.len(),
            expected
        );
    }
}
