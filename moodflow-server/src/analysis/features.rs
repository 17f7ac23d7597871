//! Feature extraction
//!
//! Summarizes a mono clip into the fixed descriptor set the classifiers
//! and the explanation layer consume:
//!
//! - `tempo_bpm`: spectral-flux novelty + autocorrelation estimate
//! - `spectral_centroid_mean`: brightness, in Hz
//! - `zcr_mean`: noisiness / percussiveness proxy
//! - `mfcc_mean`, `mfcc_std`: timbre summary over all coefficients
//! - `energy`: overall RMS amplitude
//!
//! All frame processing shares one Hann-windowed FFT pass.

use super::AnalysisError;
use moodflow_common::FeatureVector;
use rustfft::num_complex::Complex;
use rustfft::FftPlanner;

const EPSILON: f64 = 1e-10;

/// Tempo search range in BPM
const MIN_BPM: f64 = 60.0;
const MAX_BPM: f64 = 180.0;
/// Tempo estimate when the novelty curve carries no periodicity
const FALLBACK_BPM: f64 = 120.0;

/// Frame-based descriptor extractor
pub struct FeatureExtractor {
    sample_rate: u32,
    frame_size: usize,
    hop_size: usize,
    num_mel_bands: usize,
    num_mfcc: usize,
}

impl Default for FeatureExtractor {
    fn default() -> Self {
        Self::new(22050)
    }
}

impl FeatureExtractor {
    pub fn new(sample_rate: u32) -> Self {
        Self {
            sample_rate,
            frame_size: 2048,
            hop_size: 512,
            num_mel_bands: 26,
            num_mfcc: 13,
        }
    }

    /// Extract the descriptor set from mono samples.
    ///
    /// Pure and deterministic: the same samples always produce the same
    /// vector. Errors only on input shorter than one analysis frame.
    pub fn extract(&self, samples: &[f32]) -> Result<FeatureVector, AnalysisError> {
        if samples.is_empty() {
            return Err(AnalysisError::EmptyAudio);
        }
        if samples.len() < self.frame_size {
            return Err(AnalysisError::TooShort {
                samples: samples.len(),
                required: self.frame_size,
            });
        }

        let spectra = self.magnitude_spectra(samples);

        let centroid_mean = self.spectral_centroid_mean(&spectra);
        let zcr_mean = self.zero_crossing_rate_mean(samples);
        let (mfcc_mean, mfcc_std) = self.mfcc_summary(&spectra);
        let novelty = spectral_flux(&spectra);
        let tempo_bpm = self.estimate_tempo(&novelty);
        let energy = rms_energy(samples);

        let mut features = FeatureVector::new();
        features.insert("tempo_bpm", tempo_bpm);
        features.insert("spectral_centroid_mean", centroid_mean);
        features.insert("zcr_mean", zcr_mean);
        features.insert("mfcc_mean", mfcc_mean);
        features.insert("mfcc_std", mfcc_std);
        features.insert("energy", energy);

        tracing::debug!(
            tempo_bpm = format!("{:.1}", tempo_bpm),
            centroid = format!("{:.0}", centroid_mean),
            zcr = format!("{:.3}", zcr_mean),
            energy = format!("{:.3}", energy),
            "Extracted audio features"
        );

        Ok(features)
    }

    /// Hann-windowed magnitude spectra, one per hop
    fn magnitude_spectra(&self, samples: &[f32]) -> Vec<Vec<f64>> {
        let window: Vec<f64> = (0..self.frame_size)
            .map(|i| {
                let phase = std::f64::consts::TAU * i as f64 / self.frame_size as f64;
                0.5 * (1.0 - phase.cos())
            })
            .collect();

        let mut planner = FftPlanner::<f64>::new();
        let fft = planner.plan_fft_forward(self.frame_size);

        let bins = self.frame_size / 2 + 1;
        let mut spectra = Vec::new();
        let mut buffer = vec![Complex::new(0.0, 0.0); self.frame_size];

        let mut start = 0;
        while start + self.frame_size <= samples.len() {
            for (i, slot) in buffer.iter_mut().enumerate() {
                *slot = Complex::new(samples[start + i] as f64 * window[i], 0.0);
            }
            fft.process(&mut buffer);

            spectra.push(buffer[..bins].iter().map(|c| c.norm()).collect());
            start += self.hop_size;
        }

        spectra
    }

    /// Mean spectral centroid in Hz; silent frames are skipped
    fn spectral_centroid_mean(&self, spectra: &[Vec<f64>]) -> f64 {
        let bin_hz = self.sample_rate as f64 / self.frame_size as f64;

        let mut sum = 0.0;
        let mut frames = 0usize;
        for magnitudes in spectra {
            let total: f64 = magnitudes.iter().sum();
            if total < EPSILON {
                continue;
            }
            let weighted: f64 = magnitudes
                .iter()
                .enumerate()
                .map(|(bin, mag)| bin as f64 * bin_hz * mag)
                .sum();
            sum += weighted / total;
            frames += 1;
        }

        if frames == 0 {
            0.0
        } else {
            sum / frames as f64
        }
    }

    /// Mean per-frame zero-crossing rate, in [0, 1]
    fn zero_crossing_rate_mean(&self, samples: &[f32]) -> f64 {
        let mut rates = Vec::new();
        let mut start = 0;
        while start + self.frame_size <= samples.len() {
            let frame = &samples[start..start + self.frame_size];
            let crossings = frame
                .windows(2)
                .filter(|w| (w[0] >= 0.0) != (w[1] >= 0.0))
                .count();
            rates.push(crossings as f64 / self.frame_size as f64);
            start += self.hop_size;
        }

        if rates.is_empty() {
            0.0
        } else {
            rates.iter().sum::<f64>() / rates.len() as f64
        }
    }

    /// Scalar mean and standard deviation over the full MFCC matrix
    /// (13 coefficients x frames, 26-band mel filterbank, DCT-II)
    fn mfcc_summary(&self, spectra: &[Vec<f64>]) -> (f64, f64) {
        if spectra.is_empty() {
            return (0.0, 0.0);
        }

        let filterbank = self.mel_filterbank();

        let mut coefficients = Vec::with_capacity(spectra.len() * self.num_mfcc);
        for magnitudes in spectra {
            let log_energies: Vec<f64> = filterbank
                .iter()
                .map(|filter| {
                    let energy: f64 = filter
                        .iter()
                        .zip(magnitudes.iter())
                        .map(|(w, m)| w * m * m)
                        .sum();
                    (energy + EPSILON).ln()
                })
                .collect();

            for i in 0..self.num_mfcc {
                let coeff: f64 = log_energies
                    .iter()
                    .enumerate()
                    .map(|(j, e)| {
                        e * (std::f64::consts::PI * i as f64 * (j as f64 + 0.5)
                            / self.num_mel_bands as f64)
                            .cos()
                    })
                    .sum();
                coefficients.push(coeff);
            }
        }

        let n = coefficients.len() as f64;
        let mean = coefficients.iter().sum::<f64>() / n;
        let variance = coefficients.iter().map(|c| (c - mean).powi(2)).sum::<f64>() / n;
        (mean, variance.sqrt())
    }

    /// Triangular mel filterbank over the magnitude-spectrum bins
    fn mel_filterbank(&self) -> Vec<Vec<f64>> {
        fn hz_to_mel(hz: f64) -> f64 {
            2595.0 * (1.0 + hz / 700.0).log10()
        }
        fn mel_to_hz(mel: f64) -> f64 {
            700.0 * (10f64.powf(mel / 2595.0) - 1.0)
        }

        let bins = self.frame_size / 2 + 1;
        let bin_hz = self.sample_rate as f64 / self.frame_size as f64;
        let max_mel = hz_to_mel(self.sample_rate as f64 / 2.0);

        // band edge frequencies, evenly spaced on the mel scale
        let edges: Vec<f64> = (0..self.num_mel_bands + 2)
            .map(|i| mel_to_hz(max_mel * i as f64 / (self.num_mel_bands + 1) as f64))
            .collect();

        (0..self.num_mel_bands)
            .map(|band| {
                let (lo, center, hi) = (edges[band], edges[band + 1], edges[band + 2]);
                (0..bins)
                    .map(|bin| {
                        let hz = bin as f64 * bin_hz;
                        if hz <= lo || hz >= hi {
                            0.0
                        } else if hz <= center {
                            (hz - lo) / (center - lo).max(EPSILON)
                        } else {
                            (hi - hz) / (hi - center).max(EPSILON)
                        }
                    })
                    .collect()
            })
            .collect()
    }

    /// Autocorrelation tempo estimate over the novelty curve.
    ///
    /// Candidate lags span the BPM search range; scores carry a mild
    /// log-normal prior centered on 120 BPM so octave-ambiguous peaks
    /// resolve toward common tempi. A flat novelty curve yields the
    /// fallback tempo.
    fn estimate_tempo(&self, novelty: &[f64]) -> f64 {
        let frame_rate = self.sample_rate as f64 / self.hop_size as f64;

        let min_lag = ((60.0 / MAX_BPM) * frame_rate).floor().max(1.0) as usize;
        let max_lag = ((60.0 / MIN_BPM) * frame_rate).ceil() as usize;

        if novelty.len() <= max_lag * 2 {
            return FALLBACK_BPM;
        }

        let peak = novelty.iter().cloned().fold(0.0f64, f64::max);
        if peak < EPSILON {
            return FALLBACK_BPM;
        }

        let mut best_lag = 0usize;
        let mut best_score = 0.0f64;
        for lag in min_lag..=max_lag {
            let terms = novelty.len() - lag;
            let correlation: f64 = (0..terms).map(|i| novelty[i] * novelty[i + lag]).sum();
            let normalized = correlation / terms as f64;

            let bpm = 60.0 * frame_rate / lag as f64;
            let prior = (-0.5 * ((bpm / FALLBACK_BPM).log2()).powi(2)).exp();

            let score = normalized * prior;
            if score > best_score {
                best_score = score;
                best_lag = lag;
            }
        }

        if best_lag == 0 || best_score < EPSILON {
            return FALLBACK_BPM;
        }

        60.0 * frame_rate / best_lag as f64
    }
}

/// Half-wave-rectified frame-to-frame spectral difference
fn spectral_flux(spectra: &[Vec<f64>]) -> Vec<f64> {
    spectra
        .windows(2)
        .map(|pair| {
            pair[1]
                .iter()
                .zip(pair[0].iter())
                .map(|(cur, prev)| (cur - prev).max(0.0))
                .sum()
        })
        .collect()
}

/// RMS amplitude over the whole clip
fn rms_energy(samples: &[f32]) -> f64 {
    let sum_squares: f64 = samples.iter().map(|&s| (s as f64).powi(2)).sum();
    (sum_squares / samples.len() as f64).sqrt()
}

#[cfg(test)]
mod tests {
    use super::*;

    const SR: u32 = 22050;

    fn sine(frequency: f32, duration_secs: f32) -> Vec<f32> {
        let num_samples = (duration_secs * SR as f32) as usize;
        (0..num_samples)
            .map(|i| {
                let t = i as f32 / SR as f32;
                (2.0 * std::f32::consts::PI * frequency * t).sin() * 0.5
            })
            .collect()
    }

    /// Short decaying clicks over silence, spaced `period` samples apart.
    /// Keeping the period a multiple of the hop size puts every click on a
    /// frame boundary, so the novelty curve is cleanly periodic.
    fn click_track(period: usize, duration_secs: f32) -> Vec<f32> {
        let num_samples = (duration_secs * SR as f32) as usize;
        let mut samples = vec![0.0f32; num_samples];
        let mut pos = 0;
        while pos < num_samples {
            for i in 0..256.min(num_samples - pos) {
                let decay = 1.0 - i as f32 / 256.0;
                let polarity = if i % 2 == 0 { 0.9 } else { -0.9 };
                samples[pos + i] = polarity * decay;
            }
            pos += period;
        }
        samples
    }

    #[test]
    fn empty_input_is_an_error() {
        let extractor = FeatureExtractor::new(SR);
        assert!(matches!(
            extractor.extract(&[]),
            Err(AnalysisError::EmptyAudio)
        ));
    }

    #[test]
    fn short_input_is_an_error() {
        let extractor = FeatureExtractor::new(SR);
        let result = extractor.extract(&[0.1; 512]);
        assert!(matches!(result, Err(AnalysisError::TooShort { .. })));
    }

    #[test]
    fn produces_the_full_descriptor_set() {
        let extractor = FeatureExtractor::new(SR);
        let features = extractor.extract(&sine(440.0, 2.0)).unwrap();

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
    }

    #[test]
    fn extraction_is_deterministic() {
        let extractor = FeatureExtractor::new(SR);
        let samples = click_track(22 * 512, 4.0);
        let a = extractor.extract(&samples).unwrap();
        let b = extractor.extract(&samples).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn centroid_tracks_the_dominant_frequency() {
        let extractor = FeatureExtractor::new(SR);

        let low = extractor.extract(&sine(220.0, 2.0)).unwrap();
        let high = extractor.extract(&sine(4000.0, 2.0)).unwrap();

        let low_centroid = low.get("spectral_centroid_mean").unwrap();
        let high_centroid = high.get("spectral_centroid_mean").unwrap();

        assert!(
            high_centroid > low_centroid,
            "expected {high_centroid} > {low_centroid}"
        );
        // centroid of a pure tone sits near the tone (leakage pulls it up a little)
        assert!(low_centroid > 100.0 && low_centroid < 800.0);
    }

    #[test]
    fn zcr_scales_with_frequency() {
        let extractor = FeatureExtractor::new(SR);

        let slow = extractor.extract(&sine(220.0, 2.0)).unwrap();
        let fast = extractor.extract(&sine(4000.0, 2.0)).unwrap();

        let slow_zcr = slow.get("zcr_mean").unwrap();
        let fast_zcr = fast.get("zcr_mean").unwrap();
        assert!(fast_zcr > slow_zcr);
        assert!(slow_zcr > 0.0 && fast_zcr < 1.0);
    }

    #[test]
    fn rms_energy_scales_with_amplitude() {
        let loud = sine(440.0, 1.0);
        let quiet: Vec<f32> = loud.iter().map(|s| s * 0.5).collect();
        assert!(rms_energy(&loud) > rms_energy(&quiet) * 1.5);

        // 0.5-amplitude sine has RMS near 0.35
        assert!((rms_energy(&loud) - 0.354).abs() < 0.05);
    }

    #[test]
    fn tempo_locks_onto_a_click_track() {
        let extractor = FeatureExtractor::new(SR);
        // clicks every 22 frames: 60 * (22050/512) / 22 ≈ 117.5 BPM
        let features = extractor.extract(&click_track(22 * 512, 8.0)).unwrap();
        let tempo = features.get("tempo_bpm").unwrap();
        assert!(
            (110.0..=126.0).contains(&tempo),
            "tempo estimate {tempo} out of range"
        );
    }

    #[test]
    fn flat_novelty_falls_back_to_default_tempo() {
        let extractor = FeatureExtractor::new(SR);
        let novelty = vec![0.0; 400];
        assert_eq!(extractor.estimate_tempo(&novelty), FALLBACK_BPM);
    }
}
