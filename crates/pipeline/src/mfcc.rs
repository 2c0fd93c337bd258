//! MFCC features for the cough model.
//!
//! Matches the training-time front end: 1 s of 16 kHz audio, centred STFT
//! frames with zero padding at the edges, a Slaney-normalised mel filterbank, log power, an orthonormal
//! DCT-II and per-coefficient standardisation. The result is a
//! `(frames, coefficients)` matrix, time-major.

use std::f64::consts::PI;
use std::sync::Arc;

use ndarray::{Array2, Axis};
use rustfft::num_complex::Complex64;
use rustfft::{Fft, FftPlanner};

use crate::audio::TARGET_SAMPLE_RATE;

/// Samples per clip (one second).
pub const CLIP_SAMPLES: usize = TARGET_SAMPLE_RATE as usize;
pub const N_FFT: usize = 512;
pub const HOP_LENGTH: usize = 160;
pub const N_MELS: usize = 128;
pub const N_MFCC: usize = 13;

/// Frames produced for one clip: `1 + CLIP_SAMPLES / HOP_LENGTH`.
pub const N_FRAMES: usize = 1 + CLIP_SAMPLES / HOP_LENGTH;

const AMIN: f64 = 1e-10;
const TOP_DB: f64 = 80.0;
const NORM_EPS: f64 = 1e-10;

/// Reusable extractor; building the FFT plan and filterbank is the costly
/// part, so dataset jobs create one and call [`extract`](Self::extract)
/// per clip.
pub struct MfccExtractor {
    fft: Arc<dyn Fft<f64>>,
    window: Vec<f64>,
    /// `[mel_band][fft_bin]`
    filterbank: Vec<Vec<f64>>,
    /// `[coefficient][mel_band]`
    dct: Vec<Vec<f64>>,
}

impl Default for MfccExtractor {
    fn default() -> Self {
        Self::new()
    }
}

impl MfccExtractor {
    pub fn new() -> Self {
        let fft = FftPlanner::<f64>::new().plan_fft_forward(N_FFT);
        Self {
            fft,
            window: periodic_hann(N_FFT),
            filterbank: slaney_mel_filterbank(f64::from(TARGET_SAMPLE_RATE), N_FFT, N_MELS),
            dct: ortho_dct_matrix(N_MFCC, N_MELS),
        }
    }

    /// Compute the `(N_FRAMES, N_MFCC)` matrix for one clip.
    ///
    /// Input longer than a second is truncated, shorter input is padded
    /// with zeros.
    pub fn extract(&self, samples: &[f32]) -> Array2<f32> {
        let mut clip: Vec<f64> = samples
            .iter()
            .take(CLIP_SAMPLES)
            .map(|&s| f64::from(s))
            .collect();
        clip.resize(CLIP_SAMPLES, 0.0);

        let padded = centre_pad(&clip, N_FFT / 2);
        let n_bins = N_FFT / 2 + 1;

        // Mel power spectrogram, [mel][frame].
        let mut mel = Array2::<f64>::zeros((N_MELS, N_FRAMES));
        let mut buffer = vec![Complex64::new(0.0, 0.0); N_FFT];
        let mut power = vec![0.0; n_bins];

        for frame in 0..N_FRAMES {
            let start = frame * HOP_LENGTH;
            for (i, slot) in buffer.iter_mut().enumerate() {
                *slot = Complex64::new(padded[start + i] * self.window[i], 0.0);
            }
            self.fft.process(&mut buffer);
            for (p, c) in power.iter_mut().zip(&buffer) {
                *p = c.norm_sqr();
            }
            for (band, weights) in self.filterbank.iter().enumerate() {
                mel[[band, frame]] = weights.iter().zip(&power).map(|(w, p)| w * p).sum();
            }
        }

        power_to_db(&mut mel);

        // Cepstrum, [frame][coefficient].
        let mut mfcc = Array2::<f64>::zeros((N_FRAMES, N_MFCC));
        for frame in 0..N_FRAMES {
            let column = mel.column(frame);
            for (k, basis) in self.dct.iter().enumerate() {
                mfcc[[frame, k]] = basis.iter().zip(column.iter()).map(|(b, x)| b * x).sum();
            }
        }

        standardize_columns(&mut mfcc);
        mfcc.mapv(|v| v as f32)
    }
}

/// One-shot convenience wrapper around [`MfccExtractor`].
pub fn extract_mfcc(samples: &[f32]) -> Array2<f32> {
    MfccExtractor::new().extract(samples)
}

// ---------------------------------------------------------------------------
// Building blocks
// ---------------------------------------------------------------------------

fn periodic_hann(n: usize) -> Vec<f64> {
    (0..n)
        .map(|i| 0.5 - 0.5 * (2.0 * PI * i as f64 / n as f64).cos())
        .collect()
}

/// Surround `signal` with `pad` zeros on each side.
fn centre_pad(signal: &[f64], pad: usize) -> Vec<f64> {
    let mut out = vec![0.0; signal.len() + 2 * pad];
    out[pad..pad + signal.len()].copy_from_slice(signal);
    out
}

fn hz_to_mel(hz: f64) -> f64 {
    const F_SP: f64 = 200.0 / 3.0;
    const MIN_LOG_HZ: f64 = 1000.0;
    let min_log_mel = MIN_LOG_HZ / F_SP;
    let logstep = 6.4_f64.ln() / 27.0;
    if hz >= MIN_LOG_HZ {
        min_log_mel + (hz / MIN_LOG_HZ).ln() / logstep
    } else {
        hz / F_SP
    }
}

fn mel_to_hz(mel: f64) -> f64 {
    const F_SP: f64 = 200.0 / 3.0;
    const MIN_LOG_HZ: f64 = 1000.0;
    let min_log_mel = MIN_LOG_HZ / F_SP;
    let logstep = 6.4_f64.ln() / 27.0;
    if mel >= min_log_mel {
        MIN_LOG_HZ * (logstep * (mel - min_log_mel)).exp()
    } else {
        F_SP * mel
    }
}

/// Triangular filters spaced on the Slaney mel scale from 0 Hz to Nyquist,
/// each scaled to unit area.
fn slaney_mel_filterbank(sample_rate: f64, n_fft: usize, n_mels: usize) -> Vec<Vec<f64>> {
    let n_bins = n_fft / 2 + 1;
    let fft_freqs: Vec<f64> = (0..n_bins)
        .map(|k| k as f64 * sample_rate / n_fft as f64)
        .collect();

    let mel_max = hz_to_mel(sample_rate / 2.0);
    let mel_points: Vec<f64> = (0..n_mels + 2)
        .map(|i| mel_to_hz(mel_max * i as f64 / (n_mels + 1) as f64))
        .collect();

    (0..n_mels)
        .map(|m| {
            let (left, center, right) = (mel_points[m], mel_points[m + 1], mel_points[m + 2]);
            let enorm = 2.0 / (right - left);
            fft_freqs
                .iter()
                .map(|&f| {
                    let lower = (f - left) / (center - left);
                    let upper = (right - f) / (right - center);
                    lower.min(upper).max(0.0) * enorm
                })
                .collect()
        })
        .collect()
}

/// Rows of the orthonormal DCT-II, truncated to `n_out` coefficients.
fn ortho_dct_matrix(n_out: usize, n_in: usize) -> Vec<Vec<f64>> {
    (0..n_out)
        .map(|k| {
            let scale = if k == 0 {
                (1.0 / n_in as f64).sqrt()
            } else {
                (2.0 / n_in as f64).sqrt()
            };
            (0..n_in)
                .map(|n| scale * (PI * k as f64 * (2 * n + 1) as f64 / (2 * n_in) as f64).cos())
                .collect()
        })
        .collect()
}

/// Convert power to decibels relative to 1.0, clipped to `TOP_DB` below the
/// peak.
fn power_to_db(spec: &mut Array2<f64>) {
    spec.mapv_inplace(|p| 10.0 * p.max(AMIN).log10());
    let peak = spec.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let floor = peak - TOP_DB;
    spec.mapv_inplace(|db| db.max(floor));
}

/// Standardise each column over time. Constant columns become zero.
fn standardize_columns(matrix: &mut Array2<f64>) {
    for mut column in matrix.axis_iter_mut(Axis(1)) {
        let (lo, hi) = column
            .iter()
            .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &v| (lo.min(v), hi.max(v)));
        if lo == hi {
            column.fill(0.0);
            continue;
        }
        let n = column.len() as f64;
        let mean = column.sum() / n;
        let std = (column.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / n).sqrt();
        column.mapv_inplace(|v| (v - mean) / (std + NORM_EPS));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn column_stats(m: &Array2<f32>, k: usize) -> (f64, f64) {
        let col: Vec<f64> = m.column(k).iter().map(|&v| f64::from(v)).collect();
        let n = col.len() as f64;
        let mean = col.iter().sum::<f64>() / n;
        let std = (col.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / n).sqrt();
        (mean, std)
    }

    #[test]
    fn frame_count_matches_centred_stft() {
        assert_eq!(N_FRAMES, 101);
    }

    #[test]
    fn silence_gives_zero_matrix() {
        let m = extract_mfcc(&vec![0.0; CLIP_SAMPLES]);
        assert_eq!(m.dim(), (N_FRAMES, N_MFCC));
        assert!(m.iter().all(|&v| v == 0.0));
    }

    #[test]
    fn short_and_long_input_have_fixed_shape() {
        assert_eq!(extract_mfcc(&[0.1; 4_000]).dim(), (101, 13));
        assert_eq!(extract_mfcc(&[0.1; 40_000]).dim(), (101, 13));
    }

    #[test]
    fn varying_signal_is_standardised() {
        // A rising chirp with an amplitude envelope so every band varies.
        let samples: Vec<f32> = (0..CLIP_SAMPLES)
            .map(|i| {
                let t = i as f64 / CLIP_SAMPLES as f64;
                let phase = 2.0 * PI * (200.0 * t + 1800.0 * t * t);
                ((0.2 + 0.8 * t) * phase.sin()) as f32
            })
            .collect();

        let m = extract_mfcc(&samples);
        for k in 0..N_MFCC {
            let (mean, std) = column_stats(&m, k);
            assert!(mean.abs() < 1e-4, "coefficient {k} mean {mean}");
            assert!((std - 1.0).abs() < 1e-3, "coefficient {k} std {std}");
        }
    }

    #[test]
    fn edges_are_zero_padded() {
        let padded = centre_pad(&[1.0, 2.0, 3.0, 4.0], 2);
        assert_eq!(padded, vec![0.0, 0.0, 1.0, 2.0, 3.0, 4.0, 0.0, 0.0]);

        // A constant signal only varies where frames overlap the padding.
        let m = extract_mfcc(&vec![0.5; CLIP_SAMPLES]);
        assert_ne!(m.row(0), m.row(N_FRAMES / 2));
        assert_eq!(m.row(N_FRAMES / 2), m.row(N_FRAMES / 2 + 1));
    }

    #[test]
    fn mel_scale_round_trips() {
        for hz in [0.0, 440.0, 1000.0, 4321.0, 8000.0] {
            assert!((mel_to_hz(hz_to_mel(hz)) - hz).abs() < 1e-6);
        }
        assert!((hz_to_mel(1000.0) - 15.0).abs() < 1e-12);
    }

    #[test]
    fn filterbank_covers_spectrum() {
        let bank = slaney_mel_filterbank(16_000.0, N_FFT, N_MELS);
        assert_eq!(bank.len(), N_MELS);
        assert!(bank.iter().all(|f| f.len() == N_FFT / 2 + 1));
        assert!(bank.iter().flatten().all(|&w| w >= 0.0));
        // The narrowest low bands fall between FFT bins and stay empty.
        let populated = bank.iter().filter(|f| f.iter().any(|&w| w > 0.0)).count();
        assert!(populated > N_MELS / 2);
    }

    #[test]
    fn dct_rows_are_orthonormal() {
        let dct = ortho_dct_matrix(N_MFCC, N_MELS);
        for a in 0..N_MFCC {
            for b in 0..N_MFCC {
                let dot: f64 = dct[a].iter().zip(&dct[b]).map(|(x, y)| x * y).sum();
                let expected = if a == b { 1.0 } else { 0.0 };
                assert!((dot - expected).abs() < 1e-9);
            }
        }
    }
}
