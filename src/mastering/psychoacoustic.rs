//! Perceptual spectral weighting
//!
//! Nudges the spectrum toward an A-weighting-like loudness curve with STFT
//! overlap-add.
//!
//! # Algorithm
//!
//! 1. Pad `hop` zeros at the front (and enough at the back) so every sample
//!    is covered by two frames
//! 2. Frames of 2048, hop 1024: Hann-windowed FFT
//! 3. Scale bins `k` and `N - k` by `1 + (w(f) - 1)·(0.1 / iteration)`
//! 4. Inverse FFT, overlap-add, divide by the accumulated window

use crate::features::spectrum::SpectralTransform;
use crate::io::Frames;

const FRAME_SIZE: usize = 2048;
const HOP_SIZE: usize = 1024;
const PASS_STRENGTH: f64 = 0.1;
const MIN_WINDOW_SUM: f64 = 1e-3;

/// Anchor points of the perceptual weight curve (Hz, weight)
const WEIGHT_CURVE: [(f64, f64); 9] = [
    (60.0, 0.5),
    (120.0, 0.6),
    (250.0, 0.7),
    (500.0, 0.85),
    (1000.0, 1.0),
    (2000.0, 1.0),
    (4000.0, 1.0),
    (8000.0, 0.9),
    (12000.0, 0.8),
];

/// Perceptual weight at `freq`, linear between anchors and flat outside them
pub fn perceptual_weight(freq: f64) -> f64 {
    let (first_f, first_w) = WEIGHT_CURVE[0];
    let (last_f, last_w) = WEIGHT_CURVE[WEIGHT_CURVE.len() - 1];
    if freq <= first_f {
        return first_w;
    }
    if freq >= last_f {
        return last_w;
    }
    for pair in WEIGHT_CURVE.windows(2) {
        let (f0, w0) = pair[0];
        let (f1, w1) = pair[1];
        if freq <= f1 {
            return w0 + (w1 - w0) * (freq - f0) / (f1 - f0);
        }
    }
    last_w
}

/// Apply the perceptual weighting to one channel
///
/// Returns a new signal of the same length.
pub fn apply_perceptual_weighting(samples: &[f64], sample_rate: u32, iteration: usize) -> Vec<f64> {
    if samples.is_empty() {
        return Vec::new();
    }

    let strength = PASS_STRENGTH / iteration.max(1) as f64;
    let transform = SpectralTransform::new(FRAME_SIZE);
    let scales: Vec<f64> = (0..=FRAME_SIZE / 2)
        .map(|k| {
            let weight = perceptual_weight(transform.bin_frequency(k, sample_rate));
            1.0 + (weight - 1.0) * strength
        })
        .collect();

    let hops = (samples.len() + HOP_SIZE).div_ceil(HOP_SIZE);
    let mut padded = vec![0.0; (hops + 1) * HOP_SIZE];
    padded[HOP_SIZE..HOP_SIZE + samples.len()].copy_from_slice(samples);

    let mut output = vec![0.0; padded.len()];
    let mut window_sum = vec![0.0; padded.len()];

    for (start, frame) in Frames::new(&padded, FRAME_SIZE, HOP_SIZE) {
        let mut spectrum = transform.spectrum(&frame);
        for (k, &scale) in scales.iter().enumerate() {
            spectrum[k] *= scale;
            if k > 0 && k < FRAME_SIZE / 2 {
                spectrum[FRAME_SIZE - k] *= scale;
            }
        }
        let processed = transform.inverse(spectrum);
        for (i, (&y, &w)) in processed.iter().zip(transform.window()).enumerate() {
            output[start + i] += y;
            window_sum[start + i] += w;
        }
    }

    samples
        .iter()
        .enumerate()
        .map(|(i, &original)| {
            let p = i + HOP_SIZE;
            if window_sum[p] >= MIN_WINDOW_SUM {
                output[p] / window_sum[p]
            } else {
                original
            }
        })
        .collect()
}
