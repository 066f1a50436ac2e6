//! Envelope-following compressor
//!
//! Peak envelope with exponential attack (3 ms) and release (100 ms),
//! compressing above -12 dBFS.

use crate::preprocessing::normalization::EPSILON;

const ATTACK_SECONDS: f64 = 0.003;
const RELEASE_SECONDS: f64 = 0.1;

/// Compressor threshold in dBFS
pub const THRESHOLD_DB: f64 = -12.0;

const PASS_STRENGTH: f64 = 0.3;

/// Effective ratio on a given pass: `1 + (setting - 1)·(0.3 / iteration)`
pub fn pass_ratio(setting: f64, iteration: usize) -> f64 {
    1.0 + (setting - 1.0) * (PASS_STRENGTH / iteration.max(1) as f64)
}

/// Compress one channel in place
///
/// Above the threshold, gain reduction is `(threshold - level)·(1 - 1/ratio)` dB.
pub fn compress(samples: &mut [f64], sample_rate: u32, ratio: f64) {
    if ratio <= 1.0 || sample_rate == 0 {
        return;
    }

    let sr = sample_rate as f64;
    let attack = (-1.0 / (ATTACK_SECONDS * sr)).exp();
    let release = (-1.0 / (RELEASE_SECONDS * sr)).exp();
    let slope = 1.0 - 1.0 / ratio;

    let mut envelope = 0.0;
    let mut reduced = 0usize;
    for s in samples.iter_mut() {
        let level = s.abs();
        let coeff = if level > envelope { attack } else { release };
        envelope = coeff * envelope + (1.0 - coeff) * level;

        let level_db = 20.0 * (envelope + EPSILON).log10();
        if level_db > THRESHOLD_DB {
            let gain_db = (THRESHOLD_DB - level_db) * slope;
            *s *= 10.0_f64.powf(gain_db / 20.0);
            reduced += 1;
        }
    }

    log::debug!(
        "Compressor: ratio {:.3}, {} of {} samples above threshold",
        ratio,
        reduced,
        samples.len()
    );
}
