//! Band EQ matching
//!
//! One RBJ peaking biquad per band, pulling the source's relative band
//! response toward the target's. The pull shrinks with each pass.

use super::profile::{ReferenceProfile, EQ_BANDS_HZ};
use crate::preprocessing::filters::Biquad;
use crate::preprocessing::normalization::EPSILON;

/// Per-band Q, wider at the extremes
pub const BAND_Q: [f64; 9] = [0.6, 0.7, 0.8, 0.9, 1.0, 1.0, 0.9, 0.8, 0.6];

const MIN_BAND_GAIN: f64 = 0.5;
const MAX_BAND_GAIN: f64 = 2.0;
const PASS_STRENGTH: f64 = 0.3;

/// Bands at or above this fraction of the sample rate are skipped
const NYQUIST_GUARD: f64 = 0.45;

/// Linear gain for one band on a given pass
///
/// `clamp(1 + (target_gain - 1)·intensity·(0.3 / iteration), 0.5, 2.0)`
pub fn band_gain(target_gain: f64, intensity: f64, iteration: usize) -> f64 {
    let strength = PASS_STRENGTH / iteration.max(1) as f64;
    (1.0 + (target_gain - 1.0) * intensity * strength).clamp(MIN_BAND_GAIN, MAX_BAND_GAIN)
}

/// Target gain per band: target relative response over source relative response
///
/// Bands the source has no energy in are left alone (gain 1.0).
pub fn target_band_gains(source: &ReferenceProfile, target: &ReferenceProfile) -> [f64; 9] {
    let mut gains = [1.0; 9];
    for (g, band) in gains.iter_mut().zip(EQ_BANDS_HZ) {
        let src = source.frequency_response.get(&band).copied().unwrap_or(0.0);
        let tgt = target.frequency_response.get(&band).copied().unwrap_or(src);
        if src > EPSILON && tgt > EPSILON {
            *g = tgt / src;
        }
    }
    gains
}

/// Run the band EQ over one channel in place
pub fn apply_band_eq(
    samples: &mut [f64],
    sample_rate: u32,
    target_gains: &[f64; 9],
    intensity: f64,
    iteration: usize,
) {
    let sr = sample_rate as f64;
    for ((&band, &q), &target_gain) in EQ_BANDS_HZ.iter().zip(&BAND_Q).zip(target_gains) {
        if band as f64 >= sr * NYQUIST_GUARD {
            continue;
        }
        let gain = band_gain(target_gain, intensity, iteration);
        if (gain - 1.0).abs() < 1e-6 {
            continue;
        }
        let mut filter = Biquad::peaking(band as f64, q, 20.0 * gain.log10(), sr);
        filter.process_in_place(samples);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::io::SampleBuffer;
    use crate::preprocessing::normalization::rms;
    use crate::test_signals::sine;

    #[test]
    fn test_band_gain_schedule() {
        // target 2x at full intensity: 1.3, 1.15, 1.1 over three passes
        assert!((band_gain(2.0, 1.0, 1) - 1.3).abs() < 1e-12);
        assert!((band_gain(2.0, 1.0, 2) - 1.15).abs() < 1e-12);
        assert!((band_gain(2.0, 1.0, 3) - 1.1).abs() < 1e-12);
        assert_eq!(band_gain(50.0, 1.0, 1), 2.0);
        assert_eq!(band_gain(-50.0, 1.0, 1), 0.5);
        assert_eq!(band_gain(3.0, 0.0, 1), 1.0);
    }

    #[test]
    fn test_unity_gains_leave_signal_untouched() {
        let original = sine(300.0, 0.4, 0.5, 44100);
        let mut samples = original.clone();
        apply_band_eq(&mut samples, 44100, &[1.0; 9], 1.0, 1);
        assert_eq!(samples, original);
    }

    #[test]
    fn test_boost_at_band_raises_level() {
        let original = sine(1000.0, 0.2, 0.5, 44100);
        let mut samples = original.clone();
        let mut gains = [1.0; 9];
        gains[4] = 3.0; // 1 kHz
        apply_band_eq(&mut samples, 44100, &gains, 1.0, 1);
        // gain 1.6 at the centre
        let ratio = rms(&samples[4410..]) / rms(&original[4410..]);
        assert!((ratio - 1.6).abs() < 0.05, "got {:.3}", ratio);
    }

    #[test]
    fn test_target_band_gains_ratio() {
        let buffer = SampleBuffer::mono(sine(500.0, 0.3, 0.5, 44100), 44100).unwrap();
        let source = ReferenceProfile::analyze(&buffer);
        let mut target = source.clone();
        target.frequency_response.insert(500, 0.5);
        let gains = target_band_gains(&source, &target);
        assert!((gains[3] - 0.5).abs() < 1e-9);
    }
}
