//! Level measurement and gain utilities
//!
//! Provides the loudness measures used by profiling and mastering:
//! - RMS and peak
//! - Approximate LUFS from RMS (`-23 + 20·log10(rms)`)
//! - Loud-block level over 100 ms blocks
//! - Integrated loudness per ITU-R BS.1770 (K-weighted, gated), for reporting
//!
//! # Example
//!
//! ```
//! use stratum_master::preprocessing::normalization::{rms, peak, linear_to_db};
//!
//! let samples = vec![0.5, -0.5, 0.5, -0.5];
//! assert!((rms(&samples) - 0.5).abs() < 1e-12);
//! assert!((peak(&samples) - 0.5).abs() < 1e-12);
//! assert!((linear_to_db(1.0)).abs() < 1e-12);
//! ```

use super::filters::Biquad;

/// Numerical stability epsilon for divisions and logarithms
pub const EPSILON: f64 = 1e-10;

/// Gate threshold for integrated loudness (ITU-R BS.1770-4)
const LUFS_GATE_THRESHOLD: f64 = -70.0;

/// Block duration for integrated loudness
const LUFS_BLOCK_DURATION_MS: f64 = 400.0;

/// Block duration for the loud-block level
const DYNAMICS_BLOCK_DURATION_MS: f64 = 100.0;

/// Root mean square of a signal (0.0 for an empty signal)
pub fn rms(samples: &[f64]) -> f64 {
    if samples.is_empty() {
        return 0.0;
    }
    (samples.iter().map(|&x| x * x).sum::<f64>() / samples.len() as f64).sqrt()
}

/// RMS over all channels together
pub fn rms_multi(channels: &[Vec<f64>]) -> f64 {
    let count: usize = channels.iter().map(Vec::len).sum();
    if count == 0 {
        return 0.0;
    }
    let sum_sq: f64 = channels.iter().flatten().map(|&x| x * x).sum();
    (sum_sq / count as f64).sqrt()
}

/// Absolute peak of a signal
pub fn peak(samples: &[f64]) -> f64 {
    samples.iter().map(|&x| x.abs()).fold(0.0, f64::max)
}

/// Absolute peak over all channels
pub fn peak_multi(channels: &[Vec<f64>]) -> f64 {
    channels.iter().map(|ch| peak(ch)).fold(0.0, f64::max)
}

/// Convert a linear amplitude to dB (epsilon-guarded)
pub fn linear_to_db(value: f64) -> f64 {
    20.0 * (value.abs() + EPSILON).log10()
}

/// Convert dB to a linear amplitude
pub fn db_to_linear(db: f64) -> f64 {
    10.0_f64.powf(db / 20.0)
}

/// Approximate loudness from RMS: `-23 + 20·log10(rms + ε)`
pub fn lufs_approx(rms: f64) -> f64 {
    -23.0 + 20.0 * (rms + EPSILON).log10()
}

/// Multiply every sample by `gain`
pub fn apply_gain(samples: &mut [f64], gain: f64) {
    for s in samples.iter_mut() {
        *s *= gain;
    }
}

/// RMS of consecutive non-overlapping blocks (the last block may be short)
pub fn block_rms(samples: &[f64], block_size: usize) -> Vec<f64> {
    samples.chunks(block_size.max(1)).map(rms).collect()
}

/// Level of the loudest passages
///
/// Splits the signal into 100 ms blocks, takes the RMS of each, and returns
/// `20·log10(mean of the top 10% block RMS values)`. At least one block is
/// always used.
pub fn loud_block_level_db(samples: &[f64], sample_rate: u32) -> f64 {
    let block = (sample_rate as f64 * DYNAMICS_BLOCK_DURATION_MS / 1000.0) as usize;
    let mut levels = block_rms(samples, block);
    if levels.is_empty() {
        return linear_to_db(0.0);
    }
    levels.sort_by(|a, b| b.partial_cmp(a).unwrap_or(std::cmp::Ordering::Equal));
    let top = (levels.len() / 10).max(1);
    let mean = levels[..top].iter().sum::<f64>() / top as f64;
    20.0 * (mean + EPSILON).log10()
}

/// K-weighting pre-filter (ITU-R BS.1770-4 Annex 1)
///
/// Stage one is a high shelf modelling the acoustic effect of the head,
/// stage two the revised low-frequency B-curve high-pass.
struct KWeighting {
    shelf: Biquad,
    high_pass: Biquad,
}

impl KWeighting {
    fn new(sample_rate: f64) -> Self {
        Self {
            shelf: Biquad::high_shelf(
                1_681.974_450_955_531_9,
                0.707_175_236_955_419_3,
                3.999_843_853_973_347,
                sample_rate,
            ),
            high_pass: Biquad::high_pass(
                38.135_470_876_139_82,
                0.500_327_037_325_395_3,
                sample_rate,
            ),
        }
    }

    fn process(&mut self, x: f64) -> f64 {
        self.high_pass.process(self.shelf.process(x))
    }
}

/// Integrated loudness in LUFS (ITU-R BS.1770-4)
///
/// Algorithm:
/// 1. Apply K-weighting per channel
/// 2. Sum channel mean squares over 400 ms blocks
/// 3. Drop blocks below the -70 LUFS absolute gate
/// 4. Average the remaining blocks and convert to LUFS
///
/// Returns `f64::NEG_INFINITY` when every block is gated out (or the
/// input is empty).
pub fn integrated_lufs(channels: &[Vec<f64>], sample_rate: u32) -> f64 {
    let len = channels.first().map_or(0, Vec::len);
    let block_size = (sample_rate as f64 * LUFS_BLOCK_DURATION_MS / 1000.0) as usize;
    if len == 0 || block_size == 0 {
        return f64::NEG_INFINITY;
    }

    let filtered: Vec<Vec<f64>> = channels
        .iter()
        .map(|ch| {
            let mut k = KWeighting::new(sample_rate as f64);
            ch.iter().map(|&x| k.process(x)).collect()
        })
        .collect();

    let num_blocks = len.div_ceil(block_size);
    let gate_linear = 10.0_f64.powf((LUFS_GATE_THRESHOLD + 0.691) / 10.0);

    let gated: Vec<f64> = (0..num_blocks)
        .map(|i| {
            let start = i * block_size;
            let end = (start + block_size).min(len);
            filtered
                .iter()
                .map(|ch| ch[start..end].iter().map(|&x| x * x).sum::<f64>() / (end - start) as f64)
                .sum::<f64>()
        })
        .filter(|&energy| energy > gate_linear)
        .collect();

    if gated.is_empty() {
        log::warn!("All audio blocks below LUFS gate threshold (-70 LUFS)");
        return f64::NEG_INFINITY;
    }

    let mean = gated.iter().sum::<f64>() / gated.len() as f64;
    -0.691 + 10.0 * mean.log10()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_signals::sine;

    #[test]
    fn test_rms_of_sine() {
        let s = sine(440.0, 1.0, 1.0, 44100);
        assert!((rms(&s) - std::f64::consts::FRAC_1_SQRT_2).abs() < 1e-3);
    }

    #[test]
    fn test_empty_is_silent() {
        assert_eq!(rms(&[]), 0.0);
        assert_eq!(peak(&[]), 0.0);
        assert_eq!(rms_multi(&[]), 0.0);
    }

    #[test]
    fn test_db_roundtrip() {
        assert!((db_to_linear(-6.0) - 0.501_187).abs() < 1e-5);
        assert!((linear_to_db(db_to_linear(-12.0)) + 12.0).abs() < 1e-6);
    }

    #[test]
    fn test_lufs_approx_formula() {
        assert!((lufs_approx(1.0) + 23.0).abs() < 1e-6);
        assert!(lufs_approx(0.0) < -200.0);
    }

    #[test]
    fn test_loud_block_level_uses_loudest_blocks() {
        let mut s = vec![0.0; 44100];
        s.extend(vec![0.5; 4410]);
        let level = loud_block_level_db(&s, 44100);
        // 11 blocks -> top 1 block is the 0.5 DC block
        assert!((level - 20.0 * 0.5f64.log10()).abs() < 1e-6);
    }

    #[test]
    fn test_integrated_lufs_full_scale_sine() {
        // A 997 Hz sine at 0 dBFS reads close to -3 LUFS on one channel
        let s = sine(997.0, 1.0, 2.0, 48000);
        let lufs = integrated_lufs(&[s], 48000);
        assert!((lufs + 3.0).abs() < 0.5, "got {:.2} LUFS", lufs);
    }

    #[test]
    fn test_integrated_lufs_silence_is_gated() {
        let lufs = integrated_lufs(&[vec![0.0; 48000]], 48000);
        assert_eq!(lufs, f64::NEG_INFINITY);
    }
}
