//! Iterative per-channel corrector
//!
//! Three strictly sequential passes per channel, each consuming the previous
//! pass's output:
//!
//! 1. (first pass only) initial gain `min(target_rms / rms, 2.0)`
//! 2. Band EQ toward the target response
//! 3. Perceptual weighting (optional)
//! 4. Compression with a pass-scaled ratio
//! 5. 30% convergence toward the target RMS, then `tanh(0.9x)·1.1` soft clip
//!
//! Channels are independent here and run in parallel.

use super::dynamics::{compress, pass_ratio};
use super::eq::{apply_band_eq, target_band_gains};
use super::profile::ReferenceProfile;
use super::psychoacoustic::apply_perceptual_weighting;
use crate::config::ProcessingSettings;
use crate::preprocessing::normalization::{apply_gain, rms, EPSILON};
use rayon::prelude::*;

/// Number of correction passes
pub const PASSES: usize = 3;

const MAX_INITIAL_GAIN: f64 = 2.0;
const CONVERGENCE_RATE: f64 = 0.3;

/// Soft clipper: `tanh(0.9x)·1.1`
pub fn soft_clip(x: f64) -> f64 {
    (x * 0.9).tanh() * 1.1
}

/// Corrected channel and its RMS after each pass
#[derive(Debug, Clone, PartialEq)]
pub struct ChannelCorrection {
    /// Processed samples
    pub samples: Vec<f64>,
    /// RMS at the end of each pass
    pub pass_rms: Vec<f64>,
}

/// Per-invocation corrector state, shared read-only by every channel
#[derive(Debug, Clone)]
pub struct Corrector {
    target_rms: f64,
    band_gains: [f64; 9],
    settings: ProcessingSettings,
    sample_rate: u32,
}

impl Corrector {
    /// Prepare a corrector pulling `source` toward `target`
    pub fn new(
        source: &ReferenceProfile,
        target: &ReferenceProfile,
        settings: &ProcessingSettings,
        sample_rate: u32,
    ) -> Self {
        Self {
            target_rms: target.rms,
            band_gains: target_band_gains(source, target),
            settings: settings.clone(),
            sample_rate,
        }
    }

    /// Run every pass over one channel
    pub fn correct_channel(&self, mut samples: Vec<f64>) -> ChannelCorrection {
        let mut pass_rms = Vec::with_capacity(PASSES);

        for iteration in 1..=PASSES {
            if iteration == 1 {
                let current = rms(&samples);
                if current > EPSILON {
                    apply_gain(&mut samples, (self.target_rms / current).min(MAX_INITIAL_GAIN));
                }
            }

            apply_band_eq(
                &mut samples,
                self.sample_rate,
                &self.band_gains,
                self.settings.eq_intensity,
                iteration,
            );

            if self.settings.psychoacoustic_processing {
                samples = apply_perceptual_weighting(&samples, self.sample_rate, iteration);
            }

            compress(
                &mut samples,
                self.sample_rate,
                pass_ratio(self.settings.compression_ratio, iteration),
            );

            let current = rms(&samples);
            if current > EPSILON {
                let correction = 1.0 + (self.target_rms / current - 1.0) * CONVERGENCE_RATE;
                apply_gain(&mut samples, correction);
            }
            for s in samples.iter_mut() {
                *s = soft_clip(*s);
            }

            let level = rms(&samples);
            log::debug!("Pass {}: rms {:.4} (target {:.4})", iteration, level, self.target_rms);
            pass_rms.push(level);
        }

        ChannelCorrection { samples, pass_rms }
    }

    /// Correct every channel, joining before returning
    ///
    /// Output order matches input order.
    pub fn correct_all(&self, channels: Vec<Vec<f64>>) -> Vec<ChannelCorrection> {
        channels
            .into_par_iter()
            .map(|channel| self.correct_channel(channel))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::io::SampleBuffer;
    use crate::test_signals::sine;

    fn corrector_for(samples: &[f64], settings: &ProcessingSettings) -> Corrector {
        let buffer = SampleBuffer::mono(samples.to_vec(), 44100).unwrap();
        let source = ReferenceProfile::analyze(&buffer);
        let target = ReferenceProfile::intelligent_target(&source);
        Corrector::new(&source, &target, settings, 44100)
    }

    #[test]
    fn test_soft_clip_shape() {
        assert_eq!(soft_clip(0.0), 0.0);
        assert!(soft_clip(10.0) <= 1.1);
        assert!((soft_clip(-0.3) + soft_clip(0.3)).abs() < 1e-15);
    }

    #[test]
    fn test_passes_move_toward_target() {
        let samples = sine(440.0, 0.05, 1.0, 44100);
        let corrector = corrector_for(&samples, &ProcessingSettings::default());
        let start = rms(&samples);
        let result = corrector.correct_channel(samples);

        assert_eq!(result.pass_rms.len(), PASSES);
        assert_eq!(result.samples.len(), 44100);
        assert!(
            (result.pass_rms[2] - 0.3).abs() < (start - 0.3).abs(),
            "pass RMS {:?} should approach 0.3",
            result.pass_rms
        );
    }

    #[test]
    fn test_silent_channel_stays_silent() {
        let settings = ProcessingSettings::default();
        let corrector = corrector_for(&sine(440.0, 0.1, 0.2, 44100), &settings);
        let result = corrector.correct_channel(vec![0.0; 8820]);
        assert!(result.samples.iter().all(|&s| s == 0.0));
    }

    #[test]
    fn test_channel_order_preserved() {
        let settings = ProcessingSettings {
            psychoacoustic_processing: false,
            ..Default::default()
        };
        let loud = sine(440.0, 0.4, 0.3, 44100);
        let quiet = vec![0.0; loud.len()];
        let corrector = corrector_for(&loud, &settings);
        let results = corrector.correct_all(vec![loud, quiet]);
        assert!(rms(&results[0].samples) > 0.1);
        assert_eq!(rms(&results[1].samples), 0.0);
    }
}
