//! Final level, limiting and stereo stages
//!
//! Runs after all channels are joined:
//! 1. Exact RMS correction to the target (offset by `output_level_db`)
//! 2. Brickwall limit at ±0.95 (optional)
//! 3. Peak auto-normalize to 0.95 (optional)
//! 4. Mid/side width for stereo when width ≠ 1.0

use crate::config::ProcessingSettings;
use crate::preprocessing::channel_mixer::apply_stereo_width;
use crate::preprocessing::normalization::{apply_gain, db_to_linear, peak_multi, rms_multi, EPSILON};

/// Output ceiling for limiting and normalization
pub const PEAK_CEILING: f64 = 0.95;

/// Apply the final stages in place
pub fn finalize(channels: &mut [Vec<f64>], target_rms: f64, settings: &ProcessingSettings) {
    let target = target_rms * db_to_linear(settings.output_level_db);
    let current = rms_multi(channels);
    if current > EPSILON {
        let gain = target / current;
        for channel in channels.iter_mut() {
            apply_gain(channel, gain);
        }
        log::debug!("Final RMS correction: {:.4} -> {:.4}", current, target);
    }

    if settings.enable_limiting {
        let mut limited = 0usize;
        for s in channels.iter_mut().flatten() {
            if s.abs() > PEAK_CEILING {
                *s = s.signum() * PEAK_CEILING;
                limited += 1;
            }
        }
        if limited > 0 {
            log::debug!("Limiter clamped {} samples", limited);
        }
    }

    if settings.auto_normalize {
        let peak = peak_multi(channels);
        if peak > PEAK_CEILING {
            let gain = PEAK_CEILING / peak;
            for channel in channels.iter_mut() {
                apply_gain(channel, gain);
            }
            log::debug!("Auto-normalized peak {:.4} -> {:.2}", peak, PEAK_CEILING);
        }
    }

    if let [left, right] = channels {
        if (settings.stereo_width - 1.0).abs() > f64::EPSILON {
            apply_stereo_width(left, right, settings.stereo_width);
        }
    }
}
