//! Reference profiling
//!
//! Measures the loudness, tonal balance, dynamics and width of a buffer, or
//! synthesizes a target profile from the source itself when no reference is
//! given.
//!
//! # Algorithm
//!
//! - Level: joint RMS and peak over all channels, `lufs_approx = -23 + 20·log10(rms + ε)`
//! - Frequency response: magnitude at the nearest bin of one 4096-sample
//!   frame from the middle of the mono mix, at nine band centres, relative
//!   to the loudest band
//! - Psychoacoustic profile: `max(0, 20·log10(mag + ε) - threshold(f))` at
//!   seven bands, using a four-segment hearing threshold
//! - Dynamic range: level of the loudest 10% of 100 ms blocks
//! - Stereo width: `1 - mean(L·R)` for two channels, else 1.0

use crate::features::spectrum::SpectralTransform;
use crate::io::SampleBuffer;
use crate::preprocessing::normalization::{
    loud_block_level_db, lufs_approx, peak_multi, rms_multi, EPSILON,
};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// EQ band centres in Hz
pub const EQ_BANDS_HZ: [u32; 9] = [60, 120, 250, 500, 1000, 2000, 4000, 8000, 12000];

/// Psychoacoustic profile bands in Hz
pub const PSYCHOACOUSTIC_BANDS_HZ: [u32; 7] = [125, 250, 500, 1000, 2000, 4000, 8000];

const PROFILE_FRAME_SIZE: usize = 4096;

/// Loudness target of a synthesized profile
pub const TARGET_LUFS: f64 = -14.0;
/// RMS target of a synthesized profile
pub const TARGET_RMS: f64 = 0.3;
/// Peak ceiling of a synthesized profile
pub const TARGET_PEAK: f64 = 0.95;

const MIN_TARGET_DYNAMIC_RANGE_DB: f64 = 6.0;
const MAX_TARGET_WIDTH: f64 = 1.4;

/// Measured (or synthesized) mastering target
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReferenceProfile {
    /// Joint RMS over all channels
    pub rms: f64,
    /// Absolute peak over all channels
    pub peak: f64,
    /// Approximate loudness from RMS
    pub lufs_approx: f64,
    /// Level of the loudest passages in dB
    pub dynamic_range_db: f64,
    /// 1.0 for mono, `1 - mean(L·R)` for stereo
    pub stereo_width: f64,
    /// Band centre (Hz) to magnitude relative to the loudest band
    pub frequency_response: BTreeMap<u32, f64>,
    /// Band centre (Hz) to dB above the hearing threshold
    pub psychoacoustic_profile: BTreeMap<u32, f64>,
}

/// Approximate threshold of hearing in dB (four-segment ISO 226-like curve)
pub fn hearing_threshold_db(freq: f64) -> f64 {
    let freq = freq.max(EPSILON);
    if freq < 200.0 {
        60.0 - 40.0 * (freq / 20.0).log10()
    } else if freq < 1000.0 {
        20.0 - 15.0 * (freq / 200.0).log10() / 5f64.log10()
    } else if freq < 4000.0 {
        5.0 - 8.0 * (freq / 1000.0).log10() / 4f64.log10()
    } else {
        -3.0 + 20.0 * (freq / 4000.0).log10() / 4f64.log10()
    }
}

/// Magnitude spectrum of one frame from the middle of the signal
fn representative_magnitudes(mono: &[f64], transform: &SpectralTransform) -> Vec<f64> {
    let size = transform.size();
    let start = mono.len().saturating_sub(size) / 2;
    let end = (start + size).min(mono.len());
    transform.transform(&mono[start..end]).magnitudes
}

fn magnitude_at(
    magnitudes: &[f64],
    transform: &SpectralTransform,
    freq: u32,
    sample_rate: u32,
) -> f64 {
    if magnitudes.is_empty() {
        return 0.0;
    }
    let bin = (freq as f64 * transform.size() as f64 / sample_rate as f64).round() as usize;
    magnitudes[bin.min(magnitudes.len() - 1)]
}

impl ReferenceProfile {
    /// Measure a buffer
    pub fn analyze(buffer: &SampleBuffer) -> Self {
        let channels = buffer.channels();
        let sample_rate = buffer.sample_rate();
        let mono = buffer.to_mono();

        let rms = rms_multi(channels);
        let peak = peak_multi(channels);

        let transform = SpectralTransform::new(PROFILE_FRAME_SIZE);
        let magnitudes = representative_magnitudes(&mono, &transform);

        let raw: Vec<(u32, f64)> = EQ_BANDS_HZ
            .iter()
            .map(|&f| (f, magnitude_at(&magnitudes, &transform, f, sample_rate)))
            .collect();
        let loudest = raw.iter().map(|&(_, m)| m).fold(0.0, f64::max);
        let frequency_response = raw
            .into_iter()
            .map(|(f, m)| (f, if loudest > EPSILON { m / loudest } else { 0.0 }))
            .collect();

        let psychoacoustic_profile = PSYCHOACOUSTIC_BANDS_HZ
            .iter()
            .map(|&f| {
                let magnitude = magnitude_at(&magnitudes, &transform, f, sample_rate);
                let level = 20.0 * (magnitude + EPSILON).log10();
                (f, (level - hearing_threshold_db(f as f64)).max(0.0))
            })
            .collect();

        let stereo_width = match channels {
            [left, right] if !left.is_empty() => {
                let correlation =
                    left.iter().zip(right).map(|(l, r)| l * r).sum::<f64>() / left.len() as f64;
                1.0 - correlation
            }
            _ => 1.0,
        };

        let profile = Self {
            rms,
            peak,
            lufs_approx: lufs_approx(rms),
            dynamic_range_db: loud_block_level_db(&mono, sample_rate),
            stereo_width,
            frequency_response,
            psychoacoustic_profile,
        };

        log::debug!(
            "Profile: rms={:.4}, peak={:.4}, lufs~{:.1}, dr={:.1} dB, width={:.3}",
            profile.rms,
            profile.peak,
            profile.lufs_approx,
            profile.dynamic_range_db,
            profile.stereo_width
        );
        profile
    }

    /// Synthesize a target from the source's own profile
    ///
    /// Loudness -14 LUFS at RMS 0.3 and peak 0.95. Tonal balance follows the
    /// source with band boosts (sub-bass ×1.2 capped at 1.5, low-mid as is,
    /// mid ×1.1 capped at 1.3, presence ×1.15 capped at 1.4, air ×1.1 capped
    /// at 1.2). Dynamic range `max(source·0.8, 6)`, width `min(source·1.1, 1.4)`.
    pub fn intelligent_target(source: &ReferenceProfile) -> Self {
        let frequency_response = source
            .frequency_response
            .iter()
            .map(|(&band, &gain)| {
                let (boost, cap) = match band {
                    0..=200 => (1.2, 1.5),
                    201..=700 => (1.0, f64::INFINITY),
                    701..=3000 => (1.1, 1.3),
                    3001..=6000 => (1.15, 1.4),
                    _ => (1.1, 1.2),
                };
                (band, (gain * boost).min(cap))
            })
            .collect();

        let target = Self {
            rms: TARGET_RMS,
            peak: TARGET_PEAK,
            lufs_approx: TARGET_LUFS,
            dynamic_range_db: (source.dynamic_range_db * 0.8).max(MIN_TARGET_DYNAMIC_RANGE_DB),
            stereo_width: (source.stereo_width * 1.1).min(MAX_TARGET_WIDTH),
            frequency_response,
            psychoacoustic_profile: source.psychoacoustic_profile.clone(),
        };

        log::debug!(
            "Intelligent target: rms={:.2}, dr={:.1} dB, width={:.3}",
            target.rms,
            target.dynamic_range_db,
            target.stereo_width
        );
        target
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_signals::sine;

    #[test]
    fn test_hearing_threshold_segments() {
        assert!((hearing_threshold_db(20.0) - 60.0).abs() < 1e-9);
        assert!((hearing_threshold_db(200.0) - 20.0).abs() < 1e-9);
        assert!((hearing_threshold_db(1000.0) - 5.0).abs() < 1e-9);
        assert!((hearing_threshold_db(4000.0) + 3.0).abs() < 1e-9);
        assert!((hearing_threshold_db(16000.0) - 17.0).abs() < 1e-9);
        // most sensitive region sits between 1 and 4 kHz
        assert!(hearing_threshold_db(3000.0) < hearing_threshold_db(500.0));
    }

    #[test]
    fn test_profile_of_sine() {
        let sr = 44100;
        let buffer = SampleBuffer::mono(sine(1000.0, 0.5, 2.0, sr), sr).unwrap();
        let profile = ReferenceProfile::analyze(&buffer);

        assert!((profile.rms - 0.5 / 2f64.sqrt()).abs() < 1e-3);
        assert!((profile.peak - 0.5).abs() < 1e-3);
        assert_eq!(profile.stereo_width, 1.0);
        assert_eq!(profile.frequency_response.len(), 9);
        assert_eq!(profile.psychoacoustic_profile.len(), 7);
        assert!((profile.frequency_response[&1000] - 1.0).abs() < 1e-12);
        assert!(profile.frequency_response[&60] < 0.01);
        assert!(profile.psychoacoustic_profile.values().all(|&v| v >= 0.0));
    }

    #[test]
    fn test_stereo_width_measure() {
        let sr = 44100;
        let s = sine(440.0, 0.5, 1.0, sr);
        let inverted: Vec<f64> = s.iter().map(|x| -x).collect();
        let same =
            ReferenceProfile::analyze(&SampleBuffer::stereo(s.clone(), s.clone(), sr).unwrap());
        let opposite =
            ReferenceProfile::analyze(&SampleBuffer::stereo(s, inverted, sr).unwrap());
        // mean(L·R) = ±0.125 for a 0.5 sine
        assert!((same.stereo_width - 0.875).abs() < 1e-3);
        assert!((opposite.stereo_width - 1.125).abs() < 1e-3);
    }

    #[test]
    fn test_intelligent_target_rules() {
        let mut source = ReferenceProfile::analyze(
            &SampleBuffer::mono(sine(440.0, 0.2, 1.0, 44100), 44100).unwrap(),
        );
        for (i, gain) in source.frequency_response.values_mut().enumerate() {
            *gain = if i % 2 == 0 { 1.0 } else { 0.5 };
        }
        source.dynamic_range_db = -20.0;
        source.stereo_width = 1.3;

        let target = ReferenceProfile::intelligent_target(&source);
        assert_eq!(target.rms, 0.3);
        assert_eq!(target.lufs_approx, -14.0);
        assert_eq!(target.peak, 0.95);
        assert!((target.frequency_response[&60] - 1.2).abs() < 1e-12);
        assert!((target.frequency_response[&120] - 0.6).abs() < 1e-12);
        assert!((target.frequency_response[&250] - 1.0).abs() < 1e-12);
        assert!((target.frequency_response[&1000] - 1.1).abs() < 1e-12);
        assert!((target.frequency_response[&4000] - 1.15).abs() < 1e-12);
        assert!((target.frequency_response[&12000] - 1.1).abs() < 1e-12);
        assert_eq!(target.dynamic_range_db, 6.0);
        assert!((target.stereo_width - 1.4).abs() < 1e-12);
    }

    #[test]
    fn test_boost_caps() {
        let mut source = ReferenceProfile::analyze(
            &SampleBuffer::mono(sine(440.0, 0.2, 1.0, 44100), 44100).unwrap(),
        );
        for gain in source.frequency_response.values_mut() {
            *gain = 2.0;
        }
        let target = ReferenceProfile::intelligent_target(&source);
        assert_eq!(target.frequency_response[&60], 1.5);
        assert_eq!(target.frequency_response[&500], 2.0);
        assert_eq!(target.frequency_response[&2000], 1.3);
        assert_eq!(target.frequency_response[&4000], 1.4);
        assert_eq!(target.frequency_response[&8000], 1.2);
    }
}
