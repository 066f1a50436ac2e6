//! Single-pass tempo estimation from the novelty curve
//!
//! The basic BPM path: one spectral-flux novelty curve, one autocorrelation,
//! a tempo preference prior and an octave check.
//!
//! # Algorithm
//!
//! 1. Spectral flux over frames of 2048 with hop 512, normalized by its max
//! 2. Normalized autocorrelation over lags up to 4 seconds
//! 3. Weight each lag by `exp(-(bpm - 120)² / (2 · 50²))`
//! 4. Pick the prominent peak (height > 0.05, prominence > 0.05) with the
//!    highest weighted value
//! 5. For the multiples ×1, ×½, ×2, ×⅓, ×4 of that tempo (inside the BPM
//!    range), sum the autocorrelation at the implied lag and its 2×, 3×, ½×
//!    and ⅓× harmonics, scale by the tempo weight, keep the best multiple
//!
//! The octave check scores each multiple by its summed autocorrelation times
//! the tempo weight. An unweighted sum tends to pick the half tempo, since
//! the lag of half the tempo collects every harmonic of the beat.
//!
//! # Reference
//!
//! Grosche, P., & Müller, M. (2011). Extracting Predominant Local Pulse
//! Information from Music Recordings. *IEEE Transactions on Audio, Speech,
//! and Language Processing*, 19(6), 1688-1701.

use super::autocorrelation::normalized_autocorrelation;
use super::peak_picking::prominent_peaks;
use super::TempoCandidate;
use crate::config::AnalysisConfig;
use crate::error::AnalysisError;
use crate::features::onset::{normalize_by_max, spectral_flux};

const FRAME_SIZE: usize = 2048;
const HOP_SIZE: usize = 512;
const MAX_LAG_SECONDS: f64 = 4.0;
const MIN_PEAK_VALUE: f64 = 0.05;
const MIN_PEAK_PROMINENCE: f64 = 0.05;

/// Tempo multiples tested in the octave check, the detected tempo first
const TEMPO_MULTIPLES: [f64; 5] = [1.0, 0.5, 2.0, 1.0 / 3.0, 4.0];

/// Lag harmonics summed when scoring a multiple
const LAG_HARMONICS: [f64; 5] = [1.0, 2.0, 3.0, 0.5, 1.0 / 3.0];

/// Estimate a single BPM from the novelty-curve autocorrelation
///
/// # Arguments
///
/// * `samples` - Mono samples
/// * `sample_rate` - Sample rate in Hz
/// * `config` - BPM range and tempo preference
///
/// # Returns
///
/// The best tempo with confidence equal to its normalized autocorrelation
/// (clamped to [0, 1])
///
/// # Errors
///
/// Returns `AnalysisError::DegenerateSignal` when the novelty curve is empty,
/// flat, or has no usable lag inside the BPM range. Callers fall back to
/// 120 BPM.
pub fn estimate_bpm_from_novelty(
    samples: &[f64],
    sample_rate: u32,
    config: &AnalysisConfig,
) -> Result<TempoCandidate, AnalysisError> {
    if sample_rate == 0 {
        return Err(AnalysisError::InvalidInput("Sample rate must be > 0".to_string()));
    }

    let novelty = normalize_by_max(&spectral_flux(samples, FRAME_SIZE, HOP_SIZE)?);
    if novelty.len() < 4 {
        return Err(AnalysisError::DegenerateSignal(format!(
            "Novelty curve too short: {} frames",
            novelty.len()
        )));
    }

    let acf = normalized_autocorrelation(&novelty)
        .ok_or_else(|| AnalysisError::DegenerateSignal("Novelty curve is flat".to_string()))?;

    let frame_rate = sample_rate as f64 / HOP_SIZE as f64;
    let max_lag = ((MAX_LAG_SECONDS * frame_rate).ceil() as usize).min(acf.len() - 1);
    let acf = &acf[..=max_lag];

    let lag_to_bpm = |lag: f64| 60.0 * frame_rate / lag;
    let in_range = |bpm: f64| bpm >= config.min_bpm && bpm <= config.max_bpm;
    let preference = |bpm: f64| {
        let d = bpm - config.tempo_preference_bpm;
        (-(d * d) / (2.0 * config.tempo_preference_sigma * config.tempo_preference_sigma)).exp()
    };
    let weighted = |lag: usize| acf[lag] * preference(lag_to_bpm(lag as f64));

    log::debug!(
        "Novelty autocorrelation: {} frames, max lag {} ({:.2} s)",
        novelty.len(),
        max_lag,
        max_lag as f64 / frame_rate
    );

    let best_peak = prominent_peaks(acf, MIN_PEAK_VALUE, MIN_PEAK_PROMINENCE)
        .into_iter()
        .filter(|&lag| in_range(lag_to_bpm(lag as f64)))
        .max_by(|&a, &b| {
            weighted(a)
                .partial_cmp(&weighted(b))
                .unwrap_or(std::cmp::Ordering::Equal)
        });

    let best_lag = match best_peak {
        Some(lag) => lag,
        None => {
            log::debug!("No prominent novelty peak, using best weighted lag");
            (1..acf.len())
                .filter(|&lag| in_range(lag_to_bpm(lag as f64)) && acf[lag] > 0.0)
                .max_by(|&a, &b| {
                    weighted(a)
                        .partial_cmp(&weighted(b))
                        .unwrap_or(std::cmp::Ordering::Equal)
                })
                .ok_or_else(|| {
                    AnalysisError::DegenerateSignal("No positive lag in BPM range".to_string())
                })?
        }
    };

    let base_bpm = lag_to_bpm(best_lag as f64);

    let support = |bpm: f64| -> f64 {
        let lag = 60.0 * frame_rate / bpm;
        let sum: f64 = LAG_HARMONICS
            .iter()
            .map(|&h| (lag * h).round() as usize)
            .filter(|&l| l >= 1 && l < acf.len())
            .map(|l| acf[l])
            .sum();
        sum * preference(bpm)
    };

    let mut best_bpm = base_bpm;
    let mut best_score = f64::NEG_INFINITY;
    for multiple in TEMPO_MULTIPLES {
        let bpm = base_bpm * multiple;
        if !in_range(bpm) {
            continue;
        }
        let score = support(bpm);
        log::debug!("Octave check: {:.1} BPM scores {:.3}", bpm, score);
        if score > best_score {
            best_score = score;
            best_bpm = bpm;
        }
    }

    let chosen_lag = ((60.0 * frame_rate / best_bpm).round() as usize).clamp(1, acf.len() - 1);
    let confidence = acf[chosen_lag].clamp(0.0, 1.0);

    log::debug!(
        "Novelty tempo: {:.2} BPM (peak {:.2} BPM), confidence {:.3}",
        best_bpm,
        base_bpm,
        confidence
    );

    Ok(TempoCandidate {
        bpm: best_bpm,
        confidence,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_signals::click_track;

    #[test]
    fn test_novelty_120bpm() {
        let sr = 44100;
        let samples = click_track(120.0, 10.0, sr);
        let estimate = estimate_bpm_from_novelty(&samples, sr, &AnalysisConfig::default()).unwrap();
        assert!(
            (estimate.bpm - 120.0).abs() < 3.0,
            "Expected ~120 BPM, got {:.2}",
            estimate.bpm
        );
        assert!(estimate.confidence > 0.0 && estimate.confidence <= 1.0);
    }

    #[test]
    fn test_novelty_keeps_common_tempos_over_half_tempo() {
        let sr = 44100;
        for bpm in [120.0, 140.0] {
            let samples = click_track(bpm, 12.0, sr);
            let estimate =
                estimate_bpm_from_novelty(&samples, sr, &AnalysisConfig::default()).unwrap();
            assert!(
                (estimate.bpm - bpm).abs() < 3.0,
                "Expected ~{} BPM, got {:.2}",
                bpm,
                estimate.bpm
            );
        }
    }

    #[test]
    fn test_novelty_avoids_half_tempo() {
        let sr = 44100;
        let samples = click_track(100.0, 12.0, sr);
        let estimate = estimate_bpm_from_novelty(&samples, sr, &AnalysisConfig::default()).unwrap();
        assert!(
            (estimate.bpm - 100.0).abs() < 3.0,
            "Expected ~100 BPM, got {:.2}",
            estimate.bpm
        );
    }

    #[test]
    fn test_novelty_silence_is_degenerate() {
        let result =
            estimate_bpm_from_novelty(&vec![0.0; 44100 * 2], 44100, &AnalysisConfig::default());
        assert!(matches!(result, Err(AnalysisError::DegenerateSignal(_))));
    }

    #[test]
    fn test_novelty_empty_is_degenerate() {
        let result = estimate_bpm_from_novelty(&[], 44100, &AnalysisConfig::default());
        assert!(result.is_err());
    }
}
