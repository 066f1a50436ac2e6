//! Danceability score
//!
//! Combines beat regularity with how dance-friendly the implied tempo is:
//! `0.6·regularity + 0.4·tempo_suitability`, where
//! `regularity = max(0, 1 - cv)` over the inter-beat intervals.

use crate::error::AnalysisError;
use crate::features::onset::detect_energy_ratio_beats;

const FRAME_SIZE: usize = 1024;
const HOP_SIZE: usize = 512;
const ENERGY_RATIO: f64 = 1.5;
const MIN_BEATS: usize = 4;
const FEW_BEATS_SCORE: f64 = 0.2;
const REGULARITY_WEIGHT: f64 = 0.6;
const TEMPO_WEIGHT: f64 = 0.4;

/// Step function over BPM
///
/// 1.0 for 100-140, 0.7 for 80-160, 0.4 for 60-180, otherwise 0.1.
pub fn tempo_suitability(bpm: f64) -> f64 {
    if (100.0..=140.0).contains(&bpm) {
        1.0
    } else if (80.0..=160.0).contains(&bpm) {
        0.7
    } else if (60.0..=180.0).contains(&bpm) {
        0.4
    } else {
        0.1
    }
}

/// Danceability score in [0, 1]
///
/// Fewer than four detected beats scores 0.2.
///
/// # Errors
///
/// Propagates framing errors from beat detection.
pub fn danceability_score(samples: &[f64], sample_rate: u32) -> Result<f64, AnalysisError> {
    let beats =
        detect_energy_ratio_beats(samples, sample_rate, FRAME_SIZE, HOP_SIZE, ENERGY_RATIO)?;
    if beats.len() < MIN_BEATS {
        log::debug!("Danceability: only {} beats", beats.len());
        return Ok(FEW_BEATS_SCORE);
    }

    let intervals: Vec<f64> = beats.windows(2).map(|w| w[1] - w[0]).collect();
    let mean = intervals.iter().sum::<f64>() / intervals.len() as f64;
    if mean <= 0.0 {
        return Ok(FEW_BEATS_SCORE);
    }
    let variance =
        intervals.iter().map(|&x| (x - mean) * (x - mean)).sum::<f64>() / intervals.len() as f64;
    let cv = variance.sqrt() / mean;

    let regularity = (1.0 - cv).max(0.0);
    let bpm = 60.0 / mean;
    let score =
        (REGULARITY_WEIGHT * regularity + TEMPO_WEIGHT * tempo_suitability(bpm)).clamp(0.0, 1.0);

    log::debug!(
        "Danceability: {} beats, cv {:.3}, implied {:.1} BPM -> {:.3}",
        beats.len(),
        cv,
        bpm,
        score
    );
    Ok(score)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_signals::click_track;

    #[test]
    fn test_tempo_suitability_steps() {
        assert_eq!(tempo_suitability(120.0), 1.0);
        assert_eq!(tempo_suitability(90.0), 0.7);
        assert_eq!(tempo_suitability(170.0), 0.4);
        assert_eq!(tempo_suitability(200.0), 0.1);
    }

    #[test]
    fn test_regular_120bpm_is_danceable() {
        let sr = 44100;
        let score = danceability_score(&click_track(120.0, 8.0, sr), sr).unwrap();
        assert!(score > 0.9, "steady 120 BPM should score high, got {:.3}", score);
    }

    #[test]
    fn test_silence_has_few_beats() {
        assert_eq!(danceability_score(&vec![0.0; 44100 * 2], 44100).unwrap(), 0.2);
    }
}
