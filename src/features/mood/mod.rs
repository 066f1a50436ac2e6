//! Mood descriptors
//!
//! Energy, danceability and valence, each in [0, 1]. A feature that cannot
//! be computed is logged and reported as the neutral 0.5.

pub mod danceability;
pub mod energy;
pub mod valence;

pub use danceability::danceability_score;
pub use energy::energy_score;
pub use valence::valence_score;

use crate::error::AnalysisError;
use serde::{Deserialize, Serialize};

/// Neutral score used when a feature is unavailable
pub const NEUTRAL_SCORE: f64 = 0.5;

/// Mood scores, each in [0, 1]
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MoodScores {
    /// Loudness relative to the track's own dynamic range
    pub energy: f64,
    /// Beat regularity and tempo suitability
    pub danceability: f64,
    /// Major-versus-minor brightness
    pub valence: f64,
}

impl MoodScores {
    /// All scores at 0.5
    pub fn neutral() -> Self {
        Self {
            energy: NEUTRAL_SCORE,
            danceability: NEUTRAL_SCORE,
            valence: NEUTRAL_SCORE,
        }
    }
}

impl Default for MoodScores {
    fn default() -> Self {
        Self::neutral()
    }
}

/// Mood scores plus the reasons for any neutral fallback
#[derive(Debug, Clone, PartialEq)]
pub struct MoodEstimate {
    /// Scores
    pub scores: MoodScores,
    /// One entry per feature that fell back to 0.5
    pub warnings: Vec<String>,
}

fn or_neutral(name: &str, result: Result<f64, AnalysisError>, warnings: &mut Vec<String>) -> f64 {
    match result {
        Ok(score) => score,
        Err(e) => {
            log::warn!("Mood feature {} failed: {}", name, e);
            warnings.push(format!("{}: {}", name, e));
            NEUTRAL_SCORE
        }
    }
}

/// Compute all three mood scores for a mono signal
pub fn estimate_mood(samples: &[f64], sample_rate: u32) -> MoodEstimate {
    log::debug!("Estimating mood: {} samples at {} Hz", samples.len(), sample_rate);
    let mut warnings = Vec::new();
    let scores = MoodScores {
        energy: or_neutral("energy", energy_score(samples), &mut warnings),
        danceability: or_neutral(
            "danceability",
            danceability_score(samples, sample_rate),
            &mut warnings,
        ),
        valence: or_neutral("valence", valence_score(samples, sample_rate), &mut warnings),
    };
    MoodEstimate { scores, warnings }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_signal_is_neutral_with_warnings() {
        let estimate = estimate_mood(&[], 44100);
        assert_eq!(estimate.scores.energy, 0.5);
        assert_eq!(estimate.scores.valence, 0.5);
        assert!(!estimate.warnings.is_empty());
    }

    #[test]
    fn test_scores_in_unit_range() {
        let samples = crate::test_signals::click_track(128.0, 6.0, 44100);
        let s = estimate_mood(&samples, 44100).scores;
        for v in [s.energy, s.danceability, s.valence] {
            assert!((0.0..=1.0).contains(&v));
        }
    }
}
