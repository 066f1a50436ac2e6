//! Energy score
//!
//! Mean RMS of 2048-sample windows, placed within the signal's own dynamic
//! range: `clamp01((mean - min) / (max - min) + 0.1)`.

use crate::error::AnalysisError;
use crate::preprocessing::normalization::{block_rms, EPSILON};

const WINDOW_SIZE: usize = 2048;
const OFFSET: f64 = 0.1;
const FLAT_SCORE: f64 = 0.5;

/// Energy score in [0, 1]
///
/// Returns 0.5 when every window has the same RMS.
///
/// # Errors
///
/// Returns `AnalysisError::InvalidInput` for an empty signal.
pub fn energy_score(samples: &[f64]) -> Result<f64, AnalysisError> {
    if samples.is_empty() {
        return Err(AnalysisError::InvalidInput("Empty audio samples".to_string()));
    }

    let levels = block_rms(samples, WINDOW_SIZE);
    let min = levels.iter().copied().fold(f64::INFINITY, f64::min);
    let max = levels.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let mean = levels.iter().sum::<f64>() / levels.len() as f64;

    let range = max - min;
    if range <= EPSILON {
        log::debug!("Energy: flat RMS over {} windows", levels.len());
        return Ok(FLAT_SCORE);
    }

    let score = ((mean - min) / range + OFFSET).clamp(0.0, 1.0);
    log::debug!(
        "Energy: {} windows, mean {:.4} in [{:.4}, {:.4}] -> {:.3}",
        levels.len(),
        mean,
        min,
        max,
        score
    );
    Ok(score)
}
