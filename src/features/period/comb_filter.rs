//! Comb filter BPM estimation
//!
//! Tests hypothesis tempos and scores each by how well the signal lines up
//! with itself one beat later.
//!
//! # Algorithm
//!
//! 1. Generate candidate BPM values (80-180 BPM, step 2)
//! 2. For each candidate, compute the beat period `round(60 / bpm * sample_rate)`
//! 3. Score `Σ |x[i]| · |x[i + period]|` with `i` stepping by the hop size
//! 4. Normalize scores by the best score
//! 5. Return every tested BPM ranked by score
//!
//! # Reference
//!
//! Scheirer, E. D. (1998). Tempo and Beat Analysis of Acoustic Musical Signals.
//! *Journal of the Acoustical Society of America*, 103(1), 588-601.
//!
//! # Example
//!
//! ```no_run
//! use stratum_master::features::period::comb_filter::estimate_bpm_from_comb_filter;
//!
//! let samples = vec![0.0f64; 44100 * 10];
//! let candidates = estimate_bpm_from_comb_filter(&samples, 44100, 512)?;
//! # Ok::<(), stratum_master::AnalysisError>(())
//! ```

use super::TempoCandidate;
use crate::error::AnalysisError;

const EPSILON: f64 = 1e-10;
const COMB_MIN_BPM: u32 = 80;
const COMB_MAX_BPM: u32 = 180;
const COMB_STEP_BPM: usize = 2;

/// Per-position scores closer than this (min/max) carry no tempo
const FLATNESS_RATIO: f64 = 0.99;

/// Estimate BPM with a comb filter over the raw samples
///
/// # Arguments
///
/// * `samples` - Mono samples
/// * `sample_rate` - Sample rate in Hz
/// * `hop_size` - Step between scored sample positions (default: 512)
///
/// # Returns
///
/// All 51 tested BPM values, best first, with confidence = score / best score
///
/// # Errors
///
/// Returns `AnalysisError` if:
/// - Invalid parameters (sample_rate=0, hop_size=0)
/// - No tested period produces any energy, or every period scores the same
///   (`DegenerateSignal`)
pub fn estimate_bpm_from_comb_filter(
    samples: &[f64],
    sample_rate: u32,
    hop_size: usize,
) -> Result<Vec<TempoCandidate>, AnalysisError> {
    if sample_rate == 0 || hop_size == 0 {
        return Err(AnalysisError::InvalidInput(format!(
            "Invalid parameters: sample_rate={}, hop_size={}",
            sample_rate, hop_size
        )));
    }

    log::debug!(
        "Comb filter: {} samples at {} Hz, {}-{} BPM",
        samples.len(),
        sample_rate,
        COMB_MIN_BPM,
        COMB_MAX_BPM
    );

    let mut scores = Vec::new();
    let mut mean_products = Vec::new();
    for bpm in (COMB_MIN_BPM..=COMB_MAX_BPM).step_by(COMB_STEP_BPM) {
        let bpm = bpm as f64;
        let period = (60.0 / bpm * sample_rate as f64).round() as usize;
        let (score, positions) = comb_score(samples, period, hop_size);
        scores.push((bpm, score));
        if positions > 0 {
            mean_products.push(score / positions as f64);
        }
    }

    let best = scores.iter().map(|&(_, s)| s).fold(0.0, f64::max);
    if best <= EPSILON {
        return Err(AnalysisError::DegenerateSignal(
            "Comb filter found no periodic energy".to_string(),
        ));
    }

    // a steady signal lines up equally well with itself at every period
    let max_mean = mean_products.iter().copied().fold(0.0, f64::max);
    let min_mean = mean_products.iter().copied().fold(f64::INFINITY, f64::min);
    if max_mean > EPSILON && min_mean / max_mean > FLATNESS_RATIO {
        return Err(AnalysisError::DegenerateSignal(format!(
            "Comb filter scores are flat (min/max {:.4})",
            min_mean / max_mean
        )));
    }

    let mut candidates: Vec<TempoCandidate> = scores
        .into_iter()
        .map(|(bpm, score)| TempoCandidate {
            bpm,
            confidence: score / best,
        })
        .collect();

    // stable: equal scores keep ascending BPM order
    candidates.sort_by(|a, b| {
        b.confidence
            .partial_cmp(&a.confidence)
            .unwrap_or(std::cmp::Ordering::Equal)
    });

    log::debug!(
        "Comb filter best: {:.1} BPM",
        candidates.first().map_or(0.0, |c| c.bpm)
    );
    Ok(candidates)
}

/// Lag product `Σ |x[i]| · |x[i + period]|` over hop-spaced positions,
/// with the number of positions summed
fn comb_score(samples: &[f64], period: usize, hop_size: usize) -> (f64, usize) {
    if period == 0 || period >= samples.len() {
        return (0.0, 0);
    }
    (0..samples.len() - period)
        .step_by(hop_size)
        .fold((0.0, 0), |(sum, n), i| {
            (sum + samples[i].abs() * samples[i + period].abs(), n + 1)
        })
}
