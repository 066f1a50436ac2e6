//! Onset-interval histogram BPM estimation
//!
//! Votes on tempo from the spacing of spectral-flux onsets.
//!
//! # Algorithm
//!
//! 1. Detect onsets from spectral flux (window 1024, hop 512, threshold 0.1)
//! 2. Take inter-onset intervals between consecutive onsets
//! 3. Convert each to `round(60 / interval)` BPM, dropping values outside the range
//! 4. Histogram the BPM values and return the three most frequent

use super::TempoCandidate;
use crate::error::AnalysisError;
use crate::features::onset::detect_spectral_flux_onsets;
use std::collections::BTreeMap;

const FRAME_SIZE: usize = 1024;
const HOP_SIZE: usize = 512;
const ONSET_THRESHOLD: f64 = 0.1;
const TOP_BINS: usize = 3;
const CONFIDENCE: f64 = 0.7;

/// Estimate BPM from the onset-interval histogram
///
/// # Arguments
///
/// * `samples` - Mono samples
/// * `sample_rate` - Sample rate in Hz
/// * `min_bpm` - Minimum BPM kept in the histogram (default: 60.0)
/// * `max_bpm` - Maximum BPM kept in the histogram (default: 200.0)
///
/// # Returns
///
/// Up to three candidates, most frequent interval first, each with confidence 0.7
///
/// # Errors
///
/// Returns `AnalysisError::DegenerateSignal` when fewer than two onsets are found.
pub fn estimate_bpm_from_onset_intervals(
    samples: &[f64],
    sample_rate: u32,
    min_bpm: f64,
    max_bpm: f64,
) -> Result<Vec<TempoCandidate>, AnalysisError> {
    let onsets =
        detect_spectral_flux_onsets(samples, sample_rate, FRAME_SIZE, HOP_SIZE, ONSET_THRESHOLD)?;

    if onsets.len() < 2 {
        return Err(AnalysisError::DegenerateSignal(format!(
            "Too few onsets for interval histogram: {}",
            onsets.len()
        )));
    }

    // BTreeMap keeps ties ordered by BPM
    let mut histogram: BTreeMap<u32, usize> = BTreeMap::new();
    for pair in onsets.windows(2) {
        let interval = pair[1] - pair[0];
        if interval <= 0.0 {
            continue;
        }
        let bpm = (60.0 / interval).round();
        if bpm >= min_bpm && bpm <= max_bpm {
            *histogram.entry(bpm as u32).or_insert(0) += 1;
        }
    }

    let mut bins: Vec<(u32, usize)> = histogram.into_iter().collect();
    bins.sort_by(|a, b| b.1.cmp(&a.1));

    let candidates: Vec<TempoCandidate> = bins
        .into_iter()
        .take(TOP_BINS)
        .map(|(bpm, _)| TempoCandidate {
            bpm: bpm as f64,
            confidence: CONFIDENCE,
        })
        .collect();

    log::debug!(
        "Onset histogram: {} onsets -> {} candidates",
        onsets.len(),
        candidates.len()
    );
    Ok(candidates)
}
