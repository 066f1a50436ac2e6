//! Spectral-peak BPM estimation
//!
//! Reads tempo off the power spectrum of the amplitude envelope: a pulse
//! repeating every `T` seconds puts a spectral peak at `1/T` Hz.
//!
//! # Algorithm
//!
//! 1. Hop-512 RMS envelope, mean removed
//! 2. Power spectrum of the whole envelope
//! 3. Local maxima whose frequency `f` satisfies `f · 60 ∈ [min_bpm, max_bpm]`
//! 4. Top five by power, each with confidence 0.6

use super::peak_picking::local_maxima;
use super::TempoCandidate;
use crate::error::AnalysisError;
use crate::features::spectrum::power_spectrum;
use crate::preprocessing::normalization::block_rms;

const EPSILON: f64 = 1e-10;
const MAX_CANDIDATES: usize = 5;
const CONFIDENCE: f64 = 0.6;

/// Estimate BPM from peaks in the envelope power spectrum
///
/// # Errors
///
/// Returns `AnalysisError::InvalidInput` for a zero sample rate or hop, and
/// `AnalysisError::DegenerateSignal` when the envelope is too short or no
/// peak falls inside the BPM range.
pub fn estimate_bpm_from_spectral_peaks(
    samples: &[f64],
    sample_rate: u32,
    hop_size: usize,
    min_bpm: f64,
    max_bpm: f64,
) -> Result<Vec<TempoCandidate>, AnalysisError> {
    if sample_rate == 0 || hop_size == 0 {
        return Err(AnalysisError::InvalidInput(format!(
            "Invalid parameters: sample_rate={}, hop_size={}",
            sample_rate, hop_size
        )));
    }

    let mut envelope = block_rms(samples, hop_size);
    if envelope.len() < 8 {
        return Err(AnalysisError::DegenerateSignal(format!(
            "Envelope too short for spectral analysis: {} blocks",
            envelope.len()
        )));
    }

    let mean = envelope.iter().sum::<f64>() / envelope.len() as f64;
    for e in envelope.iter_mut() {
        *e -= mean;
    }

    let power = power_spectrum(&envelope);
    let envelope_rate = sample_rate as f64 / hop_size as f64;
    let bin_hz = envelope_rate / envelope.len() as f64;

    let mut peaks: Vec<(f64, f64)> = local_maxima(&power)
        .into_iter()
        .map(|k| (k as f64 * bin_hz * 60.0, power[k]))
        .filter(|&(bpm, p)| bpm >= min_bpm && bpm <= max_bpm && p > EPSILON)
        .collect();

    if peaks.is_empty() {
        return Err(AnalysisError::DegenerateSignal(
            "No envelope spectral peaks in BPM range".to_string(),
        ));
    }

    peaks.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal));

    log::debug!(
        "Spectral peaks: {} in range, resolution {:.2} BPM",
        peaks.len(),
        bin_hz * 60.0
    );

    Ok(peaks
        .into_iter()
        .take(MAX_CANDIDATES)
        .map(|(bpm, _)| TempoCandidate {
            bpm,
            confidence: CONFIDENCE,
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_signals::click_track;

    #[test]
    fn test_spectral_peak_120bpm() {
        let sr = 44100;
        let samples = click_track(120.0, 12.0, sr);
        let candidates = estimate_bpm_from_spectral_peaks(&samples, sr, 512, 60.0, 200.0).unwrap();
        assert!(candidates.len() <= 5);
        assert!(
            (candidates[0].bpm - 120.0).abs() < 6.0,
            "Strongest peak should be near 120 BPM, got {:?}",
            candidates
        );
        assert!(candidates.iter().all(|c| c.confidence == 0.6));
    }

    #[test]
    fn test_spectral_peak_constant_signal_is_degenerate() {
        let result =
            estimate_bpm_from_spectral_peaks(&vec![0.3; 44100 * 4], 44100, 512, 60.0, 200.0);
        assert!(matches!(result, Err(AnalysisError::DegenerateSignal(_))));
    }
}
