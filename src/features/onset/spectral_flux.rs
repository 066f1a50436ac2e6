//! Spectral flux novelty and onset detection
//!
//! Detects onsets by finding increases in the magnitude spectrogram.
//!
//! Algorithm:
//! 1. Frame the signal (window, hop) and take the Hann-windowed magnitude spectrum
//! 2. Flux per frame: sum of half-wave rectified bin increases over the previous frame
//! 3. Normalize by the maximum flux
//! 4. Onsets are local maxima of the normalized flux above a threshold
//!
//! # Reference
//!
//! Bello, J. P., Daudet, L., Abdallah, S., Duxbury, C., Davies, M., & Sandler, M. B. (2005).
//! A Tutorial on Onset Detection in Music Signals.
//! *IEEE Transactions on Speech and Audio Processing*, 13(5), 1035-1047.

use crate::error::AnalysisError;
use crate::features::spectrum::SpectralTransform;
use crate::io::Frames;

const EPSILON: f64 = 1e-10;

/// Compute the spectral flux novelty curve
///
/// # Arguments
///
/// * `samples` - Mono samples
/// * `frame_size` - Analysis window in samples
/// * `hop_size` - Hop between windows in samples
///
/// # Returns
///
/// One flux value per frame (the first frame has flux 0). Not normalized.
///
/// # Errors
///
/// Returns `AnalysisError::InvalidInput` if `frame_size` or `hop_size` is zero.
pub fn spectral_flux(
    samples: &[f64],
    frame_size: usize,
    hop_size: usize,
) -> Result<Vec<f64>, AnalysisError> {
    if frame_size == 0 || hop_size == 0 {
        return Err(AnalysisError::InvalidInput(format!(
            "Invalid framing: frame_size={}, hop_size={}",
            frame_size, hop_size
        )));
    }

    log::debug!(
        "Computing spectral flux: {} samples, frame={}, hop={}",
        samples.len(),
        frame_size,
        hop_size
    );

    let transform = SpectralTransform::new(frame_size);
    let mut flux = Vec::with_capacity(Frames::count_frames(samples.len(), frame_size, hop_size));
    let mut previous: Option<Vec<f64>> = None;

    for (_, frame) in Frames::new(samples, frame_size, hop_size) {
        let magnitudes = transform.transform(&frame).magnitudes;
        let value = match &previous {
            Some(prev) => prev
                .iter()
                .zip(&magnitudes)
                .map(|(&p, &c)| (c - p).max(0.0))
                .sum(),
            None => 0.0,
        };
        flux.push(value);
        previous = Some(magnitudes);
    }

    Ok(flux)
}

/// Scale a curve so its maximum is 1.0 (all-zero curves are returned unchanged)
pub fn normalize_by_max(curve: &[f64]) -> Vec<f64> {
    let max = curve.iter().copied().fold(0.0, f64::max);
    if max <= EPSILON {
        return curve.to_vec();
    }
    curve.iter().map(|&x| x / max).collect()
}

/// Detect onsets from spectral flux
///
/// # Arguments
///
/// * `samples` - Mono samples
/// * `sample_rate` - Sample rate in Hz
/// * `frame_size` - Analysis window (typically 1024)
/// * `hop_size` - Hop size (typically 512)
/// * `threshold` - Minimum normalized flux for an onset (typically 0.1)
///
/// # Returns
///
/// Onset times in seconds, sorted by time
pub fn detect_spectral_flux_onsets(
    samples: &[f64],
    sample_rate: u32,
    frame_size: usize,
    hop_size: usize,
    threshold: f64,
) -> Result<Vec<f64>, AnalysisError> {
    if sample_rate == 0 {
        return Err(AnalysisError::InvalidInput(
            "Invalid sample rate: 0".to_string(),
        ));
    }

    let flux = normalize_by_max(&spectral_flux(samples, frame_size, hop_size)?);
    let mut onsets = Vec::new();

    for i in 0..flux.len() {
        let value = flux[i];
        if value <= threshold {
            continue;
        }
        let left = if i > 0 { flux[i - 1] } else { 0.0 };
        let right = flux.get(i + 1).copied().unwrap_or(0.0);
        if value > left && value >= right {
            onsets.push((i * hop_size) as f64 / sample_rate as f64);
        }
    }

    log::debug!("Spectral flux found {} onsets", onsets.len());
    Ok(onsets)
}
