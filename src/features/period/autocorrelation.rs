//! Autocorrelation-based BPM estimation
//!
//! Finds periodicity in the amplitude envelope using FFT-accelerated
//! autocorrelation.
//!
//! # Algorithm
//!
//! 1. Reduce the mono stream to a hop-512 RMS envelope
//! 2. Compute the normalized autocorrelation: `ACF = IFFT(|FFT(x - mean)|²) / ACF[0]`
//! 3. Find local maxima over lags `[1, N/4]`
//! 4. Convert lag values to BPM: `BPM = (60 * sample_rate) / (lag * hop_size)`
//! 5. Keep candidates inside the BPM range, strongest first
//!
//! # Reference
//!
//! Ellis, D. P. W., & Pikrakis, A. (2006). Real-time Beat Induction.
//! *Proceedings of the International Conference on Music Information Retrieval*.
//!
//! # Example
//!
//! ```no_run
//! use stratum_master::features::period::autocorrelation::estimate_bpm_from_autocorrelation;
//!
//! let samples = vec![0.0f64; 44100 * 10];
//! let candidates = estimate_bpm_from_autocorrelation(&samples, 44100, 512, 60.0, 200.0)?;
//! # Ok::<(), stratum_master::AnalysisError>(())
//! ```

use super::peak_picking::local_maxima;
use super::TempoCandidate;
use crate::error::AnalysisError;
use crate::preprocessing::normalization::block_rms;
use rustfft::num_complex::Complex;
use rustfft::FftPlanner;

const EPSILON: f64 = 1e-10;
const MAX_CANDIDATES: usize = 5;
const CONFIDENCE: f64 = 0.8;

/// Estimate BPM from envelope autocorrelation
///
/// # Arguments
///
/// * `samples` - Mono samples
/// * `sample_rate` - Sample rate in Hz
/// * `hop_size` - Envelope hop in samples (default: 512)
/// * `min_bpm` - Minimum BPM to consider (default: 60.0)
/// * `max_bpm` - Maximum BPM to consider (default: 200.0)
///
/// # Returns
///
/// Up to five candidates ranked by autocorrelation strength, each with
/// confidence 0.8
///
/// # Errors
///
/// Returns `AnalysisError` if:
/// - Invalid parameters (sample_rate=0, hop_size=0, inverted BPM range)
/// - The envelope is too short or has no variance (`DegenerateSignal`)
pub fn estimate_bpm_from_autocorrelation(
    samples: &[f64],
    sample_rate: u32,
    hop_size: usize,
    min_bpm: f64,
    max_bpm: f64,
) -> Result<Vec<TempoCandidate>, AnalysisError> {
    log::debug!(
        "Estimating BPM from autocorrelation: {} samples, {} Hz, hop={}, range=[{:.1}, {:.1}] BPM",
        samples.len(),
        sample_rate,
        hop_size,
        min_bpm,
        max_bpm
    );

    if sample_rate == 0 || hop_size == 0 {
        return Err(AnalysisError::InvalidInput(format!(
            "Invalid parameters: sample_rate={}, hop_size={}",
            sample_rate, hop_size
        )));
    }

    if min_bpm <= 0.0 || min_bpm >= max_bpm {
        return Err(AnalysisError::InvalidInput(format!(
            "Invalid BPM range: [{:.1}, {:.1}]",
            min_bpm, max_bpm
        )));
    }

    let envelope = block_rms(samples, hop_size);
    if envelope.len() < 8 {
        return Err(AnalysisError::DegenerateSignal(format!(
            "Envelope too short for autocorrelation: {} blocks",
            envelope.len()
        )));
    }

    let acf = normalized_autocorrelation(&envelope).ok_or_else(|| {
        AnalysisError::DegenerateSignal("Envelope has no variance".to_string())
    })?;

    let max_lag = envelope.len() / 4;
    let mut peaks: Vec<(f64, f64)> = local_maxima(&acf[..=max_lag.min(acf.len() - 1)])
        .into_iter()
        .filter(|&lag| acf[lag] > 0.0)
        .map(|lag| {
            let bpm = (60.0 * sample_rate as f64) / (lag as f64 * hop_size as f64);
            (bpm, acf[lag])
        })
        .filter(|&(bpm, _)| bpm >= min_bpm && bpm <= max_bpm)
        .collect();

    peaks.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal));

    let candidates: Vec<TempoCandidate> = peaks
        .into_iter()
        .take(MAX_CANDIDATES)
        .map(|(bpm, _)| TempoCandidate {
            bpm,
            confidence: CONFIDENCE,
        })
        .collect();

    log::debug!("Autocorrelation found {} BPM candidates", candidates.len());
    Ok(candidates)
}

/// Mean-removed autocorrelation normalized so that lag 0 equals 1.0
///
/// Uses the identity `ACF = IFFT(|FFT(signal)|²)` with zero-padding to avoid
/// circular wrap-around. Returns `None` if the signal has no variance.
pub fn normalized_autocorrelation(signal: &[f64]) -> Option<Vec<f64>> {
    let n = signal.len();
    if n == 0 {
        return None;
    }

    let mean = signal.iter().sum::<f64>() / n as f64;
    let fft_size = (2 * n).next_power_of_two();

    let mut buffer: Vec<Complex<f64>> = signal
        .iter()
        .map(|&x| Complex::new(x - mean, 0.0))
        .collect();
    buffer.resize(fft_size, Complex::new(0.0, 0.0));

    let mut planner = FftPlanner::new();
    planner.plan_fft_forward(fft_size).process(&mut buffer);
    for x in buffer.iter_mut() {
        *x = Complex::new(x.norm_sqr(), 0.0);
    }
    planner.plan_fft_inverse(fft_size).process(&mut buffer);

    let zero_lag = buffer[0].re;
    if zero_lag <= EPSILON {
        return None;
    }

    Some(buffer[..n].iter().map(|x| x.re / zero_lag).collect())
}
