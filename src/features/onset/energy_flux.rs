//! Energy-ratio beat detection
//!
//! Detects beats where frame energy jumps above a multiple of the previous
//! frame's energy.
//!
//! Algorithm:
//! 1. Divide audio into overlapping frames (frame_size, hop_size)
//! 2. Compute energy (sum of squares) per frame
//! 3. Mark a beat where `E[n] > ratio · E[n-1]`
//! 4. Drop beats closer than 100 ms to the previous one (an attack spread
//!    over several overlapping frames counts once)
//!
//! # Example
//!
//! ```no_run
//! use stratum_master::features::onset::energy_flux::detect_energy_ratio_beats;
//!
//! let samples = vec![0.0f64; 44100 * 30];
//! let beats = detect_energy_ratio_beats(&samples, 44100, 1024, 512, 1.5)?;
//! println!("Found {} beats", beats.len());
//! # Ok::<(), stratum_master::AnalysisError>(())
//! ```

use crate::error::AnalysisError;
use crate::io::Frames;

/// Frames quieter than this never count as beats
const ENERGY_FLOOR: f64 = 1e-8;

/// Minimum spacing between detected beats in seconds
const MIN_BEAT_GAP_S: f64 = 0.1;

/// Energy (sum of squares) of each frame
pub fn frame_energies(samples: &[f64], frame_size: usize, hop_size: usize) -> Vec<f64> {
    Frames::new(samples, frame_size, hop_size)
        .map(|(_, frame)| frame.iter().map(|&x| x * x).sum())
        .collect()
}

/// Detect beats with the energy-ratio rule
///
/// # Arguments
///
/// * `samples` - Mono samples
/// * `sample_rate` - Sample rate in Hz
/// * `frame_size` - Frame size (typically 1024)
/// * `hop_size` - Hop size (typically 512)
/// * `ratio` - Required energy jump over the previous frame (typically 1.5)
///
/// # Returns
///
/// Beat times in seconds, sorted by time
///
/// # Errors
///
/// Returns `AnalysisError::InvalidInput` for a zero sample rate or framing.
pub fn detect_energy_ratio_beats(
    samples: &[f64],
    sample_rate: u32,
    frame_size: usize,
    hop_size: usize,
    ratio: f64,
) -> Result<Vec<f64>, AnalysisError> {
    if sample_rate == 0 || frame_size == 0 || hop_size == 0 {
        return Err(AnalysisError::InvalidInput(format!(
            "Invalid parameters: sample_rate={}, frame_size={}, hop_size={}",
            sample_rate, frame_size, hop_size
        )));
    }

    let energies = frame_energies(samples, frame_size, hop_size);
    let mut beats: Vec<f64> = Vec::new();
    for (i, pair) in energies.windows(2).enumerate() {
        if pair[1] <= ENERGY_FLOOR || pair[1] <= ratio * pair[0] {
            continue;
        }
        let time = ((i + 1) * hop_size) as f64 / sample_rate as f64;
        if beats.last().map_or(true, |&last| time - last >= MIN_BEAT_GAP_S) {
            beats.push(time);
        }
    }

    log::debug!(
        "Energy ratio detector: {} frames, {} beats",
        energies.len(),
        beats.len()
    );
    Ok(beats)
}
