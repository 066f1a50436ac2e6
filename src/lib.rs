//! # Stratum Master
//!
//! An audio analysis and reference-matching mastering engine.
//!
//! ## Features
//!
//! - **BPM Detection**: Four-voice weighted ensemble (onset intervals, envelope
//!   autocorrelation, comb filter, envelope spectrum) or a single novelty-curve path
//! - **Key Detection**: Three chroma variants matched against Krumhansl-Kessler
//!   and Temperley profiles
//! - **Mood**: Energy, danceability and valence scores in [0, 1]
//! - **Mastering**: Three-pass EQ/dynamics/level correction toward a reference
//!   recording or a synthesized target, with limiting and stereo width
//!
//! ## Quick Start
//!
//! ```no_run
//! use stratum_master::{analyze, master, ProcessingSettings, SampleBuffer};
//!
//! let left: Vec<f64> = vec![]; // Your audio data
//! let right: Vec<f64> = vec![];
//! let buffer = SampleBuffer::stereo(left, right, 44100)?;
//!
//! let result = analyze(&buffer)?;
//! println!("BPM: {:.2} (confidence: {:.2})", result.bpm, result.bpm_confidence);
//! println!("Key: {} (confidence: {:.2})", result.key.name(), result.key_confidence);
//!
//! let mastered = master(&buffer, None, &ProcessingSettings::default())?;
//! # Ok::<(), stratum_master::AnalysisError>(())
//! ```
//!
//! ## Architecture
//!
//! ```text
//! SampleBuffer → mono mix ─┬─ Tempo ensemble ─┐
//!                          ├─ Key (chroma)  ──┼→ AnalysisResult
//!                          └─ Mood          ──┘
//!
//! SampleBuffer (+ reference) → Profile → 3 passes per channel → Finalize → SampleBuffer
//! ```
//!
//! Analysis never fails on silent or empty input; it reports documented
//! defaults (120 BPM, C Major, zero chroma, 0.5 mood) instead.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod analysis;
pub mod config;
pub mod error;
pub mod features;
pub mod io;
pub mod mastering;
pub mod preprocessing;

#[cfg(test)]
mod test_signals;

// Re-export main types
pub use analysis::cache::{AnalysisCache, CacheKey, InMemoryCache};
pub use analysis::metadata::{AnalysisFlag, AnalysisMetadata};
pub use analysis::result::{AnalysisResult, Key, KeyCandidate, Mode};
pub use config::{AnalysisConfig, ProcessingSettings, TempoMode};
pub use error::AnalysisError;
pub use features::chroma::ChromaVector;
pub use features::mood::MoodScores;
pub use features::period::TempoCandidate;
pub use io::SampleBuffer;
pub use mastering::{master, master_with_report, MasteringReport, ReferenceProfile};

/// Analyze a buffer with the default configuration
///
/// # Arguments
///
/// * `buffer` - Multi-channel samples in [-1.0, 1.0]
///
/// # Returns
///
/// `AnalysisResult` with tempo, key, chroma and mood scores
///
/// # Errors
///
/// Returns `AnalysisError::InvalidInput` if the buffer holds non-finite
/// samples. Empty or silent buffers return the fallback result.
///
/// # Example
///
/// ```
/// use stratum_master::{analyze, SampleBuffer};
///
/// let buffer = SampleBuffer::mono(vec![0.0; 44100], 44100)?;
/// let result = analyze(&buffer)?;
/// assert_eq!(result.bpm, 120.0);
/// assert_eq!(result.key.name(), "C Major");
/// # Ok::<(), stratum_master::AnalysisError>(())
/// ```
pub fn analyze(buffer: &SampleBuffer) -> Result<AnalysisResult, AnalysisError> {
    analyze_with_config(buffer, &AnalysisConfig::default())
}

/// Analyze a buffer with an explicit configuration
///
/// # Errors
///
/// Same as [`analyze`].
pub fn analyze_with_config(
    buffer: &SampleBuffer,
    config: &AnalysisConfig,
) -> Result<AnalysisResult, AnalysisError> {
    analysis::run_analysis(buffer, config)
}

/// Analyze a buffer, consulting `cache` first
///
/// Results are keyed by a hash of the samples, sample rate and config. Only
/// successful results are stored.
///
/// # Errors
///
/// Same as [`analyze`].
pub fn analyze_cached(
    buffer: &SampleBuffer,
    config: &AnalysisConfig,
    cache: &dyn AnalysisCache,
) -> Result<AnalysisResult, AnalysisError> {
    let key = CacheKey::new(buffer, config);
    if let Some(result) = cache.get(&key) {
        log::debug!("Analysis cache hit: {}", key);
        return Ok(result);
    }

    let result = analysis::run_analysis(buffer, config)?;
    cache.put(key, result.clone());
    Ok(result)
}
