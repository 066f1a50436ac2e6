//! Key detection by template matching
//!
//! Correlates a chroma vector against the Krumhansl-Schmuckler and Temperley
//! profiles in all 24 rotations.
//!
//! # Algorithm
//!
//! 1. For each tonic 0..11 and each mode, Pearson-correlate the chroma with
//!    the rotated Krumhansl-Schmuckler and Temperley profiles
//! 2. Blend as `0.6·KS + 0.4·Temperley`, clipping negative scores to 0
//! 3. Sort the 24 scores descending (ties keep tonic order, major first)
//!
//! # Example
//!
//! ```
//! use stratum_master::analysis::result::Key;
//! use stratum_master::features::chroma::ChromaVector;
//! use stratum_master::features::key::detector::match_to_key;
//! use stratum_master::features::key::templates::{rotate, KRUMHANSL_MAJOR};
//!
//! // a chroma shaped like the D major profile
//! let profile = rotate(&KRUMHANSL_MAJOR, 2);
//! let sum: f64 = profile.iter().sum();
//! let mut bins = [0.0; 12];
//! for (b, p) in bins.iter_mut().zip(profile) {
//!     *b = p / sum;
//! }
//! let ranked = match_to_key(&ChromaVector(bins));
//! assert_eq!(ranked[0].key, Key::Major(2));
//! ```

use super::templates::{krumhansl, rotate, temperley};
use crate::analysis::result::{Key, KeyCandidate, Mode};
use crate::config::AnalysisConfig;
use crate::error::AnalysisError;
use crate::features::chroma::{extract_combined_chroma, ChromaVector};

const EPSILON: f64 = 1e-12;
const KRUMHANSL_WEIGHT: f64 = 0.6;
const TEMPERLEY_WEIGHT: f64 = 0.4;

/// Pearson correlation of two equal-length vectors
///
/// `(nΣxy - ΣxΣy) / sqrt((nΣx² - (Σx)²)(nΣy² - (Σy)²))`, or 0.0 when either
/// vector has zero variance (or the lengths differ or are zero).
pub fn pearson(x: &[f64], y: &[f64]) -> f64 {
    if x.len() != y.len() || x.is_empty() {
        return 0.0;
    }
    let n = x.len() as f64;
    let (mut sx, mut sy, mut sxy, mut sxx, mut syy) = (0.0, 0.0, 0.0, 0.0, 0.0);
    for (&a, &b) in x.iter().zip(y) {
        sx += a;
        sy += b;
        sxy += a * b;
        sxx += a * a;
        syy += b * b;
    }
    let var_x = n * sxx - sx * sx;
    let var_y = n * syy - sy * sy;
    if var_x <= EPSILON || var_y <= EPSILON {
        return 0.0;
    }
    (n * sxy - sx * sy) / (var_x * var_y).sqrt()
}

/// Score all 24 keys against a chroma vector
///
/// # Returns
///
/// 24 candidates sorted by blended score, best first. A zero chroma scores
/// every key 0.0 and therefore ranks C Major first.
pub fn match_to_key(chroma: &ChromaVector) -> Vec<KeyCandidate> {
    let values = chroma.values();
    let mut candidates: Vec<KeyCandidate> = (0..12u32)
        .flat_map(|tonic| [Mode::Major, Mode::Minor].map(|mode| (tonic, mode)))
        .map(|(tonic, mode)| {
            let ks = pearson(values, &rotate(krumhansl(mode), tonic as usize));
            let tp = pearson(values, &rotate(temperley(mode), tonic as usize));
            KeyCandidate {
                key: Key::new(tonic, mode),
                confidence: (KRUMHANSL_WEIGHT * ks + TEMPERLEY_WEIGHT * tp).max(0.0),
            }
        })
        .collect();

    // stable sort keeps generation order for ties
    candidates.sort_by(|a, b| {
        b.confidence
            .partial_cmp(&a.confidence)
            .unwrap_or(std::cmp::Ordering::Equal)
    });
    candidates
}

/// Key estimate for a signal
#[derive(Debug, Clone, PartialEq)]
pub struct KeyEstimate {
    /// Best key
    pub key: Key,
    /// Blended score of the best key
    pub confidence: f64,
    /// Top ranked keys
    pub candidates: Vec<KeyCandidate>,
    /// Blended chroma the match was made on
    pub chroma: ChromaVector,
}

/// Estimate the key of a mono signal
///
/// Builds the blended chroma (see [`extract_combined_chroma`]) and matches it
/// against all 24 keys.
///
/// # Errors
///
/// Returns `AnalysisError::InvalidInput` for an empty signal or zero sample rate.
pub fn estimate_key(
    samples: &[f64],
    sample_rate: u32,
    config: &AnalysisConfig,
) -> Result<KeyEstimate, AnalysisError> {
    if samples.is_empty() {
        return Err(AnalysisError::InvalidInput("Empty audio samples".to_string()));
    }
    if sample_rate == 0 {
        return Err(AnalysisError::InvalidInput("Sample rate must be > 0".to_string()));
    }

    log::debug!("Estimating key: {} samples at {} Hz", samples.len(), sample_rate);

    let chroma = extract_combined_chroma(samples, sample_rate, &config.chroma_weights);
    if chroma.is_zero() {
        log::warn!("No pitched energy measured, key defaults to C Major");
    }

    let ranked = match_to_key(&chroma);
    let best = ranked.first().copied().unwrap_or(KeyCandidate {
        key: Key::default(),
        confidence: 0.0,
    });

    log::debug!(
        "Detected key: {} ({}), confidence {:.3}",
        best.key.name(),
        best.key.numerical(),
        best.confidence
    );

    Ok(KeyEstimate {
        key: best.key,
        confidence: best.confidence.clamp(0.0, 1.0),
        candidates: ranked.into_iter().take(config.max_candidates).collect(),
        chroma,
    })
}
