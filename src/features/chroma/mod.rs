//! Chroma extraction
//!
//! Pitch-class energy distribution (12 semitones, C first) built from three
//! spectral variants and blended by weight:
//! - Plain STFT chroma
//! - Median-smoothed (CENS-like) chroma
//! - Frequency-scaled (constant-Q-like) chroma

pub mod extractor;
pub mod normalization;
pub mod smoothing;

pub use extractor::{extract_chroma, extract_combined_chroma, ChromaVariant};

use serde::{Deserialize, Serialize};

/// 12-bin pitch-class distribution, index 0 = C ... 11 = B
///
/// Normalized to sum 1.0, or all zeros when no energy was measured.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ChromaVector(pub [f64; 12]);

impl ChromaVector {
    /// The all-zero vector
    pub fn zero() -> Self {
        ChromaVector([0.0; 12])
    }

    /// Bin values
    pub fn values(&self) -> &[f64; 12] {
        &self.0
    }

    /// True when no pitch-class energy was measured
    pub fn is_zero(&self) -> bool {
        self.0.iter().all(|&v| v == 0.0)
    }
}

impl Default for ChromaVector {
    fn default() -> Self {
        Self::zero()
    }
}
