//! Feature extraction modules
//!
//! This module contains all feature extraction algorithms:
//! - Spectral transform (Hann window + FFT)
//! - Onset detection (spectral flux, energy ratio)
//! - Period estimation (BPM ensemble and novelty path)
//! - Chroma extraction (three variants)
//! - Key detection
//! - Mood descriptors

pub mod chroma;
pub mod key;
pub mod mood;
pub mod onset;
pub mod period;
pub mod spectrum;
