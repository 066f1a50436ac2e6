//! Key detection
//!
//! Matches the blended chroma vector against Krumhansl-Schmuckler and
//! Temperley profiles in all 24 keys.

pub mod detector;
pub mod templates;

pub use detector::{estimate_key, match_to_key, pearson, KeyEstimate};
