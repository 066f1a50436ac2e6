//! Valence score
//!
//! Major-versus-minor tonality of the plain chroma:
//! `clamp01((max_major - max_minor + 1) / 2)` where the maxima are the best
//! Pearson correlations against all rotations of the Krumhansl-Schmuckler
//! major and minor profiles.

use crate::error::AnalysisError;
use crate::features::chroma::{extract_chroma, ChromaVariant, ChromaVector};
use crate::features::key::pearson;
use crate::features::key::templates::{rotate, KRUMHANSL_MAJOR, KRUMHANSL_MINOR};

/// Valence from an existing chroma vector
pub fn valence_from_chroma(chroma: &ChromaVector) -> f64 {
    let best = |profile: &[f64; 12]| {
        (0..12)
            .map(|tonic| pearson(chroma.values(), &rotate(profile, tonic)))
            .fold(f64::NEG_INFINITY, f64::max)
    };
    let max_major = best(&KRUMHANSL_MAJOR);
    let max_minor = best(&KRUMHANSL_MINOR);
    ((max_major - max_minor + 1.0) / 2.0).clamp(0.0, 1.0)
}

/// Valence score in [0, 1] from the plain chroma of a signal
///
/// # Errors
///
/// Returns `AnalysisError::InvalidInput` for an empty signal or zero sample rate.
pub fn valence_score(samples: &[f64], sample_rate: u32) -> Result<f64, AnalysisError> {
    let chroma = extract_chroma(samples, sample_rate, ChromaVariant::Plain)?;
    let score = valence_from_chroma(&chroma);
    log::debug!("Valence: {:.3}", score);
    Ok(score)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn normalized(profile: [f64; 12]) -> ChromaVector {
        let sum: f64 = profile.iter().sum();
        ChromaVector(profile.map(|p| p / sum))
    }

    #[test]
    fn test_major_profile_is_bright() {
        let v = valence_from_chroma(&normalized(rotate(&KRUMHANSL_MAJOR, 5)));
        assert!(v > 0.5, "major chroma should score above neutral, got {:.3}", v);
    }

    #[test]
    fn test_minor_profile_is_dark() {
        let v = valence_from_chroma(&normalized(rotate(&KRUMHANSL_MINOR, 2)));
        assert!(v < 0.5, "minor chroma should score below neutral, got {:.3}", v);
    }

    #[test]
    fn test_zero_chroma_is_neutral() {
        assert_eq!(valence_from_chroma(&ChromaVector::zero()), 0.5);
    }
}
