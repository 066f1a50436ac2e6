//! Error types for the analysis and mastering engine

use thiserror::Error;

/// Errors that can occur during analysis or mastering
///
/// Numeric edge cases (zero RMS, empty spectra, flat novelty curves) are
/// guarded inside the algorithms and never reach the caller. Estimators use
/// [`AnalysisError::DegenerateSignal`] internally to signal that their voice
/// has nothing to contribute; the ensemble boundary turns it into a fallback.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum AnalysisError {
    /// Invalid input parameters (missing/empty source buffer, ragged channels, ...)
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Signal carries no usable information for an estimator
    #[error("Degenerate signal: {0}")]
    DegenerateSignal(String),

    /// Processing error during analysis
    #[error("Processing error: {0}")]
    ProcessingError(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = AnalysisError::InvalidInput("empty source buffer".to_string());
        assert_eq!(err.to_string(), "Invalid input: empty source buffer");

        let err = AnalysisError::DegenerateSignal("flat novelty".to_string());
        assert_eq!(err.to_string(), "Degenerate signal: flat novelty");
    }
}
