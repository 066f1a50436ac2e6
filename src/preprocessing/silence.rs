//! Silence detection

use super::normalization::{linear_to_db, peak_multi};

/// Silence detection configuration
#[derive(Debug, Clone)]
pub struct SilenceDetector {
    /// Peak threshold in dBFS (default: -90.0)
    pub threshold_db: f64,
}

impl Default for SilenceDetector {
    fn default() -> Self {
        Self { threshold_db: -90.0 }
    }
}

impl SilenceDetector {
    /// True if no sample of any channel rises above the threshold
    ///
    /// Empty input counts as silent.
    pub fn is_silent(&self, channels: &[Vec<f64>]) -> bool {
        let peak = peak_multi(channels);
        let silent = peak == 0.0 || linear_to_db(peak) < self.threshold_db;
        log::debug!(
            "Silence check: peak={:.3e}, threshold={:.1} dB, silent={}",
            peak,
            self.threshold_db,
            silent
        );
        silent
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zeros_are_silent() {
        assert!(SilenceDetector::default().is_silent(&[vec![0.0; 1000]]));
    }

    #[test]
    fn test_empty_is_silent() {
        assert!(SilenceDetector::default().is_silent(&[]));
    }

    #[test]
    fn test_quiet_noise_floor() {
        let detector = SilenceDetector { threshold_db: -60.0 };
        assert!(detector.is_silent(&[vec![1e-4; 100]]));
        assert!(!detector.is_silent(&[vec![1e-2; 100]]));
    }
}
