//! Configuration parameters for analysis and mastering
//!
//! The tempo ensemble weights, the tempo-preference Gaussian and the chroma
//! variant weights are empirical calibration points. They are exposed here
//! so callers can tune them without touching the estimators.

use serde::{Deserialize, Serialize};

/// How tempo is estimated
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TempoMode {
    /// Four independent estimators with weighted voting
    Ensemble,
    /// Single novelty-curve autocorrelation pass (basic BPM only)
    Novelty,
}

/// Per-estimator voting weights for the tempo ensemble
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EnsembleWeights {
    /// Onset-interval histogram (default: 0.30)
    pub onset: f64,
    /// Envelope autocorrelation (default: 0.35)
    pub autocorrelation: f64,
    /// Comb filter (default: 0.20)
    pub comb_filter: f64,
    /// Envelope spectral peaks (default: 0.15)
    pub spectral_peak: f64,
}

impl Default for EnsembleWeights {
    fn default() -> Self {
        Self {
            onset: 0.30,
            autocorrelation: 0.35,
            comb_filter: 0.20,
            spectral_peak: 0.15,
        }
    }
}

/// Mixing weights for the three chroma variants
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChromaWeights {
    /// Constant-Q-like variant (default: 0.40)
    pub constant_q: f64,
    /// Median-smoothed (CENS-like) variant (default: 0.35)
    pub smoothed: f64,
    /// Plain STFT variant (default: 0.25)
    pub plain: f64,
}

impl Default for ChromaWeights {
    fn default() -> Self {
        Self {
            constant_q: 0.40,
            smoothed: 0.35,
            plain: 0.25,
        }
    }
}

/// Analysis configuration parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisConfig {
    // Tempo
    /// Tempo estimation path (default: Ensemble)
    pub tempo_mode: TempoMode,

    /// Minimum BPM to consider (default: 60.0)
    pub min_bpm: f64,

    /// Maximum BPM to consider (default: 200.0)
    pub max_bpm: f64,

    /// Ensemble voting weights
    pub ensemble_weights: EnsembleWeights,

    /// Candidates closer than this are merged into one group (default: 3.0 BPM)
    pub group_tolerance_bpm: f64,

    /// Bonus for groups in the common dance range (default: 0.10)
    pub genre_bonus: f64,

    /// Range receiving `genre_bonus` (default: 120-140 BPM)
    pub genre_bonus_range: (f64, f64),

    /// Extra bonus for the house/techno core (default: 0.05)
    pub core_bonus: f64,

    /// Range receiving `core_bonus` (default: 128-132 BPM)
    pub core_bonus_range: (f64, f64),

    /// Centre of the tempo preference Gaussian for the novelty path (default: 120.0)
    pub tempo_preference_bpm: f64,

    /// Width of the tempo preference Gaussian in BPM (default: 50.0)
    pub tempo_preference_sigma: f64,

    // Key
    /// Chroma variant mixing weights
    pub chroma_weights: ChromaWeights,

    // General
    /// Buffers whose peak stays below this level are treated as silent (default: -90 dBFS)
    pub silence_threshold_db: f64,

    /// Number of ranked candidates exposed in the result (default: 5)
    pub max_candidates: usize,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            tempo_mode: TempoMode::Ensemble,
            min_bpm: 60.0,
            max_bpm: 200.0,
            ensemble_weights: EnsembleWeights::default(),
            group_tolerance_bpm: 3.0,
            genre_bonus: 0.10,
            genre_bonus_range: (120.0, 140.0),
            core_bonus: 0.05,
            core_bonus_range: (128.0, 132.0),
            tempo_preference_bpm: 120.0,
            tempo_preference_sigma: 50.0,
            chroma_weights: ChromaWeights::default(),
            silence_threshold_db: -90.0,
            max_candidates: 5,
        }
    }
}

/// Mastering settings, supplied per invocation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProcessingSettings {
    /// Offset applied to the final RMS target in dB (default: 0.0)
    pub output_level_db: f64,

    /// Compressor ratio reached on the first pass (default: 2.0)
    pub compression_ratio: f64,

    /// How strongly band EQ follows the target, 0.0-1.0 (default: 0.5)
    pub eq_intensity: f64,

    /// Mid/side width, 0.0 (mono) to 2.0 (default: 1.0 = unchanged)
    pub stereo_width: f64,

    /// Pull peaks above 0.95 back down after limiting (default: true)
    pub auto_normalize: bool,

    /// Brickwall limit at +/-0.95 (default: true)
    pub enable_limiting: bool,

    /// Apply the perceptual spectral weighting pass (default: true)
    pub psychoacoustic_processing: bool,
}

impl Default for ProcessingSettings {
    fn default() -> Self {
        Self {
            output_level_db: 0.0,
            compression_ratio: 2.0,
            eq_intensity: 0.5,
            stereo_width: 1.0,
            auto_normalize: true,
            enable_limiting: true,
            psychoacoustic_processing: true,
        }
    }
}

impl ProcessingSettings {
    /// Check that every numeric setting is finite
    pub fn validate(&self) -> Result<(), crate::error::AnalysisError> {
        let fields = [
            ("output_level_db", self.output_level_db),
            ("compression_ratio", self.compression_ratio),
            ("eq_intensity", self.eq_intensity),
            ("stereo_width", self.stereo_width),
        ];
        for (name, value) in fields {
            if !value.is_finite() {
                return Err(crate::error::AnalysisError::InvalidInput(format!(
                    "Setting {} is not finite: {}",
                    name, value
                )));
            }
        }
        Ok(())
    }

    /// Return a copy with every setting clamped into its supported range
    pub fn sanitized(&self) -> Self {
        let mut s = self.clone();
        if !(0.0..=1.0).contains(&s.eq_intensity) {
            log::warn!("eq_intensity {:.3} out of range, clamping to [0, 1]", s.eq_intensity);
            s.eq_intensity = s.eq_intensity.clamp(0.0, 1.0);
        }
        if !(0.0..=2.0).contains(&s.stereo_width) {
            log::warn!("stereo_width {:.3} out of range, clamping to [0, 2]", s.stereo_width);
            s.stereo_width = s.stereo_width.clamp(0.0, 2.0);
        }
        if s.compression_ratio < 1.0 {
            log::warn!("compression_ratio {:.3} below 1, using 1.0", s.compression_ratio);
            s.compression_ratio = 1.0;
        }
        s
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ensemble_weights_sum_to_one() {
        let w = EnsembleWeights::default();
        let sum = w.onset + w.autocorrelation + w.comb_filter + w.spectral_peak;
        assert!((sum - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_sanitized_clamps_ranges() {
        let settings = ProcessingSettings {
            eq_intensity: 1.7,
            stereo_width: -0.5,
            compression_ratio: 0.2,
            ..Default::default()
        };
        let s = settings.sanitized();
        assert_eq!(s.eq_intensity, 1.0);
        assert_eq!(s.stereo_width, 0.0);
        assert_eq!(s.compression_ratio, 1.0);
    }

    #[test]
    fn test_validate_rejects_nan() {
        let settings = ProcessingSettings {
            output_level_db: f64::NAN,
            ..Default::default()
        };
        assert!(settings.validate().is_err());
        assert!(ProcessingSettings::default().validate().is_ok());
    }

    #[test]
    fn test_config_partial_deserialize() {
        let json = r#"{ "tempo_mode": "Novelty", "max_candidates": 3 }"#;
        let config: AnalysisConfig = serde_json::from_str(json).unwrap();
        assert_eq!(config.tempo_mode, TempoMode::Novelty);
        assert_eq!(config.max_candidates, 3);
        assert_eq!(config.min_bpm, 60.0);
    }
}
