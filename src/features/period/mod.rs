//! Tempo (period) estimation
//!
//! Two paths produce a BPM from mono samples:
//! - Ensemble: four independent estimators (onset-interval histogram,
//!   envelope autocorrelation, comb filter, envelope spectral peaks) pooled
//!   by weighted voting
//! - Novelty: one novelty-curve autocorrelation with an octave check
//!
//! Neither path fails. A voice that cannot produce candidates is logged and
//! skipped, and a path with nothing to report yields [`DEFAULT_BPM`].

pub mod autocorrelation;
pub mod candidate_filter;
pub mod comb_filter;
pub mod novelty;
pub mod onset_histogram;
pub mod peak_picking;
pub mod spectral_peak;

use crate::config::{AnalysisConfig, EnsembleWeights, TempoMode};
use crate::error::AnalysisError;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

/// Tempo reported when no estimate can be made
pub const DEFAULT_BPM: f64 = 120.0;

/// Hop used by the envelope-based voices
const ENVELOPE_HOP: usize = 512;

/// Second group at least this fraction of the first marks an ambiguous tempo
const MULTIMODAL_RATIO: f64 = 0.9;

/// BPM candidate with confidence
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TempoCandidate {
    /// BPM estimate
    pub bpm: f64,

    /// Confidence score (0.0-1.0)
    pub confidence: f64,
}

/// The closed set of ensemble voices
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TempoEstimator {
    /// Spectral-flux onset intervals
    OnsetInterval,
    /// Envelope autocorrelation
    Autocorrelation,
    /// Lag-product comb filter
    CombFilter,
    /// Envelope power-spectrum peaks
    SpectralPeak,
}

impl TempoEstimator {
    /// Every voice, in voting order
    pub const ALL: [TempoEstimator; 4] = [
        TempoEstimator::OnsetInterval,
        TempoEstimator::Autocorrelation,
        TempoEstimator::CombFilter,
        TempoEstimator::SpectralPeak,
    ];

    /// Stable identifier used in metadata
    pub fn name(self) -> &'static str {
        match self {
            TempoEstimator::OnsetInterval => "onset_interval",
            TempoEstimator::Autocorrelation => "autocorrelation",
            TempoEstimator::CombFilter => "comb_filter",
            TempoEstimator::SpectralPeak => "spectral_peak",
        }
    }

    /// Voting weight for this voice
    pub fn weight(self, weights: &EnsembleWeights) -> f64 {
        match self {
            TempoEstimator::OnsetInterval => weights.onset,
            TempoEstimator::Autocorrelation => weights.autocorrelation,
            TempoEstimator::CombFilter => weights.comb_filter,
            TempoEstimator::SpectralPeak => weights.spectral_peak,
        }
    }

    /// Run this voice
    pub fn estimate(
        self,
        samples: &[f64],
        sample_rate: u32,
        config: &AnalysisConfig,
    ) -> Result<Vec<TempoCandidate>, AnalysisError> {
        match self {
            TempoEstimator::OnsetInterval => onset_histogram::estimate_bpm_from_onset_intervals(
                samples,
                sample_rate,
                config.min_bpm,
                config.max_bpm,
            ),
            TempoEstimator::Autocorrelation => autocorrelation::estimate_bpm_from_autocorrelation(
                samples,
                sample_rate,
                ENVELOPE_HOP,
                config.min_bpm,
                config.max_bpm,
            ),
            TempoEstimator::CombFilter => {
                comb_filter::estimate_bpm_from_comb_filter(samples, sample_rate, ENVELOPE_HOP)
            }
            TempoEstimator::SpectralPeak => spectral_peak::estimate_bpm_from_spectral_peaks(
                samples,
                sample_rate,
                ENVELOPE_HOP,
                config.min_bpm,
                config.max_bpm,
            ),
        }
    }
}

/// Final tempo estimate
#[derive(Debug, Clone, PartialEq)]
pub struct TempoEstimate {
    /// Primary BPM
    pub bpm: f64,

    /// Confidence of the primary BPM (0.0-1.0)
    pub confidence: f64,

    /// Ranked alternatives, primary group included
    pub candidates: Vec<TempoCandidate>,

    /// Voices that contributed candidates
    pub methods_used: Vec<String>,

    /// Voices that failed, with reasons
    pub warnings: Vec<String>,

    /// Two tempo groups of near-equal strength
    pub multimodal: bool,
}

impl TempoEstimate {
    /// The documented default when nothing can be measured
    pub fn fallback() -> Self {
        Self {
            bpm: DEFAULT_BPM,
            confidence: 0.0,
            candidates: Vec::new(),
            methods_used: Vec::new(),
            warnings: Vec::new(),
            multimodal: false,
        }
    }
}

/// Estimate tempo using the configured path
///
/// # Arguments
///
/// * `samples` - Mono samples
/// * `sample_rate` - Sample rate in Hz
/// * `config` - Analysis configuration
///
/// # Returns
///
/// A tempo estimate; never fails
pub fn estimate_tempo(samples: &[f64], sample_rate: u32, config: &AnalysisConfig) -> TempoEstimate {
    match config.tempo_mode {
        TempoMode::Ensemble => estimate_tempo_ensemble(samples, sample_rate, config),
        TempoMode::Novelty => estimate_tempo_novelty(samples, sample_rate, config),
    }
}

fn estimate_tempo_ensemble(
    samples: &[f64],
    sample_rate: u32,
    config: &AnalysisConfig,
) -> TempoEstimate {
    log::debug!("Tempo ensemble over {} samples", samples.len());

    // collect keeps declaration order, so the pool is scheduling independent
    let results: Vec<(TempoEstimator, Result<Vec<TempoCandidate>, AnalysisError>)> =
        TempoEstimator::ALL
            .par_iter()
            .map(|&voice| (voice, voice.estimate(samples, sample_rate, config)))
            .collect();

    let mut estimate = TempoEstimate::fallback();
    let mut pool = Vec::new();
    for (voice, result) in results {
        match result {
            Ok(candidates) if !candidates.is_empty() => {
                log::debug!("{}: {} candidates", voice.name(), candidates.len());
                pool.extend(candidate_filter::weight_candidates(
                    &candidates,
                    voice.weight(&config.ensemble_weights),
                ));
                estimate.methods_used.push(voice.name().to_string());
            }
            Ok(_) => {
                log::warn!("{} produced no candidates", voice.name());
                estimate
                    .warnings
                    .push(format!("{}: no candidates", voice.name()));
            }
            Err(e) => {
                log::warn!("{} failed: {}", voice.name(), e);
                estimate.warnings.push(format!("{}: {}", voice.name(), e));
            }
        }
    }

    let groups = candidate_filter::group_candidates(&pool, config.group_tolerance_bpm);
    let Some(primary) = candidate_filter::select_primary(&groups, config) else {
        log::warn!("No tempo candidates, using {} BPM", DEFAULT_BPM);
        return estimate;
    };

    let total: f64 = groups.iter().map(|g| g.confidence).sum();
    estimate.bpm = groups[primary].bpm;
    estimate.confidence = if total > 0.0 {
        (groups[primary].confidence / total).clamp(0.0, 1.0)
    } else {
        0.0
    };
    estimate.candidates = candidate_filter::ranked_candidates(&groups, config.max_candidates);
    estimate.multimodal = groups.len() > 1
        && groups[0].confidence > 0.0
        && groups[1].confidence >= MULTIMODAL_RATIO * groups[0].confidence;

    log::debug!(
        "Tempo ensemble: {:.2} BPM (confidence {:.3}, {} groups)",
        estimate.bpm,
        estimate.confidence,
        groups.len()
    );
    estimate
}

fn estimate_tempo_novelty(
    samples: &[f64],
    sample_rate: u32,
    config: &AnalysisConfig,
) -> TempoEstimate {
    let mut estimate = TempoEstimate::fallback();
    match novelty::estimate_bpm_from_novelty(samples, sample_rate, config) {
        Ok(candidate) => {
            estimate.bpm = candidate.bpm;
            estimate.confidence = candidate.confidence;
            estimate.candidates = vec![candidate];
            estimate.methods_used.push("novelty".to_string());
        }
        Err(e) => {
            log::warn!("Novelty tempo failed ({}), using {} BPM", e, DEFAULT_BPM);
            estimate.warnings.push(format!("novelty: {}", e));
        }
    }
    estimate
}
