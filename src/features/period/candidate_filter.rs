//! BPM candidate weighting, grouping and selection
//!
//! Merges the pooled output of every tempo estimator into ranked tempo
//! groups.
//!
//! # Algorithm
//!
//! 1. Multiply each candidate's confidence by its estimator's weight
//! 2. Visit candidates strongest first; join the nearest existing group within
//!    the tolerance (running confidence-weighted mean BPM, summed confidence),
//!    otherwise open a new group
//! 3. Sort groups by summed confidence
//! 4. Select the primary group after adding the dance-range bonus

use super::TempoCandidate;
use crate::config::AnalysisConfig;

const EPSILON: f64 = 1e-10;

/// A cluster of agreeing tempo candidates
#[derive(Debug, Clone, PartialEq)]
pub struct TempoGroup {
    /// Confidence-weighted mean BPM of the members
    pub bpm: f64,

    /// Summed (weighted) confidence of the members
    pub confidence: f64,

    /// Number of raw candidates merged into this group
    pub members: usize,
}

/// Scale every candidate's confidence by `weight`
pub fn weight_candidates(candidates: &[TempoCandidate], weight: f64) -> Vec<TempoCandidate> {
    candidates
        .iter()
        .map(|c| TempoCandidate {
            bpm: c.bpm,
            confidence: c.confidence * weight,
        })
        .collect()
}

/// Group candidates whose BPM values lie within `tolerance_bpm` of a group
///
/// # Arguments
///
/// * `candidates` - Pooled, already weighted candidates
/// * `tolerance_bpm` - Maximum distance from a group's running mean (default: 3.0)
///
/// # Returns
///
/// Groups sorted by summed confidence, strongest first
///
/// # Example
///
/// ```
/// use stratum_master::features::period::TempoCandidate;
/// use stratum_master::features::period::candidate_filter::group_candidates;
///
/// let groups = group_candidates(
///     &[
///         TempoCandidate { bpm: 120.0, confidence: 0.3 },
///         TempoCandidate { bpm: 122.0, confidence: 0.1 },
///     ],
///     3.0,
/// );
/// assert_eq!(groups.len(), 1);
/// assert!((groups[0].bpm - 120.5).abs() < 1e-9);
/// ```
pub fn group_candidates(candidates: &[TempoCandidate], tolerance_bpm: f64) -> Vec<TempoGroup> {
    let mut ordered: Vec<&TempoCandidate> = candidates
        .iter()
        .filter(|c| c.bpm.is_finite() && c.confidence.is_finite())
        .collect();
    ordered.sort_by(|a, b| {
        b.confidence
            .partial_cmp(&a.confidence)
            .unwrap_or(std::cmp::Ordering::Equal)
    });

    let mut groups: Vec<TempoGroup> = Vec::new();
    for candidate in ordered {
        let nearest = groups
            .iter_mut()
            .map(|g| ((g.bpm - candidate.bpm).abs(), g))
            .filter(|(distance, _)| *distance <= tolerance_bpm)
            .min_by(|a, b| a.0.partial_cmp(&b.0).unwrap_or(std::cmp::Ordering::Equal));

        match nearest {
            Some((_, group)) => {
                let total = group.confidence + candidate.confidence;
                if total > EPSILON {
                    let weighted =
                        group.bpm * group.confidence + candidate.bpm * candidate.confidence;
                    group.bpm = weighted / total;
                }
                group.confidence = total;
                group.members += 1;
            }
            None => groups.push(TempoGroup {
                bpm: candidate.bpm,
                confidence: candidate.confidence,
                members: 1,
            }),
        }
    }

    groups.sort_by(|a, b| {
        b.confidence
            .partial_cmp(&a.confidence)
            .unwrap_or(std::cmp::Ordering::Equal)
    });

    log::debug!(
        "Grouped {} candidates into {} tempo groups (tolerance {:.1} BPM)",
        candidates.len(),
        groups.len(),
        tolerance_bpm
    );
    groups
}

/// Tie-breaking bonus for common dance tempos
///
/// `genre_bonus` inside `genre_bonus_range`, plus `core_bonus` inside
/// `core_bonus_range` (both ranges inclusive).
pub fn genre_bonus(bpm: f64, config: &AnalysisConfig) -> f64 {
    let mut bonus = 0.0;
    let (lo, hi) = config.genre_bonus_range;
    if bpm >= lo && bpm <= hi {
        bonus += config.genre_bonus;
    }
    let (lo, hi) = config.core_bonus_range;
    if bpm >= lo && bpm <= hi {
        bonus += config.core_bonus;
    }
    bonus
}

/// Index of the primary group: highest confidence after the genre bonus
///
/// Ties keep the earlier (stronger pre-bonus) group. Returns `None` for no groups.
pub fn select_primary(groups: &[TempoGroup], config: &AnalysisConfig) -> Option<usize> {
    let mut best: Option<(usize, f64)> = None;
    for (i, group) in groups.iter().enumerate() {
        let score = group.confidence + genre_bonus(group.bpm, config);
        match best {
            Some((_, best_score)) if score <= best_score => {}
            _ => best = Some((i, score)),
        }
    }
    best.map(|(i, _)| i)
}

/// Convert the top groups to exposed candidates
///
/// Confidence becomes each group's share of the total grouped confidence, so
/// the exposed values lie in [0, 1].
pub fn ranked_candidates(groups: &[TempoGroup], max_candidates: usize) -> Vec<TempoCandidate> {
    let total: f64 = groups.iter().map(|g| g.confidence).sum();
    groups
        .iter()
        .take(max_candidates)
        .map(|g| TempoCandidate {
            bpm: g.bpm,
            confidence: if total > EPSILON { g.confidence / total } else { 0.0 },
        })
        .collect()
}
