//! Chroma vector extraction
//!
//! Converts framed magnitude spectra to a 12-element pitch-class
//! distribution.
//!
//! # Algorithm
//!
//! 1. Frame the signal with hop = window / 4
//! 2. Hann-windowed magnitude spectrum per frame
//! 3. Variant-specific conditioning of the magnitudes
//! 4. For bins with 80 Hz < f < 4000 Hz, add the magnitude to pitch class
//!    `round(69 + 12·log2(f / 440)) mod 12`
//! 5. L1-normalize the accumulated vector

use super::normalization::{combine_weighted, l1_normalize};
use super::smoothing::median_filter;
use super::ChromaVector;
use crate::config::ChromaWeights;
use crate::error::AnalysisError;
use crate::features::spectrum::SpectralTransform;
use crate::io::Frames;
use rayon::prelude::*;

const EPSILON: f64 = 1e-10;
const MIN_FREQ_HZ: f64 = 80.0;
const MAX_FREQ_HZ: f64 = 4000.0;
const MEDIAN_TAPS: usize = 5;
const CQ_REFERENCE_HZ: f64 = 50.0;

/// The closed set of chroma constructions
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChromaVariant {
    /// Plain STFT magnitudes, window 4096
    Plain,
    /// 5-tap median over the magnitude spectrum, window 4096
    Smoothed,
    /// Magnitudes scaled by `sqrt(f / 50)`, window 8192
    ConstantQ,
}

impl ChromaVariant {
    /// Every variant, in blending order
    pub const ALL: [ChromaVariant; 3] = [
        ChromaVariant::ConstantQ,
        ChromaVariant::Smoothed,
        ChromaVariant::Plain,
    ];

    /// Analysis window in samples
    pub fn window_size(self) -> usize {
        match self {
            ChromaVariant::Plain | ChromaVariant::Smoothed => 4096,
            ChromaVariant::ConstantQ => 8192,
        }
    }

    /// Hop between frames (a quarter window)
    pub fn hop_size(self) -> usize {
        self.window_size() / 4
    }

    /// Blend weight for this variant
    pub fn weight(self, weights: &ChromaWeights) -> f64 {
        match self {
            ChromaVariant::Plain => weights.plain,
            ChromaVariant::Smoothed => weights.smoothed,
            ChromaVariant::ConstantQ => weights.constant_q,
        }
    }

    /// Stable identifier used in logs
    pub fn name(self) -> &'static str {
        match self {
            ChromaVariant::Plain => "plain",
            ChromaVariant::Smoothed => "smoothed",
            ChromaVariant::ConstantQ => "constant_q",
        }
    }

    fn condition(
        self,
        magnitudes: Vec<f64>,
        transform: &SpectralTransform,
        sample_rate: u32,
    ) -> Vec<f64> {
        match self {
            ChromaVariant::Plain => magnitudes,
            ChromaVariant::Smoothed => median_filter(&magnitudes, MEDIAN_TAPS),
            ChromaVariant::ConstantQ => magnitudes
                .into_iter()
                .enumerate()
                .map(|(k, m)| {
                    let freq = transform.bin_frequency(k, sample_rate);
                    m * (freq.max(EPSILON) / CQ_REFERENCE_HZ).sqrt()
                })
                .collect(),
        }
    }
}

/// Pitch class of a frequency, or `None` outside the chroma band
pub fn pitch_class(freq: f64) -> Option<usize> {
    if freq <= MIN_FREQ_HZ || freq >= MAX_FREQ_HZ {
        return None;
    }
    let midi = (69.0 + 12.0 * (freq / 440.0).log2()).round() as i64;
    Some(midi.rem_euclid(12) as usize)
}

/// Extract one chroma variant over the whole signal
///
/// # Arguments
///
/// * `samples` - Mono samples
/// * `sample_rate` - Sample rate in Hz
/// * `variant` - Which chroma construction to use
///
/// # Returns
///
/// L1-normalized chroma vector (all zeros for a silent signal)
///
/// # Errors
///
/// Returns `AnalysisError::InvalidInput` for an empty signal or zero sample rate.
pub fn extract_chroma(
    samples: &[f64],
    sample_rate: u32,
    variant: ChromaVariant,
) -> Result<ChromaVector, AnalysisError> {
    if samples.is_empty() {
        return Err(AnalysisError::InvalidInput("Empty audio samples".to_string()));
    }
    if sample_rate == 0 {
        return Err(AnalysisError::InvalidInput("Sample rate must be > 0".to_string()));
    }

    let window = variant.window_size();
    let transform = SpectralTransform::new(window);

    // bin -> pitch class is fixed for the whole signal
    let classes: Vec<Option<usize>> = (0..window / 2)
        .map(|k| pitch_class(transform.bin_frequency(k, sample_rate)))
        .collect();

    let mut bins = [0.0; 12];
    let mut frames = 0usize;
    for (_, frame) in Frames::new(samples, window, variant.hop_size()) {
        let magnitudes =
            variant.condition(transform.transform(&frame).magnitudes, &transform, sample_rate);
        for (m, class) in magnitudes.iter().zip(&classes) {
            if let Some(pc) = class {
                bins[*pc] += m;
            }
        }
        frames += 1;
    }

    log::debug!(
        "Chroma {}: {} frames of {} samples",
        variant.name(),
        frames,
        window
    );

    Ok(l1_normalize(&bins))
}

/// Extract every chroma variant and blend them by weight
///
/// Variants run concurrently; results are combined in declaration order.
/// A failed variant is dropped and the blend renormalized over the rest.
pub fn extract_combined_chroma(
    samples: &[f64],
    sample_rate: u32,
    weights: &ChromaWeights,
) -> ChromaVector {
    let results: Vec<(ChromaVariant, Result<ChromaVector, AnalysisError>)> = ChromaVariant::ALL
        .par_iter()
        .map(|&variant| (variant, extract_chroma(samples, sample_rate, variant)))
        .collect();

    let parts: Vec<(ChromaVector, f64)> = results
        .into_iter()
        .filter_map(|(variant, result)| match result {
            Ok(chroma) => Some((chroma, variant.weight(weights))),
            Err(e) => {
                log::warn!("Chroma variant {} failed: {}", variant.name(), e);
                None
            }
        })
        .collect();

    combine_weighted(&parts)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_signals::{chord, sine};

    #[test]
    fn test_pitch_class_mapping() {
        assert_eq!(pitch_class(440.0), Some(9)); // A
        assert_eq!(pitch_class(261.63), Some(0)); // C
        assert_eq!(pitch_class(392.0), Some(7)); // G
        assert_eq!(pitch_class(50.0), None);
        assert_eq!(pitch_class(5000.0), None);
    }

    #[test]
    fn test_a440_dominates_every_variant() {
        let sr = 44100;
        let samples = sine(440.0, 0.5, 2.0, sr);
        for variant in ChromaVariant::ALL {
            let chroma = extract_chroma(&samples, sr, variant).unwrap();
            let values = chroma.values();
            let best = (0..12)
                .max_by(|&a, &b| values[a].partial_cmp(&values[b]).unwrap())
                .unwrap();
            assert_eq!(best, 9, "{} variant should peak at A", variant.name());
            assert!((values.iter().sum::<f64>() - 1.0).abs() < 1e-9);
        }
    }

    #[test]
    fn test_silence_is_zero_chroma() {
        let chroma = extract_chroma(&vec![0.0; 8192], 44100, ChromaVariant::Plain).unwrap();
        assert!(chroma.is_zero());
    }

    #[test]
    fn test_empty_is_error() {
        assert!(extract_chroma(&[], 44100, ChromaVariant::Plain).is_err());
    }

    #[test]
    fn test_combined_chord_energy_on_chord_tones() {
        let sr = 44100;
        // C major triad C4 E4 G4
        let samples = chord(&[60, 64, 67], 0.2, 2.0, sr);
        let chroma = extract_combined_chroma(&samples, sr, &ChromaWeights::default());
        let v = chroma.values();
        let chord_energy = v[0] + v[4] + v[7];
        assert!(chord_energy > 0.5, "chord tones hold {:.3} of the energy", chord_energy);
        assert!((v.iter().sum::<f64>() - 1.0).abs() < 1e-9);
    }
}
