//! Reference-matching mastering engine
//!
//! Pulls a source recording toward a target loudness, tonal balance and
//! dynamics profile.
//!
//! # Stages
//!
//! 1. **Profile**: measure the reference, or synthesize an intelligent
//!    target from the source when no reference is given
//! 2. **Iterate**: three sequential correction passes per channel
//!    ([`corrector`]), channels in parallel
//! 3. **Finalize**: exact RMS correction, limiting, peak normalization and
//!    stereo width ([`finalize`])
//!
//! # Example
//!
//! ```
//! use stratum_master::{master, ProcessingSettings, SampleBuffer};
//!
//! let tone: Vec<f64> = (0..44100)
//!     .map(|i| 0.05 * (2.0 * std::f64::consts::PI * 440.0 * i as f64 / 44100.0).sin())
//!     .collect();
//! let source = SampleBuffer::mono(tone, 44100)?;
//! let mastered = master(&source, None, &ProcessingSettings::default())?;
//! assert_eq!(mastered.len(), source.len());
//! # Ok::<(), stratum_master::AnalysisError>(())
//! ```

pub mod corrector;
pub mod dynamics;
pub mod eq;
pub mod finalize;
pub mod profile;
pub mod psychoacoustic;

pub use profile::ReferenceProfile;

use crate::config::ProcessingSettings;
use crate::error::AnalysisError;
use crate::io::SampleBuffer;
use crate::preprocessing::normalization::{integrated_lufs, peak_multi, rms_multi, EPSILON};
use crate::preprocessing::silence::SilenceDetector;
use corrector::Corrector;
use serde::{Deserialize, Serialize};

/// Summary of one mastering run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MasteringReport {
    /// Profile measured from the source
    pub source_profile: ReferenceProfile,

    /// Profile the source was pulled toward
    pub target_profile: ReferenceProfile,

    /// True when no usable reference was given and the target was synthesized
    pub target_synthesized: bool,

    /// Joint RMS before processing
    pub input_rms: f64,

    /// Joint RMS after processing
    pub output_rms: f64,

    /// Absolute peak before processing
    pub input_peak: f64,

    /// Absolute peak after processing
    pub output_peak: f64,

    /// Gated integrated loudness before processing (LUFS)
    pub input_lufs: f64,

    /// Gated integrated loudness after processing (LUFS)
    pub output_lufs: f64,

    /// Per channel, the RMS at the end of each correction pass
    pub pass_rms: Vec<Vec<f64>>,
}

/// Master `source` toward `reference` (or an intelligent target)
///
/// # Arguments
///
/// * `source` - Buffer to process; never modified
/// * `reference` - Optional target recording; `None` selects the intelligent target
/// * `settings` - Processing settings (out-of-range values are clamped)
///
/// # Returns
///
/// A new buffer with the source's channel count, length and sample rate
///
/// # Errors
///
/// Returns `AnalysisError::InvalidInput` if the source is empty or contains
/// non-finite samples, or if a setting is not finite.
pub fn master(
    source: &SampleBuffer,
    reference: Option<&SampleBuffer>,
    settings: &ProcessingSettings,
) -> Result<SampleBuffer, AnalysisError> {
    master_with_report(source, reference, settings).map(|(buffer, _)| buffer)
}

/// Master `source` and report what was measured and done
///
/// # Errors
///
/// Same as [`master`].
pub fn master_with_report(
    source: &SampleBuffer,
    reference: Option<&SampleBuffer>,
    settings: &ProcessingSettings,
) -> Result<(SampleBuffer, MasteringReport), AnalysisError> {
    if source.is_empty() {
        return Err(AnalysisError::InvalidInput(
            "Source buffer is empty".to_string(),
        ));
    }
    if !source.is_finite() {
        return Err(AnalysisError::InvalidInput(
            "Source buffer contains non-finite samples".to_string(),
        ));
    }
    settings.validate()?;
    let settings = settings.sanitized();

    let sample_rate = source.sample_rate();
    log::debug!(
        "Mastering {} channels x {} samples at {} Hz",
        source.channel_count(),
        source.len(),
        sample_rate
    );

    let source_profile = ReferenceProfile::analyze(source);
    let usable_reference = reference.filter(|r| {
        let usable = !r.is_empty()
            && r.is_finite()
            && !SilenceDetector::default().is_silent(r.channels())
            && rms_multi(r.channels()) > EPSILON;
        if !usable {
            log::warn!("Reference buffer is empty, silent or non-finite, using intelligent target");
        }
        usable
    });
    let (target_profile, target_synthesized) = match usable_reference {
        Some(r) => {
            if r.sample_rate() != sample_rate {
                log::debug!(
                    "Reference at {} Hz profiled at its own rate (source {} Hz)",
                    r.sample_rate(),
                    sample_rate
                );
            }
            (ReferenceProfile::analyze(r), false)
        }
        None => (ReferenceProfile::intelligent_target(&source_profile), true),
    };

    let input_rms = rms_multi(source.channels());
    let input_peak = peak_multi(source.channels());
    let input_lufs = integrated_lufs(source.channels(), sample_rate);

    let corrector = Corrector::new(&source_profile, &target_profile, &settings, sample_rate);
    let corrections = corrector.correct_all(source.channels().to_vec());

    let mut pass_rms = Vec::with_capacity(corrections.len());
    let mut channels = Vec::with_capacity(corrections.len());
    for correction in corrections {
        pass_rms.push(correction.pass_rms);
        channels.push(correction.samples);
    }

    finalize::finalize(&mut channels, target_profile.rms, &settings);

    let output_rms = rms_multi(&channels);
    let output_peak = peak_multi(&channels);
    let output_lufs = integrated_lufs(&channels, sample_rate);

    log::debug!(
        "Mastered: rms {:.4} -> {:.4}, peak {:.4} -> {:.4}",
        input_rms,
        output_rms,
        input_peak,
        output_peak
    );

    let output = SampleBuffer::new(channels, sample_rate)?;
    let report = MasteringReport {
        source_profile,
        target_profile,
        target_synthesized,
        input_rms,
        output_rms,
        input_peak,
        output_peak,
        input_lufs,
        output_lufs,
        pass_rms,
    };
    Ok((output, report))
}
