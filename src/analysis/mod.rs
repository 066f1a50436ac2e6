//! Analysis pipeline and result aggregation
//!
//! Fans out tempo, key and mood estimation over the mono mix and merges
//! them into one [`AnalysisResult`]:
//! - Result types
//! - Metadata and flags
//! - Optional result caching

pub mod cache;
pub mod metadata;
pub mod result;

use crate::config::AnalysisConfig;
use crate::error::AnalysisError;
use crate::features::key::{estimate_key, KeyEstimate};
use crate::features::mood::estimate_mood;
use crate::features::period::estimate_tempo;
use crate::io::SampleBuffer;
use crate::preprocessing::silence::SilenceDetector;
use metadata::{AnalysisFlag, AnalysisMetadata};
use result::{AnalysisResult, Key};
use std::time::Instant;

/// Key confidence below which a track is flagged as weakly tonal
const WEAK_TONALITY_THRESHOLD: f64 = 0.2;

/// Analyze a buffer with the given configuration
///
/// # Errors
///
/// Returns `AnalysisError::InvalidInput` only when the buffer holds
/// non-finite samples. Empty and silent buffers return
/// [`AnalysisResult::fallback`] flagged [`AnalysisFlag::Silent`].
pub fn run_analysis(
    buffer: &SampleBuffer,
    config: &AnalysisConfig,
) -> Result<AnalysisResult, AnalysisError> {
    let start_time = Instant::now();
    log::debug!(
        "Starting analysis: {} channels x {} samples at {} Hz",
        buffer.channel_count(),
        buffer.len(),
        buffer.sample_rate()
    );

    if !buffer.is_finite() {
        return Err(AnalysisError::InvalidInput(
            "Buffer contains non-finite samples".to_string(),
        ));
    }

    let mut metadata = AnalysisMetadata::new(config.tempo_mode);
    let detector = SilenceDetector {
        threshold_db: config.silence_threshold_db,
    };
    if buffer.is_empty() || detector.is_silent(buffer.channels()) {
        log::warn!("Buffer is empty or silent, reporting defaults");
        metadata.flags.push(AnalysisFlag::Silent);
        metadata.processing_time_ms = start_time.elapsed().as_secs_f64() * 1000.0;
        return Ok(AnalysisResult::fallback(
            buffer.duration_seconds(),
            buffer.sample_rate(),
            metadata,
        ));
    }

    let mono = buffer.to_mono();
    let sample_rate = buffer.sample_rate();

    // tempo || (key || mood); each branch only reads `mono`
    let (tempo, (key, mood)) = rayon::join(
        || estimate_tempo(&mono, sample_rate, config),
        || {
            rayon::join(
                || estimate_key(&mono, sample_rate, config),
                || estimate_mood(&mono, sample_rate),
            )
        },
    );

    let key = key.unwrap_or_else(|e| {
        log::warn!("Key detection failed: {}", e);
        metadata.warnings.push(format!("key: {}", e));
        KeyEstimate {
            key: Key::default(),
            confidence: 0.0,
            candidates: Vec::new(),
            chroma: Default::default(),
        }
    });

    metadata.methods_used.extend(tempo.methods_used.iter().cloned());
    metadata.methods_used.push("chroma_template".to_string());
    metadata.methods_used.push("mood".to_string());
    metadata.warnings.extend(tempo.warnings.iter().cloned());
    metadata.warnings.extend(mood.warnings.iter().cloned());

    if tempo.multimodal {
        metadata.flags.push(AnalysisFlag::MultimodalBpm);
    }
    if key.confidence < WEAK_TONALITY_THRESHOLD {
        metadata.flags.push(AnalysisFlag::WeakTonality);
    }

    metadata.processing_time_ms = start_time.elapsed().as_secs_f64() * 1000.0;
    log::debug!(
        "Analysis complete: {:.2} BPM, {} in {:.1} ms",
        tempo.bpm,
        key.key.name(),
        metadata.processing_time_ms
    );

    Ok(AnalysisResult {
        bpm: tempo.bpm,
        bpm_confidence: tempo.confidence,
        bpm_candidates: tempo.candidates,
        key: key.key,
        key_confidence: key.confidence,
        key_candidates: key.candidates,
        chroma: key.chroma,
        mood: mood.scores,
        duration_seconds: buffer.duration_seconds(),
        sample_rate,
        metadata,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_signals::{chord, click_track};

    #[test]
    fn test_silent_buffer_defaults() {
        let buffer = SampleBuffer::stereo(vec![0.0; 44100], vec![0.0; 44100], 44100).unwrap();
        let result = run_analysis(&buffer, &AnalysisConfig::default()).unwrap();
        assert_eq!(result.bpm, 120.0);
        assert_eq!(result.key, Key::Major(0));
        assert!(result.chroma.is_zero());
        assert_eq!(result.mood.energy, 0.5);
        assert_eq!(result.mood.danceability, 0.5);
        assert_eq!(result.mood.valence, 0.5);
        assert!(result.metadata.has_flag(AnalysisFlag::Silent));
        assert!((result.duration_seconds - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_empty_buffer_defaults() {
        let buffer = SampleBuffer::new(Vec::new(), 48000).unwrap();
        let result = run_analysis(&buffer, &AnalysisConfig::default()).unwrap();
        assert_eq!(result.bpm, 120.0);
        assert_eq!(result.sample_rate, 48000);
        assert_eq!(result.duration_seconds, 0.0);
    }

    #[test]
    fn test_non_finite_is_rejected() {
        let buffer = SampleBuffer::mono(vec![0.1, f64::NAN, 0.2], 44100).unwrap();
        assert!(matches!(
            run_analysis(&buffer, &AnalysisConfig::default()),
            Err(AnalysisError::InvalidInput(_))
        ));
    }

    #[test]
    fn test_click_track_over_chord() {
        let sr = 44100;
        let clicks = click_track(120.0, 10.0, sr);
        let tones = chord(&[60, 64, 67], 0.05, 10.0, sr);
        let mix: Vec<f64> = clicks.iter().zip(&tones).map(|(a, b)| a + b).collect();
        let buffer = SampleBuffer::mono(mix, sr).unwrap();

        let result = run_analysis(&buffer, &AnalysisConfig::default()).unwrap();
        assert!((result.bpm - 120.0).abs() < 3.0, "got {:.2} BPM", result.bpm);
        assert!(result.bpm_candidates.len() <= 5);
        assert!(result.key_candidates.len() <= 5);
        assert!((result.chroma.values().iter().sum::<f64>() - 1.0).abs() < 1e-9);
        assert!(!result.metadata.has_flag(AnalysisFlag::Silent));
    }

    #[test]
    fn test_analysis_is_deterministic() {
        let sr = 22050;
        let buffer = SampleBuffer::mono(click_track(110.0, 6.0, sr), sr).unwrap();
        let config = AnalysisConfig::default();
        let a = run_analysis(&buffer, &config).unwrap();
        let b = run_analysis(&buffer, &config).unwrap();
        assert_eq!(a.bpm, b.bpm);
        assert_eq!(a.key, b.key);
        assert_eq!(a.chroma, b.chroma);
        assert_eq!(a.mood, b.mood);
    }
}
