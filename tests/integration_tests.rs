//! Integration tests for the analysis and mastering engine

use std::f64::consts::PI;
use stratum_master::{
    analyze, analyze_cached, analyze_with_config, master, master_with_report, AnalysisConfig,
    AnalysisError, AnalysisFlag, AnalysisResult, InMemoryCache, Key, ProcessingSettings,
    SampleBuffer, TempoMode,
};

const SR: u32 = 44100;

fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// Decaying broadband clicks at a fixed tempo
fn click_track(bpm: f64, seconds: f64) -> Vec<f64> {
    let len = (seconds * SR as f64) as usize;
    let period = 60.0 / bpm * SR as f64;
    let click_len = SR as usize / 100;
    let mut samples = vec![0.0; len];
    let mut beat = 0usize;
    while ((beat as f64 * period).round() as usize) < len {
        let start = (beat as f64 * period).round() as usize;
        for j in 0..click_len.min(len - start) {
            let decay = 1.0 - j as f64 / click_len as f64;
            let phase = (j as f64 * 2.399_963).sin() + (j as f64 * 0.618_034 * PI).cos();
            samples[start + j] = 0.45 * phase * decay;
        }
        beat += 1;
    }
    samples
}

fn sine(freq: f64, amplitude: f64, seconds: f64) -> Vec<f64> {
    (0..(seconds * SR as f64) as usize)
        .map(|i| amplitude * (2.0 * PI * freq * i as f64 / SR as f64).sin())
        .collect()
}

fn chord(midi_notes: &[u8], amplitude: f64, seconds: f64) -> Vec<f64> {
    let mut samples = vec![0.0; (seconds * SR as f64) as usize];
    for &note in midi_notes {
        let tone = sine(440.0 * 2f64.powf((note as f64 - 69.0) / 12.0), amplitude, seconds);
        for (s, t) in samples.iter_mut().zip(tone) {
            *s += t;
        }
    }
    samples
}

fn rms(channels: &[Vec<f64>]) -> f64 {
    let n: usize = channels.iter().map(Vec::len).sum();
    (channels.iter().flatten().map(|x| x * x).sum::<f64>() / n as f64).sqrt()
}

fn db(x: f64) -> f64 {
    20.0 * x.log10()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_silent_buffer_reports_defaults() {
        let silence = vec![0.0; SR as usize * 2];
        let buffer =
            SampleBuffer::stereo(silence.clone(), silence, SR).expect("valid buffer");
        let result = analyze(&buffer).expect("silence is not an error");

        assert_eq!(result.bpm, 120.0);
        assert_eq!(result.key, Key::Major(0));
        assert_eq!(result.key.name(), "C Major");
        assert!(result.chroma.is_zero());
        assert_eq!(result.mood.energy, 0.5);
        assert_eq!(result.mood.danceability, 0.5);
        assert_eq!(result.mood.valence, 0.5);
        assert!(result.metadata.has_flag(AnalysisFlag::Silent));
        assert!((result.duration_seconds - 2.0).abs() < 1e-9);
    }

    #[test]
    fn test_analyze_120bpm_click_track() {
        init_logging();
        let buffer = SampleBuffer::mono(click_track(120.0, 10.0), SR).unwrap();
        let result = analyze(&buffer).expect("Analysis should succeed");

        assert!(
            (result.bpm - 120.0).abs() < 3.0,
            "BPM should be close to 120, got {:.2}",
            result.bpm
        );
        assert!(result.bpm_confidence > 0.0 && result.bpm_confidence <= 1.0);
        assert!(result.bpm_candidates.len() <= 5);
        assert!(!result.metadata.methods_used.is_empty());
        assert_eq!(result.sample_rate, SR);
    }

    #[test]
    fn test_novelty_mode_120bpm() {
        let buffer = SampleBuffer::mono(click_track(120.0, 10.0), SR).unwrap();
        let config = AnalysisConfig {
            tempo_mode: TempoMode::Novelty,
            ..Default::default()
        };
        let result = analyze_with_config(&buffer, &config).unwrap();
        assert!((result.bpm - 120.0).abs() < 3.0, "got {:.2}", result.bpm);
        assert_eq!(result.metadata.tempo_mode, TempoMode::Novelty);
    }

    #[test]
    fn test_c_major_chord_key() {
        init_logging();
        let samples = chord(&[48, 60, 64, 67], 0.15, 3.0);
        let buffer = SampleBuffer::stereo(samples.clone(), samples, SR).unwrap();
        let result = analyze(&buffer).unwrap();

        assert_eq!(result.key, Key::Major(0), "got {}", result.key.name());
        assert!(result.key_confidence > 0.0 && result.key_confidence <= 1.0);
        assert!(result.key_candidates.len() <= 5);
        let sum: f64 = result.chroma.values().iter().sum();
        assert!((sum - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_mood_scores_in_range() {
        let clicks = click_track(124.0, 8.0);
        let tones = chord(&[57, 60, 64], 0.05, 8.0);
        let mix: Vec<f64> = clicks.iter().zip(&tones).map(|(a, b)| a + b).collect();
        let result = analyze(&SampleBuffer::mono(mix, SR).unwrap()).unwrap();

        for score in [result.mood.energy, result.mood.danceability, result.mood.valence] {
            assert!((0.0..=1.0).contains(&score), "score {} out of range", score);
        }
    }

    #[test]
    fn test_non_finite_samples_rejected() {
        let mut samples = sine(440.0, 0.5, 1.0);
        samples[100] = f64::INFINITY;
        let result = analyze(&SampleBuffer::mono(samples, SR).unwrap());
        assert!(matches!(result, Err(AnalysisError::InvalidInput(_))));
    }

    #[test]
    fn test_result_json_roundtrip() {
        let buffer = SampleBuffer::mono(click_track(128.0, 6.0), SR).unwrap();
        let result = analyze(&buffer).unwrap();

        let json = serde_json::to_string(&result).expect("serialize");
        let restored: AnalysisResult = serde_json::from_str(&json).expect("deserialize");
        assert_eq!(restored.key, result.key);
        assert_eq!(restored.bpm_candidates.len(), result.bpm_candidates.len());
        assert!((restored.bpm - result.bpm).abs() < 1e-9);
        assert_eq!(restored.metadata.methods_used, result.metadata.methods_used);
    }

    #[test]
    fn test_cache_hit_returns_stored_result() {
        let buffer = SampleBuffer::mono(click_track(120.0, 4.0), SR).unwrap();
        let config = AnalysisConfig::default();
        let cache = InMemoryCache::new();

        let first = analyze_cached(&buffer, &config, &cache).unwrap();
        assert_eq!(cache.len(), 1);
        let second = analyze_cached(&buffer, &config, &cache).unwrap();
        assert_eq!(cache.len(), 1);
        // a hit returns the stored record, processing time included
        assert_eq!(first, second);

        let other = AnalysisConfig {
            tempo_mode: TempoMode::Novelty,
            ..Default::default()
        };
        analyze_cached(&buffer, &other, &cache).unwrap();
        assert_eq!(cache.len(), 2);
    }

    #[test]
    fn test_master_hits_target_rms() {
        init_logging();
        let tones = chord(&[55, 59, 62], 0.04, 3.0);
        let source = SampleBuffer::stereo(tones.clone(), tones, SR).unwrap();
        let output = master(&source, None, &ProcessingSettings::default()).unwrap();

        let error_db = (db(rms(output.channels())) - db(0.3)).abs();
        assert!(error_db < 1.0, "output is {:.2} dB from the target", error_db);
        assert!(output.channels().iter().flatten().all(|s| s.abs() <= 0.95 + 1e-12));
    }

    #[test]
    fn test_master_preserves_shape() {
        let source = SampleBuffer::new(
            vec![sine(220.0, 0.2, 1.5), sine(330.0, 0.2, 1.5), sine(440.0, 0.2, 1.5)],
            48000,
        )
        .unwrap();
        let output = master(&source, None, &ProcessingSettings::default()).unwrap();

        assert_eq!(output.channel_count(), source.channel_count());
        assert_eq!(output.len(), source.len());
        assert_eq!(output.sample_rate(), source.sample_rate());
    }

    #[test]
    fn test_master_twice_with_same_reference_does_not_diverge() {
        init_logging();
        let source = SampleBuffer::mono(chord(&[60, 64, 67], 0.03, 2.0), SR).unwrap();
        let reference = SampleBuffer::mono(chord(&[57, 60, 64], 0.1, 2.0), SR).unwrap();
        let settings = ProcessingSettings::default();

        let (once, first) = master_with_report(&source, Some(&reference), &settings).unwrap();
        let (_, second) = master_with_report(&once, Some(&reference), &settings).unwrap();

        assert!(!first.target_synthesized);
        assert!((first.target_profile.rms - second.target_profile.rms).abs() < 1e-12);

        let target = first.target_profile.rms;
        let first_error = (first.pass_rms[0][0] - target).abs();
        let second_error = (second.pass_rms[0][0] - target).abs();
        assert!(
            second_error <= first_error + 1e-6,
            "second run first pass {:.4} vs first run {:.4}",
            second_error,
            first_error
        );
    }

    #[test]
    fn test_master_twice_without_reference_does_not_diverge() {
        let tones = chord(&[60, 64, 67], 0.03, 2.0);
        let source = SampleBuffer::mono(tones, SR).unwrap();
        let settings = ProcessingSettings::default();

        let (once, first) = master_with_report(&source, None, &settings).unwrap();
        let (_, second) = master_with_report(&once, None, &settings).unwrap();

        let target = first.target_profile.rms;
        let first_error = (first.pass_rms[0][0] - target).abs();
        let second_error = (second.pass_rms[0][0] - second.target_profile.rms).abs();
        assert!(
            second_error <= first_error + 1e-9,
            "second run first pass {:.4} vs first run {:.4}",
            second_error,
            first_error
        );
    }

    #[test]
    fn test_stereo_width_settings() {
        let left = sine(220.0, 0.2, 1.0);
        let right = sine(330.0, 0.2, 1.0);
        let source = SampleBuffer::stereo(left, right, SR).unwrap();

        let mono_settings = ProcessingSettings {
            stereo_width: 0.0,
            ..Default::default()
        };
        let collapsed = master(&source, None, &mono_settings).unwrap();
        assert_eq!(collapsed.channels()[0], collapsed.channels()[1]);

        let unity = master(&source, None, &ProcessingSettings::default()).unwrap();
        assert_ne!(unity.channels()[0], unity.channels()[1]);
    }

    #[test]
    fn test_master_with_reference() {
        init_logging();
        let source = SampleBuffer::mono(sine(440.0, 0.4, 1.0), SR).unwrap();
        let reference = SampleBuffer::mono(chord(&[57, 64], 0.05, 1.0), 48000).unwrap();
        let (output, report) =
            master_with_report(&source, Some(&reference), &ProcessingSettings::default()).unwrap();

        assert!(!report.target_synthesized);
        assert_eq!(output.sample_rate(), SR);
        assert!((report.output_rms - report.target_profile.rms).abs() < 0.01);
    }

    #[test]
    fn test_master_empty_source_is_error() {
        let source = SampleBuffer::stereo(Vec::new(), Vec::new(), SR).unwrap();
        let result = master(&source, None, &ProcessingSettings::default());
        assert!(matches!(result, Err(AnalysisError::InvalidInput(_))));
    }

    #[test]
    fn test_ragged_buffer_rejected() {
        let result = SampleBuffer::stereo(vec![0.0; 10], vec![0.0; 11], SR);
        assert!(matches!(result, Err(AnalysisError::InvalidInput(_))));
    }
}
