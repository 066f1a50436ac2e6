//! Synthetic signals for unit tests

use std::f64::consts::PI;

/// Decaying noise-like clicks at a fixed tempo
pub fn click_track(bpm: f64, seconds: f64, sample_rate: u32) -> Vec<f64> {
    let len = (seconds * sample_rate as f64) as usize;
    let mut samples = vec![0.0; len];
    let period = 60.0 / bpm * sample_rate as f64;
    let click_len = (sample_rate as f64 * 0.01) as usize;
    let mut beat = 0usize;
    loop {
        let start = (beat as f64 * period).round() as usize;
        if start >= len {
            break;
        }
        for j in 0..click_len.min(len - start) {
            let decay = 1.0 - j as f64 / click_len as f64;
            // deterministic broadband burst
            let phase = (j as f64 * 2.399_963).sin() + (j as f64 * 0.618_034 * PI).cos();
            samples[start + j] = 0.45 * phase * decay;
        }
        beat += 1;
    }
    samples
}

/// Pure sine tone
pub fn sine(freq: f64, amplitude: f64, seconds: f64, sample_rate: u32) -> Vec<f64> {
    (0..(seconds * sample_rate as f64) as usize)
        .map(|i| amplitude * (2.0 * PI * freq * i as f64 / sample_rate as f64).sin())
        .collect()
}

/// Sum of sines at the given MIDI notes, each with the given amplitude
pub fn chord(midi_notes: &[u8], amplitude: f64, seconds: f64, sample_rate: u32) -> Vec<f64> {
    let len = (seconds * sample_rate as f64) as usize;
    let mut samples = vec![0.0; len];
    for &note in midi_notes {
        let freq = 440.0 * 2f64.powf((note as f64 - 69.0) / 12.0);
        for (i, s) in samples.iter_mut().enumerate() {
            *s += amplitude * (2.0 * PI * freq * i as f64 / sample_rate as f64).sin();
        }
    }
    samples
}
