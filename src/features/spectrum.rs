//! Windowed magnitude spectrum (spectral transform)
//!
//! Every spectral stage in the crate goes through [`SpectralTransform`]: a
//! Hann window `0.5 - 0.5·cos(2πi/(N-1))` followed by a DFT of the same
//! length. rustfft handles arbitrary lengths exactly, so the result matches
//! the direct summation `|Σ x[n]·e^{-2πi·k·n/N}|` without padding.
//!
//! # Example
//!
//! ```
//! use stratum_master::features::spectrum::SpectralTransform;
//!
//! let sr = 44100.0;
//! let samples: Vec<f64> = (0..4096)
//!     .map(|i| (2.0 * std::f64::consts::PI * 1000.0 * i as f64 / sr).sin())
//!     .collect();
//! let frame = SpectralTransform::new(4096).transform(&samples);
//! assert_eq!(frame.peak_bin(), Some(93));
//! ```

use rustfft::num_complex::Complex;
use rustfft::{Fft, FftPlanner};
use std::sync::Arc;

/// Magnitude spectrum of one analysis window (bins `0..N/2`)
#[derive(Debug, Clone, PartialEq)]
pub struct SpectralFrame {
    /// Bin magnitudes, length `window_size / 2`
    pub magnitudes: Vec<f64>,
}

impl SpectralFrame {
    /// Index of the strongest bin, if any
    pub fn peak_bin(&self) -> Option<usize> {
        self.magnitudes
            .iter()
            .enumerate()
            .max_by(|a, b| a.1.partial_cmp(b.1).unwrap_or(std::cmp::Ordering::Equal))
            .map(|(i, _)| i)
    }
}

/// Symmetric Hann window of `size` points
pub fn hann_window(size: usize) -> Vec<f64> {
    if size <= 1 {
        return vec![1.0; size];
    }
    let denom = (size - 1) as f64;
    (0..size)
        .map(|i| 0.5 - 0.5 * (2.0 * std::f64::consts::PI * i as f64 / denom).cos())
        .collect()
}

/// Planned forward/inverse transform for a fixed window size
#[derive(Clone)]
pub struct SpectralTransform {
    size: usize,
    window: Vec<f64>,
    forward: Arc<dyn Fft<f64>>,
    inverse: Arc<dyn Fft<f64>>,
}

impl std::fmt::Debug for SpectralTransform {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SpectralTransform")
            .field("size", &self.size)
            .finish()
    }
}

impl SpectralTransform {
    /// Plan a transform for windows of `size` samples
    pub fn new(size: usize) -> Self {
        let size = size.max(1);
        let mut planner = FftPlanner::new();
        Self {
            size,
            window: hann_window(size),
            forward: planner.plan_fft_forward(size),
            inverse: planner.plan_fft_inverse(size),
        }
    }

    /// Window size in samples
    pub fn size(&self) -> usize {
        self.size
    }

    /// Analysis window
    pub fn window(&self) -> &[f64] {
        &self.window
    }

    /// Centre frequency of `bin` in Hz
    pub fn bin_frequency(&self, bin: usize, sample_rate: u32) -> f64 {
        bin as f64 * sample_rate as f64 / self.size as f64
    }

    /// Full complex spectrum of the Hann-windowed frame
    ///
    /// Frames shorter than the window are zero-padded, longer ones truncated.
    pub fn spectrum(&self, frame: &[f64]) -> Vec<Complex<f64>> {
        let mut buffer: Vec<Complex<f64>> = self
            .window
            .iter()
            .enumerate()
            .map(|(i, &w)| Complex::new(frame.get(i).copied().unwrap_or(0.0) * w, 0.0))
            .collect();
        self.forward.process(&mut buffer);
        buffer
    }

    /// Magnitude spectrum of the Hann-windowed frame
    pub fn transform(&self, frame: &[f64]) -> SpectralFrame {
        let spectrum = self.spectrum(frame);
        SpectralFrame {
            magnitudes: spectrum[..self.size / 2].iter().map(|c| c.norm()).collect(),
        }
    }

    /// Inverse transform back to real samples (scaled by `1/N`)
    ///
    /// The window applied by [`SpectralTransform::spectrum`] is not undone.
    pub fn inverse(&self, mut spectrum: Vec<Complex<f64>>) -> Vec<f64> {
        spectrum.resize(self.size, Complex::new(0.0, 0.0));
        self.inverse.process(&mut spectrum);
        let scale = 1.0 / self.size as f64;
        spectrum.iter().map(|c| c.re * scale).collect()
    }
}

/// Magnitude spectrum of a single window, planning a transform of its length
pub fn transform(window: &[f64]) -> SpectralFrame {
    SpectralTransform::new(window.len()).transform(window)
}

/// Unwindowed power spectrum `|X[k]|²` for bins `0..N/2`
pub fn power_spectrum(signal: &[f64]) -> Vec<f64> {
    if signal.is_empty() {
        return Vec::new();
    }
    let n = signal.len();
    let mut buffer: Vec<Complex<f64>> = signal.iter().map(|&x| Complex::new(x, 0.0)).collect();
    let mut planner = FftPlanner::new();
    planner.plan_fft_forward(n).process(&mut buffer);
    buffer[..n / 2].iter().map(|c| c.norm_sqr()).collect()
}
