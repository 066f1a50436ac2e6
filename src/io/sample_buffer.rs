//! Multi-channel sample buffers and frame iteration

use crate::error::AnalysisError;
use serde::{Deserialize, Serialize};

/// Decoded multi-channel PCM audio
///
/// Samples are `f64` in [-1.0, 1.0]. All channels have the same length.
/// The engine never mutates a caller's buffer; mastering works on a copy.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SampleBuffer {
    channels: Vec<Vec<f64>>,
    sample_rate: u32,
}

impl SampleBuffer {
    /// Create a buffer from per-channel sample vectors
    ///
    /// # Errors
    ///
    /// Returns `AnalysisError::InvalidInput` if the sample rate is zero or the
    /// channels have different lengths.
    pub fn new(channels: Vec<Vec<f64>>, sample_rate: u32) -> Result<Self, AnalysisError> {
        if sample_rate == 0 {
            return Err(AnalysisError::InvalidInput(
                "Invalid sample rate: 0".to_string(),
            ));
        }

        if let Some(first) = channels.first() {
            let len = first.len();
            if let Some((i, ch)) = channels.iter().enumerate().find(|(_, ch)| ch.len() != len) {
                return Err(AnalysisError::InvalidInput(format!(
                    "Channel {} has {} samples, channel 0 has {}",
                    i,
                    ch.len(),
                    len
                )));
            }
        }

        Ok(Self {
            channels,
            sample_rate,
        })
    }

    /// Create a single-channel buffer
    pub fn mono(samples: Vec<f64>, sample_rate: u32) -> Result<Self, AnalysisError> {
        Self::new(vec![samples], sample_rate)
    }

    /// Create a two-channel buffer
    pub fn stereo(
        left: Vec<f64>,
        right: Vec<f64>,
        sample_rate: u32,
    ) -> Result<Self, AnalysisError> {
        Self::new(vec![left, right], sample_rate)
    }

    /// Per-channel samples
    pub fn channels(&self) -> &[Vec<f64>] {
        &self.channels
    }

    /// Consume the buffer, returning its channels
    pub fn into_channels(self) -> Vec<Vec<f64>> {
        self.channels
    }

    /// Number of channels
    pub fn channel_count(&self) -> usize {
        self.channels.len()
    }

    /// Number of samples per channel
    pub fn len(&self) -> usize {
        self.channels.first().map_or(0, Vec::len)
    }

    /// True if there are no channels or no samples
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Sample rate in Hz
    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    /// Duration in seconds
    pub fn duration_seconds(&self) -> f64 {
        self.len() as f64 / self.sample_rate as f64
    }

    /// True if every sample is finite
    pub fn is_finite(&self) -> bool {
        self.channels.iter().flatten().all(|x| x.is_finite())
    }

    /// Mono mixdown (average of all channels)
    pub fn to_mono(&self) -> Vec<f64> {
        crate::preprocessing::channel_mixer::mix_to_mono(&self.channels)
    }
}

/// Iterator over fixed-size analysis frames
///
/// Frames start at sample 0 and advance by `hop` while a full frame fits.
/// A non-empty input shorter than one frame yields a single zero-padded
/// frame. Every frame is an owned buffer, so callers may transform it freely.
#[derive(Debug)]
pub struct Frames<'a> {
    samples: &'a [f64],
    size: usize,
    hop: usize,
    position: usize,
    done: bool,
}

impl<'a> Frames<'a> {
    /// Create a frame iterator; `size` and `hop` must be non-zero
    pub fn new(samples: &'a [f64], size: usize, hop: usize) -> Self {
        Self {
            samples,
            size: size.max(1),
            hop: hop.max(1),
            position: 0,
            done: samples.is_empty(),
        }
    }

    /// Number of frames the iterator will yield
    pub fn count_frames(samples_len: usize, size: usize, hop: usize) -> usize {
        let size = size.max(1);
        let hop = hop.max(1);
        if samples_len == 0 {
            0
        } else if samples_len < size {
            1
        } else {
            (samples_len - size) / hop + 1
        }
    }
}

impl Iterator for Frames<'_> {
    /// (start sample, frame samples)
    type Item = (usize, Vec<f64>);

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }

        let start = self.position;
        if self.samples.len() < self.size {
            self.done = true;
            let mut frame = self.samples.to_vec();
            frame.resize(self.size, 0.0);
            return Some((start, frame));
        }

        if start + self.size > self.samples.len() {
            self.done = true;
            return None;
        }

        let frame = self.samples[start..start + self.size].to_vec();
        self.position += self.hop;
        Some((start, frame))
    }
}
