//! Analysis result types

use super::metadata::AnalysisMetadata;
use crate::features::chroma::ChromaVector;
use crate::features::mood::MoodScores;
use crate::features::period::TempoCandidate;
use serde::{Deserialize, Serialize};

const NOTE_NAMES: [&str; 12] = [
    "C", "C#", "D", "D#", "E", "F", "F#", "G", "G#", "A", "A#", "B",
];

// Circle of fifths: C, G, D, A, E, B, F#, C#, G#, D#, A#, F
const CIRCLE_OF_FIFTHS_MAJOR: [u32; 12] = [0, 7, 2, 9, 4, 11, 6, 1, 8, 3, 10, 5];
// Relative minors: Am, Em, Bm, F#m, C#m, G#m, D#m, A#m, Fm, Cm, Gm, Dm
const CIRCLE_OF_FIFTHS_MINOR: [u32; 12] = [9, 4, 11, 6, 1, 8, 3, 10, 5, 0, 7, 2];

/// Key mode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Mode {
    /// Major mode
    Major,
    /// Minor mode
    Minor,
}

/// Musical key
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Key {
    /// Major key (0 = C, 1 = C#, ..., 11 = B)
    Major(u32),
    /// Minor key (0 = C, 1 = C#, ..., 11 = B)
    Minor(u32),
}

impl Default for Key {
    fn default() -> Self {
        Key::Major(0)
    }
}

impl Key {
    /// Build a key from tonic pitch class and mode
    pub fn new(tonic: u32, mode: Mode) -> Self {
        match mode {
            Mode::Major => Key::Major(tonic % 12),
            Mode::Minor => Key::Minor(tonic % 12),
        }
    }

    /// Tonic pitch class (0 = C ... 11 = B)
    pub fn tonic(&self) -> u32 {
        match self {
            Key::Major(i) | Key::Minor(i) => *i % 12,
        }
    }

    /// Key mode
    pub fn mode(&self) -> Mode {
        match self {
            Key::Major(_) => Mode::Major,
            Key::Minor(_) => Mode::Minor,
        }
    }

    /// Full key name (e.g., "C Major", "A Minor")
    ///
    /// # Example
    ///
    /// ```
    /// use stratum_master::analysis::result::Key;
    ///
    /// assert_eq!(Key::Major(0).name(), "C Major");
    /// assert_eq!(Key::Minor(9).name(), "A Minor");
    /// ```
    pub fn name(&self) -> String {
        let mode = match self.mode() {
            Mode::Major => "Major",
            Mode::Minor => "Minor",
        };
        format!("{} {}", NOTE_NAMES[self.tonic() as usize], mode)
    }

    /// Short musical notation (e.g., "C", "Am", "F#", "D#m")
    pub fn short_name(&self) -> String {
        match self {
            Key::Major(_) => NOTE_NAMES[self.tonic() as usize].to_string(),
            Key::Minor(_) => format!("{}m", NOTE_NAMES[self.tonic() as usize]),
        }
    }

    /// DJ wheel notation (e.g., "1A", "2B", "12A")
    ///
    /// Major keys map to 1A-12A (1A = C, 2A = G, ...), minor keys to 1B-12B
    /// (1B = Am, 2B = Em, ...), stepping up a fifth each number.
    ///
    /// # Example
    ///
    /// ```
    /// use stratum_master::analysis::result::Key;
    ///
    /// assert_eq!(Key::Major(0).numerical(), "1A");
    /// assert_eq!(Key::Major(7).numerical(), "2A");
    /// assert_eq!(Key::Minor(9).numerical(), "1B");
    /// ```
    pub fn numerical(&self) -> String {
        let (circle, suffix) = match self {
            Key::Major(_) => (&CIRCLE_OF_FIFTHS_MAJOR, 'A'),
            Key::Minor(_) => (&CIRCLE_OF_FIFTHS_MINOR, 'B'),
        };
        let position = circle
            .iter()
            .position(|&x| x == self.tonic())
            .unwrap_or(0);
        format!("{}{}", position + 1, suffix)
    }

    /// Parse DJ wheel notation, `None` for anything malformed
    pub fn from_numerical(notation: &str) -> Option<Self> {
        if notation.len() < 2 || !notation.is_ascii() {
            return None;
        }

        let (num_str, suffix) = notation.split_at(notation.len() - 1);
        let num: usize = num_str.parse().ok()?;
        if !(1..=12).contains(&num) {
            return None;
        }

        match suffix {
            "A" => Some(Key::Major(CIRCLE_OF_FIFTHS_MAJOR[num - 1])),
            "B" => Some(Key::Minor(CIRCLE_OF_FIFTHS_MINOR[num - 1])),
            _ => None,
        }
    }
}

/// Ranked key hypothesis
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct KeyCandidate {
    /// Key
    pub key: Key,

    /// Blended template correlation, clipped to [0, 1]
    pub confidence: f64,
}

/// Complete analysis result
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisResult {
    /// BPM estimate
    pub bpm: f64,

    /// BPM confidence (0.0-1.0)
    pub bpm_confidence: f64,

    /// Ranked BPM alternatives
    pub bpm_candidates: Vec<TempoCandidate>,

    /// Detected key
    pub key: Key,

    /// Key confidence (0.0-1.0)
    pub key_confidence: f64,

    /// Ranked key alternatives
    pub key_candidates: Vec<KeyCandidate>,

    /// Blended chroma vector
    pub chroma: ChromaVector,

    /// Energy, danceability and valence
    pub mood: MoodScores,

    /// Audio duration in seconds
    pub duration_seconds: f64,

    /// Sample rate in Hz
    pub sample_rate: u32,

    /// Analysis metadata
    pub metadata: AnalysisMetadata,
}

impl AnalysisResult {
    /// The documented defaults for a buffer with nothing to measure
    ///
    /// 120 BPM, C Major, zero chroma, 0.5 for every mood score.
    pub fn fallback(duration_seconds: f64, sample_rate: u32, metadata: AnalysisMetadata) -> Self {
        Self {
            bpm: crate::features::period::DEFAULT_BPM,
            bpm_confidence: 0.0,
            bpm_candidates: Vec::new(),
            key: Key::default(),
            key_confidence: 0.0,
            key_candidates: Vec::new(),
            chroma: ChromaVector::zero(),
            mood: MoodScores::neutral(),
            duration_seconds,
            sample_rate,
            metadata,
        }
    }
}
