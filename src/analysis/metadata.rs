//! Analysis metadata

use crate::config::TempoMode;
use serde::{Deserialize, Serialize};

/// Analysis flags
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AnalysisFlag {
    /// Buffer was empty or below the silence threshold; defaults were reported
    Silent,
    /// Multiple BPM peaks equally strong
    MultimodalBpm,
    /// Low key confidence (atonal/ambiguous)
    WeakTonality,
}

/// Analysis metadata
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisMetadata {
    /// Processing time in milliseconds
    pub processing_time_ms: f64,

    /// Algorithm version
    pub algorithm_version: String,

    /// Tempo path used
    pub tempo_mode: TempoMode,

    /// Methods that contributed to the result
    pub methods_used: Vec<String>,

    /// Analysis flags
    pub flags: Vec<AnalysisFlag>,

    /// Degraded voices and features, with reasons
    pub warnings: Vec<String>,
}

impl AnalysisMetadata {
    /// Empty metadata for the given tempo path
    pub fn new(tempo_mode: TempoMode) -> Self {
        Self {
            processing_time_ms: 0.0,
            algorithm_version: env!("CARGO_PKG_VERSION").to_string(),
            tempo_mode,
            methods_used: Vec::new(),
            flags: Vec::new(),
            warnings: Vec::new(),
        }
    }

    /// True if `flag` was raised
    pub fn has_flag(&self, flag: AnalysisFlag) -> bool {
        self.flags.contains(&flag)
    }
}
