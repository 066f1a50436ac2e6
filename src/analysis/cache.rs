//! Analysis result caching
//!
//! The analysis core never caches on its own. Callers that want to skip
//! repeated work inject an [`AnalysisCache`] and go through
//! [`analyze_cached`](crate::analyze_cached), which keys results by a
//! content hash of the buffer and the configuration.

use super::result::AnalysisResult;
use crate::config::AnalysisConfig;
use crate::io::SampleBuffer;
use std::collections::HashMap;
use std::fmt;
use std::sync::Mutex;

/// Content hash identifying one (buffer, configuration) pair
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CacheKey([u8; 32]);

impl CacheKey {
    /// Hash the sample bits, channel layout, sample rate and configuration
    pub fn new(buffer: &SampleBuffer, config: &AnalysisConfig) -> Self {
        let mut hasher = blake3::Hasher::new();
        hasher.update(&buffer.sample_rate().to_le_bytes());
        hasher.update(&(buffer.channel_count() as u64).to_le_bytes());
        hasher.update(&(buffer.len() as u64).to_le_bytes());
        for channel in buffer.channels() {
            for sample in channel {
                hasher.update(&sample.to_bits().to_le_bytes());
            }
        }
        // Debug output covers every config field, including the calibration weights
        hasher.update(format!("{:?}", config).as_bytes());
        CacheKey(*hasher.finalize().as_bytes())
    }

    /// Raw 32-byte digest
    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for byte in &self.0 {
            write!(f, "{:02x}", byte)?;
        }
        Ok(())
    }
}

/// Store of previously computed analysis results
pub trait AnalysisCache: Send + Sync {
    /// Look up a result
    fn get(&self, key: &CacheKey) -> Option<AnalysisResult>;

    /// Store a result
    fn put(&self, key: CacheKey, result: AnalysisResult);
}

/// Process-local cache backed by a mutex-guarded map
#[derive(Debug, Default)]
pub struct InMemoryCache {
    entries: Mutex<HashMap<CacheKey, AnalysisResult>>,
}

impl InMemoryCache {
    /// Empty cache
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of cached results
    pub fn len(&self) -> usize {
        self.entries.lock().map(|m| m.len()).unwrap_or(0)
    }

    /// True if nothing is cached
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl AnalysisCache for InMemoryCache {
    fn get(&self, key: &CacheKey) -> Option<AnalysisResult> {
        match self.entries.lock() {
            Ok(map) => map.get(key).cloned(),
            Err(_) => {
                log::warn!("Analysis cache lock poisoned, treating as miss");
                None
            }
        }
    }

    fn put(&self, key: CacheKey, result: AnalysisResult) {
        match self.entries.lock() {
            Ok(mut map) => {
                map.insert(key, result);
            }
            Err(_) => log::warn!("Analysis cache lock poisoned, dropping entry {}", key),
        }
    }
}
