//! Audio preprocessing modules
//!
//! This module contains utilities for preparing and measuring audio:
//! - Channel mixing (mono mixdown, mid/side)
//! - Level measurement (RMS, peak, approximate and integrated loudness)
//! - Silence detection
//! - Biquad filters shared by loudness measurement and mastering EQ

pub mod channel_mixer;
pub mod filters;
pub mod normalization;
pub mod silence;
