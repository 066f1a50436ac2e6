//! Onset detection modules
//!
//! Two onset detectors shared by tempo and mood analysis:
//! - Spectral flux (novelty curve + peak picking)
//! - Energy ratio (frame energy jumps)

pub mod energy_flux;
pub mod spectral_flux;

pub use energy_flux::detect_energy_ratio_beats;
pub use spectral_flux::{detect_spectral_flux_onsets, normalize_by_max, spectral_flux};
