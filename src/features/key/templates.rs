//! Key profile templates
//!
//! Tonal hierarchy profiles for C major and C minor; other tonics are
//! rotations.
//!
//! # References
//!
//! Krumhansl, C. L., & Kessler, E. J. (1982). Tracing the Dynamic Changes in Perceived
//! Tonal Organization in a Spatial Representation of Musical Keys. *Psychological Review*,
//! 89(4), 334-368.
//!
//! Temperley, D. (1999). What's Key for Key? The Krumhansl-Schmuckler Key-Finding
//! Algorithm Reconsidered. *Music Perception*, 17(1), 65-100.

use crate::analysis::result::Mode;

/// Krumhansl-Schmuckler major profile
pub const KRUMHANSL_MAJOR: [f64; 12] = [
    6.35, 2.23, 3.48, 2.33, 4.38, 4.09, 2.52, 5.19, 2.39, 3.66, 2.29, 2.88,
];

/// Krumhansl-Schmuckler minor profile
pub const KRUMHANSL_MINOR: [f64; 12] = [
    6.33, 2.68, 3.52, 5.38, 2.60, 3.53, 2.54, 4.75, 3.98, 2.69, 3.34, 3.17,
];

/// Temperley major profile
pub const TEMPERLEY_MAJOR: [f64; 12] = [
    5.0, 2.0, 3.5, 2.0, 4.5, 4.0, 2.0, 4.5, 2.0, 3.5, 1.5, 4.0,
];

/// Temperley minor profile
pub const TEMPERLEY_MINOR: [f64; 12] = [
    5.0, 2.0, 3.5, 4.5, 2.0, 4.0, 2.0, 4.5, 3.5, 2.0, 1.5, 4.0,
];

/// Krumhansl-Schmuckler profile for a mode
pub fn krumhansl(mode: Mode) -> &'static [f64; 12] {
    match mode {
        Mode::Major => &KRUMHANSL_MAJOR,
        Mode::Minor => &KRUMHANSL_MINOR,
    }
}

/// Temperley profile for a mode
pub fn temperley(mode: Mode) -> &'static [f64; 12] {
    match mode {
        Mode::Major => &TEMPERLEY_MAJOR,
        Mode::Minor => &TEMPERLEY_MINOR,
    }
}

/// Rotate a C-based profile so that `tonic` takes index 0's role
///
/// `rotated[i] = profile[(i + 12 - tonic) % 12]`
pub fn rotate(profile: &[f64; 12], tonic: usize) -> [f64; 12] {
    let tonic = tonic % 12;
    let mut out = [0.0; 12];
    for (i, o) in out.iter_mut().enumerate() {
        *o = profile[(i + 12 - tonic) % 12];
    }
    out
}
