//! Audio buffer modules
//!
//! Decoded sample buffers and the frame/hop iterator shared by every
//! spectral analysis stage. Decoding itself is left to the caller.

pub mod sample_buffer;

pub use sample_buffer::{Frames, SampleBuffer};
