//! Acoustic fingerprinting and offset alignment.
//!
//! Builds a shift-invariant constellation fingerprint of a mono PCM clip
//! and estimates the time offset between two clips by voting over the
//! positional differences of their shared patterns.

pub mod audio;
pub mod config;
pub mod error;
pub mod fingerprint;

pub use config::{Configuration, FittingOptions, PatternsConfig, PeaksConfig, StftConfig};
pub use error::Error;
pub use fingerprint::{Alignment, Fingerprint, Pattern};

/// Sample index into a PCM stream. Produced values are non-negative;
/// differences between positions may be negative.
pub type SamplePosition = i32;

/// Frequency in Hz.
pub type Frequency = i32;
