//! Decoding/resampling adapter in front of the fingerprint core.
//!
//! The core consumes finished mono float PCM at the configured rate; this
//! module produces it from an audio file on disk.

mod decode;
mod resample;

use std::path::Path;

use crate::error::Error;

/// Load an audio file as mono f32 PCM at `target_sample_rate`.
pub fn load(path: &Path, target_sample_rate: u32) -> Result<Vec<f32>, Error> {
    let decoded = decode::decode_file(path)?;
    let mono = decode::to_mono(&decoded.samples, decoded.channels);
    resample::resample(&mono, decoded.sample_rate, target_sample_rate)
}
