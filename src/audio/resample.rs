//! Sample-rate conversion via rubato.

use rubato::{
    Resampler, SincFixedIn, SincInterpolationParameters, SincInterpolationType, WindowFunction,
};
use tracing::debug;

use crate::error::Error;

const CHUNK_SIZE: usize = 1024;

/// Resample a mono stream to `target_rate`.
///
/// Chunks pass sequentially through a single resampler so the sinc history
/// carries across chunk seams. The final partial chunk is zero padded and
/// the output truncated to `ceil(n * target / source)` frames; the trailing
/// pad is insignificant to the fingerprint.
pub fn resample(input: &[f32], input_rate: u32, target_rate: u32) -> Result<Vec<f32>, Error> {
    if input_rate == target_rate {
        return Ok(input.to_vec());
    }

    let ratio = target_rate as f64 / input_rate as f64;
    debug!(
        "resampling {} Hz -> {} Hz (ratio {:.4})",
        input_rate, target_rate, ratio
    );

    let parameters = SincInterpolationParameters {
        sinc_len: 128,
        f_cutoff: 0.95,
        oversampling_factor: 64,
        interpolation: SincInterpolationType::Linear,
        window: WindowFunction::BlackmanHarris2,
    };
    let mut resampler = SincFixedIn::<f32>::new(ratio, 2.0, parameters, CHUNK_SIZE, 1)
        .map_err(|e| Error::CannotCreateAudioConverter(e.to_string()))?;

    let expected = (input.len() as f64 * ratio).ceil() as usize;
    let mut output = Vec::with_capacity(expected);

    for chunk in input.chunks(CHUNK_SIZE) {
        let frames = if chunk.len() == CHUNK_SIZE {
            resampler
                .process(&[chunk], None)
                .map_err(|e| Error::CannotCreateAudioConverter(e.to_string()))?
        } else {
            let mut padded = vec![0.0f32; CHUNK_SIZE];
            padded[..chunk.len()].copy_from_slice(chunk);
            resampler
                .process(&[padded], None)
                .map_err(|e| Error::CannotCreateAudioConverter(e.to_string()))?
        };
        output.extend_from_slice(&frames[0]);
    }

    output.truncate(expected);
    Ok(output)
}
