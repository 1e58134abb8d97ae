//! Container/codec decoding via symphonia.

use std::fs::File;
use std::path::Path;

use rayon::prelude::*;
use symphonia::core::audio::SampleBuffer;
use symphonia::core::codecs::DecoderOptions;
use symphonia::core::errors::Error as SymphoniaError;
use symphonia::core::formats::FormatOptions;
use symphonia::core::io::MediaSourceStream;
use symphonia::core::meta::MetadataOptions;
use symphonia::core::probe::Hint;
use tracing::debug;

use crate::error::Error;

pub struct DecodedAudio {
    /// Interleaved samples, `channels` per frame.
    pub samples: Vec<f32>,
    pub sample_rate: u32,
    pub channels: usize,
}

/// Decode the default audio track of `path` to interleaved f32 PCM.
pub fn decode_file(path: &Path) -> Result<DecodedAudio, Error> {
    let file = File::open(path)
        .map_err(|e| Error::CannotCreatePcmBuffer(format!("{}: {}", path.display(), e)))?;
    let stream = MediaSourceStream::new(Box::new(file), Default::default());

    let mut hint = Hint::new();
    if let Some(extension) = path.extension().and_then(|e| e.to_str()) {
        hint.with_extension(extension);
    }

    let probed = symphonia::default::get_probe()
        .format(
            &hint,
            stream,
            &FormatOptions::default(),
            &MetadataOptions::default(),
        )
        .map_err(|e| Error::CannotCreatePcmBuffer(e.to_string()))?;
    let mut format = probed.format;

    let track = format
        .default_track()
        .ok_or_else(|| Error::CannotCreatePcmBuffer("no default audio track".into()))?;
    let track_id = track.id;
    let sample_rate = track
        .codec_params
        .sample_rate
        .ok_or_else(|| Error::CannotCreatePcmBuffer("unknown sample rate".into()))?;
    let channels = track
        .codec_params
        .channels
        .ok_or_else(|| Error::CannotCreatePcmBuffer("unknown channel layout".into()))?
        .count();

    let mut decoder = symphonia::default::get_codecs()
        .make(&track.codec_params, &DecoderOptions::default())
        .map_err(|e| Error::CannotCreatePcmBuffer(e.to_string()))?;

    let mut samples = Vec::new();
    loop {
        let packet = match format.next_packet() {
            Ok(packet) => packet,
            Err(SymphoniaError::IoError(e))
                if e.kind() == std::io::ErrorKind::UnexpectedEof =>
            {
                break
            }
            Err(e) => return Err(Error::CannotCreatePcmBuffer(e.to_string())),
        };
        if packet.track_id() != track_id {
            continue;
        }
        // Skip undecodable packets; the decoder resynchronizes on the next.
        let Ok(decoded) = decoder.decode(&packet) else {
            continue;
        };

        let mut buffer = SampleBuffer::<f32>::new(decoded.capacity() as u64, *decoded.spec());
        buffer.copy_interleaved_ref(decoded);
        samples.extend_from_slice(buffer.samples());
    }

    if samples.is_empty() {
        return Err(Error::CannotCreatePcmBuffer(format!(
            "{}: no decodable audio",
            path.display()
        )));
    }

    debug!(
        "decoded {} interleaved samples at {} Hz, {} channel(s)",
        samples.len(),
        sample_rate,
        channels
    );

    Ok(DecodedAudio {
        samples,
        sample_rate,
        channels,
    })
}

/// Downmix interleaved samples to mono by averaging the channels of each
/// frame.
pub fn to_mono(samples: &[f32], channels: usize) -> Vec<f32> {
    if channels == 1 {
        return samples.to_vec();
    }
    samples
        .par_chunks(channels)
        .map(|frame| frame.iter().sum::<f32>() / channels as f32)
        .collect()
}
