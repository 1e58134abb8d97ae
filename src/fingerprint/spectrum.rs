//! STFT spectrum construction.
//!
//! Turns a mono PCM buffer into a row-major log-magnitude spectrogram with
//! labelled frequency and position axes.

use std::f32::consts::PI;
use std::sync::Arc;

use rayon::prelude::*;
use rustfft::{num_complex::Complex, Fft, FftPlanner};
use tracing::debug;

use crate::config::StftConfig;
use crate::error::Error;
use crate::{Frequency, SamplePosition};

/// Keeps the log finite on silent cells. A magnitude bias, not an amplitude.
const MAGNITUDE_FLOOR: f32 = 1e-20;

/// Log-magnitude spectrogram of one clip.
///
/// `magnitudes` is row-major: frame `h` occupies
/// `magnitudes[h * width() .. (h + 1) * width()]`, one dB value per bin.
pub struct Spectrum {
    /// Label of each frequency bin, Hz.
    pub frequencies: Vec<Frequency>,
    /// Starting sample of each frame.
    pub positions: Vec<SamplePosition>,
    pub magnitudes: Vec<f32>,
}

impl Spectrum {
    pub fn width(&self) -> usize {
        self.frequencies.len()
    }

    pub fn height(&self) -> usize {
        self.positions.len()
    }
}

/// Compute the log-magnitude spectrum of `samples`.
///
/// Frames are Hann-windowed and fully in-bounds; the trailing samples that
/// do not fill a frame are ignored rather than zero padded, so every
/// emitted position refers to real signal.
pub fn make_spectrum(
    samples: &[f32],
    sample_rate: u32,
    config: &StftConfig,
) -> Result<Spectrum, Error> {
    let segment = config.segment;
    if segment <= 16 {
        return Err(Error::StftSegmentTooShort(segment));
    }
    if !segment.is_power_of_two() {
        return Err(Error::InvalidStftSegment(segment));
    }
    if samples.len() <= 2 * segment || samples.len() <= sample_rate as usize {
        return Err(Error::AudioTooShort {
            samples: samples.len(),
            sample_rate,
        });
    }

    let fft: Arc<dyn Fft<f32>> = FftPlanner::new().plan_fft_forward(segment);
    if fft.len() != segment {
        return Err(Error::CannotSetupFft(segment));
    }

    let window = hann_window(segment);
    // Sequential sum keeps the normalization deterministic across runs.
    let scale = 1.0 / window.iter().sum::<f32>();

    let hop = config.hop();
    let width = segment / 2;
    let height = (samples.len() - segment) / hop + 1;

    let mut magnitudes = vec![0.0f32; height * width];
    magnitudes
        .par_chunks_mut(width)
        .enumerate()
        .for_each(|(h, row)| {
            let start = h * hop;
            let mut buffer: Vec<Complex<f32>> = samples[start..start + segment]
                .iter()
                .zip(&window)
                .map(|(&sample, &w)| Complex {
                    re: sample * w,
                    im: 0.0,
                })
                .collect();
            fft.process(&mut buffer);

            // Bins DC through Nyquist - 1; the Nyquist bin is dropped.
            for (cell, bin) in row.iter_mut().zip(&buffer[..width]) {
                *cell = 20.0 * (bin.norm() * scale).max(MAGNITUDE_FLOOR).log10();
            }
        });

    let frequencies = (0..width)
        .map(|i| (i as f64 * sample_rate as f64 / 2.0 / width as f64).round() as Frequency)
        .collect();
    let positions = (0..height).map(|h| (h * hop) as SamplePosition).collect();

    debug!("spectrum built: {} frames x {} bins", height, width);

    Ok(Spectrum {
        frequencies,
        positions,
        magnitudes,
    })
}

fn hann_window(size: usize) -> Vec<f32> {
    let n = size as f32;
    (0..size)
        .map(|i| 0.5 * (1.0 - (2.0 * PI * i as f32 / (n - 1.0)).cos()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE_RATE: u32 = 16_000;

    fn tone(frequency: f32, seconds: f32) -> Vec<f32> {
        let count = (seconds * SAMPLE_RATE as f32) as usize;
        (0..count)
            .map(|i| (2.0 * PI * frequency * i as f32 / SAMPLE_RATE as f32).sin())
            .collect()
    }

    #[test]
    fn rejects_segments_of_sixteen_or_less() {
        let config = StftConfig {
            segment: 16,
            overlap: 0,
        };
        let result = make_spectrum(&tone(440.0, 2.0), SAMPLE_RATE, &config);
        assert!(matches!(result, Err(Error::StftSegmentTooShort(16))));
    }

    #[test]
    fn rejects_non_power_of_two_segments() {
        let config = StftConfig {
            segment: 1000,
            overlap: 0,
        };
        let result = make_spectrum(&tone(440.0, 2.0), SAMPLE_RATE, &config);
        assert!(matches!(result, Err(Error::InvalidStftSegment(1000))));
    }

    #[test]
    fn rejects_audio_shorter_than_a_second() {
        let result = make_spectrum(&tone(440.0, 0.3), SAMPLE_RATE, &StftConfig::default());
        assert!(matches!(result, Err(Error::AudioTooShort { .. })));
    }

    #[test]
    fn axes_follow_the_frame_geometry() {
        let config = StftConfig {
            segment: 1024,
            overlap: 512,
        };
        let spectrum = make_spectrum(&tone(440.0, 2.0), SAMPLE_RATE, &config).unwrap();

        assert_eq!(spectrum.width(), 512);
        assert_eq!(spectrum.height(), (32_000 - 1024) / 512 + 1);
        assert_eq!(spectrum.positions[0], 0);
        assert_eq!(spectrum.positions[1], 512);
        assert_eq!(spectrum.frequencies[0], 0);
        // bin spacing is sample_rate / segment = 15.625 Hz
        assert_eq!(spectrum.frequencies[1], 16);
        assert_eq!(spectrum.frequencies[64], 1000);
        assert_eq!(
            spectrum.magnitudes.len(),
            spectrum.width() * spectrum.height()
        );
    }

    #[test]
    fn exact_bin_tone_dominates_its_frame() {
        // 1000 Hz sits exactly on bin 64 of a 1024-sample segment at 16 kHz.
        let spectrum =
            make_spectrum(&tone(1000.0, 2.0), SAMPLE_RATE, &StftConfig::default()).unwrap();
        let row = &spectrum.magnitudes[..spectrum.width()];
        let loudest = (0..row.len())
            .max_by(|&a, &b| row[a].total_cmp(&row[b]))
            .unwrap();
        assert_eq!(loudest, 64);
        // a full-scale exact-bin sine lands at 20*log10(1/2) ~ -6.02 dB
        assert!((row[loudest] + 6.02).abs() < 0.1, "got {}", row[loudest]);
    }
}
