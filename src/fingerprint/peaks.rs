//! Spectral peak extraction.
//!
//! A peak is a spectrogram cell that survives three gates: it is the
//! maximum of its local neighborhood, it lies above an amplitude floor
//! derived from the clip's own loudness, and its frequency falls inside
//! the configured band.

use crate::config::PeaksConfig;
use crate::fingerprint::spectrum::Spectrum;
use crate::fingerprint::stats::approximate_percentile;
use crate::{Frequency, SamplePosition};

/// Bin width used when estimating the clip's amplitude ceiling, in dB.
const CEILING_HISTOGRAM_DELTA: f32 = 0.1;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Peak {
    pub frequency: Frequency,
    pub position: SamplePosition,
}

/// Extract constellation peaks from a spectrum.
///
/// Peaks come back ordered by position, then frequency; pattern generation
/// depends on this order.
pub fn find_peaks(spectrum: &Spectrum, config: &PeaksConfig) -> Vec<Peak> {
    let kernel = config.local_maximum_kernel_size;
    assert!(kernel % 2 == 1, "local maximum kernel size must be odd");

    let width = spectrum.width();
    let height = spectrum.height();

    let dilated = dilate(&spectrum.magnitudes, height, width, kernel);

    let ceiling = approximate_percentile(
        &spectrum.magnitudes,
        CEILING_HISTOGRAM_DELTA,
        config.maximum_amplitude_approximate_percentile,
    );
    let floor = ceiling + config.relative_minimum_amplitude;

    let mut peaks = Vec::new();
    for h in 0..height {
        for k in 0..width {
            let cell = h * width + k;
            let frequency = spectrum.frequencies[k];
            if spectrum.magnitudes[cell] == dilated[cell]
                && spectrum.magnitudes[cell] > floor
                && frequency >= config.minimum_frequency
                && frequency <= config.maximum_frequency
            {
                peaks.push(Peak {
                    frequency,
                    position: spectrum.positions[h],
                });
            }
        }
    }
    peaks
}

/// Grayscale dilation with a square kernel and clamped edges, done as a
/// horizontal pass followed by a vertical pass.
fn dilate(image: &[f32], height: usize, width: usize, kernel: usize) -> Vec<f32> {
    let reach = kernel / 2;

    let mut rows = vec![0.0f32; image.len()];
    for h in 0..height {
        let row = &image[h * width..(h + 1) * width];
        for k in 0..width {
            let lo = k.saturating_sub(reach);
            let hi = (k + reach).min(width - 1);
            rows[h * width + k] = row[lo..=hi].iter().copied().fold(f32::MIN, f32::max);
        }
    }

    let mut out = vec![0.0f32; image.len()];
    for h in 0..height {
        let lo = h.saturating_sub(reach);
        let hi = (h + reach).min(height - 1);
        for k in 0..width {
            let mut max = rows[lo * width + k];
            for row in lo + 1..=hi {
                max = max.max(rows[row * width + k]);
            }
            out[h * width + k] = max;
        }
    }
    out
}
