//! Fingerprinting and alignment parameters.
//!
//! All defaults target 16 kHz mono input. Two fingerprints can only be
//! aligned when they were built from equal configurations.

use serde::{Deserialize, Serialize};

use crate::{Frequency, SamplePosition};

/// Short-time Fourier transform geometry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StftConfig {
    /// Samples per analysis frame. Must be a power of two greater than 16.
    pub segment: usize,
    /// Samples shared between successive frames. Must be less than `segment`.
    pub overlap: usize,
}

impl StftConfig {
    /// Stride between successive frames.
    pub fn hop(&self) -> usize {
        assert!(
            self.overlap < self.segment,
            "overlap must be less than segment"
        );
        self.segment - self.overlap
    }
}

impl Default for StftConfig {
    fn default() -> Self {
        Self {
            segment: 1024,
            overlap: 896,
        }
    }
}

/// Spectral peak extraction thresholds.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PeaksConfig {
    /// Side length of the square local-maximum kernel. Must be odd.
    pub local_maximum_kernel_size: usize,
    /// Percentile of the magnitude distribution taken as the clip's ceiling.
    pub maximum_amplitude_approximate_percentile: f32,
    /// Floor relative to the ceiling, in dB. Typically negative.
    pub relative_minimum_amplitude: f32,
    /// Lowest peak frequency admitted, Hz.
    pub minimum_frequency: Frequency,
    /// Highest peak frequency admitted, Hz.
    pub maximum_frequency: Frequency,
}

impl Default for PeaksConfig {
    fn default() -> Self {
        Self {
            local_maximum_kernel_size: 5,
            maximum_amplitude_approximate_percentile: 0.999,
            relative_minimum_amplitude: -35.0,
            minimum_frequency: 0,
            maximum_frequency: 8_000,
        }
    }
}

/// Peak pairing parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PatternsConfig {
    /// How far ahead in the peak list each peak looks for partners. Each
    /// peak is paired with up to `fan - 1` successors. Must be at least 2.
    pub fan: usize,
    /// Smallest admissible sample distance within a pair.
    pub minimum_sample_position_delta: SamplePosition,
    /// Largest admissible sample distance within a pair.
    pub maximum_sample_position_delta: SamplePosition,
}

impl Default for PatternsConfig {
    fn default() -> Self {
        Self {
            fan: 10,
            minimum_sample_position_delta: 0,
            maximum_sample_position_delta: 16_000,
        }
    }
}

/// Everything a fingerprint build depends on.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Configuration {
    /// Rate of the PCM handed to the fingerprinter, Hz.
    pub sample_rate: u32,
    pub stft: StftConfig,
    pub peaks: PeaksConfig,
    pub patterns: PatternsConfig,
}

impl Configuration {
    /// Lower bound on alignment precision: one STFT hop, in seconds.
    pub fn finest_time_resolution(&self) -> f32 {
        self.stft.hop() as f32 / self.sample_rate as f32
    }
}

impl Default for Configuration {
    fn default() -> Self {
        Self {
            sample_rate: 16_000,
            stft: StftConfig::default(),
            peaks: PeaksConfig::default(),
            patterns: PatternsConfig::default(),
        }
    }
}

/// Options controlling the alignment vote.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FittingOptions {
    /// Fine vote bin width, seconds. Clamped up to the finest resolution
    /// the fingerprint geometry supports.
    pub time_resolution: f32,
    /// Coarse vote bin width, seconds. Clamped the same way.
    pub time_resolution_coarse: f32,
    /// Width of the window around the coarse winner that is re-voted at
    /// fine resolution, seconds.
    pub focus_interval: f32,
}

impl Default for FittingOptions {
    fn default() -> Self {
        Self {
            time_resolution: 0.001,
            time_resolution_coarse: 0.1,
            focus_interval: 5.0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hop_is_segment_minus_overlap() {
        let config = StftConfig {
            segment: 1024,
            overlap: 896,
        };
        assert_eq!(config.hop(), 128);
    }

    #[test]
    fn finest_resolution_is_one_hop() {
        let configuration = Configuration::default();
        let expected = 128.0 / 16_000.0;
        assert!((configuration.finest_time_resolution() - expected).abs() < 1e-9);
    }
}
