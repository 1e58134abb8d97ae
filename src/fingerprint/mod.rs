//! Constellation fingerprints and offset alignment.
//!
//! Wires the spectrum builder, the peak extractor and the pattern
//! generator into the immutable `Fingerprint` value, and exposes the
//! alignment of two fingerprints.

mod align;
mod patterns;
mod peaks;
mod spectrum;
mod stats;

pub use self::align::Alignment;
pub use self::patterns::Pattern;

use std::sync::Arc;

use tracing::debug;

use self::patterns::Patterns;
use crate::config::{Configuration, FittingOptions};
use crate::error::Error;

/// Shift-invariant acoustic fingerprint of a single clip.
///
/// Immutable once constructed; cloning shares the pattern table, so a
/// fingerprint is cheap to hand across threads.
#[derive(Debug, Clone)]
pub struct Fingerprint {
    configuration: Configuration,
    patterns: Arc<Patterns>,
}

impl Fingerprint {
    /// Fingerprint a mono PCM clip sampled at the configuration's rate.
    ///
    /// The spectrogram and its dilation are transient; only the pattern
    /// table and the configuration survive in the returned value.
    pub fn from_samples(samples: &[f32], configuration: Configuration) -> Result<Self, Error> {
        let spectrum =
            spectrum::make_spectrum(samples, configuration.sample_rate, &configuration.stft)?;
        let peaks = peaks::find_peaks(&spectrum, &configuration.peaks);
        drop(spectrum);

        let patterns = patterns::make_patterns(&peaks, &configuration.patterns)?;
        debug!("{} peaks yielded {} patterns", peaks.len(), patterns.len());

        Ok(Self {
            configuration,
            patterns: Arc::new(patterns),
        })
    }

    pub fn configuration(&self) -> &Configuration {
        &self.configuration
    }

    pub fn pattern_count(&self) -> usize {
        self.patterns.len()
    }

    /// Estimate how many seconds this clip must be shifted to line up with
    /// `reference`.
    ///
    /// Fails with [`Error::ConfigurationMismatch`] when the fingerprints
    /// were built under different configurations and with
    /// [`Error::NoMatchesFound`] when the clips share no patterns.
    pub fn align(
        &self,
        reference: &Fingerprint,
        options: &FittingOptions,
    ) -> Result<Alignment, Error> {
        align::align(self, reference, options)
    }

    pub(crate) fn patterns(&self) -> &Patterns {
        &self.patterns
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::PatternsConfig;
    use std::f32::consts::PI;

    const SAMPLE_RATE: u32 = 16_000;

    /// Stepped melody of exact-bin tones, distinctive enough in time for an
    /// unambiguous vote.
    fn melody(seconds: f32) -> Vec<f32> {
        let bins = [24usize, 40, 64, 88, 48, 72, 32, 96];
        let count = (seconds * SAMPLE_RATE as f32) as usize;
        let note = SAMPLE_RATE as usize / 2;
        (0..count)
            .map(|i| {
                let bin = bins[(i / note) % bins.len()];
                let frequency = bin as f32 * SAMPLE_RATE as f32 / 1024.0;
                0.8 * (2.0 * PI * frequency * i as f32 / SAMPLE_RATE as f32).sin()
            })
            .collect()
    }

    fn tone(frequency: f32, seconds: f32) -> Vec<f32> {
        let count = (seconds * SAMPLE_RATE as f32) as usize;
        (0..count)
            .map(|i| (2.0 * PI * frequency * i as f32 / SAMPLE_RATE as f32).sin())
            .collect()
    }

    fn silence(seconds: f32) -> Vec<f32> {
        vec![0.0; (seconds * SAMPLE_RATE as f32) as usize]
    }

    #[test]
    fn aligning_a_fingerprint_with_itself_is_exactly_zero() {
        let fingerprint =
            Fingerprint::from_samples(&melody(8.0), Configuration::default()).unwrap();
        let alignment = fingerprint
            .align(&fingerprint, &FittingOptions::default())
            .unwrap();
        assert_eq!(alignment.estimated_time_offset, 0.0);
    }

    #[test]
    fn recovers_a_known_lead_in() {
        let configuration = Configuration::default();
        let reference_samples = melody(8.0);
        let mut clip_samples = silence(2.0);
        clip_samples.extend_from_slice(&reference_samples);

        let reference = Fingerprint::from_samples(&reference_samples, configuration).unwrap();
        let clip = Fingerprint::from_samples(&clip_samples, configuration).unwrap();

        let offset = clip
            .align(&reference, &FittingOptions::default())
            .unwrap()
            .estimated_time_offset;
        let finest = configuration.finest_time_resolution();
        assert!(
            (offset - 2.0).abs() <= finest,
            "estimated {offset}, expected 2.0 within {finest}"
        );

        let reverse = reference
            .align(&clip, &FittingOptions::default())
            .unwrap()
            .estimated_time_offset;
        assert!(
            (offset + reverse).abs() <= finest,
            "asymmetric estimates: {offset} vs {reverse}"
        );
    }

    #[test]
    fn differing_configurations_do_not_align() {
        let samples = melody(4.0);
        let narrow = Configuration::default();
        let wide = Configuration {
            patterns: PatternsConfig {
                fan: 12,
                ..narrow.patterns
            },
            ..narrow
        };

        let a = Fingerprint::from_samples(&samples, narrow).unwrap();
        let b = Fingerprint::from_samples(&samples, wide).unwrap();
        assert!(matches!(
            a.align(&b, &FittingOptions::default()),
            Err(Error::ConfigurationMismatch)
        ));
    }

    #[test]
    fn disjoint_spectra_share_no_patterns() {
        let configuration = Configuration::default();
        let a = Fingerprint::from_samples(&tone(1000.0, 4.0), configuration).unwrap();
        let b = Fingerprint::from_samples(&tone(2000.0, 4.0), configuration).unwrap();
        assert!(matches!(
            a.align(&b, &FittingOptions::default()),
            Err(Error::NoMatchesFound)
        ));
    }

    #[test]
    fn silence_behaves_deterministically() {
        let configuration = Configuration::default();
        let a = Fingerprint::from_samples(&silence(2.0), configuration);
        let b = Fingerprint::from_samples(&silence(2.0), configuration);

        match (a, b) {
            (Ok(a), Ok(b)) => {
                assert_eq!(a.patterns(), b.patterns());
                let alignment = a.align(&b, &FittingOptions::default()).unwrap();
                assert_eq!(alignment.estimated_time_offset, 0.0);
            }
            (Err(Error::NoPatternsFound), Err(Error::NoPatternsFound)) => {}
            (a, b) => panic!("silence fingerprinting not deterministic: {a:?} / {b:?}"),
        }
    }

    #[test]
    fn repeated_runs_produce_identical_pattern_tables() {
        let samples = melody(4.0);
        let a = Fingerprint::from_samples(&samples, Configuration::default()).unwrap();
        let b = Fingerprint::from_samples(&samples, Configuration::default()).unwrap();
        assert_eq!(a.patterns(), b.patterns());
    }
}
