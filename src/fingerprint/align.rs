//! Two-pass histogram alignment of fingerprints.
//!
//! Every pattern shared by the two clips casts one vote: the difference of
//! its anchor positions, in seconds. A coarse histogram finds the
//! neighborhood where the votes pile up; a fine histogram over that
//! neighborhood nails the offset down to the requested resolution.

use serde::Serialize;
use tracing::debug;

use crate::config::FittingOptions;
use crate::error::Error;
use crate::fingerprint::stats::histogram;
use crate::fingerprint::Fingerprint;

/// Result of aligning a clip against a reference.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Alignment {
    /// Seconds by which the clip trails the reference. Positive means the
    /// clip's content starts later than the reference's, so the clip must
    /// be shifted earlier by this amount to line the two up.
    pub estimated_time_offset: f32,
}

pub(crate) fn align(
    clip: &Fingerprint,
    reference: &Fingerprint,
    options: &FittingOptions,
) -> Result<Alignment, Error> {
    if clip.configuration() != reference.configuration() {
        return Err(Error::ConfigurationMismatch);
    }
    let configuration = clip.configuration();

    // Bin widths below one hop would pretend to more precision than the
    // frame positions carry.
    let finest = configuration.finest_time_resolution();
    let fine_delta = options.time_resolution.max(finest);
    let coarse_delta = options.time_resolution_coarse.max(finest);
    let sample_rate = configuration.sample_rate as f32;

    let mut diffs = Vec::new();
    for (pattern, &position) in clip.patterns() {
        if let Some(&reference_position) = reference.patterns().get(pattern) {
            diffs.push((position - reference_position) as f32 / sample_rate);
        }
    }
    if diffs.is_empty() {
        return Err(Error::NoMatchesFound);
    }
    debug!("{} shared patterns vote on the offset", diffs.len());

    let coarse = histogram(&diffs, coarse_delta);
    let center = coarse.centers[winning_bin(&coarse.counts)];

    let half = options.focus_interval / 2.0;
    let focused: Vec<f32> = diffs
        .iter()
        .copied()
        .filter(|diff| (center - half..=center + half).contains(diff))
        .collect();

    let fine = histogram(&focused, fine_delta);
    Ok(Alignment {
        estimated_time_offset: fine.centers[winning_bin(&fine.counts)],
    })
}

/// Index of the largest count; earlier bins win ties.
fn winning_bin(counts: &[usize]) -> usize {
    let mut winner = 0;
    for (bin, &count) in counts.iter().enumerate() {
        if count > counts[winner] {
            winner = bin;
        }
    }
    winner
}
