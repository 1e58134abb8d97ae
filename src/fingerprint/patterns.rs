//! Constellation pattern generation.

use std::collections::HashMap;

use crate::config::PatternsConfig;
use crate::error::Error;
use crate::fingerprint::peaks::Peak;
use crate::{Frequency, SamplePosition};

/// A landmark pair: two peak frequencies and the sample distance between
/// them. Patterns are what two clips are joined on during alignment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Pattern {
    pub frequency_a: Frequency,
    pub frequency_b: Frequency,
    pub position_delta: SamplePosition,
}

/// Pattern table of one clip: pattern to anchor, where the anchor is the
/// sample position of the earlier peak in the pair. Duplicate patterns keep
/// the anchor written last.
pub type Patterns = HashMap<Pattern, SamplePosition>;

/// Pair each peak with its successors and collect the qualifying pairs.
///
/// Peaks must already be ordered by position then frequency; together with
/// the ascending anchor/successor iteration this makes the overwrite order,
/// and therefore the table, reproducible.
pub fn make_patterns(peaks: &[Peak], config: &PatternsConfig) -> Result<Patterns, Error> {
    assert!(config.fan >= 2, "fan must be at least 2");

    let mut patterns = Patterns::new();
    for (i, anchor) in peaks.iter().enumerate() {
        for successor in &peaks[i + 1..(i + config.fan).min(peaks.len())] {
            let delta = successor.position - anchor.position;
            if delta >= config.minimum_sample_position_delta
                && delta <= config.maximum_sample_position_delta
            {
                patterns.insert(
                    Pattern {
                        frequency_a: anchor.frequency,
                        frequency_b: successor.frequency,
                        position_delta: delta,
                    },
                    anchor.position,
                );
            }
        }
    }

    if patterns.is_empty() {
        return Err(Error::NoPatternsFound);
    }
    Ok(patterns)
}
