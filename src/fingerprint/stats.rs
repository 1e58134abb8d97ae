//! Histogram and percentile helpers behind the amplitude floor and the
//! alignment vote.

/// Fixed-width binning of a float slice.
pub struct Histogram {
    pub counts: Vec<usize>,
    pub centers: Vec<f32>,
}

/// Bin `values` into bins of roughly `delta` width.
///
/// When every value is identical the result is a single bin holding all of
/// them. Otherwise the bins uniformly cover `[min, max]`, each half-open
/// with the final bin closed at the top, so every value lands in exactly
/// one bin.
pub fn histogram(values: &[f32], delta: f32) -> Histogram {
    assert!(!values.is_empty(), "cannot bin an empty slice");
    assert!(delta > 0.0, "bin width must be positive");

    let mut min = values[0];
    let mut max = values[0];
    for &value in values {
        min = min.min(value);
        max = max.max(value);
    }

    if min == max {
        return Histogram {
            counts: vec![values.len()],
            centers: vec![min],
        };
    }

    let bins = ((max - min) / delta).ceil() as usize;
    let width = (max - min) / bins as f32;

    let mut counts = vec![0usize; bins];
    for &value in values {
        let bin = (((value - min) / width) as usize).min(bins - 1);
        counts[bin] += 1;
    }

    let centers = (0..bins)
        .map(|bin| min + width * (bin as f32 + 0.5))
        .collect();

    Histogram { counts, centers }
}

/// Approximate the `percentile` quantile of `values` from a histogram with
/// bin width `delta`: walk the bins in increasing order and return the
/// center of the first bin whose cumulative mass reaches the percentile.
pub fn approximate_percentile(values: &[f32], delta: f32, percentile: f32) -> f32 {
    assert!(
        (0.0..=1.0).contains(&percentile),
        "percentile must lie in [0, 1]"
    );

    let hist = histogram(values, delta);
    let total = values.len();

    // Integer accumulation so a percentile of 1.0 terminates on the last
    // bin without floating-point mass drift.
    let mut seen = 0usize;
    for (&count, &center) in hist.counts.iter().zip(&hist.centers) {
        seen += count;
        if seen as f64 / total as f64 >= percentile as f64 {
            return center;
        }
    }
    unreachable!("cumulative histogram mass never reached {percentile}")
}
