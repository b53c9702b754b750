//! Aggregate statistics over the retained piece volumes.
//!
//! All ratios fall back to zero when there are no pieces, so a degenerate
//! run produces an all-zero summary instead of NaNs.

use serde::Serialize;

/// Number of fixed-width histogram bins spanning `[0, max]`.
pub const HISTOGRAM_BINS: usize = 20;

/// Summary statistics over a set of piece volumes (mm³).
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Statistics {
    pub piece_count: usize,
    pub total: f64,
    pub mean: f64,
    /// Population standard deviation (divisor `n`).
    pub std_dev: f64,
    /// Coefficient of variation in percent. Lower means more uniform pieces.
    pub cv: f64,
    /// Element at index `n / 2` of the sorted volumes (upper median for even `n`).
    pub median: f64,
    pub max: f64,
    pub histogram: Histogram,
}

/// Computes [`Statistics`] for `volumes`. Input order does not matter.
#[must_use]
pub fn summarize(volumes: &[f64]) -> Statistics {
    let piece_count = volumes.len();
    if piece_count == 0 {
        return Statistics {
            histogram: Histogram::build(volumes, 0.0),
            ..Statistics::default()
        };
    }

    let mut sorted = volumes.to_vec();
    sorted.sort_by(f64::total_cmp);

    let total: f64 = sorted.iter().sum();
    #[allow(clippy::cast_precision_loss)]
    let n = piece_count as f64;
    let mean = total / n;
    let variance = sorted
        .iter()
        .map(|volume| (volume - mean).powi(2))
        .sum::<f64>()
        / n;
    let std_dev = variance.sqrt();
    let cv = if mean > 0.0 { std_dev / mean * 100.0 } else { 0.0 };
    let median = sorted[piece_count / 2];
    let max = sorted[piece_count - 1];

    Statistics {
        piece_count,
        total,
        mean,
        std_dev,
        cv,
        median,
        max,
        histogram: Histogram::build(&sorted, max),
    }
}

/// Fixed 20-bin histogram of piece volumes over `[0, max]`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Histogram {
    pub bin_size: f64,
    pub counts: Vec<usize>,
    /// Rounded `lower-upper` range of each bin in mm³.
    pub labels: Vec<String>,
}

impl Default for Histogram {
    fn default() -> Self {
        Self::build(&[], 0.0)
    }
}

impl Histogram {
    /// Buckets `volumes` into [`HISTOGRAM_BINS`] bins of width `max / 20`.
    ///
    /// The largest volume is clamped into the last bin.
    #[must_use]
    pub fn build(volumes: &[f64], max: f64) -> Self {
        #[allow(clippy::cast_precision_loss)]
        let bin_size = max / HISTOGRAM_BINS as f64;
        let mut counts = vec![0usize; HISTOGRAM_BINS];

        if bin_size > 0.0 {
            for volume in volumes {
                counts[bin_index(*volume, bin_size)] += 1;
            }
        } else if !volumes.is_empty() {
            // Every volume is zero-width here; keep the count invariant.
            counts[0] += volumes.len();
        }

        let labels = (0..HISTOGRAM_BINS)
            .map(|i| {
                #[allow(clippy::cast_precision_loss)]
                let (lower, upper) = (i as f64 * bin_size, (i + 1) as f64 * bin_size);
                format!("{}-{}", lower.round(), upper.round())
            })
            .collect();

        Self {
            bin_size,
            counts,
            labels,
        }
    }

    /// Total number of pieces across all bins.
    #[must_use]
    pub fn total(&self) -> usize {
        self.counts.iter().sum()
    }

    /// `(label, count)` pairs in bin order, as consumed by the chart.
    pub fn pairs(&self) -> impl Iterator<Item = (&str, usize)> {
        self.labels
            .iter()
            .map(String::as_str)
            .zip(self.counts.iter().copied())
    }
}

#[inline]
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn bin_index(volume: f64, bin_size: f64) -> usize {
    ((volume / bin_size).floor().max(0.0) as usize).min(HISTOGRAM_BINS - 1)
}
