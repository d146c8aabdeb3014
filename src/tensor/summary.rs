//! Per-dimension summaries shared by every frame.
//!
//! Axis extents come from the whole cube so all frames share axes; the bin
//! grid is sized so the final iteration's posterior spans roughly
//! `final_bins` bins, and the histogram y-limit is the final posterior's peak
//! density with 10% headroom.

use ndarray::s;

use super::SampleTensor;

/// Cap on the shared bin grid when early, wide samples dwarf the final
/// posterior's width.
const MAX_BINS: usize = 2048;

fn min_max<I>(values: I) -> (f64, f64)
where
    I: IntoIterator<Item = f64>,
{
    let mut lo = f64::INFINITY;
    let mut hi = f64::NEG_INFINITY;
    for v in values {
        lo = lo.min(v);
        hi = hi.max(v);
    }
    (lo, hi)
}

/// Fixed axis extent, bin edges, and histogram y-limit for one dimension.
#[derive(Debug, Clone, PartialEq)]
pub struct DimensionSummary {
    /// Lower axis bound over the whole cube.
    pub lo: f64,
    /// Upper axis bound over the whole cube.
    pub hi: f64,
    /// Shared histogram bin edges (`bins + 1` entries, uniform).
    pub edges: Vec<f64>,
    /// Histogram y-limit: 1.1x the final iteration's peak density.
    pub ymax: f64,
}

impl DimensionSummary {
    /// Number of histogram bins.
    #[must_use]
    pub fn bins(&self) -> usize {
        self.edges.len().saturating_sub(1)
    }
}

/// Compute the per-dimension summaries for a tensor.
#[must_use]
pub fn summarize(tensor: &SampleTensor, final_bins: usize) -> Vec<DimensionSummary> {
    let last = tensor.iterations() - 1;
    (0..tensor.dimensions())
        .map(|d| {
            let all = tensor.cube().slice(s![.., .., d]);
            let (mut lo, mut hi) = min_max(all.iter().copied());
            if hi - lo <= f64::EPSILON {
                // Degenerate dimension: inflate so the axis range stays valid.
                lo -= 0.5;
                hi += 0.5;
            }

            let finals = tensor.cube().slice(s![last, .., d]);
            let (final_lo, final_hi) = min_max(finals.iter().copied());
            let dx = (final_hi - final_lo) / final_bins as f64;

            let bins = if dx > 0.0 {
                (((hi - lo) / dx).floor() as usize).clamp(1, MAX_BINS)
            } else {
                final_bins
            };

            let width = (hi - lo) / bins as f64;
            let edges: Vec<f64> = (0..=bins).map(|j| lo + width * j as f64).collect();

            let final_density = histogram_density(finals.iter().copied(), &edges);
            let peak = final_density.iter().copied().fold(0.0f64, f64::max);
            let ymax = if peak > 0.0 { 1.1 * peak } else { 1.0 };

            DimensionSummary {
                lo,
                hi,
                edges,
                ymax,
            }
        })
        .collect()
}

/// Normalized histogram over the given edges: each bin holds
/// `count / (total_in_range * bin_width)`, so the area sums to one.
#[must_use]
pub fn histogram_density<I>(values: I, edges: &[f64]) -> Vec<f64>
where
    I: IntoIterator<Item = f64>,
{
    let bins = edges.len().saturating_sub(1);
    let mut counts = vec![0usize; bins];
    if bins == 0 {
        return Vec::new();
    }

    let lo = edges[0];
    let hi = edges[bins];
    let mut total = 0usize;

    for v in values {
        if v < lo || v > hi {
            continue;
        }
        // Last edge is inclusive, matching the usual histogram convention.
        let idx = if v >= hi {
            bins - 1
        } else {
            edges.partition_point(|e| *e <= v).saturating_sub(1).min(bins - 1)
        };
        counts[idx] += 1;
        total += 1;
    }

    if total == 0 {
        return vec![0.0; bins];
    }

    counts
        .iter()
        .zip(edges.windows(2))
        .map(|(&c, pair)| {
            let width = pair[1] - pair[0];
            if width > 0.0 {
                c as f64 / (total as f64 * width)
            } else {
                0.0
            }
        })
        .collect()
}


#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        /// Histogram area is one whenever any value lands in range.
        #[test]
        fn prop_density_normalized(
            values in proptest::collection::vec(-1.0f64..1.0, 1..200),
            bins in 1usize..64,
        ) {
            let edges: Vec<f64> = (0..=bins)
                .map(|j| -1.0 + 2.0 * j as f64 / bins as f64)
                .collect();
            let density = histogram_density(values, &edges);
            let area: f64 = density
                .iter()
                .zip(edges.windows(2))
                .map(|(d, pair)| d * (pair[1] - pair[0]))
                .sum();
            prop_assert!((area - 1.0).abs() < 1e-6);
        }
    }
}
