//! Histogram binning of raw values.

use serde::Serialize;

/// Bin count used when a dataset does not specify one.
pub const DEFAULT_BIN_COUNT: usize = 10;

/// Upper bound on the number of equal-width bins.
pub const MAX_BIN_COUNT: usize = 1_000;

/// Separator between the two edges in a bin label.
const LABEL_SEPARATOR: &str = " - ";

/// One histogram bin.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Bin {
    /// Both edges with two decimals, e.g. `"0.00 - 5.00"`.
    pub range_label: String,
    /// Lower edge (inclusive).
    pub start: f64,
    /// Upper edge (exclusive, except for the last bin).
    pub end: f64,
    /// Values falling in the bin.
    pub count: usize,
}

/// Bin `values` into a frequency table.
///
/// Non-finite values are ignored. When `explicit_edges` holds at least two
/// finite edges they define the bins, widened to cover the observed range;
/// otherwise `bin_count` equal-width bins span `[min, max]`, with the count
/// clamped to `1..=MAX_BIN_COUNT`. Bins are
/// half-open except the last, which also holds values equal to its upper
/// edge. If every value is identical a single bin holds them all.
#[must_use]
pub fn bin(values: &[f64], explicit_edges: Option<&[f64]>, bin_count: usize) -> Vec<Bin> {
    let finite: Vec<f64> = values.iter().copied().filter(|v| v.is_finite()).collect();
    let Some((min, max)) = bounds(&finite) else {
        return Vec::new();
    };

    let edges = explicit_edges
        .and_then(|edges| widened_edges(edges, min, max))
        .unwrap_or_else(|| equal_width_edges(min, max, bin_count));

    let mut counts = vec![0usize; edges.len() - 1];
    for &value in &finite {
        if let Some(index) = bin_index(&edges, value) {
            counts[index] += 1;
        }
    }

    edges
        .windows(2)
        .zip(counts)
        .map(|(pair, count)| Bin {
            range_label: format!("{:.2}{LABEL_SEPARATOR}{:.2}", pair[0], pair[1]),
            start: pair[0],
            end: pair[1],
            count,
        })
        .collect()
}

fn bounds(values: &[f64]) -> Option<(f64, f64)> {
    let first = *values.first()?;
    Some(
        values
            .iter()
            .fold((first, first), |(lo, hi), &v| (lo.min(v), hi.max(v))),
    )
}

fn widened_edges(edges: &[f64], min: f64, max: f64) -> Option<Vec<f64>> {
    let mut sorted: Vec<f64> = edges.iter().copied().filter(|e| e.is_finite()).collect();
    if sorted.len() < 2 {
        return None;
    }
    sorted.sort_by(f64::total_cmp);

    if min < sorted[0] {
        sorted.insert(0, min);
    }
    if sorted.last().is_some_and(|&last| max > last) {
        sorted.push(max);
    }
    Some(sorted)
}

#[allow(clippy::cast_precision_loss)]
fn equal_width_edges(min: f64, max: f64, bin_count: usize) -> Vec<f64> {
    // Zero-width range: one bin holds everything.
    if max <= min {
        return vec![min, max];
    }

    let count = bin_count.clamp(1, MAX_BIN_COUNT);
    // Interpolated so `max - min` is never formed; it overflows for wide ranges.
    (0..=count)
        .map(|i| {
            let t = i as f64 / count as f64;
            min * (1.0 - t) + max * t
        })
        .collect()
}

fn bin_index(edges: &[f64], value: f64) -> Option<usize> {
    let last_bin = edges.len().checked_sub(2)?;
    if let Some(index) = edges
        .windows(2)
        .position(|pair| pair[0] <= value && value < pair[1])
    {
        return Some(index);
    }
    // Closed at the very top.
    (Some(&value) == edges.last()).then_some(last_bin)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn counts(bins: &[Bin]) -> Vec<usize> {
        bins.iter().map(|b| b.count).collect()
    }

    #[test]
    fn equal_width_bins_cover_range() {
        let values: Vec<f64> = (1..=10).map(f64::from).collect();
        let bins = bin(&values, None, 5);
        assert_eq!(bins.len(), 5);
        for b in &bins {
            assert!((b.end - b.start - 1.8).abs() < 1e-9, "width was {}", b.end - b.start);
        }
        assert!((bins[0].start - 1.0).abs() < f64::EPSILON);
        assert!((bins[4].end - 10.0).abs() < 1e-9);
        assert_eq!(counts(&bins).iter().sum::<usize>(), 10);
    }

    #[test]
    fn maximum_lands_in_last_bin() {
        let values: Vec<f64> = (1..=10).map(f64::from).collect();
        let bins = bin(&values, None, 5);
        assert_eq!(counts(&bins), vec![2, 2, 2, 2, 2]);
    }

    #[test]
    fn explicit_edges_close_top_edge() {
        let bins = bin(&[1.0, 6.0, 10.0], Some(&[0.0, 5.0, 10.0]), DEFAULT_BIN_COUNT);
        assert_eq!(bins.len(), 2);
        assert_eq!(bins[0].range_label, "0.00 - 5.00");
        assert_eq!(bins[0].count, 1);
        assert_eq!(bins[1].range_label, "5.00 - 10.00");
        assert_eq!(bins[1].count, 2);
    }

    #[test]
    fn explicit_edges_are_sorted_and_widened() {
        let bins = bin(&[-3.0, 4.0, 25.0], Some(&[10.0, 0.0]), DEFAULT_BIN_COUNT);
        let edges: Vec<(f64, f64)> = bins.iter().map(|b| (b.start, b.end)).collect();
        assert_eq!(edges, vec![(-3.0, 0.0), (0.0, 10.0), (10.0, 25.0)]);
        assert_eq!(counts(&bins), vec![1, 1, 1]);
    }

    #[test]
    fn too_few_explicit_edges_fall_back_to_equal_width() {
        let bins = bin(&[0.0, 10.0], Some(&[5.0]), 2);
        assert_eq!(bins.len(), 2);
        assert_eq!(counts(&bins), vec![1, 1]);
    }

    #[test]
    fn non_finite_values_are_ignored() {
        let bins = bin(&[f64::NAN, 1.0, f64::INFINITY, 3.0], None, 2);
        assert_eq!(counts(&bins).iter().sum::<usize>(), 2);
    }

    #[test]
    fn empty_input_yields_no_bins() {
        assert!(bin(&[], None, DEFAULT_BIN_COUNT).is_empty());
        assert!(bin(&[f64::NAN], None, DEFAULT_BIN_COUNT).is_empty());
    }

    #[test]
    fn identical_values_form_single_bin() {
        let bins = bin(&[5.0, 5.0, 5.0], None, DEFAULT_BIN_COUNT);
        assert_eq!(bins.len(), 1);
        assert_eq!(bins[0].count, 3);
        assert_eq!(bins[0].range_label, "5.00 - 5.00");
    }

    #[test]
    fn huge_bin_count_is_clamped() {
        let bins = bin(&[1.0, 2.0], None, usize::MAX);
        assert_eq!(bins.len(), MAX_BIN_COUNT);
        assert_eq!(counts(&bins).iter().sum::<usize>(), 2);
    }

    #[test]
    fn extreme_range_keeps_every_value() {
        let values = [-1e308, 0.0, 1e308];
        let bins = bin(&values, None, DEFAULT_BIN_COUNT);
        assert_eq!(bins.len(), DEFAULT_BIN_COUNT);
        assert!(bins.iter().all(|b| b.start.is_finite() && b.end.is_finite()));
        assert_eq!(counts(&bins).iter().sum::<usize>(), values.len());
        assert_eq!(bins[0].count, 1);
        assert_eq!(bins[DEFAULT_BIN_COUNT - 1].count, 1);
    }

    #[test]
    fn zero_bin_count_is_treated_as_one() {
        let bins = bin(&[1.0, 2.0, 3.0], None, 0);
        assert_eq!(bins.len(), 1);
        assert_eq!(bins[0].count, 3);
    }
}
