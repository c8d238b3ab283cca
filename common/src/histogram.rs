use itertools::{Itertools, MinMaxResult};
use thiserror::Error;

#[derive(Error, Debug, PartialEq)]
pub enum HistogramError {
    #[error("No samples to bin")]
    EmptySample,
    #[error("Samples contain NaN or infinite values")]
    NonFinite,
    #[error("Invalid logarithmic range [{min}, {max}]")]
    NonPositiveRange { min: f64, max: f64 },
    #[error("Histogram needs at least one bin")]
    ZeroBins,
}

/// Evenly spaced edges between `first` and `last`, both included exactly.
fn linspace(first: f64, last: f64, count: usize) -> Vec<f64> {
    let div = (count - 1) as f64;
    let delta = last - first;
    let mut edges = (0..count)
        .map(|i| first + delta * (i as f64 / div))
        .collect::<Vec<_>>();
    edges[count - 1] = last;
    edges
}

fn min_max(values: &[f64]) -> Result<(f64, f64), HistogramError> {
    if values.iter().any(|v| !v.is_finite()) {
        return Err(HistogramError::NonFinite);
    }
    match values.iter().copied().minmax_by(f64::total_cmp) {
        MinMaxResult::NoElements => Err(HistogramError::EmptySample),
        MinMaxResult::OneElement(v) => Ok((v, v)),
        MinMaxResult::MinMax(min, max) => Ok((min, max)),
    }
}

/// `bins + 1` evenly spaced edges covering `values`.
///
/// A sample whose values are all equal gets the range `[v - 0.5, v + 0.5]`.
pub fn linear_edges(values: &[f64], bins: usize) -> Result<Vec<f64>, HistogramError> {
    if bins == 0 {
        return Err(HistogramError::ZeroBins);
    }
    let (min, max) = min_max(values)?;
    let (first, last) = if min == max {
        (min - 0.5, max + 0.5)
    } else {
        (min, max)
    };
    Ok(linspace(first, last, bins + 1))
}

/// `count` edges forming a geometric progression from `first` to `last`.
pub fn log_edges(first: f64, last: f64, count: usize) -> Result<Vec<f64>, HistogramError> {
    if count < 2 {
        return Err(HistogramError::ZeroBins);
    }
    if !(first > 0.0 && last > first && last.is_finite()) {
        return Err(HistogramError::NonPositiveRange {
            min: first,
            max: last,
        });
    }
    let exponents = linspace(first.log10(), last.log10(), count);
    let mut edges = exponents
        .into_iter()
        .map(|e| 10f64.powf(e))
        .collect::<Vec<_>>();
    edges[0] = first;
    edges[count - 1] = last;
    Ok(edges)
}

#[derive(Debug, Clone, PartialEq)]
pub struct LogHistogram {
    pub edges: Vec<f64>,
    pub counts: Vec<u64>,
}

impl LogHistogram {
    /// Bins `values` into `bins` logarithmically spaced buckets.
    ///
    /// The bounds come from a linear binning of the same values. When that
    /// binning had to widen a single-valued sample below zero, the value is
    /// instead centered on half a decade either side.
    pub fn from_values(values: &[f64], bins: usize) -> Result<Self, HistogramError> {
        let linear = linear_edges(values, bins)?;
        let (mut first, mut last) = (linear[0], linear[linear.len() - 1]);

        let (min, max) = min_max(values)?;
        if min == max && first <= 0.0 && min > 0.0 {
            let half_decade = 10f64.sqrt();
            first = min / half_decade;
            last = min * half_decade;
        }

        let edges = log_edges(first, last, linear.len())?;
        let counts = count_into(&edges, values);
        Ok(Self { edges, counts })
    }

    pub fn bins(&self) -> usize {
        self.counts.len()
    }

    pub fn total(&self) -> u64 {
        self.counts.iter().sum()
    }

    pub fn max_count(&self) -> u64 {
        self.counts.iter().copied().max().unwrap_or(0)
    }

    /// `(lower edge, upper edge, count)` for every bin.
    pub fn iter_bins(&self) -> impl Iterator<Item = (f64, f64, u64)> + '_ {
        self.edges
            .iter()
            .tuple_windows()
            .zip(&self.counts)
            .map(|((lo, hi), count)| (*lo, *hi, *count))
    }
}

/// Bins are half open `[lo, hi)`, except the last which includes its upper edge.
fn count_into(edges: &[f64], values: &[f64]) -> Vec<u64> {
    let bins = edges.len() - 1;
    let (first, last) = (edges[0], edges[bins]);
    let mut counts = vec![0; bins];
    for &v in values {
        if v < first || v > last {
            continue;
        }
        let idx = (edges.partition_point(|e| *e <= v) - 1).min(bins - 1);
        counts[idx] += 1;
    }
    counts
}
