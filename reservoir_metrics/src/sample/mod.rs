//! Bounded reservoirs of observed integers.
//!
//! A sample sees an unbounded stream of values and keeps a fixed number of
//! them around to answer statistical questions in bounded memory.

mod exp_decay;
mod uniform;

pub use exp_decay::{ExpDecaySample, DEFAULT_DECAY_ALPHA, RESCALE_THRESHOLD};
pub use uniform::UniformSample;

use crate::{Counted, Distribution};

/// Reservoir size used by the default histogram and timer samples
pub const DEFAULT_RESERVOIR_SIZE: usize = 1028;

/// A bounded reservoir of observations.
///
/// Statistics are computed over the values currently held. `count()` is the
/// number of updates since the last clear and is always at least `size()`.
pub trait Sample: Send + Sync + std::fmt::Debug {
    /// Forget every value and reset the count to zero
    fn clear(&self);

    /// Number of updates ever seen since the last clear
    fn count(&self) -> i64;

    /// Number of values currently held. Never more than the capacity.
    fn size(&self) -> usize;

    /// Observe a value
    fn update(&self, value: i64);

    /// A copy of the values currently held, in no particular order
    fn values(&self) -> Vec<i64>;

    /// An immutable copy of the held values and the current count
    fn snapshot(&self) -> SampleSnapshot;

    /// Smallest held value, or 0
    fn min(&self) -> i64 {
        min(&self.values())
    }

    /// Largest held value, or 0
    fn max(&self) -> i64 {
        max(&self.values())
    }

    /// Mean of the held values, or 0
    fn mean(&self) -> f64 {
        mean(&self.values())
    }

    /// Sum of the held values
    fn sum(&self) -> i64 {
        sum(&self.values())
    }

    /// Population standard deviation of the held values, or 0
    fn std_dev(&self) -> f64 {
        variance(&self.values()).sqrt()
    }

    /// Population variance of the held values, or 0
    fn variance(&self) -> f64 {
        variance(&self.values())
    }

    /// An arbitrary percentile of the held values, or 0
    fn percentile(&self, percentile: f64) -> f64 {
        self.snapshot().percentile(percentile)
    }

    /// Several percentiles of the held values
    fn percentiles(&self, percentiles: &[f64]) -> Vec<f64> {
        self.snapshot().percentiles(percentiles)
    }
}

/// The values a sample held at a point in time, sorted, plus its count.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SampleSnapshot {
    count: i64,
    sorted_values: Vec<i64>,
}

impl SampleSnapshot {
    /// Freeze `values` with the count of observations they were drawn from
    pub fn new(count: i64, mut values: Vec<i64>) -> Self {
        values.sort_unstable();
        Self {
            count,
            sorted_values: values,
        }
    }

    /// Number of values held
    pub fn size(&self) -> usize {
        self.sorted_values.len()
    }

    /// The held values in ascending order
    pub fn values(&self) -> &[i64] {
        &self.sorted_values
    }
}

impl Counted for SampleSnapshot {
    fn count(&self) -> i64 {
        self.count
    }
}

impl Distribution for SampleSnapshot {
    fn min(&self) -> i64 {
        self.sorted_values.first().copied().unwrap_or_default()
    }

    fn max(&self) -> i64 {
        self.sorted_values.last().copied().unwrap_or_default()
    }

    fn mean(&self) -> f64 {
        mean(&self.sorted_values)
    }

    fn sum(&self) -> i64 {
        sum(&self.sorted_values)
    }

    fn std_dev(&self) -> f64 {
        self.variance().sqrt()
    }

    fn variance(&self) -> f64 {
        variance(&self.sorted_values)
    }

    fn percentile(&self, percentile: f64) -> f64 {
        sorted_percentile(&self.sorted_values, percentile)
    }

    fn percentiles(&self, percentiles: &[f64]) -> Vec<f64> {
        percentiles
            .iter()
            .map(|percentile| sorted_percentile(&self.sorted_values, *percentile))
            .collect()
    }
}

pub(crate) fn min(values: &[i64]) -> i64 {
    values.iter().copied().min().unwrap_or_default()
}

pub(crate) fn max(values: &[i64]) -> i64 {
    values.iter().copied().max().unwrap_or_default()
}

pub(crate) fn sum(values: &[i64]) -> i64 {
    values.iter().fold(0_i64, |sum, value| sum.wrapping_add(*value))
}

pub(crate) fn mean(values: &[i64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().map(|value| *value as f64).sum::<f64>() / values.len() as f64
}

pub(crate) fn variance(values: &[i64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    let mean = mean(values);
    values
        .iter()
        .map(|value| {
            let deviation = *value as f64 - mean;
            deviation * deviation
        })
        .sum::<f64>()
        / values.len() as f64
}

/// Linear interpolation between the two closest ranks. Ranks are 1-based and
/// the position of percentile p over n values is p * (n + 1). A NaN
/// percentile reads as the smallest value.
pub(crate) fn sorted_percentile(sorted_values: &[i64], percentile: f64) -> f64 {
    let size = sorted_values.len();
    if size == 0 {
        return 0.0;
    }
    let position = percentile * (size + 1) as f64;
    if position.is_nan() || position < 1.0 {
        sorted_values[0] as f64
    } else if position >= size as f64 {
        sorted_values[size - 1] as f64
    } else {
        let rank = position.floor();
        let lower = sorted_values[rank as usize - 1] as f64;
        let upper = sorted_values[rank as usize] as f64;
        lower + (position - rank) * (upper - lower)
    }
}
