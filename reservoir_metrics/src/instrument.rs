//! Read-only capabilities shared by live metrics and their snapshots.
//!
//! Live metrics carry the mutators as inherent methods. Snapshots only
//! implement these traits, so an exporter holding a snapshot has no way to
//! write to it.

use crate::Labels;

/// A metric that can be frozen into a point-in-time copy.
pub trait Instrument {
    /// The immutable point-in-time copy of this metric.
    type Snapshot: Instrument<Snapshot = Self::Snapshot> + Clone;

    /// A copy of the metric's labels.
    fn labels(&self) -> Labels;

    /// Freeze the current state and labels.
    fn snapshot(&self) -> Self::Snapshot;

    /// A snapshot carrying these labels overlaid on the metric's own.
    /// The receiver is never changed.
    fn with_labels(&self, labels: &Labels) -> Self::Snapshot;
}

/// Something that counts
pub trait Counted {
    /// The current count
    fn count(&self) -> i64;
}

/// Something with a single current value, like a gauge
pub trait Valued {
    /// Type of the value
    type Value;

    /// The current value
    fn value(&self) -> Self::Value;
}

/// Statistics over a distribution of observed integers.
///
/// Every statistic is computed over the values currently held, and is 0 when
/// nothing is held. `count()` is the number of observations ever made, which
/// can be larger than the number of values held.
pub trait Distribution: Counted {
    /// Smallest held value
    fn min(&self) -> i64;
    /// Largest held value
    fn max(&self) -> i64;
    /// Arithmetic mean of the held values
    fn mean(&self) -> f64;
    /// Sum of the held values
    fn sum(&self) -> i64;
    /// Population standard deviation of the held values
    fn std_dev(&self) -> f64;
    /// Population variance of the held values
    fn variance(&self) -> f64;
    /// An arbitrary percentile in [0, 1] of the held values
    fn percentile(&self, percentile: f64) -> f64;
    /// Several percentiles at once. This sorts the held values only once.
    fn percentiles(&self, percentiles: &[f64]) -> Vec<f64>;
}

/// Per-second event rates
pub trait Rates {
    /// One-minute moving average rate
    fn rate1(&self) -> f64;
    /// Five-minute moving average rate
    fn rate5(&self) -> f64;
    /// Fifteen-minute moving average rate
    fn rate15(&self) -> f64;
    /// Count divided by the seconds since the metric was created
    fn rate_mean(&self) -> f64;
}
