use std::{
    sync::atomic::{AtomicBool, AtomicI64},
    time::Instant,
};

use crate::{Counted, Ewma, Instrument, Labels, Rates};

const ORDERING: std::sync::atomic::Ordering = std::sync::atomic::Ordering::Relaxed;

/// Counts events and tracks their rate as 1, 5 and 15 minute moving averages
/// plus an overall mean rate.
///
/// Marks and reads fold any elapsed tick periods into the moving averages.
/// Meters obtained through a [`crate::MeterTicker`] or a registry are also
/// ticked by the shared ticker task, which keeps decay current between reads.
#[derive(Debug)]
pub struct Meter {
    count: AtomicI64,
    rate1: Ewma,
    rate5: Ewma,
    rate15: Ewma,
    start_time: Instant,
    stopped: AtomicBool,
    labels: Labels,
}

impl Default for Meter {
    fn default() -> Self {
        Self::new(Labels::default())
    }
}

impl Meter {
    /// A meter starting now
    pub fn new(labels: Labels) -> Self {
        Self::new_at(labels, Instant::now())
    }

    pub(crate) fn new_at(labels: Labels, now: Instant) -> Self {
        Self {
            count: AtomicI64::new(0),
            rate1: Ewma::for_window_minutes(1.0, now),
            rate5: Ewma::for_window_minutes(5.0, now),
            rate15: Ewma::for_window_minutes(15.0, now),
            start_time: now,
            stopped: AtomicBool::new(false),
            labels,
        }
    }

    /// Record `n` events
    #[inline]
    pub fn mark(&self, n: i64) {
        self.mark_at(n, Instant::now())
    }

    pub(crate) fn mark_at(&self, n: i64, now: Instant) {
        self.count.fetch_add(n, ORDERING);
        self.rate1.update_at(n, now);
        self.rate5.update_at(n, now);
        self.rate15.update_at(n, now);
    }

    /// Advance the moving averages through elapsed tick periods
    pub fn tick(&self) {
        self.tick_at(Instant::now())
    }

    pub(crate) fn tick_at(&self, now: Instant) {
        self.rate1.tick_at(now);
        self.rate5.tick_at(now);
        self.rate15.tick_at(now);
    }

    /// Stop being ticked by a [`crate::MeterTicker`]. The meter still counts.
    pub fn stop(&self) {
        self.stopped.store(true, ORDERING);
    }

    /// Undo [`Meter::stop`] so a ticker advances this meter again
    pub(crate) fn resume(&self) {
        self.stopped.store(false, ORDERING);
    }

    /// True once [`Meter::stop`] has been called
    pub fn is_stopped(&self) -> bool {
        self.stopped.load(ORDERING)
    }

    pub(crate) fn rate_mean_at(&self, now: Instant) -> f64 {
        let elapsed = now.saturating_duration_since(self.start_time).as_secs_f64();
        if elapsed <= 0.0 {
            return 0.0;
        }
        self.count() as f64 / elapsed
    }

    pub(crate) fn snapshot_at(&self, now: Instant) -> MeterSnapshot {
        MeterSnapshot {
            count: self.count(),
            rate1: self.rate1.rate_at(now),
            rate5: self.rate5.rate_at(now),
            rate15: self.rate15.rate_at(now),
            rate_mean: self.rate_mean_at(now),
            labels: self.labels(),
        }
    }
}

impl Counted for Meter {
    fn count(&self) -> i64 {
        self.count.load(ORDERING)
    }
}

impl Rates for Meter {
    fn rate1(&self) -> f64 {
        self.rate1.rate()
    }

    fn rate5(&self) -> f64 {
        self.rate5.rate()
    }

    fn rate15(&self) -> f64 {
        self.rate15.rate()
    }

    fn rate_mean(&self) -> f64 {
        self.rate_mean_at(Instant::now())
    }
}

impl Instrument for Meter {
    type Snapshot = MeterSnapshot;

    fn labels(&self) -> Labels {
        self.labels.clone()
    }

    fn snapshot(&self) -> MeterSnapshot {
        self.snapshot_at(Instant::now())
    }

    fn with_labels(&self, labels: &Labels) -> MeterSnapshot {
        self.snapshot().with_labels(labels)
    }
}

/// A meter's count and rates at a point in time
#[derive(Debug, Clone, PartialEq)]
pub struct MeterSnapshot {
    count: i64,
    rate1: f64,
    rate5: f64,
    rate15: f64,
    rate_mean: f64,
    labels: Labels,
}

impl Counted for MeterSnapshot {
    fn count(&self) -> i64 {
        self.count
    }
}

impl Rates for MeterSnapshot {
    fn rate1(&self) -> f64 {
        self.rate1
    }

    fn rate5(&self) -> f64 {
        self.rate5
    }

    fn rate15(&self) -> f64 {
        self.rate15
    }

    fn rate_mean(&self) -> f64 {
        self.rate_mean
    }
}

impl Instrument for MeterSnapshot {
    type Snapshot = MeterSnapshot;

    fn labels(&self) -> Labels {
        self.labels.clone()
    }

    fn snapshot(&self) -> MeterSnapshot {
        self.clone()
    }

    fn with_labels(&self, labels: &Labels) -> MeterSnapshot {
        let mut snapshot = self.clone();
        snapshot.labels.merge(labels);
        snapshot
    }
}
