use std::{
    sync::Arc,
    time::{Duration, Instant},
};

use crate::{
    Counted, Distribution, Histogram, HistogramSnapshot, Instrument, Labels, Meter, MeterSnapshot,
    Rates,
};

/// Times things: a histogram of durations in nanoseconds plus a meter of how
/// often something was timed.
#[derive(Debug)]
pub struct Timer {
    histogram: Histogram,
    meter: Arc<Meter>,
    labels: Labels,
}

impl Default for Timer {
    fn default() -> Self {
        Self::new(Labels::default())
    }
}

impl Timer {
    /// A timer over the default forward-decaying histogram
    pub fn new(labels: Labels) -> Self {
        Self::with_histogram(Histogram::default(), labels)
    }

    /// A timer recording into a histogram you configured
    pub fn with_histogram(histogram: Histogram, labels: Labels) -> Self {
        Self {
            histogram,
            meter: Arc::new(Meter::default()),
            labels,
        }
    }

    /// Record one timed event
    #[inline]
    pub fn update(&self, duration: Duration) {
        self.histogram
            .update(i64::try_from(duration.as_nanos()).unwrap_or(i64::MAX));
        self.meter.mark(1);
    }

    /// Record the time since `start`
    pub fn update_since(&self, start: Instant) {
        self.update(start.elapsed())
    }

    /// Run `action` and record how long it took.
    pub fn time<T>(&self, action: impl FnOnce() -> T) -> T {
        let start = Instant::now();
        let result = action();
        self.update_since(start);
        result
    }

    /// Start timing now. The elapsed time is recorded when the guard drops.
    ///
    /// ```
    /// # use reservoir_metrics::{Counted, Timer};
    /// let timer = Timer::default();
    /// {
    ///     let _timing = timer.start();
    ///     // the work to time
    /// }
    /// assert_eq!(1, timer.count());
    /// ```
    pub fn start(&self) -> TimerGuard<'_> {
        TimerGuard {
            timer: self,
            start: Instant::now(),
        }
    }

    /// Forget recorded durations. The rate meter keeps counting.
    pub fn clear(&self) {
        self.histogram.clear()
    }

    /// Stop the rate meter from being ticked
    pub fn stop(&self) {
        self.meter.stop()
    }

    /// The meter of timed events, for sharing with a ticker
    pub fn meter(&self) -> &Arc<Meter> {
        &self.meter
    }

    /// The histogram of durations
    pub fn histogram(&self) -> &Histogram {
        &self.histogram
    }
}

/// Records the time since it was created into its timer on drop.
#[derive(Debug)]
pub struct TimerGuard<'a> {
    timer: &'a Timer,
    start: Instant,
}

impl TimerGuard<'_> {
    /// Time elapsed so far
    pub fn elapsed(&self) -> Duration {
        self.start.elapsed()
    }
}

impl Drop for TimerGuard<'_> {
    fn drop(&mut self) {
        self.timer.update_since(self.start)
    }
}

impl Counted for Timer {
    fn count(&self) -> i64 {
        self.histogram.count()
    }
}

impl Distribution for Timer {
    fn min(&self) -> i64 {
        self.histogram.min()
    }

    fn max(&self) -> i64 {
        self.histogram.max()
    }

    fn mean(&self) -> f64 {
        self.histogram.mean()
    }

    fn sum(&self) -> i64 {
        self.histogram.sum()
    }

    fn std_dev(&self) -> f64 {
        self.histogram.std_dev()
    }

    fn variance(&self) -> f64 {
        self.histogram.variance()
    }

    fn percentile(&self, percentile: f64) -> f64 {
        self.histogram.percentile(percentile)
    }

    fn percentiles(&self, percentiles: &[f64]) -> Vec<f64> {
        self.histogram.percentiles(percentiles)
    }
}

impl Rates for Timer {
    fn rate1(&self) -> f64 {
        self.meter.rate1()
    }

    fn rate5(&self) -> f64 {
        self.meter.rate5()
    }

    fn rate15(&self) -> f64 {
        self.meter.rate15()
    }

    fn rate_mean(&self) -> f64 {
        self.meter.rate_mean()
    }
}

impl Instrument for Timer {
    type Snapshot = TimerSnapshot;

    fn labels(&self) -> Labels {
        self.labels.clone()
    }

    fn snapshot(&self) -> TimerSnapshot {
        TimerSnapshot {
            histogram: self.histogram.snapshot(),
            meter: self.meter.snapshot(),
            labels: self.labels(),
        }
    }

    fn with_labels(&self, labels: &Labels) -> TimerSnapshot {
        self.snapshot().with_labels(labels)
    }
}

/// A timer's durations and rates at a point in time
#[derive(Debug, Clone, PartialEq)]
pub struct TimerSnapshot {
    histogram: HistogramSnapshot,
    meter: MeterSnapshot,
    labels: Labels,
}

impl TimerSnapshot {
    /// The frozen duration histogram
    pub fn histogram(&self) -> &HistogramSnapshot {
        &self.histogram
    }

    /// The frozen rate meter
    pub fn meter(&self) -> &MeterSnapshot {
        &self.meter
    }
}

impl Counted for TimerSnapshot {
    fn count(&self) -> i64 {
        self.histogram.count()
    }
}

impl Distribution for TimerSnapshot {
    fn min(&self) -> i64 {
        self.histogram.min()
    }

    fn max(&self) -> i64 {
        self.histogram.max()
    }

    fn mean(&self) -> f64 {
        self.histogram.mean()
    }

    fn sum(&self) -> i64 {
        self.histogram.sum()
    }

    fn std_dev(&self) -> f64 {
        self.histogram.std_dev()
    }

    fn variance(&self) -> f64 {
        self.histogram.variance()
    }

    fn percentile(&self, percentile: f64) -> f64 {
        self.histogram.percentile(percentile)
    }

    fn percentiles(&self, percentiles: &[f64]) -> Vec<f64> {
        self.histogram.percentiles(percentiles)
    }
}

impl Rates for TimerSnapshot {
    fn rate1(&self) -> f64 {
        self.meter.rate1()
    }

    fn rate5(&self) -> f64 {
        self.meter.rate5()
    }

    fn rate15(&self) -> f64 {
        self.meter.rate15()
    }

    fn rate_mean(&self) -> f64 {
        self.meter.rate_mean()
    }
}

impl Instrument for TimerSnapshot {
    type Snapshot = TimerSnapshot;

    fn labels(&self) -> Labels {
        self.labels.clone()
    }

    fn snapshot(&self) -> TimerSnapshot {
        self.clone()
    }

    fn with_labels(&self, labels: &Labels) -> TimerSnapshot {
        let mut snapshot = self.clone();
        snapshot.labels.merge(labels);
        snapshot
    }
}

#[cfg(test)]
mod test {
    use std::time::{Duration, Instant};

    use crate::{Counted, Distribution, Instrument, Labels, Rates, Timer};

    #[test]
    fn update_feeds_histogram_and_meter() {
        let timer = Timer::default();
        timer.update(Duration::from_millis(1));
        timer.update(Duration::from_millis(3));
        assert_eq!(2, timer.count());
        assert_eq!(2, timer.meter().count());
        assert_eq!(1_000_000, timer.min());
        assert_eq!(3_000_000, timer.max());
        assert_eq!(2_000_000.0, timer.mean());
        assert!(timer.rate_mean() > 0.0);
    }

    #[test]
    fn time_runs_the_action() {
        let timer = Timer::default();
        let answer = timer.time(|| {
            std::thread::sleep(Duration::from_millis(2));
            42
        });
        assert_eq!(42, answer);
        assert_eq!(1, timer.count());
        assert!(timer.max() >= 2_000_000);
    }

    #[test]
    fn guard_records_on_drop() {
        let timer = Timer::default();
        {
            let guard = timer.start();
            std::thread::sleep(Duration::from_millis(1));
            assert!(guard.elapsed() >= Duration::from_millis(1));
            assert_eq!(0, timer.count());
        }
        assert_eq!(1, timer.count());
    }

    #[test]
    fn update_since() {
        let timer = Timer::default();
        timer.update_since(Instant::now() - Duration::from_millis(5));
        assert!(timer.min() >= 5_000_000);
    }

    #[test]
    fn snapshot_is_frozen() {
        let timer = Timer::new(Labels::new([("route", "/")]));
        timer.update(Duration::from_nanos(10));
        let snapshot = timer.snapshot();
        timer.update(Duration::from_nanos(20));
        assert_eq!(1, snapshot.count());
        assert_eq!(10, snapshot.max());
        assert_eq!(1, snapshot.meter().count());
        assert_eq!(vec![10.0], snapshot.percentiles(&[0.5]));
        assert_eq!(Some("/"), snapshot.labels().get("route"));
        assert!(snapshot.rate1() >= 0.0);
    }

    #[test]
    fn huge_durations_saturate() {
        let timer = Timer::default();
        timer.update(Duration::MAX);
        assert_eq!(i64::MAX, timer.max());
    }

    #[test]
    fn clear_keeps_rate() {
        let timer = Timer::default();
        timer.update(Duration::from_nanos(1));
        timer.clear();
        assert_eq!(0, timer.count());
        assert_eq!(1, timer.meter().count());
    }
}
