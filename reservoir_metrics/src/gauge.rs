use std::sync::atomic::{AtomicI64, AtomicU64};

use crate::{Instrument, Labels, Valued};

const ORDERING: std::sync::atomic::Ordering = std::sync::atomic::Ordering::Relaxed;

/// A function that produces a gauge's value on every read
pub type ValueFunction<T> = Box<dyn Fn() -> T + Send + Sync>;

enum Source<TStored, T> {
    Stored(TStored),
    Function(ValueFunction<T>),
}

impl<TStored: std::fmt::Debug, T> std::fmt::Debug for Source<TStored, T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Stored(stored) => f.debug_tuple("Stored").field(stored).finish(),
            Self::Function(_) => f.debug_tuple("Function").finish(),
        }
    }
}

/// A gauge holds a 64 bit signed value that you set arbitrarily.
///
/// Gauges have no clear: you update them to whatever the value should be.
/// A functional gauge calls its function on each read instead of holding a
/// value, which is handy for numbers that something else already tracks.
///
/// This never blocks. Internal mutability is achieved via platform atomics.
#[derive(Debug)]
pub struct Gauge {
    source: Source<AtomicI64, i64>,
    labels: Labels,
}

impl Default for Gauge {
    fn default() -> Self {
        Self::new(Labels::default())
    }
}

impl Gauge {
    /// A gauge holding 0
    pub fn new(labels: Labels) -> Self {
        Self {
            source: Source::Stored(AtomicI64::new(0)),
            labels,
        }
    }

    /// A gauge that reads its value from `value` every time it is asked.
    /// Nothing is cached.
    pub fn functional(value: impl Fn() -> i64 + Send + Sync + 'static, labels: Labels) -> Self {
        Self {
            source: Source::Function(Box::new(value)),
            labels,
        }
    }

    /// True for gauges made with [`Gauge::functional`]
    pub fn is_functional(&self) -> bool {
        matches!(self.source, Source::Function(_))
    }

    /// Replace the gauge's value.
    ///
    /// # Panics
    ///
    /// Functional gauges have no value to replace; updating one is a
    /// programming error and panics.
    #[inline]
    pub fn update(&self, value: i64) {
        match &self.source {
            Source::Stored(stored) => stored.store(value, ORDERING),
            Source::Function(_) => panic!("update called on a functional gauge"),
        }
    }
}

impl Valued for Gauge {
    type Value = i64;

    fn value(&self) -> i64 {
        match &self.source {
            Source::Stored(stored) => stored.load(ORDERING),
            Source::Function(value) => value(),
        }
    }
}

impl Instrument for Gauge {
    type Snapshot = GaugeSnapshot;

    fn labels(&self) -> Labels {
        self.labels.clone()
    }

    fn snapshot(&self) -> GaugeSnapshot {
        GaugeSnapshot {
            value: self.value(),
            labels: self.labels(),
        }
    }

    fn with_labels(&self, labels: &Labels) -> GaugeSnapshot {
        self.snapshot().with_labels(labels)
    }
}

/// A gauge's value at a point in time
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GaugeSnapshot {
    value: i64,
    labels: Labels,
}

impl Valued for GaugeSnapshot {
    type Value = i64;

    fn value(&self) -> i64 {
        self.value
    }
}

impl Instrument for GaugeSnapshot {
    type Snapshot = GaugeSnapshot;

    fn labels(&self) -> Labels {
        self.labels.clone()
    }

    fn snapshot(&self) -> GaugeSnapshot {
        self.clone()
    }

    fn with_labels(&self, labels: &Labels) -> GaugeSnapshot {
        Self {
            value: self.value,
            labels: self.labels.merged(labels),
        }
    }
}

/// A gauge holding a 64 bit float, stored as bits in an atomic.
#[derive(Debug)]
pub struct GaugeFloat64 {
    source: Source<AtomicU64, f64>,
    labels: Labels,
}

impl Default for GaugeFloat64 {
    fn default() -> Self {
        Self::new(Labels::default())
    }
}

impl GaugeFloat64 {
    /// A gauge holding 0.0
    pub fn new(labels: Labels) -> Self {
        Self {
            source: Source::Stored(AtomicU64::new(0_f64.to_bits())),
            labels,
        }
    }

    /// A gauge that reads its value from `value` every time it is asked.
    pub fn functional(value: impl Fn() -> f64 + Send + Sync + 'static, labels: Labels) -> Self {
        Self {
            source: Source::Function(Box::new(value)),
            labels,
        }
    }

    /// True for gauges made with [`GaugeFloat64::functional`]
    pub fn is_functional(&self) -> bool {
        matches!(self.source, Source::Function(_))
    }

    /// Replace the gauge's value.
    ///
    /// # Panics
    ///
    /// Updating a functional gauge panics.
    #[inline]
    pub fn update(&self, value: f64) {
        match &self.source {
            Source::Stored(stored) => stored.store(value.to_bits(), ORDERING),
            Source::Function(_) => panic!("update called on a functional float gauge"),
        }
    }
}

impl Valued for GaugeFloat64 {
    type Value = f64;

    fn value(&self) -> f64 {
        match &self.source {
            Source::Stored(stored) => f64::from_bits(stored.load(ORDERING)),
            Source::Function(value) => value(),
        }
    }
}

impl Instrument for GaugeFloat64 {
    type Snapshot = GaugeFloat64Snapshot;

    fn labels(&self) -> Labels {
        self.labels.clone()
    }

    fn snapshot(&self) -> GaugeFloat64Snapshot {
        GaugeFloat64Snapshot {
            value: self.value(),
            labels: self.labels(),
        }
    }

    fn with_labels(&self, labels: &Labels) -> GaugeFloat64Snapshot {
        self.snapshot().with_labels(labels)
    }
}

/// A float gauge's value at a point in time
#[derive(Debug, Clone, PartialEq)]
pub struct GaugeFloat64Snapshot {
    value: f64,
    labels: Labels,
}

impl Valued for GaugeFloat64Snapshot {
    type Value = f64;

    fn value(&self) -> f64 {
        self.value
    }
}

impl Instrument for GaugeFloat64Snapshot {
    type Snapshot = GaugeFloat64Snapshot;

    fn labels(&self) -> Labels {
        self.labels.clone()
    }

    fn snapshot(&self) -> GaugeFloat64Snapshot {
        self.clone()
    }

    fn with_labels(&self, labels: &Labels) -> GaugeFloat64Snapshot {
        Self {
            value: self.value,
            labels: self.labels.merged(labels),
        }
    }
}

#[cfg(test)]
mod test {
    use std::sync::{
        atomic::{AtomicI64, Ordering},
        Arc,
    };

    use crate::{Gauge, GaugeFloat64, Instrument, Labels, Valued};

    #[test]
    fn update_and_snapshot() {
        let gauge = Gauge::new(Labels::new([("a", "b")]));
        gauge.update(47);
        let snapshot = gauge.snapshot();
        gauge.update(-1);
        assert_eq!(47, snapshot.value());
        assert_eq!(-1, gauge.value());
        assert_eq!(Labels::new([("a", "b")]), snapshot.labels());
    }

    #[test]
    fn functional_gauge_reads_every_time() {
        let source = Arc::new(AtomicI64::new(1));
        let read_source = source.clone();
        let gauge = Gauge::functional(move || read_source.load(Ordering::Relaxed), Labels::default());
        assert!(gauge.is_functional());
        assert_eq!(1, gauge.value());
        source.store(5, Ordering::Relaxed);
        assert_eq!(5, gauge.value());

        let snapshot = gauge.snapshot();
        source.store(9, Ordering::Relaxed);
        assert_eq!(5, snapshot.value());
    }

    #[test]
    #[should_panic(expected = "update called on a functional gauge")]
    fn functional_gauge_update_panics() {
        Gauge::functional(|| 3, Labels::default()).update(4);
    }

    #[test]
    fn float_gauge() {
        let gauge = GaugeFloat64::default();
        assert_eq!(0.0, gauge.value());
        gauge.update(47.5);
        let snapshot = gauge.with_labels(&Labels::new([("k", "v")]));
        gauge.update(1.25);
        assert_eq!(47.5, snapshot.value());
        assert_eq!(1.25, gauge.value());
        assert!(gauge.labels().is_empty());
        assert_eq!(Some("v"), snapshot.labels().get("k"));
    }

    #[test]
    fn functional_float_gauge() {
        let gauge = GaugeFloat64::functional(|| 0.5, Labels::default());
        assert_eq!(0.5, gauge.snapshot().value());
    }

    #[test]
    fn with_labels_twice_is_independent() {
        let gauge = Gauge::new(Labels::new([("base", "1")]));
        let a = gauge.with_labels(&Labels::new([("a", "1")]));
        let b = gauge.with_labels(&Labels::new([("b", "1")]));
        assert_eq!(None, a.labels().get("b"));
        assert_eq!(None, b.labels().get("a"));
        assert_eq!(Some("1"), a.labels().get("base"));
    }
}
