use std::sync::atomic::AtomicI64;

use crate::{Counted, Instrument, Labels};

const ORDERING: std::sync::atomic::Ordering = std::sync::atomic::Ordering::Relaxed;

/// A signed count that can go up and down, and below zero.
///
/// This never blocks. Internal mutability is achieved via platform atomics.
#[derive(Debug, Default)]
pub struct Counter {
    count: AtomicI64,
    labels: Labels,
}

impl Counter {
    /// A zeroed counter with labels
    pub fn new(labels: Labels) -> Self {
        Self {
            count: AtomicI64::new(0),
            labels,
        }
    }

    /// Add to the count
    #[inline]
    pub fn inc(&self, n: i64) {
        self.count.fetch_add(n, ORDERING);
    }

    /// Subtract from the count
    #[inline]
    pub fn dec(&self, n: i64) {
        self.count.fetch_sub(n, ORDERING);
    }

    /// Reset to zero
    pub fn clear(&self) {
        self.count.store(0, ORDERING);
    }
}

impl Counted for Counter {
    fn count(&self) -> i64 {
        self.count.load(ORDERING)
    }
}

impl Instrument for Counter {
    type Snapshot = CounterSnapshot;

    fn labels(&self) -> Labels {
        self.labels.clone()
    }

    fn snapshot(&self) -> CounterSnapshot {
        CounterSnapshot {
            count: self.count(),
            labels: self.labels(),
        }
    }

    fn with_labels(&self, labels: &Labels) -> CounterSnapshot {
        self.snapshot().with_labels(labels)
    }
}

/// A counter's count at a point in time
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CounterSnapshot {
    count: i64,
    labels: Labels,
}

impl Counted for CounterSnapshot {
    fn count(&self) -> i64 {
        self.count
    }
}

impl Instrument for CounterSnapshot {
    type Snapshot = CounterSnapshot;

    fn labels(&self) -> Labels {
        self.labels.clone()
    }

    fn snapshot(&self) -> CounterSnapshot {
        self.clone()
    }

    fn with_labels(&self, labels: &Labels) -> CounterSnapshot {
        Self {
            count: self.count,
            labels: self.labels.merged(labels),
        }
    }
}

#[cfg(test)]
mod test {
    use std::sync::Arc;

    use crate::{Counted, Counter, Instrument, Labels};

    #[test]
    fn inc_dec_clear() {
        let counter = Counter::default();
        counter.inc(2);
        counter.dec(5);
        assert_eq!(-3, counter.count());
        counter.clear();
        assert_eq!(0, counter.count());
    }

    #[test]
    fn snapshot_is_frozen() {
        let counter = Counter::new(Labels::new([("key", "value")]));
        counter.inc(1);
        let snapshot = counter.snapshot();
        counter.inc(1);
        assert_eq!(1, snapshot.count());
        assert_eq!(2, counter.count());
        assert_eq!(Labels::new([("key", "value")]), snapshot.labels());
    }

    #[test]
    fn labels_are_copies() {
        let mut labels = Labels::new([("key", "value")]);
        let counter = Counter::new(labels.clone());
        labels.insert("key", "changed");

        let mut read = counter.labels();
        read.insert("other", "thing");

        assert_eq!(Labels::new([("key", "value")]), counter.labels());
    }

    #[test]
    fn with_labels_does_not_mutate() {
        let counter = Counter::new(Labels::new([("key", "value")]));
        counter.inc(7);
        let a = counter.with_labels(&Labels::new([("a", "1")]));
        let b = counter.with_labels(&Labels::new([("b", "2"), ("key", "override")]));

        assert_eq!(Labels::new([("key", "value"), ("a", "1")]), a.labels());
        assert_eq!(Labels::new([("key", "override"), ("b", "2")]), b.labels());
        assert_eq!(Labels::new([("key", "value")]), counter.labels());
        assert_eq!(7, a.count());
    }

    #[test]
    fn concurrent_increments() {
        let counter = Arc::new(Counter::default());
        std::thread::scope(|scope| {
            for _ in 0..8 {
                let counter = counter.clone();
                scope.spawn(move || {
                    for _ in 0..1000 {
                        counter.inc(1);
                    }
                });
            }
        });
        assert_eq!(8000, counter.count());
    }
}
