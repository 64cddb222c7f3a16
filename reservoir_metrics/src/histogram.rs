use crate::{
    sample::{ExpDecaySample, Sample, SampleSnapshot, DEFAULT_DECAY_ALPHA, DEFAULT_RESERVOIR_SIZE},
    Counted, Distribution, Instrument, Labels,
};

/// Distribution statistics over a stream of i64 values, held in bounded
/// memory by a [`Sample`].
#[derive(Debug)]
pub struct Histogram {
    sample: Box<dyn Sample>,
    labels: Labels,
}

impl Default for Histogram {
    /// A histogram over a forward-decaying sample biased to the last few minutes
    fn default() -> Self {
        Self::new(
            ExpDecaySample::new(DEFAULT_RESERVOIR_SIZE, DEFAULT_DECAY_ALPHA),
            Labels::default(),
        )
    }
}

impl Histogram {
    /// A histogram over `sample`
    pub fn new(sample: impl Sample + 'static, labels: Labels) -> Self {
        Self {
            sample: Box::new(sample),
            labels,
        }
    }

    /// Observe a value
    #[inline]
    pub fn update(&self, value: i64) {
        self.sample.update(value)
    }

    /// Forget all observations
    pub fn clear(&self) {
        self.sample.clear()
    }

    /// The reservoir behind this histogram
    pub fn sample(&self) -> &dyn Sample {
        self.sample.as_ref()
    }
}

impl Counted for Histogram {
    fn count(&self) -> i64 {
        self.sample.count()
    }
}

impl Distribution for Histogram {
    fn min(&self) -> i64 {
        self.sample.min()
    }

    fn max(&self) -> i64 {
        self.sample.max()
    }

    fn mean(&self) -> f64 {
        self.sample.mean()
    }

    fn sum(&self) -> i64 {
        self.sample.sum()
    }

    fn std_dev(&self) -> f64 {
        self.sample.std_dev()
    }

    fn variance(&self) -> f64 {
        self.sample.variance()
    }

    fn percentile(&self, percentile: f64) -> f64 {
        self.sample.percentile(percentile)
    }

    fn percentiles(&self, percentiles: &[f64]) -> Vec<f64> {
        self.sample.percentiles(percentiles)
    }
}

impl Instrument for Histogram {
    type Snapshot = HistogramSnapshot;

    fn labels(&self) -> Labels {
        self.labels.clone()
    }

    fn snapshot(&self) -> HistogramSnapshot {
        HistogramSnapshot {
            sample: self.sample.snapshot(),
            labels: self.labels(),
        }
    }

    fn with_labels(&self, labels: &Labels) -> HistogramSnapshot {
        self.snapshot().with_labels(labels)
    }
}

/// A histogram's sorted values and count at a point in time
#[derive(Debug, Clone, PartialEq)]
pub struct HistogramSnapshot {
    sample: SampleSnapshot,
    labels: Labels,
}

impl HistogramSnapshot {
    /// The frozen sample
    pub fn sample(&self) -> &SampleSnapshot {
        &self.sample
    }
}

impl Counted for HistogramSnapshot {
    fn count(&self) -> i64 {
        self.sample.count()
    }
}

impl Distribution for HistogramSnapshot {
    fn min(&self) -> i64 {
        self.sample.min()
    }

    fn max(&self) -> i64 {
        self.sample.max()
    }

    fn mean(&self) -> f64 {
        self.sample.mean()
    }

    fn sum(&self) -> i64 {
        self.sample.sum()
    }

    fn std_dev(&self) -> f64 {
        self.sample.std_dev()
    }

    fn variance(&self) -> f64 {
        self.sample.variance()
    }

    fn percentile(&self, percentile: f64) -> f64 {
        self.sample.percentile(percentile)
    }

    fn percentiles(&self, percentiles: &[f64]) -> Vec<f64> {
        self.sample.percentiles(percentiles)
    }
}

impl Instrument for HistogramSnapshot {
    type Snapshot = HistogramSnapshot;

    fn labels(&self) -> Labels {
        self.labels.clone()
    }

    fn snapshot(&self) -> HistogramSnapshot {
        self.clone()
    }

    fn with_labels(&self, labels: &Labels) -> HistogramSnapshot {
        Self {
            sample: self.sample.clone(),
            labels: self.labels.merged(labels),
        }
    }
}
