//! The registry's view of metrics: one tagged union over every kind.

use std::{fmt::Display, sync::Arc};

use crate::{
    Counted, Counter, CounterSnapshot, Distribution, Gauge, GaugeFloat64, GaugeFloat64Snapshot,
    GaugeSnapshot, Healthcheck, HealthcheckSnapshot, Histogram, HistogramSnapshot, Instrument,
    Labels, Meter, MeterSnapshot, Rates, Timer, TimerSnapshot, Valued,
};

/// The kinds of metric a registry can hold
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MetricKind {
    /// [`Counter`]
    Counter,
    /// [`Gauge`], stored or functional
    Gauge,
    /// [`GaugeFloat64`], stored or functional
    GaugeFloat64,
    /// [`Histogram`]
    Histogram,
    /// [`Meter`]
    Meter,
    /// [`Timer`]
    Timer,
    /// [`Healthcheck`]
    Healthcheck,
}

impl Display for MetricKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            MetricKind::Counter => "counter",
            MetricKind::Gauge => "gauge",
            MetricKind::GaugeFloat64 => "float gauge",
            MetricKind::Histogram => "histogram",
            MetricKind::Meter => "meter",
            MetricKind::Timer => "timer",
            MetricKind::Healthcheck => "healthcheck",
        })
    }
}

/// A shared handle to a live metric of any kind.
///
/// Cloning is cheap and clones refer to the same metric. Exporters match on
/// the variant, or call [`Metric::snapshot`] and match on that.
#[derive(Debug, Clone)]
pub enum Metric {
    #[allow(missing_docs)]
    Counter(Arc<Counter>),
    #[allow(missing_docs)]
    Gauge(Arc<Gauge>),
    #[allow(missing_docs)]
    GaugeFloat64(Arc<GaugeFloat64>),
    #[allow(missing_docs)]
    Histogram(Arc<Histogram>),
    #[allow(missing_docs)]
    Meter(Arc<Meter>),
    #[allow(missing_docs)]
    Timer(Arc<Timer>),
    #[allow(missing_docs)]
    Healthcheck(Arc<Healthcheck>),
}

impl Metric {
    /// Which kind of metric this is
    pub fn kind(&self) -> MetricKind {
        match self {
            Metric::Counter(_) => MetricKind::Counter,
            Metric::Gauge(_) => MetricKind::Gauge,
            Metric::GaugeFloat64(_) => MetricKind::GaugeFloat64,
            Metric::Histogram(_) => MetricKind::Histogram,
            Metric::Meter(_) => MetricKind::Meter,
            Metric::Timer(_) => MetricKind::Timer,
            Metric::Healthcheck(_) => MetricKind::Healthcheck,
        }
    }

    /// A copy of the metric's labels
    pub fn labels(&self) -> Labels {
        match self {
            Metric::Counter(metric) => metric.labels(),
            Metric::Gauge(metric) => metric.labels(),
            Metric::GaugeFloat64(metric) => metric.labels(),
            Metric::Histogram(metric) => metric.labels(),
            Metric::Meter(metric) => metric.labels(),
            Metric::Timer(metric) => metric.labels(),
            Metric::Healthcheck(metric) => metric.labels(),
        }
    }

    /// Freeze the metric
    pub fn snapshot(&self) -> MetricSnapshot {
        match self {
            Metric::Counter(metric) => MetricSnapshot::Counter(metric.snapshot()),
            Metric::Gauge(metric) => MetricSnapshot::Gauge(metric.snapshot()),
            Metric::GaugeFloat64(metric) => MetricSnapshot::GaugeFloat64(metric.snapshot()),
            Metric::Histogram(metric) => MetricSnapshot::Histogram(metric.snapshot()),
            Metric::Meter(metric) => MetricSnapshot::Meter(metric.snapshot()),
            Metric::Timer(metric) => MetricSnapshot::Timer(metric.snapshot()),
            Metric::Healthcheck(metric) => MetricSnapshot::Healthcheck(metric.snapshot()),
        }
    }

    /// The meter that a ticker should advance, if this metric has one
    pub(crate) fn meter(&self) -> Option<&Arc<Meter>> {
        match self {
            Metric::Meter(meter) => Some(meter),
            Metric::Timer(timer) => Some(timer.meter()),
            _ => None,
        }
    }

    /// True when both handles refer to the same live metric
    pub fn ptr_eq(&self, other: &Metric) -> bool {
        match (self, other) {
            (Metric::Counter(a), Metric::Counter(b)) => Arc::ptr_eq(a, b),
            (Metric::Gauge(a), Metric::Gauge(b)) => Arc::ptr_eq(a, b),
            (Metric::GaugeFloat64(a), Metric::GaugeFloat64(b)) => Arc::ptr_eq(a, b),
            (Metric::Histogram(a), Metric::Histogram(b)) => Arc::ptr_eq(a, b),
            (Metric::Meter(a), Metric::Meter(b)) => Arc::ptr_eq(a, b),
            (Metric::Timer(a), Metric::Timer(b)) => Arc::ptr_eq(a, b),
            (Metric::Healthcheck(a), Metric::Healthcheck(b)) => Arc::ptr_eq(a, b),
            _ => false,
        }
    }
}

/// Metric kinds that can be stored in and fetched from a registry by type.
pub trait Registrable: Sized + Send + Sync + 'static {
    /// The tag of this kind in [`Metric`]
    const KIND: MetricKind;

    /// Wrap a shared metric for storage
    fn into_metric(self: Arc<Self>) -> Metric;

    /// The shared metric, if `metric` is of this kind
    fn from_metric(metric: &Metric) -> Option<Arc<Self>>;
}

macro_rules! registrable {
    ($($kind:ident),+ $(,)?) => {
        $(
            impl Registrable for $kind {
                const KIND: MetricKind = MetricKind::$kind;

                fn into_metric(self: Arc<Self>) -> Metric {
                    Metric::$kind(self)
                }

                fn from_metric(metric: &Metric) -> Option<Arc<Self>> {
                    match metric {
                        Metric::$kind(inner) => Some(inner.clone()),
                        _ => None,
                    }
                }
            }

            impl From<Arc<$kind>> for Metric {
                fn from(metric: Arc<$kind>) -> Self {
                    metric.into_metric()
                }
            }

            impl From<$kind> for Metric {
                fn from(metric: $kind) -> Self {
                    Arc::new(metric).into_metric()
                }
            }
        )+
    };
}

registrable!(Counter, Gauge, GaugeFloat64, Histogram, Meter, Timer, Healthcheck);

/// A frozen metric of any kind
#[derive(Debug, Clone)]
pub enum MetricSnapshot {
    #[allow(missing_docs)]
    Counter(CounterSnapshot),
    #[allow(missing_docs)]
    Gauge(GaugeSnapshot),
    #[allow(missing_docs)]
    GaugeFloat64(GaugeFloat64Snapshot),
    #[allow(missing_docs)]
    Histogram(HistogramSnapshot),
    #[allow(missing_docs)]
    Meter(MeterSnapshot),
    #[allow(missing_docs)]
    Timer(TimerSnapshot),
    #[allow(missing_docs)]
    Healthcheck(HealthcheckSnapshot),
}

impl MetricSnapshot {
    /// Which kind of metric this was taken from
    pub fn kind(&self) -> MetricKind {
        match self {
            MetricSnapshot::Counter(_) => MetricKind::Counter,
            MetricSnapshot::Gauge(_) => MetricKind::Gauge,
            MetricSnapshot::GaugeFloat64(_) => MetricKind::GaugeFloat64,
            MetricSnapshot::Histogram(_) => MetricKind::Histogram,
            MetricSnapshot::Meter(_) => MetricKind::Meter,
            MetricSnapshot::Timer(_) => MetricKind::Timer,
            MetricSnapshot::Healthcheck(_) => MetricKind::Healthcheck,
        }
    }

    /// The labels frozen with the snapshot
    pub fn labels(&self) -> Labels {
        match self {
            MetricSnapshot::Counter(snapshot) => snapshot.labels(),
            MetricSnapshot::Gauge(snapshot) => snapshot.labels(),
            MetricSnapshot::GaugeFloat64(snapshot) => snapshot.labels(),
            MetricSnapshot::Histogram(snapshot) => snapshot.labels(),
            MetricSnapshot::Meter(snapshot) => snapshot.labels(),
            MetricSnapshot::Timer(snapshot) => snapshot.labels(),
            MetricSnapshot::Healthcheck(snapshot) => snapshot.labels(),
        }
    }
}

const DISPLAYED_PERCENTILES: [f64; 5] = [0.5, 0.75, 0.95, 0.99, 0.999];
const PERCENTILE_NAMES: [&str; 5] = ["p50", "p75", "p95", "p99", "p999"];

fn display_distribution(
    map: &mut std::fmt::DebugMap<'_, '_>,
    distribution: &impl Distribution,
) {
    map.entry(&"count", &distribution.count())
        .entry(&"min", &distribution.min())
        .entry(&"max", &distribution.max())
        .entry(&"mean", &distribution.mean())
        .entry(&"stddev", &distribution.std_dev());
    let percentiles = distribution.percentiles(&DISPLAYED_PERCENTILES);
    for (name, value) in PERCENTILE_NAMES.iter().zip(percentiles) {
        map.entry(name, &value);
    }
}

fn display_rates(map: &mut std::fmt::DebugMap<'_, '_>, rates: &impl Rates) {
    map.entry(&"rate1", &rates.rate1())
        .entry(&"rate5", &rates.rate5())
        .entry(&"rate15", &rates.rate15())
        .entry(&"rate_mean", &rates.rate_mean());
}

impl Display for MetricSnapshot {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut map = f.debug_map();
        map.entry(&"kind", &format_args!("{}", self.kind()));
        match self {
            MetricSnapshot::Counter(snapshot) => {
                map.entry(&"count", &snapshot.count());
            }
            MetricSnapshot::Gauge(snapshot) => {
                map.entry(&"value", &snapshot.value());
            }
            MetricSnapshot::GaugeFloat64(snapshot) => {
                map.entry(&"value", &snapshot.value());
            }
            MetricSnapshot::Histogram(snapshot) => {
                display_distribution(&mut map, snapshot);
            }
            MetricSnapshot::Meter(snapshot) => {
                map.entry(&"count", &snapshot.count());
                display_rates(&mut map, snapshot);
            }
            MetricSnapshot::Timer(snapshot) => {
                display_distribution(&mut map, snapshot);
                display_rates(&mut map, snapshot);
            }
            MetricSnapshot::Healthcheck(snapshot) => match snapshot.error() {
                Some(error) => {
                    map.entry(&"healthy", &false)
                        .entry(&"error", &format_args!("{error}"));
                }
                None => {
                    map.entry(&"healthy", &true);
                }
            },
        }
        let labels = self.labels();
        if !labels.is_empty() {
            map.entry(&"labels", &format_args!("{labels}"));
        }
        map.finish()
    }
}

#[cfg(test)]
mod test {
    use std::sync::Arc;

    use crate::{Counter, Gauge, Healthcheck, Histogram, Labels, Metric, MetricKind, Registrable};

    #[test]
    fn kinds_round_trip_through_metric() {
        let counter = Arc::new(Counter::default());
        let metric = counter.clone().into_metric();
        assert_eq!(MetricKind::Counter, metric.kind());
        assert!(Arc::ptr_eq(
            &counter,
            &Counter::from_metric(&metric).expect("it is a counter")
        ));
        assert!(Gauge::from_metric(&metric).is_none());
        assert!(metric.meter().is_none());
    }

    #[test]
    fn ptr_eq() {
        let a: Metric = Counter::default().into();
        let b: Metric = Counter::default().into();
        assert!(a.ptr_eq(&a.clone()));
        assert!(!a.ptr_eq(&b));
        assert!(!a.ptr_eq(&Metric::from(Gauge::default())));
    }

    #[test]
    fn display_counter() {
        let counter = Counter::new(Labels::new([("host", "a")]));
        counter.inc(3);
        let metric = Metric::from(counter);
        assert_eq!(
            r#"{"kind": counter, "count": 3, "labels": {"host": "a"}}"#,
            metric.snapshot().to_string()
        );
    }

    #[test]
    fn display_histogram() {
        let histogram = Histogram::default();
        for i in 1..=4 {
            histogram.update(i);
        }
        let display = Metric::from(histogram).snapshot().to_string();
        assert!(display.starts_with(r#"{"kind": histogram, "count": 4, "min": 1, "max": 4"#));
        assert!(display.contains(r#""p50": 2.5"#));
        assert!(!display.contains("labels"));
    }

    #[test]
    fn display_healthcheck() {
        let healthcheck = Healthcheck::new(|_| {}, Labels::default());
        healthcheck.unhealthy("disk full");
        assert_eq!(
            r#"{"kind": healthcheck, "healthy": false, "error": disk full}"#,
            Metric::from(healthcheck).snapshot().to_string()
        );
    }
}
