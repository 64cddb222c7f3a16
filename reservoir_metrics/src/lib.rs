//! In-process metrics: counters, gauges, meters, timers and histograms kept in
//! a concurrent named registry that exporters poll.
//!
//! Histograms answer percentile queries over unbounded streams with bounded
//! memory, by keeping a reservoir sample: either a [`UniformSample`] over the
//! whole history or an [`ExpDecaySample`] biased toward recent observations.
//! Meters track 1, 5 and 15 minute exponentially weighted moving rates, which
//! one shared [`MeterTicker`] advances for every registered meter.
//!
//! # Examples
//!
//! ```
//! use reservoir_metrics::{
//!     get_or_register_counter, get_or_register_timer, Counted, Labels, LoggingReporter,
//!     PrefixedRegistry,
//! };
//!
//! let registry = PrefixedRegistry::new("service.");
//! let requests = get_or_register_counter("requests", Some(&registry), Labels::default())
//!     .expect("requests is a counter");
//! let latency = get_or_register_timer("latency", Some(&registry), Labels::new([("route", "/")]))
//!     .expect("latency is a timer");
//!
//! latency.time(|| requests.inc(1));
//! assert_eq!(1, requests.count());
//!
//! LoggingReporter::default().report(&registry);
//! ```
//!
//! Meters fold elapsed periods into their averages whenever they are marked or
//! read. Running the ticker of your registry, usually [`default_meter_ticker`],
//! keeps that decay current between reads:
//!
//! ```no_run
//! # async fn start() {
//! use reservoir_metrics::{default_meter_ticker, DEFAULT_TICK_CADENCE};
//!
//! tokio::spawn(default_meter_ticker().clone().tick_meters_forever(DEFAULT_TICK_CADENCE));
//! # }
//! ```
//!
//! # Feature Flags
//!
//! - `ahash-hasher`: use ahash for the registry's name map.

mod counter;
mod error;
mod ewma;
mod gauge;
mod healthcheck;
mod histogram;
mod instrument;
mod labels;
mod meter;
mod meter_ticker;
mod metric;
mod registry;
mod reporter;
mod sample;
mod timer;

pub use counter::{Counter, CounterSnapshot};
pub use error::{HealthError, MetricsError, Result};
pub use ewma::{Ewma, EWMA_TICK_PERIOD};
pub use gauge::{Gauge, GaugeFloat64, GaugeFloat64Snapshot, GaugeSnapshot, ValueFunction};
pub use healthcheck::{CheckFunction, Healthcheck, HealthcheckSnapshot};
pub use histogram::{Histogram, HistogramSnapshot};
pub use instrument::{Counted, Distribution, Instrument, Rates, Valued};
pub use labels::Labels;
pub use meter::{Meter, MeterSnapshot};
pub use meter_ticker::{default_meter_ticker, MeterTicker, DEFAULT_TICK_CADENCE};
pub use metric::{Metric, MetricKind, MetricSnapshot, Registrable};
pub use registry::*;
pub use reporter::LoggingReporter;
pub use sample::{
    ExpDecaySample, Sample, SampleSnapshot, UniformSample, DEFAULT_DECAY_ALPHA,
    DEFAULT_RESERVOIR_SIZE, RESCALE_THRESHOLD,
};
pub use timer::{Timer, TimerGuard, TimerSnapshot};
