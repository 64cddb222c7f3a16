//! Typed construction and lookup.
//!
//! Each helper takes an optional registry. `None` means the
//! [`default_registry`].

use std::sync::Arc;

use crate::{
    Counter, Gauge, GaugeFloat64, Healthcheck, Histogram, Labels, Meter, Metric, MetricsError,
    Registrable, Registry, Result, Sample, Timer,
};

use super::default_registry;

fn or_default(registry: Option<&dyn Registry>) -> &dyn Registry {
    match registry {
        Some(registry) => registry,
        None => &**default_registry(),
    }
}

fn downcast<T: Registrable>(name: &str, metric: &Metric) -> Result<Arc<T>> {
    T::from_metric(metric).ok_or_else(|| {
        log::warn!(
            "wanted a {} for {name} but found a {}",
            T::KIND,
            metric.kind()
        );
        MetricsError::KindMismatch {
            name: name.to_string(),
            expected: T::KIND,
            found: metric.kind(),
        }
    })
}

/// The `T` registered under `name`, or the one `make` builds after
/// registering it.
///
/// Fails with [`MetricsError::KindMismatch`] if something other than a `T` is
/// registered under `name`.
pub fn get_or_register<T: Registrable>(
    name: &str,
    registry: Option<&dyn Registry>,
    make: impl FnOnce() -> T,
) -> Result<Arc<T>> {
    let metric =
        or_default(registry).get_or_register_with(name, Box::new(|| Arc::new(make()).into_metric()));
    downcast(name, &metric)
}

/// Register `metric` under `name` and hand it back shared.
///
/// Fails with [`MetricsError::DuplicateMetric`] if the name is taken.
pub fn new_registered<T: Registrable>(
    name: &str,
    registry: Option<&dyn Registry>,
    metric: T,
) -> Result<Arc<T>> {
    let metric = Arc::new(metric);
    or_default(registry).register(name, metric.clone().into_metric())?;
    Ok(metric)
}

/// The `T` registered under `name`, if any
pub fn get<T: Registrable>(name: &str, registry: Option<&dyn Registry>) -> Result<Option<Arc<T>>> {
    or_default(registry)
        .get(name)
        .map(|metric| downcast(name, &metric))
        .transpose()
}

/// Get or register a [`Counter`]
pub fn get_or_register_counter(
    name: &str,
    registry: Option<&dyn Registry>,
    labels: Labels,
) -> Result<Arc<Counter>> {
    get_or_register(name, registry, || Counter::new(labels))
}

/// Register a new [`Counter`]
pub fn new_registered_counter(
    name: &str,
    registry: Option<&dyn Registry>,
    labels: Labels,
) -> Result<Arc<Counter>> {
    new_registered(name, registry, Counter::new(labels))
}

/// Get or register a [`Gauge`]
pub fn get_or_register_gauge(
    name: &str,
    registry: Option<&dyn Registry>,
    labels: Labels,
) -> Result<Arc<Gauge>> {
    get_or_register(name, registry, || Gauge::new(labels))
}

/// Register a new [`Gauge`]
pub fn new_registered_gauge(
    name: &str,
    registry: Option<&dyn Registry>,
    labels: Labels,
) -> Result<Arc<Gauge>> {
    new_registered(name, registry, Gauge::new(labels))
}

/// Get or register a [`Gauge`] that reads its value from `value`
pub fn get_or_register_functional_gauge(
    name: &str,
    registry: Option<&dyn Registry>,
    value: impl Fn() -> i64 + Send + Sync + 'static,
    labels: Labels,
) -> Result<Arc<Gauge>> {
    get_or_register(name, registry, || Gauge::functional(value, labels))
}

/// Register a new [`Gauge`] that reads its value from `value`
pub fn new_registered_functional_gauge(
    name: &str,
    registry: Option<&dyn Registry>,
    value: impl Fn() -> i64 + Send + Sync + 'static,
    labels: Labels,
) -> Result<Arc<Gauge>> {
    new_registered(name, registry, Gauge::functional(value, labels))
}

/// Get or register a [`GaugeFloat64`]
pub fn get_or_register_gauge_float64(
    name: &str,
    registry: Option<&dyn Registry>,
    labels: Labels,
) -> Result<Arc<GaugeFloat64>> {
    get_or_register(name, registry, || GaugeFloat64::new(labels))
}

/// Register a new [`GaugeFloat64`]
pub fn new_registered_gauge_float64(
    name: &str,
    registry: Option<&dyn Registry>,
    labels: Labels,
) -> Result<Arc<GaugeFloat64>> {
    new_registered(name, registry, GaugeFloat64::new(labels))
}

/// Get or register a [`GaugeFloat64`] that reads its value from `value`
pub fn get_or_register_functional_gauge_float64(
    name: &str,
    registry: Option<&dyn Registry>,
    value: impl Fn() -> f64 + Send + Sync + 'static,
    labels: Labels,
) -> Result<Arc<GaugeFloat64>> {
    get_or_register(name, registry, || GaugeFloat64::functional(value, labels))
}

/// Register a new [`GaugeFloat64`] that reads its value from `value`
pub fn new_registered_functional_gauge_float64(
    name: &str,
    registry: Option<&dyn Registry>,
    value: impl Fn() -> f64 + Send + Sync + 'static,
    labels: Labels,
) -> Result<Arc<GaugeFloat64>> {
    new_registered(name, registry, GaugeFloat64::functional(value, labels))
}

/// Get or register a [`Histogram`] over `sample`.
///
/// `sample` is dropped if a histogram is already registered.
pub fn get_or_register_histogram(
    name: &str,
    registry: Option<&dyn Registry>,
    sample: impl Sample + 'static,
    labels: Labels,
) -> Result<Arc<Histogram>> {
    get_or_register(name, registry, || Histogram::new(sample, labels))
}

/// Register a new [`Histogram`] over `sample`
pub fn new_registered_histogram(
    name: &str,
    registry: Option<&dyn Registry>,
    sample: impl Sample + 'static,
    labels: Labels,
) -> Result<Arc<Histogram>> {
    new_registered(name, registry, Histogram::new(sample, labels))
}

/// Get or register a [`Meter`]. The registry's ticker advances it.
pub fn get_or_register_meter(
    name: &str,
    registry: Option<&dyn Registry>,
    labels: Labels,
) -> Result<Arc<Meter>> {
    get_or_register(name, registry, || Meter::new(labels))
}

/// Register a new [`Meter`]. The registry's ticker advances it.
pub fn new_registered_meter(
    name: &str,
    registry: Option<&dyn Registry>,
    labels: Labels,
) -> Result<Arc<Meter>> {
    new_registered(name, registry, Meter::new(labels))
}

/// Get or register a [`Timer`]. The registry's ticker advances its meter.
pub fn get_or_register_timer(
    name: &str,
    registry: Option<&dyn Registry>,
    labels: Labels,
) -> Result<Arc<Timer>> {
    get_or_register(name, registry, || Timer::new(labels))
}

/// Register a new [`Timer`]. The registry's ticker advances its meter.
pub fn new_registered_timer(
    name: &str,
    registry: Option<&dyn Registry>,
    labels: Labels,
) -> Result<Arc<Timer>> {
    new_registered(name, registry, Timer::new(labels))
}

/// Get or register a [`Healthcheck`] that runs `check`
pub fn get_or_register_healthcheck(
    name: &str,
    registry: Option<&dyn Registry>,
    check: impl Fn(&Healthcheck) + Send + Sync + 'static,
    labels: Labels,
) -> Result<Arc<Healthcheck>> {
    get_or_register(name, registry, || Healthcheck::new(check, labels))
}

/// Register a new [`Healthcheck`] that runs `check`
pub fn new_registered_healthcheck(
    name: &str,
    registry: Option<&dyn Registry>,
    check: impl Fn(&Healthcheck) + Send + Sync + 'static,
    labels: Labels,
) -> Result<Arc<Healthcheck>> {
    new_registered(name, registry, Healthcheck::new(check, labels))
}
