use std::{
    collections::{hash_map::Entry, HashMap},
    sync::{Mutex, PoisonError},
};

use crate::{default_meter_ticker, MeterTicker, Metric, MetricsError, Registry, Result};

use super::Hasher;

/// The root registry: a map of names to metrics behind one lock.
///
/// Meters and timers stored here are handed to the registry's
/// [`MeterTicker`] so their moving averages keep advancing.
pub struct StandardRegistry {
    metrics: Mutex<HashMap<String, Metric, Hasher>>,
    meter_ticker: MeterTicker,
}

impl std::fmt::Debug for StandardRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let metrics = self.lock();
        f.debug_struct("StandardRegistry")
            .field("metrics", &metrics.keys().collect::<Vec<_>>())
            .field("meter_ticker", &self.meter_ticker)
            .finish()
    }
}

impl Default for StandardRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl StandardRegistry {
    /// An empty registry whose meters are ticked by the default meter ticker
    pub fn new() -> Self {
        Self::with_meter_ticker(default_meter_ticker().clone())
    }

    /// An empty registry whose meters are ticked by `meter_ticker`
    pub fn with_meter_ticker(meter_ticker: MeterTicker) -> Self {
        Self {
            metrics: Mutex::new(HashMap::with_hasher(Hasher::default())),
            meter_ticker,
        }
    }

    /// The ticker that advances this registry's meters
    pub fn meter_ticker(&self) -> &MeterTicker {
        &self.meter_ticker
    }

    /// Number of registered metrics
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    /// True when nothing is registered
    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, HashMap<String, Metric, Hasher>> {
        self.metrics.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn track(&self, metric: &Metric) {
        if let Some(meter) = metric.meter() {
            meter.resume();
            self.meter_ticker.track(meter);
        }
    }

    fn stop(metric: &Metric) {
        if let Some(meter) = metric.meter() {
            meter.stop();
        }
    }
}

impl Registry for StandardRegistry {
    fn register(&self, name: &str, metric: Metric) -> Result<()> {
        match self.lock().entry(name.to_string()) {
            Entry::Occupied(_) => {
                log::debug!("rejected duplicate registration of {name}");
                return Err(MetricsError::DuplicateMetric {
                    name: name.to_string(),
                });
            }
            Entry::Vacant(vacant) => {
                vacant.insert(metric.clone());
            }
        }
        self.track(&metric);
        Ok(())
    }

    fn get_or_register_with(&self, name: &str, make: Box<dyn FnOnce() -> Metric + '_>) -> Metric {
        if let Some(existing) = self.get(name) {
            return existing;
        }
        let made = make();
        let winner = match self.lock().entry(name.to_string()) {
            Entry::Occupied(occupied) => return occupied.get().clone(),
            Entry::Vacant(vacant) => vacant.insert(made).clone(),
        };
        self.track(&winner);
        winner
    }

    fn get(&self, name: &str) -> Option<Metric> {
        self.lock().get(name).cloned()
    }

    fn unregister(&self, name: &str) {
        let removed = self.lock().remove(name);
        if let Some(metric) = removed {
            Self::stop(&metric);
        }
    }

    fn unregister_all(&self) {
        let removed: Vec<Metric> = self.lock().drain().map(|(_, metric)| metric).collect();
        for metric in &removed {
            Self::stop(metric);
        }
    }

    fn each(&self, visit: &mut dyn FnMut(&str, &Metric)) {
        let entries: Vec<(String, Metric)> = self
            .lock()
            .iter()
            .map(|(name, metric)| (name.clone(), metric.clone()))
            .collect();
        for (name, metric) in &entries {
            visit(name, metric);
        }
    }
}
