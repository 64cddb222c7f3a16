//! Named storage for metrics, and the helpers that create metrics in it.

mod prefixed;
mod standard;
mod typed;

use std::sync::{Arc, LazyLock};

pub use prefixed::PrefixedRegistry;
pub use standard::StandardRegistry;
pub use typed::*;

use crate::{Metric, Result};

#[cfg(not(feature = "ahash-hasher"))]
use std::collections::hash_map::RandomState;

#[cfg(feature = "ahash-hasher")]
use ahash::RandomState;

/// Alias for the map hasher, selected by the ahash-hasher crate feature
pub(crate) type Hasher = RandomState;

/// The process-wide registry. Typed helpers use it when you pass no registry.
pub fn default_registry() -> &'static Arc<StandardRegistry> {
    static DEFAULT_REGISTRY: LazyLock<Arc<StandardRegistry>> =
        LazyLock::new(|| Arc::new(StandardRegistry::new()));

    &DEFAULT_REGISTRY
}

/// A name to metric store.
///
/// Every method takes `&self` and is safe to call from any thread. A registry
/// holds at most one metric per name.
pub trait Registry: Send + Sync + std::fmt::Debug {
    /// Store `metric` under `name`.
    ///
    /// Fails with [`crate::MetricsError::DuplicateMetric`] if the name is taken.
    fn register(&self, name: &str, metric: Metric) -> Result<()>;

    /// The metric under `name`, or the one `make` builds if there is none.
    ///
    /// `make` is only called when the name looks free, and never while a
    /// registry lock is held. If another thread registers the name first, the
    /// metric `make` built is dropped and the other thread's is returned.
    fn get_or_register_with(&self, name: &str, make: Box<dyn FnOnce() -> Metric + '_>) -> Metric;

    /// The metric under `name`, or `metric` after storing it there.
    fn get_or_register(&self, name: &str, metric: Metric) -> Metric {
        self.get_or_register_with(name, Box::new(move || metric))
    }

    /// The metric under `name`, if any
    fn get(&self, name: &str) -> Option<Metric>;

    /// Remove the metric under `name`. Meters and timers stop being ticked.
    /// Removing an absent name does nothing.
    fn unregister(&self, name: &str);

    /// Remove every metric this registry can see
    fn unregister_all(&self);

    /// Visit each registered metric once, in no particular order.
    ///
    /// The visitor runs without any registry lock held, so it may register
    /// or unregister metrics. Those changes may or may not be seen by the
    /// visit in progress.
    fn each(&self, visit: &mut dyn FnMut(&str, &Metric));

    /// The prefix this registry puts in front of every name on its way to
    /// the root registry
    fn prefix(&self) -> String {
        String::new()
    }

    /// Run the check function of every registered healthcheck
    fn run_healthchecks(&self) {
        self.each(&mut |_, metric| {
            if let Metric::Healthcheck(healthcheck) = metric {
                healthcheck.check();
            }
        })
    }
}

impl<T: Registry + ?Sized> Registry for Arc<T> {
    fn register(&self, name: &str, metric: Metric) -> Result<()> {
        (**self).register(name, metric)
    }

    fn get_or_register_with(&self, name: &str, make: Box<dyn FnOnce() -> Metric + '_>) -> Metric {
        (**self).get_or_register_with(name, make)
    }

    fn get_or_register(&self, name: &str, metric: Metric) -> Metric {
        (**self).get_or_register(name, metric)
    }

    fn get(&self, name: &str) -> Option<Metric> {
        (**self).get(name)
    }

    fn unregister(&self, name: &str) {
        (**self).unregister(name)
    }

    fn unregister_all(&self) {
        (**self).unregister_all()
    }

    fn each(&self, visit: &mut dyn FnMut(&str, &Metric)) {
        (**self).each(visit)
    }

    fn prefix(&self) -> String {
        (**self).prefix()
    }

    fn run_healthchecks(&self) {
        (**self).run_healthchecks()
    }
}
