use std::sync::Arc;

use arc_swap::ArcSwapOption;

use crate::{HealthError, Instrument, Labels};

/// The function a healthcheck runs to decide its status
pub type CheckFunction = Box<dyn Fn(&Healthcheck) + Send + Sync>;

/// An up/down status with an optional error describing what is wrong.
///
/// `check()` runs the check function, which reports back through
/// `healthy()` and `unhealthy()`.
pub struct Healthcheck {
    error: ArcSwapOption<HealthError>,
    check: CheckFunction,
    labels: Labels,
}

impl std::fmt::Debug for Healthcheck {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Healthcheck")
            .field("error", &self.error())
            .field("labels", &self.labels)
            .finish_non_exhaustive()
    }
}

impl Healthcheck {
    /// A healthy healthcheck that runs `check` to update itself
    pub fn new(check: impl Fn(&Healthcheck) + Send + Sync + 'static, labels: Labels) -> Self {
        Self {
            error: ArcSwapOption::const_empty(),
            check: Box::new(check),
            labels,
        }
    }

    /// Run the check function
    pub fn check(&self) {
        (self.check)(self)
    }

    /// The current error, if unhealthy
    pub fn error(&self) -> Option<Arc<HealthError>> {
        self.error.load_full()
    }

    /// True when there is no error
    pub fn is_healthy(&self) -> bool {
        self.error.load().is_none()
    }

    /// Mark healthy
    pub fn healthy(&self) {
        self.error.store(None)
    }

    /// Mark unhealthy for the given reason
    pub fn unhealthy(&self, error: impl Into<Box<dyn std::error::Error + Send + Sync>>) {
        self.error.store(Some(Arc::new(HealthError::new(error))))
    }
}

impl Instrument for Healthcheck {
    type Snapshot = HealthcheckSnapshot;

    fn labels(&self) -> Labels {
        self.labels.clone()
    }

    fn snapshot(&self) -> HealthcheckSnapshot {
        HealthcheckSnapshot {
            error: self.error(),
            labels: self.labels(),
        }
    }

    fn with_labels(&self, labels: &Labels) -> HealthcheckSnapshot {
        self.snapshot().with_labels(labels)
    }
}

/// A healthcheck's status at a point in time
#[derive(Debug, Clone)]
pub struct HealthcheckSnapshot {
    error: Option<Arc<HealthError>>,
    labels: Labels,
}

impl HealthcheckSnapshot {
    /// The error at the time of the snapshot, if unhealthy
    pub fn error(&self) -> Option<&HealthError> {
        self.error.as_deref()
    }

    /// True when there was no error
    pub fn is_healthy(&self) -> bool {
        self.error.is_none()
    }
}

impl Instrument for HealthcheckSnapshot {
    type Snapshot = HealthcheckSnapshot;

    fn labels(&self) -> Labels {
        self.labels.clone()
    }

    fn snapshot(&self) -> HealthcheckSnapshot {
        self.clone()
    }

    fn with_labels(&self, labels: &Labels) -> HealthcheckSnapshot {
        Self {
            error: self.error.clone(),
            labels: self.labels.merged(labels),
        }
    }
}

#[cfg(test)]
mod test {
    use std::sync::{
        atomic::{AtomicBool, Ordering},
        Arc,
    };

    use crate::{Healthcheck, Instrument, Labels};

    #[test]
    fn check_updates_status() {
        let up = Arc::new(AtomicBool::new(true));
        let check_up = up.clone();
        let healthcheck = Healthcheck::new(
            move |healthcheck| {
                if check_up.load(Ordering::Relaxed) {
                    healthcheck.healthy()
                } else {
                    healthcheck.unhealthy("database unreachable")
                }
            },
            Labels::default(),
        );
        assert!(healthcheck.is_healthy());

        up.store(false, Ordering::Relaxed);
        healthcheck.check();
        assert!(!healthcheck.is_healthy());
        assert_eq!(
            Some("database unreachable".to_string()),
            healthcheck.error().map(|error| error.to_string())
        );

        let snapshot = healthcheck.snapshot();
        up.store(true, Ordering::Relaxed);
        healthcheck.check();
        assert!(healthcheck.is_healthy());
        assert!(!snapshot.is_healthy());
    }

    #[test]
    fn with_labels() {
        let healthcheck = Healthcheck::new(|_| {}, Labels::new([("a", "1")]));
        let snapshot = healthcheck.with_labels(&Labels::new([("b", "2")]));
        assert_eq!(Labels::new([("a", "1"), ("b", "2")]), snapshot.labels());
        assert!(snapshot.is_healthy());
        assert!(snapshot.error().is_none());
    }
}
