use crate::Registry;

/// A reporter that just logs a snapshot of every metric in a registry
#[derive(Debug, Clone, Copy)]
pub struct LoggingReporter {
    log_level: log::Level,
}

impl Default for LoggingReporter {
    fn default() -> Self {
        Self {
            log_level: log::Level::Info,
        }
    }
}

impl LoggingReporter {
    /// Log at `log_level` instead of Info
    pub fn new(log_level: log::Level) -> Self {
        Self { log_level }
    }

    /// Log one line per metric. Returns how many metrics were logged.
    pub fn report(&self, registry: &dyn Registry) -> usize {
        if !log::log_enabled!(self.log_level) {
            return 0;
        }
        let mut reported = 0;
        registry.each(&mut |name, metric| {
            log::log!(self.log_level, "{name}: {}", metric.snapshot());
            reported += 1;
        });
        reported
    }
}

#[cfg(test)]
mod test {
    use crate::{Counter, LoggingReporter, MeterTicker, Registry, StandardRegistry, Timer};

    #[test_log::test]
    fn reports_every_metric() {
        let registry = StandardRegistry::with_meter_ticker(MeterTicker::default());
        registry
            .register("hits", Counter::default().into())
            .expect("name is free");
        registry
            .register("latency", Timer::default().into())
            .expect("name is free");
        let reported = LoggingReporter::new(log::Level::Error).report(&registry);
        assert_eq!(2, reported);
    }
}
