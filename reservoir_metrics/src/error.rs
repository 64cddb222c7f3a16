use std::fmt::Display;

use thiserror::Error;

use crate::MetricKind;

/// Errors returned by registries
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MetricsError {
    /// A metric is already registered under the name
    #[error("duplicate metric: {name}")]
    DuplicateMetric {
        /// The contested name
        name: String,
    },
    /// The metric under the name is not the kind the caller asked for
    #[error("metric {name} is a {found}, not a {expected}")]
    KindMismatch {
        /// Name of the registered metric
        name: String,
        /// The kind the caller asked for
        expected: MetricKind,
        /// The kind that is registered
        found: MetricKind,
    },
}

/// Result alias for registry operations
pub type Result<T> = std::result::Result<T, MetricsError>;

/// Why a healthcheck is unhealthy
#[derive(Debug)]
pub struct HealthError {
    error: Box<dyn std::error::Error + Send + Sync>,
}

impl HealthError {
    /// Wrap any error, or a message
    pub fn new(error: impl Into<Box<dyn std::error::Error + Send + Sync>>) -> Self {
        Self {
            error: error.into(),
        }
    }
}

impl Display for HealthError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        Display::fmt(&self.error, f)
    }
}

impl std::error::Error for HealthError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        Some(self.error.as_ref())
    }
}
