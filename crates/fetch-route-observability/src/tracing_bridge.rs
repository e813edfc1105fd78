//! Bridge from the logger seam to `tracing`.

use fetch_route_core::{LogLevel, Logger};

/// Logger that forwards every message to the `tracing` macros.
///
/// Useful when the host already installs a subscriber.
#[derive(Debug, Clone, Default)]
pub struct TracingLogger {
    namespace: Option<String>,
}

impl TracingLogger {
    /// Create a new tracing logger.
    pub fn new() -> Self {
        Self::default()
    }

    /// Attach a namespace field to every event.
    pub fn with_namespace(mut self, namespace: impl Into<String>) -> Self {
        self.namespace = Some(namespace.into());
        self
    }
}

impl Logger for TracingLogger {
    fn log(&self, level: LogLevel, message: &str) {
        let namespace = self.namespace.as_deref().unwrap_or_default();
        match level {
            LogLevel::Trace => tracing::trace!(namespace, "{}", message),
            LogLevel::Debug => tracing::debug!(namespace, "{}", message),
            LogLevel::Info => tracing::info!(namespace, "{}", message),
            LogLevel::Warn => tracing::warn!(namespace, "{}", message),
            LogLevel::Error => tracing::error!(namespace, "{}", message),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tracing_logger_without_subscriber_is_silent() {
        let logger = TracingLogger::new().with_namespace("fetch-route");
        logger.debug("no subscriber installed");
        logger.warn("still fine");
    }
}
