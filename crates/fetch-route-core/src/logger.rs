//! Logger seam for cache and navigation diagnostics.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Log level for diagnostics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Trace,
    Debug,
    Info,
    Warn,
    Error,
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Trace => write!(f, "TRACE"),
            Self::Debug => write!(f, "DEBUG"),
            Self::Info => write!(f, "INFO"),
            Self::Warn => write!(f, "WARN"),
            Self::Error => write!(f, "ERROR"),
        }
    }
}

/// Sink for diagnostic messages.
///
/// Logging never affects control flow; implementations must not panic.
pub trait Logger: Send + Sync {
    /// Record a message at the given level.
    fn log(&self, level: LogLevel, message: &str);

    /// Log at debug level.
    fn debug(&self, message: &str) {
        self.log(LogLevel::Debug, message);
    }

    /// Log at info level.
    fn info(&self, message: &str) {
        self.log(LogLevel::Info, message);
    }

    /// Log at warn level.
    fn warn(&self, message: &str) {
        self.log(LogLevel::Warn, message);
    }
}

/// Logger that discards everything.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopLogger;

impl Logger for NoopLogger {
    fn log(&self, _level: LogLevel, _message: &str) {}
}
