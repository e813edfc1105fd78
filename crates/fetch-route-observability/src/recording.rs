//! In-memory logger.

use std::sync::Arc;

use fetch_route_core::{LogLevel, Logger};
use parking_lot::Mutex;

/// Logger that keeps every message in memory.
///
/// Clones share the same buffer, so a test can hand one clone to the
/// installation and inspect the other.
#[derive(Debug, Clone, Default)]
pub struct RecordingLogger {
    entries: Arc<Mutex<Vec<(LogLevel, String)>>>,
}

impl RecordingLogger {
    /// Create an empty recording logger.
    pub fn new() -> Self {
        Self::default()
    }

    /// All recorded entries, oldest first.
    pub fn entries(&self) -> Vec<(LogLevel, String)> {
        self.entries.lock().clone()
    }

    /// Recorded messages, oldest first.
    pub fn messages(&self) -> Vec<String> {
        self.entries.lock().iter().map(|(_, m)| m.clone()).collect()
    }

    /// Whether any recorded message contains `needle`.
    pub fn contains(&self, needle: &str) -> bool {
        self.entries.lock().iter().any(|(_, m)| m.contains(needle))
    }

    /// Drop all recorded entries.
    pub fn clear(&self) {
        self.entries.lock().clear();
    }
}

impl Logger for RecordingLogger {
    fn log(&self, level: LogLevel, message: &str) {
        self.entries.lock().push((level, message.to_string()));
    }
}
