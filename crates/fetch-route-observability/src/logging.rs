//! Structured logging with namespace context.

use std::collections::HashMap;
use std::fmt;
use std::time::Instant;

use fetch_route_core::{LogLevel, Logger};
use serde::{Deserialize, Serialize};

/// A structured log entry.
#[derive(Debug, Clone, Serialize)]
pub struct LogEntry {
    /// Log level.
    pub level: LogLevel,
    /// Log message.
    pub message: String,
    /// Store namespace of the emitting module.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub namespace: Option<String>,
    /// Additional structured fields.
    #[serde(flatten)]
    pub fields: HashMap<String, serde_json::Value>,
    /// Microseconds since the logger was created.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub elapsed_us: Option<u64>,
}

impl LogEntry {
    /// Format as JSON string.
    pub fn to_json(&self) -> String {
        serde_json::to_string(self).unwrap_or_else(|_| self.message.clone())
    }

    /// Format as human-readable string.
    pub fn to_human(&self) -> String {
        let mut s = match &self.namespace {
            Some(ns) => format!("[{}] {}: {}", self.level, ns, self.message),
            None => format!("[{}] {}", self.level, self.message),
        };

        if let Some(elapsed) = self.elapsed_us {
            s.push_str(&format!(" ({}us)", elapsed));
        }

        if !self.fields.is_empty() {
            s.push_str(" | ");
            let mut fields: Vec<String> = self
                .fields
                .iter()
                .map(|(k, v)| format!("{}={}", k, v))
                .collect();
            fields.sort();
            s.push_str(&fields.join(" "));
        }

        s
    }
}

/// Output format for logs.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// JSON format (for log aggregation).
    Json,
    /// Human-readable format (for development).
    #[default]
    Human,
}

/// Structured logger writing one line per entry to stderr.
///
/// This is the default logger for a fetch-route installation.
#[derive(Debug, Clone)]
pub struct StructuredLogger {
    namespace: Option<String>,
    start_time: Instant,
    min_level: LogLevel,
    format: LogFormat,
}

impl Default for StructuredLogger {
    fn default() -> Self {
        Self::new()
    }
}

impl StructuredLogger {
    /// Create a new logger at info level, human format.
    pub fn new() -> Self {
        Self {
            namespace: None,
            start_time: Instant::now(),
            min_level: LogLevel::Info,
            format: LogFormat::Human,
        }
    }

    /// Tag every entry with a store namespace.
    pub fn with_namespace(mut self, namespace: impl Into<String>) -> Self {
        self.namespace = Some(namespace.into());
        self
    }

    /// Set minimum log level.
    pub fn with_min_level(mut self, level: LogLevel) -> Self {
        self.min_level = level;
        self
    }

    /// Set output format.
    pub fn with_format(mut self, format: LogFormat) -> Self {
        self.format = format;
        self
    }

    /// Minimum level that will be written.
    pub fn min_level(&self) -> LogLevel {
        self.min_level
    }

    /// Log with additional fields.
    pub fn log_with_fields(
        &self,
        level: LogLevel,
        message: &str,
        fields: HashMap<String, serde_json::Value>,
    ) {
        if let Some(line) = self.render(level, message, fields) {
            eprintln!("{}", line);
        }
    }

    /// Log at debug level with fields.
    pub fn debug_with(&self, message: &str, fields: &[(&str, &dyn fmt::Debug)]) {
        let fields = fields
            .iter()
            .map(|(k, v)| (k.to_string(), serde_json::json!(format!("{:?}", v))))
            .collect();
        self.log_with_fields(LogLevel::Debug, message, fields);
    }

    /// Build the output line for an entry, or `None` when filtered out.
    pub fn render(
        &self,
        level: LogLevel,
        message: &str,
        fields: HashMap<String, serde_json::Value>,
    ) -> Option<String> {
        if level < self.min_level {
            return None;
        }

        let entry = LogEntry {
            level,
            message: message.to_string(),
            namespace: self.namespace.clone(),
            fields,
            elapsed_us: Some(self.start_time.elapsed().as_micros() as u64),
        };

        Some(match self.format {
            LogFormat::Json => entry.to_json(),
            LogFormat::Human => entry.to_human(),
        })
    }
}

impl Logger for StructuredLogger {
    fn log(&self, level: LogLevel, message: &str) {
        self.log_with_fields(level, message, HashMap::new());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(level: LogLevel, message: &str) -> LogEntry {
        LogEntry {
            level,
            message: message.to_string(),
            namespace: Some("fetch-route".to_string()),
            fields: HashMap::new(),
            elapsed_us: None,
        }
    }

    // === LogEntry Tests ===

    #[test]
    fn test_entry_to_human() {
        let line = entry(LogLevel::Debug, "Using cached data").to_human();
        assert_eq!(line, "[DEBUG] fetch-route: Using cached data");
    }

    #[test]
    fn test_entry_to_human_with_fields() {
        let mut e = entry(LogLevel::Info, "saved");
        e.fields.insert("key".to_string(), serde_json::json!("/api/app"));
        assert_eq!(e.to_human(), r#"[INFO] fetch-route: saved | key="/api/app""#);
    }

    #[test]
    fn test_entry_to_json() {
        let json: serde_json::Value =
            serde_json::from_str(&entry(LogLevel::Warn, "careful").to_json()).unwrap();

        assert_eq!(json["level"], "warn");
        assert_eq!(json["message"], "careful");
        assert_eq!(json["namespace"], "fetch-route");
        assert!(json.get("elapsed_us").is_none());
    }

    // === StructuredLogger Tests ===

    #[test]
    fn test_logger_filters_below_min_level() {
        let logger = StructuredLogger::new().with_min_level(LogLevel::Warn);
        assert!(logger.render(LogLevel::Debug, "hidden", HashMap::new()).is_none());
        assert!(logger.render(LogLevel::Error, "shown", HashMap::new()).is_some());
    }

    #[test]
    fn test_logger_json_format() {
        let logger = StructuredLogger::new()
            .with_namespace("app/data")
            .with_format(LogFormat::Json);

        let line = logger.render(LogLevel::Info, "hello", HashMap::new()).unwrap();
        let json: serde_json::Value = serde_json::from_str(&line).unwrap();
        assert_eq!(json["namespace"], "app/data");
        assert!(json["elapsed_us"].is_u64());
    }
}
