//! Observability infrastructure for fetch-route.
//!
//! This crate provides:
//! - `StructuredLogger` - Structured logging to stderr (the default logger)
//! - `TracingLogger` - Forwards diagnostics to `tracing`
//! - `RecordingLogger` - Keeps messages in memory for inspection

mod logging;
mod recording;
mod tracing_bridge;

pub use logging::*;
pub use recording::*;
pub use tracing_bridge::*;

// Re-export the logger seam for convenience
pub use fetch_route_core::{LogLevel, Logger};
