//! Route data payloads.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Data returned for a route, plus any partials delivered with it.
///
/// Partials are independently cacheable fragments (e.g., a shared navigation
/// block) keyed by name.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RoutePayload {
    /// The route's own data.
    #[serde(default)]
    pub data: Value,
    /// Partial fragments delivered alongside the data.
    #[serde(default, skip_serializing_if = "Map::is_empty")]
    pub partials: Map<String, Value>,
}

impl RoutePayload {
    /// Create a payload without partials.
    pub fn new(data: Value) -> Self {
        Self {
            data,
            partials: Map::new(),
        }
    }

    /// Add a partial fragment.
    pub fn with_partial(mut self, name: impl Into<String>, value: Value) -> Self {
        self.partials.insert(name.into(), value);
        self
    }
}
