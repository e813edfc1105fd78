//! Navigation targets and their comparison.

use fetch_route_cache::strip_ignored;
use fetch_route_core::{Params, Query, QueryValue};

use crate::endpoint::RouteEndpoint;

/// A resolved navigation target.
#[derive(Debug, Clone, Default)]
pub struct RouteLocation {
    pub name: Option<String>,
    pub params: Params,
    pub query: Query,
    /// Fetch endpoint of the matched route, if it has one.
    pub endpoint: Option<RouteEndpoint>,
}

impl RouteLocation {
    /// A location for a named route without an endpoint.
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            ..Default::default()
        }
    }

    pub fn with_param(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.params.insert(key.into(), value.into());
        self
    }

    pub fn with_query(mut self, key: impl Into<String>, value: impl Into<QueryValue>) -> Self {
        self.query.insert(key.into(), value.into());
        self
    }

    pub fn with_endpoint(mut self, endpoint: RouteEndpoint) -> Self {
        self.endpoint = Some(endpoint);
        self
    }
}

/// Whether two locations address the same data.
///
/// Names and params must match exactly; queries must match once the
/// ignored params are removed from both.
pub fn compare_records<S: AsRef<str>>(
    a: &RouteLocation,
    b: &RouteLocation,
    ignored: &[S],
) -> bool {
    a.name == b.name
        && a.params == b.params
        && strip_ignored(&a.query, ignored) == strip_ignored(&b.query, ignored)
}
