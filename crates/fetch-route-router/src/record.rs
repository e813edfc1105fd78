//! Route records as supplied by the host router.

use fetch_route_core::{Params, Query, QueryValue, RoutePayload};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

fn default_use_cache() -> bool {
    true
}

/// How to fetch the data behind one route.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApiDescriptor {
    /// URL template with `:name` placeholders (e.g., `/api/products/:id`).
    pub url: String,
    /// Whether cached data may be served.
    #[serde(default = "default_use_cache", rename = "useCache")]
    pub use_cache: bool,
    /// Preset params, overridden by call-site params.
    #[serde(default, skip_serializing_if = "Params::is_empty")]
    pub params: Params,
    /// Preset query, overridden by call-site query.
    #[serde(default, skip_serializing_if = "Query::is_empty")]
    pub query: Query,
}

impl ApiDescriptor {
    /// Create a cached descriptor for a URL template.
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            use_cache: true,
            params: Params::new(),
            query: Query::new(),
        }
    }

    /// Allow or forbid serving cached data.
    pub fn with_cache(mut self, use_cache: bool) -> Self {
        self.use_cache = use_cache;
        self
    }

    /// Preset a param.
    pub fn with_param(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.params.insert(key.into(), value.into());
        self
    }

    /// Preset a query value.
    pub fn with_query(mut self, key: impl Into<String>, value: impl Into<QueryValue>) -> Self {
        self.query.insert(key.into(), value.into());
        self
    }
}

/// The `api` block of a route record.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RouteApiSpec {
    /// Fetch descriptor; routes without one are fetch-inert.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fetch: Option<ApiDescriptor>,
    /// Payload already available for this route, written to the cache at
    /// decoration time.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fetched: Option<RoutePayload>,
}

/// A route definition, possibly with nested children.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RouteRecord {
    /// Path segment of this route.
    pub path: String,
    /// Route name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// View component identifier, opaque to fetch-route.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub component: Option<String>,
    /// Redirect target.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub redirect: Option<String>,
    /// Alias path.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub alias: Option<String>,
    /// Nested routes.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub children: Option<Vec<RouteRecord>>,
    /// Free-form route metadata.
    #[serde(default, skip_serializing_if = "Map::is_empty")]
    pub meta: Map<String, Value>,
    /// Data fetching block.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api: Option<RouteApiSpec>,
}

impl RouteRecord {
    /// Create a record for a path.
    pub fn new(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            ..Default::default()
        }
    }

    /// Set the route name.
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Set the view component identifier.
    pub fn with_component(mut self, component: impl Into<String>) -> Self {
        self.component = Some(component.into());
        self
    }

    /// Redirect this route elsewhere.
    pub fn with_redirect(mut self, target: impl Into<String>) -> Self {
        self.redirect = Some(target.into());
        self
    }

    /// Alias this route.
    pub fn with_alias(mut self, alias: impl Into<String>) -> Self {
        self.alias = Some(alias.into());
        self
    }

    /// Set nested routes.
    pub fn with_children(mut self, children: Vec<RouteRecord>) -> Self {
        self.children = Some(children);
        self
    }

    /// Add a metadata entry.
    pub fn with_meta(mut self, key: impl Into<String>, value: Value) -> Self {
        self.meta.insert(key.into(), value);
        self
    }

    /// Attach a fetch descriptor.
    pub fn with_fetch(mut self, descriptor: ApiDescriptor) -> Self {
        self.api.get_or_insert_with(RouteApiSpec::default).fetch = Some(descriptor);
        self
    }

    /// Attach an already available payload.
    pub fn with_fetched(mut self, payload: RoutePayload) -> Self {
        self.api.get_or_insert_with(RouteApiSpec::default).fetched = Some(payload);
        self
    }

    /// The fetch descriptor, if any.
    pub fn fetch_descriptor(&self) -> Option<&ApiDescriptor> {
        self.api.as_ref().and_then(|api| api.fetch.as_ref())
    }

    /// The prefetched payload, if any.
    pub fn fetched(&self) -> Option<&RoutePayload> {
        self.api.as_ref().and_then(|api| api.fetched.as_ref())
    }
}
