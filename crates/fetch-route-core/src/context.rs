//! Route parameters, query strings and fetch requests.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::payload::RoutePayload;

/// Name of the query parameter carrying requested partial names.
pub const PARTIALS_PARAM: &str = "partials";

/// Route parameters filling `:name` placeholders (e.g., `:id` in `/products/:id`).
///
/// Sorted by key, which fixes the placeholder replacement order.
pub type Params = BTreeMap<String, String>;

/// Query string parameters.
pub type Query = BTreeMap<String, QueryValue>;

/// A single query value or a list of values for the same key.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum QueryValue {
    One(String),
    Many(Vec<String>),
}

impl QueryValue {
    /// All values carried by this entry, in order.
    pub fn values(&self) -> Vec<&str> {
        match self {
            Self::One(v) => vec![v.as_str()],
            Self::Many(vs) => vs.iter().map(String::as_str).collect(),
        }
    }

    /// Consume into an owned list of values.
    pub fn into_values(self) -> Vec<String> {
        match self {
            Self::One(v) => vec![v],
            Self::Many(vs) => vs,
        }
    }

    /// Whether this entry carries no value at all.
    pub fn is_empty(&self) -> bool {
        matches!(self, Self::Many(vs) if vs.is_empty())
    }
}

impl From<&str> for QueryValue {
    fn from(value: &str) -> Self {
        Self::One(value.to_string())
    }
}

impl From<String> for QueryValue {
    fn from(value: String) -> Self {
        Self::One(value)
    }
}

impl From<Vec<String>> for QueryValue {
    fn from(values: Vec<String>) -> Self {
        Self::Many(values)
    }
}

impl From<Vec<&str>> for QueryValue {
    fn from(values: Vec<&str>) -> Self {
        Self::Many(values.into_iter().map(String::from).collect())
    }
}

/// Runtime input to a route's fetch endpoint.
///
/// A request carrying a `response` writes that payload into the cache instead
/// of reading from it.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RouteRequest {
    /// Route parameters, merged over the endpoint's presets.
    #[serde(default)]
    pub params: Params,
    /// Query parameters, merged over the endpoint's presets.
    #[serde(default)]
    pub query: Query,
    /// Already available route data (e.g., embedded in the initial document).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub response: Option<RoutePayload>,
}

impl RouteRequest {
    /// Create an empty request.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a route parameter.
    pub fn with_param(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.params.insert(key.into(), value.into());
        self
    }

    /// Set a query parameter.
    pub fn with_query(mut self, key: impl Into<String>, value: impl Into<QueryValue>) -> Self {
        self.query.insert(key.into(), value.into());
        self
    }

    /// Request a set of partials alongside the route data.
    pub fn with_partials<I, S>(self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let names: Vec<String> = names.into_iter().map(Into::into).collect();
        self.with_query(PARTIALS_PARAM, names)
    }

    /// Attach a prefetched payload, turning this into a cache write.
    pub fn with_response(mut self, response: RoutePayload) -> Self {
        self.response = Some(response);
        self
    }
}
