//! Installation configuration.

use std::fmt;
use std::sync::Arc;

use fetch_route_core::{LogLevel, Logger, Namespace, Transport, DEFAULT_NAMESPACE, PARTIALS_PARAM};
use fetch_route_data::HttpTransport;
use fetch_route_observability::{LogFormat, StructuredLogger};
use serde::{Deserialize, Serialize};

/// Error loading configuration overrides.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("invalid TOML config: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("invalid JSON config: {0}")]
    Json(#[from] serde_json::Error),
}

/// Options for a fetch-route installation.
#[derive(Clone)]
pub struct FetchRouteConfig {
    /// Diagnostics sink.
    pub logger: Arc<dyn Logger>,
    /// Network transport for cache misses.
    pub transport: Arc<dyn Transport>,
    /// Query params left out of storage keys and route comparison.
    pub ignored_query_params: Vec<String>,
    /// Store namespace of the route-data module.
    pub namespace: Namespace,
    /// Reject URLs with unresolved `:name` placeholders instead of warning.
    pub strict_templates: bool,
}

impl Default for FetchRouteConfig {
    fn default() -> Self {
        Self {
            logger: Arc::new(StructuredLogger::new().with_namespace(DEFAULT_NAMESPACE)),
            transport: Arc::new(HttpTransport::new()),
            ignored_query_params: vec![PARTIALS_PARAM.to_string()],
            namespace: Namespace::default(),
            strict_templates: false,
        }
    }
}

impl FetchRouteConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Defaults with `overrides` applied.
    pub fn resolve(overrides: &FetchRouteOverrides) -> Self {
        Self::default().apply(overrides)
    }

    pub fn with_logger(mut self, logger: impl Logger + 'static) -> Self {
        self.logger = Arc::new(logger);
        self
    }

    pub fn with_transport(mut self, transport: impl Transport + 'static) -> Self {
        self.transport = Arc::new(transport);
        self
    }

    pub fn with_ignored_query_params<I, S>(mut self, params: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.ignored_query_params = params.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_namespace(mut self, namespace: impl Into<Namespace>) -> Self {
        self.namespace = namespace.into();
        self
    }

    pub fn with_strict_templates(mut self, strict: bool) -> Self {
        self.strict_templates = strict;
        self
    }

    /// Layer file or environment overrides on top of this config.
    ///
    /// The logger is rebuilt when a level or format is given; the transport
    /// is rebuilt when a base URL is given.
    pub fn apply(mut self, overrides: &FetchRouteOverrides) -> Self {
        if let Some(params) = &overrides.ignored_query_params {
            self.ignored_query_params = params.clone();
        }
        if let Some(namespace) = &overrides.namespace {
            self.namespace = namespace.clone();
        }
        if let Some(strict) = overrides.strict_templates {
            self.strict_templates = strict;
        }
        if overrides.log_level.is_some() || overrides.log_format.is_some() {
            self.logger = Arc::new(
                StructuredLogger::new()
                    .with_namespace(self.namespace.as_path())
                    .with_min_level(overrides.log_level.unwrap_or(LogLevel::Info))
                    .with_format(overrides.log_format.unwrap_or_default()),
            );
        }
        if let Some(base_url) = &overrides.base_url {
            self.transport = Arc::new(HttpTransport::new().with_base_url(base_url.clone()));
        }
        self
    }
}

impl fmt::Debug for FetchRouteConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FetchRouteConfig")
            .field("ignored_query_params", &self.ignored_query_params)
            .field("namespace", &self.namespace)
            .field("strict_templates", &self.strict_templates)
            .finish_non_exhaustive()
    }
}

/// Serializable overrides, e.g. a `[fetch_route]` table in a config file.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FetchRouteOverrides {
    pub log_level: Option<LogLevel>,
    pub log_format: Option<LogFormat>,
    /// Prefix for relative fetch URLs.
    pub base_url: Option<String>,
    pub ignored_query_params: Option<Vec<String>>,
    pub namespace: Option<Namespace>,
    pub strict_templates: Option<bool>,
}

impl FetchRouteOverrides {
    pub fn from_toml_str(source: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(source)?)
    }

    pub fn from_json_str(source: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(source)?)
    }
}
