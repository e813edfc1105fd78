//! The fetch-route installation: one cache module shared by every route.

use std::sync::{Arc, OnceLock};

use fetch_route_cache::{settled, RouteDataFuture, RouteDataModule};
use fetch_route_core::{Logger, Namespace, RouteDataError, RouteRequest};

use crate::config::FetchRouteConfig;
use crate::decorate::{DecoratedRoute, RecordDecorator};
use crate::location::{self, RouteLocation};
use crate::record::RouteRecord;
use crate::store::{StateContainer, StoreError, Unsync};

/// An installed fetch-route instance.
///
/// Owns the route-data module. Decorated routes and connected stores hold
/// handles on the same module.
#[derive(Debug)]
pub struct FetchRoute {
    config: FetchRouteConfig,
    module: Arc<RouteDataModule>,
    decorator: RecordDecorator,
}

impl FetchRoute {
    pub fn new(config: FetchRouteConfig) -> Self {
        let module = Arc::new(
            RouteDataModule::new(Arc::clone(&config.transport))
                .with_logger(Arc::clone(&config.logger))
                .with_ignored_query_params(config.ignored_query_params.clone()),
        );
        let decorator = RecordDecorator::new(Arc::clone(&module))
            .with_strict_templates(config.strict_templates);

        Self {
            config,
            module,
            decorator,
        }
    }

    /// Install into a process-wide slot.
    ///
    /// The first install wins; later calls leave it untouched and return it.
    pub fn install(slot: &OnceLock<FetchRoute>, config: FetchRouteConfig) -> &FetchRoute {
        let mut created = false;
        let plugin = slot.get_or_init(|| {
            created = true;
            Self::new(config)
        });
        if !created {
            plugin.logger().debug("fetch-route is already installed");
        }
        plugin
    }

    pub fn config(&self) -> &FetchRouteConfig {
        &self.config
    }

    pub fn module(&self) -> &Arc<RouteDataModule> {
        &self.module
    }

    pub fn namespace(&self) -> &Namespace {
        &self.config.namespace
    }

    pub fn logger(&self) -> &Arc<dyn Logger> {
        &self.config.logger
    }

    pub fn is_loading(&self) -> bool {
        self.module.is_loading()
    }

    /// Register the route-data module with a store under the configured
    /// namespace. Connecting twice to the same store is a no-op.
    pub fn connect<S>(&self, store: Arc<S>) -> Result<Unsync, StoreError>
    where
        S: StateContainer + 'static,
    {
        let namespace = self.config.namespace.clone();
        store.register_module(&namespace, Arc::clone(&self.module))?;
        self.logger()
            .debug(&format!("Registered route-data module under '{}'", namespace));
        Ok(Unsync::new(store, namespace))
    }

    /// Decorate top-level route records.
    pub fn decorate_records(&self, records: &[RouteRecord]) -> Vec<DecoratedRoute> {
        self.decorator.decorate_records(records, &[])
    }

    /// Decorate one record nested under `parents`.
    pub fn decorate_record(&self, record: &RouteRecord, parents: &[String]) -> DecoratedRoute {
        self.decorator.decorate_record(record, parents)
    }

    /// Whether two locations address the same data, ignoring the configured
    /// query params.
    pub fn compare_records(&self, a: &RouteLocation, b: &RouteLocation) -> bool {
        location::compare_records(a, b, self.config.ignored_query_params.as_slice())
    }

    /// Fetch the data behind a location.
    ///
    /// Resolves with `NotFetchable` when the location has no endpoint.
    pub fn invoke_fetch(&self, location: &RouteLocation) -> RouteDataFuture {
        match &location.endpoint {
            Some(endpoint) => endpoint.resolve(RouteRequest {
                params: location.params.clone(),
                query: location.query.clone(),
                response: None,
            }),
            None => settled(Err(RouteDataError::NotFetchable(
                location.name.clone().unwrap_or_else(|| "<unnamed>".to_string()),
            ))),
        }
    }
}
