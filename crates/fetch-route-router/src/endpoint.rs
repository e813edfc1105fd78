//! Per-route fetch endpoints.

use std::fmt;
use std::sync::Arc;

use fetch_route_cache::{
    compile_url, settled, unresolved_placeholders, RouteDataFuture, RouteDataModule,
};
use fetch_route_core::{Params, Query, RouteDataError, RouteRequest};

use crate::record::ApiDescriptor;

/// A route's fetch capability: one descriptor bound to the shared module.
///
/// Cloning is cheap; every clone talks to the same cache.
#[derive(Clone)]
pub struct RouteEndpoint {
    module: Arc<RouteDataModule>,
    descriptor: Arc<ApiDescriptor>,
    strict_templates: bool,
}

impl RouteEndpoint {
    /// Bind a descriptor to a module.
    pub fn new(module: Arc<RouteDataModule>, descriptor: ApiDescriptor) -> Self {
        Self {
            module,
            descriptor: Arc::new(descriptor),
            strict_templates: false,
        }
    }

    /// Reject requests whose URL keeps unresolved `:name` placeholders.
    pub fn with_strict_templates(mut self, strict: bool) -> Self {
        self.strict_templates = strict;
        self
    }

    /// The bound descriptor.
    pub fn descriptor(&self) -> &ApiDescriptor {
        &self.descriptor
    }

    /// The URL template.
    pub fn url(&self) -> &str {
        &self.descriptor.url
    }

    /// Resolve a request.
    ///
    /// Call-site params and query win over the descriptor presets. A request
    /// carrying a `response` writes it under the storage key; any other
    /// request reads through the cache. Failures only surface through the
    /// returned future.
    pub fn resolve(&self, request: RouteRequest) -> RouteDataFuture {
        let RouteRequest {
            params,
            query,
            response,
        } = request;

        let mut merged_params: Params = self.descriptor.params.clone();
        merged_params.extend(params);
        let mut merged_query: Query = self.descriptor.query.clone();
        merged_query.extend(query);

        if let Err(err) = self.check_template(&merged_params) {
            return settled(Err(err));
        }

        let logger = self.module.logger();
        let url = &self.descriptor.url;

        match response {
            Some(payload) => {
                let storage_key = self.module.storage_key(url, &merged_params, &merged_query);
                logger.debug(&format!("Saving prefetched data for URL '{}'", storage_key));
                self.module.set_route_data(&storage_key, payload)
            }
            None => {
                let keys = self.module.derive_keys(url, &merged_params, &merged_query);
                logger.debug(&format!(
                    "Fetching data for URL '{}'... Caching is {}.",
                    keys.fetch_key,
                    if self.descriptor.use_cache {
                        "enabled"
                    } else {
                        "disabled"
                    }
                ));
                self.module
                    .get_route_data(&keys.storage_key, &keys.fetch_key, self.descriptor.use_cache)
            }
        }
    }

    /// Shorthand for a read with the given params and query.
    pub fn fetch(&self, params: Params, query: Query) -> RouteDataFuture {
        self.resolve(RouteRequest {
            params,
            query,
            response: None,
        })
    }

    fn check_template(&self, params: &Params) -> Result<(), RouteDataError> {
        let url = compile_url(&self.descriptor.url, params, &Query::new());
        let placeholders = unresolved_placeholders(&url);
        if placeholders.is_empty() {
            return Ok(());
        }

        if self.strict_templates {
            return Err(RouteDataError::UnresolvedPlaceholder { url, placeholders });
        }

        self.module.logger().warn(&format!(
            "URL '{}' has unresolved placeholders {:?}",
            url, placeholders
        ));
        Ok(())
    }
}

impl fmt::Debug for RouteEndpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RouteEndpoint")
            .field("descriptor", &self.descriptor)
            .field("strict_templates", &self.strict_templates)
            .finish_non_exhaustive()
    }
}
