//! Route decoration: attach fetch endpoints and hierarchy to route trees.

use std::sync::Arc;

use fetch_route_cache::RouteDataModule;
use fetch_route_core::{Params, Query, RouteRequest};
use serde::{Serialize, Serializer};
use serde_json::{Map, Value};

use crate::endpoint::RouteEndpoint;
use crate::location::RouteLocation;
use crate::record::{RouteApiSpec, RouteRecord};

/// Meta attached to a fetchable route.
#[derive(Debug, Clone)]
pub struct FetchMeta {
    /// Paths from the root down to and including this route.
    pub hierarchy: Vec<String>,
    /// The route's fetch endpoint.
    pub api: RouteEndpoint,
}

/// What a decorated route is.
#[derive(Debug, Clone)]
pub enum RouteNode {
    /// No fetch descriptor.
    Leaf,
    /// Has a fetch descriptor.
    Fetchable(FetchMeta),
    /// Redirects to another path; never fetches.
    Redirect(String),
    /// Aliases another path; never fetches.
    Alias(String),
}

/// A route record after decoration.
///
/// Serializes back to the input record shape. Fetchable routes gain
/// `meta.hierarchy` and `meta.api`.
#[derive(Debug, Clone)]
pub struct DecoratedRoute {
    pub path: String,
    pub name: Option<String>,
    pub component: Option<String>,
    /// User-supplied meta, untouched.
    pub meta: Map<String, Value>,
    pub children: Option<Vec<DecoratedRoute>>,
    pub node: RouteNode,
    redirect: Option<String>,
    alias: Option<String>,
    api: Option<RouteApiSpec>,
}

impl DecoratedRoute {
    /// The fetch endpoint, if this route is fetchable.
    pub fn endpoint(&self) -> Option<&RouteEndpoint> {
        match &self.node {
            RouteNode::Fetchable(meta) => Some(&meta.api),
            _ => None,
        }
    }

    /// Root-to-self path list, if this route is fetchable.
    pub fn hierarchy(&self) -> Option<&[String]> {
        match &self.node {
            RouteNode::Fetchable(meta) => Some(&meta.hierarchy),
            _ => None,
        }
    }

    pub fn is_fetchable(&self) -> bool {
        matches!(self.node, RouteNode::Fetchable(_))
    }

    /// Depth-first search for a route by name.
    pub fn find(&self, name: &str) -> Option<&DecoratedRoute> {
        if self.name.as_deref() == Some(name) {
            return Some(self);
        }
        self.children
            .as_deref()
            .and_then(|children| find_route(children, name))
    }

    /// A navigation target for this route.
    pub fn location(&self, params: Params, query: Query) -> RouteLocation {
        RouteLocation {
            name: self.name.clone(),
            params,
            query,
            endpoint: self.endpoint().cloned(),
        }
    }

    /// Convert back to a plain record.
    pub fn to_record(&self) -> RouteRecord {
        let mut meta = self.meta.clone();
        if let RouteNode::Fetchable(fetch) = &self.node {
            meta.insert(
                "hierarchy".to_string(),
                Value::Array(fetch.hierarchy.iter().cloned().map(Value::String).collect()),
            );
            // ApiDescriptor only holds strings, bools and maps.
            if let Ok(api) = serde_json::to_value(fetch.api.descriptor()) {
                meta.insert("api".to_string(), api);
            }
        }

        RouteRecord {
            path: self.path.clone(),
            name: self.name.clone(),
            component: self.component.clone(),
            redirect: self.redirect.clone(),
            alias: self.alias.clone(),
            children: self
                .children
                .as_ref()
                .map(|children| children.iter().map(DecoratedRoute::to_record).collect()),
            meta,
            api: self.api.clone(),
        }
    }
}

impl Serialize for DecoratedRoute {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.to_record().serialize(serializer)
    }
}

/// Depth-first search over a route list.
pub fn find_route<'a>(routes: &'a [DecoratedRoute], name: &str) -> Option<&'a DecoratedRoute> {
    routes.iter().find_map(|route| route.find(name))
}

/// Decorates route records against one route-data module.
#[derive(Debug, Clone)]
pub struct RecordDecorator {
    module: Arc<RouteDataModule>,
    strict_templates: bool,
}

impl RecordDecorator {
    pub fn new(module: Arc<RouteDataModule>) -> Self {
        Self {
            module,
            strict_templates: false,
        }
    }

    pub fn with_strict_templates(mut self, strict: bool) -> Self {
        self.strict_templates = strict;
        self
    }

    /// Decorate a list of sibling records under `parents`.
    pub fn decorate_records(
        &self,
        records: &[RouteRecord],
        parents: &[String],
    ) -> Vec<DecoratedRoute> {
        records
            .iter()
            .map(|record| self.decorate_record(record, parents))
            .collect()
    }

    /// Decorate one record and its children.
    ///
    /// A `fetched` payload is written to the cache right away, under the
    /// storage key derived from the descriptor presets.
    pub fn decorate_record(&self, record: &RouteRecord, parents: &[String]) -> DecoratedRoute {
        let mut hierarchy = parents.to_vec();
        hierarchy.push(record.path.clone());

        let children = record
            .children
            .as_ref()
            .map(|children| self.decorate_records(children, &hierarchy));

        let node = if let Some(target) = &record.redirect {
            RouteNode::Redirect(target.clone())
        } else if let Some(target) = &record.alias {
            RouteNode::Alias(target.clone())
        } else if let Some(descriptor) = record.fetch_descriptor() {
            let api = RouteEndpoint::new(Arc::clone(&self.module), descriptor.clone())
                .with_strict_templates(self.strict_templates);
            if let Some(fetched) = record.fetched() {
                // The write commits synchronously; the future only reports it.
                let written = api.resolve(RouteRequest::new().with_response(fetched.clone()));
                if let Some(Err(err)) = written.peek() {
                    self.module.logger().warn(&format!(
                        "Dropping prefetched data for route '{}': {}",
                        record.path, err
                    ));
                }
            }
            RouteNode::Fetchable(FetchMeta { hierarchy, api })
        } else {
            RouteNode::Leaf
        };

        DecoratedRoute {
            path: record.path.clone(),
            name: record.name.clone(),
            component: record.component.clone(),
            meta: record.meta.clone(),
            children,
            node,
            redirect: record.redirect.clone(),
            alias: record.alias.clone(),
            api: record.api.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use fetch_route_cache::StorageKey;
    use fetch_route_core::{RoutePayload, TransportError};
    use fetch_route_data::FnTransport;
    use fetch_route_observability::RecordingLogger;
    use serde_json::json;

    use crate::record::ApiDescriptor;

    fn decorator() -> RecordDecorator {
        let transport = FnTransport::new(|url: String| async move {
            Err::<RoutePayload, _>(TransportError::Connection(url))
        });
        RecordDecorator::new(Arc::new(RouteDataModule::new(Arc::new(transport))))
    }

    fn app_records() -> Vec<RouteRecord> {
        vec![
            RouteRecord::new("/").with_name("home").with_component("Home"),
            RouteRecord::new("/app")
                .with_name("app")
                .with_fetch(ApiDescriptor::new("/api/:section").with_param("section", "app"))
                .with_children(vec![RouteRecord::new("settings")
                    .with_name("settings")
                    .with_fetch(ApiDescriptor::new("/api/settings"))]),
            RouteRecord::new("/old").with_redirect("/app"),
        ]
    }

    #[test]
    fn test_leaf_serializes_like_input() {
        let records = app_records();
        let routes = decorator().decorate_records(&records, &[]);

        assert!(matches!(routes[0].node, RouteNode::Leaf));
        assert_eq!(
            serde_json::to_value(&routes[0]).unwrap(),
            serde_json::to_value(&records[0]).unwrap()
        );
    }

    #[test]
    fn test_redirect_serializes_like_input() {
        let records = app_records();
        let routes = decorator().decorate_records(&records, &[]);

        assert!(matches!(&routes[2].node, RouteNode::Redirect(target) if target == "/app"));
        assert!(routes[2].endpoint().is_none());
        assert_eq!(routes[2].to_record(), records[2]);
    }

    #[test]
    fn test_alias_wins_over_fetch() {
        let record = RouteRecord::new("/a")
            .with_alias("/b")
            .with_fetch(ApiDescriptor::new("/api/a"));

        let route = decorator().decorate_record(&record, &[]);

        assert!(matches!(&route.node, RouteNode::Alias(target) if target == "/b"));
        assert_eq!(route.to_record(), record);
    }

    #[test]
    fn test_redirect_keeps_alias() {
        let record = RouteRecord::new("/a").with_redirect("/b").with_alias("/c");

        let route = decorator().decorate_record(&record, &[]);

        assert!(matches!(&route.node, RouteNode::Redirect(target) if target == "/b"));
        assert_eq!(route.to_record(), record);
        assert_eq!(
            serde_json::to_value(&route).unwrap(),
            json!({ "path": "/a", "redirect": "/b", "alias": "/c" })
        );
    }

    #[test]
    fn test_fetchable_gains_hierarchy_and_api() {
        let routes = decorator().decorate_records(&app_records(), &[]);
        let app = &routes[1];

        assert_eq!(app.hierarchy().unwrap(), ["/app"]);
        assert_eq!(app.endpoint().unwrap().url(), "/api/:section");

        let value = serde_json::to_value(app).unwrap();
        assert_eq!(value["meta"]["hierarchy"], json!(["/app"]));
        assert_eq!(value["meta"]["api"]["url"], json!("/api/:section"));
        assert_eq!(value["meta"]["api"]["useCache"], json!(true));
        assert_eq!(value["api"]["fetch"]["params"]["section"], json!("app"));
    }

    #[test]
    fn test_children_inherit_hierarchy() {
        let routes = decorator().decorate_records(&app_records(), &["/root".to_string()]);
        let settings = routes[1].find("settings").unwrap();

        assert_eq!(settings.hierarchy().unwrap(), ["/root", "/app", "settings"]);
    }

    #[test]
    fn test_user_meta_preserved() {
        let record = RouteRecord::new("/x")
            .with_meta("title", json!("X"))
            .with_fetch(ApiDescriptor::new("/api/x"));

        let value = serde_json::to_value(decorator().decorate_record(&record, &[])).unwrap();

        assert_eq!(value["meta"]["title"], json!("X"));
        assert_eq!(value["meta"]["hierarchy"], json!(["/x"]));
    }

    #[test]
    fn test_fetched_payload_written_at_decoration() {
        let decorator = decorator();
        let record = RouteRecord::new("/app")
            .with_fetch(ApiDescriptor::new("/api/:section").with_param("section", "app"))
            .with_fetched(RoutePayload::new(json!({ "x": 1 })).with_partial("nav", json!([1])));

        decorator.decorate_record(&record, &[]);

        let module = &decorator.module;
        let slot = module.slot(&StorageKey::new("/api/app")).unwrap();
        assert_eq!(slot.future().peek().unwrap().as_ref().unwrap(), &json!({ "x": 1 }));
        assert_eq!(module.partial("nav"), Some(json!([1])));
    }

    #[test]
    fn test_rejected_prefetch_is_logged() {
        let logger = RecordingLogger::new();
        let transport = FnTransport::new(|url: String| async move {
            Err::<RoutePayload, _>(TransportError::Connection(url))
        });
        let module =
            RouteDataModule::new(Arc::new(transport)).with_logger(Arc::new(logger.clone()));
        let decorator = RecordDecorator::new(Arc::new(module)).with_strict_templates(true);
        let record = RouteRecord::new("/p/:id")
            .with_fetch(ApiDescriptor::new("/api/products/:id"))
            .with_fetched(RoutePayload::new(json!({ "x": 1 })));

        let route = decorator.decorate_record(&record, &[]);

        assert!(route.is_fetchable());
        assert!(decorator.module.state().routes.is_empty());
        assert!(logger.contains("Dropping prefetched data for route '/p/:id'"));
    }

    #[test]
    fn test_find_route_by_name() {
        let routes = decorator().decorate_records(&app_records(), &[]);

        assert_eq!(find_route(&routes, "settings").unwrap().path, "settings");
        assert!(find_route(&routes, "missing").is_none());
    }
}
