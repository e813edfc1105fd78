//! The route-data module: cache actions shared by every fetch endpoint.
//!
//! The module exclusively owns three pieces of state:
//! - the `StorageKey -> CacheSlot` route cache,
//! - the partials registry,
//! - the loading flag, published through a `watch` channel.
//!
//! All mutations happen synchronously inside the triggering call, so two
//! sequential calls always observe each other's writes.

use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Weak};

use fetch_route_core::{
    Logger, NoopLogger, Params, Query, RouteDataError, RoutePayload, Transport, PARTIALS_PARAM,
};
use futures::FutureExt;
use parking_lot::Mutex;
use serde::Serialize;
use serde_json::{Map, Value};
use tokio::sync::watch;

use crate::key::{self, FetchKey, StorageKey, UrlKeys};
use crate::slot::{CacheSlot, RouteDataFuture, SlotStatus};
use crate::status::CacheStatus;

/// Serializable snapshot of the module state.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RouteDataState {
    /// Whether a network round-trip is outstanding.
    pub is_loading: bool,
    /// Cached routes and the status of their slot.
    pub routes: BTreeMap<StorageKey, SlotStatus>,
    /// Resolved partials by name.
    pub partials: Map<String, Value>,
}

#[derive(Default)]
struct CacheState {
    routes: HashMap<StorageKey, CacheSlot>,
    partials: Map<String, Value>,
    in_flight: usize,
}

/// Route-data cache with single-flight fetch semantics.
pub struct RouteDataModule {
    state: Mutex<CacheState>,
    loading: watch::Sender<bool>,
    next_slot: AtomicU64,
    transport: Arc<dyn Transport>,
    logger: Arc<dyn Logger>,
    ignored_query_params: Vec<String>,
}

impl RouteDataModule {
    /// Create a module around a transport, ignoring the `partials` query
    /// param for storage keys.
    pub fn new(transport: Arc<dyn Transport>) -> Self {
        let (loading, _) = watch::channel(false);
        Self {
            state: Mutex::new(CacheState::default()),
            loading,
            next_slot: AtomicU64::new(1),
            transport,
            logger: Arc::new(NoopLogger),
            ignored_query_params: vec![PARTIALS_PARAM.to_string()],
        }
    }

    /// Set the diagnostics logger.
    pub fn with_logger(mut self, logger: Arc<dyn Logger>) -> Self {
        self.logger = logger;
        self
    }

    /// Set the query params stripped from storage keys.
    pub fn with_ignored_query_params(mut self, params: Vec<String>) -> Self {
        self.ignored_query_params = params;
        self
    }

    /// Query params stripped from storage keys.
    pub fn ignored_query_params(&self) -> &[String] {
        &self.ignored_query_params
    }

    /// The injected logger.
    pub fn logger(&self) -> &Arc<dyn Logger> {
        &self.logger
    }

    // === Key derivation ===

    /// Derive the fetch/storage key pair, narrowing `partials` against the
    /// partials registry.
    pub fn derive_keys(&self, template: &str, params: &Params, query: &Query) -> UrlKeys {
        let state = self.state.lock();
        key::derive_keys(
            template,
            params,
            query,
            &self.ignored_query_params,
            |name| state.partials.contains_key(name),
        )
    }

    /// Derive the storage key only.
    pub fn storage_key(&self, template: &str, params: &Params, query: &Query) -> StorageKey {
        key::storage_key(template, params, query, &self.ignored_query_params)
    }

    /// Copy of `query` without the ignored params.
    pub fn strip_ignored(&self, query: &Query) -> Query {
        key::strip_ignored(query, &self.ignored_query_params)
    }

    // === Actions ===

    /// Write route data under `key`.
    ///
    /// Every partial in the payload is merged into the partials registry and
    /// a new settled future replaces whatever the key held before.
    pub fn set_route_data(&self, key: &StorageKey, value: RoutePayload) -> RouteDataFuture {
        let RoutePayload { data, partials } = value;
        let slot = CacheSlot::resolved(self.next_slot_id(), data);
        let future = slot.future();

        {
            let mut state = self.state.lock();
            state.partials.extend(partials);
            state.routes.insert(key.clone(), slot);
        }

        future
    }

    /// Read route data, from cache when allowed, otherwise over the
    /// transport.
    ///
    /// On a miss the loading flag is raised before this returns and the
    /// pending future is stored under `storage_key`, so every later cached
    /// read shares the same round-trip. On success the result is written
    /// through [`set_route_data`](Self::set_route_data); on failure the slot
    /// goes back to what it held before and the transport error is returned.
    pub fn get_route_data(
        self: &Arc<Self>,
        storage_key: &StorageKey,
        fetch_key: &FetchKey,
        use_cache: bool,
    ) -> RouteDataFuture {
        let (status, future) = {
            let mut state = self.state.lock();

            if use_cache {
                if let Some(slot) = state.routes.get(storage_key) {
                    let future = slot.future();
                    drop(state);
                    self.logger.debug(&format!(
                        "Cache {}: using cached data for '{}'",
                        CacheStatus::Hit,
                        storage_key
                    ));
                    return future;
                }
            }

            let id = self.next_slot_id();
            let previous = state.routes.get(storage_key).cloned();
            let future = self.fetch_remote(id, storage_key.clone(), fetch_key.clone());
            state.routes.insert(
                storage_key.clone(),
                CacheSlot::new(id, future.clone()).with_fallback(previous),
            );
            state.in_flight += 1;

            let status = if use_cache {
                CacheStatus::Miss
            } else {
                CacheStatus::Bypass
            };
            (status, future)
        };

        self.publish_loading();
        self.logger.debug(&format!(
            "Cache {}: using api data from '{}'",
            status, fetch_key
        ));

        drive(&future);
        future
    }

    /// Drop every cached route and partial. The loading flag is untouched.
    pub fn flush_cache(&self) {
        {
            let mut state = self.state.lock();
            state.routes = HashMap::new();
            state.partials = Map::new();
        }
        self.logger.debug("Flushed route cache");
    }

    // === State access ===

    /// Whether a network round-trip is outstanding.
    pub fn is_loading(&self) -> bool {
        *self.loading.borrow()
    }

    /// Subscribe to loading flag changes.
    pub fn subscribe_loading(&self) -> watch::Receiver<bool> {
        self.loading.subscribe()
    }

    /// The slot cached under `key`, if any.
    pub fn slot(&self, key: &StorageKey) -> Option<CacheSlot> {
        self.state.lock().routes.get(key).cloned()
    }

    /// Whether a slot is cached under `key`.
    pub fn contains(&self, key: &StorageKey) -> bool {
        self.state.lock().routes.contains_key(key)
    }

    /// A resolved partial by name.
    pub fn partial(&self, name: &str) -> Option<Value> {
        self.state.lock().partials.get(name).cloned()
    }

    /// Snapshot of the module state.
    pub fn state(&self) -> RouteDataState {
        let state = self.state.lock();
        RouteDataState {
            is_loading: state.in_flight > 0,
            routes: state
                .routes
                .iter()
                .map(|(key, slot)| (key.clone(), slot.status()))
                .collect(),
            partials: state.partials.clone(),
        }
    }

    // === Internals ===

    fn next_slot_id(&self) -> u64 {
        self.next_slot.fetch_add(1, Ordering::Relaxed)
    }

    fn fetch_remote(
        self: &Arc<Self>,
        id: u64,
        storage_key: StorageKey,
        fetch_key: FetchKey,
    ) -> RouteDataFuture {
        let module: Weak<Self> = Arc::downgrade(self);
        let transport = Arc::clone(&self.transport);

        async move {
            let result = transport.fetch(fetch_key.as_str()).await;

            let Some(module) = module.upgrade() else {
                return result.map(|payload| payload.data).map_err(RouteDataError::from);
            };

            let outcome = match result {
                Ok(payload) => module.set_route_data(&storage_key, payload).await,
                Err(err) => {
                    module.logger.debug(&format!(
                        "Fetching '{}' failed: {}",
                        fetch_key, err
                    ));
                    module.restore_slot(id, &storage_key);
                    Err(RouteDataError::from(err))
                }
            };

            module.finish_request();
            outcome
        }
        .boxed()
        .shared()
    }

    /// Undo a failed fetch.
    ///
    /// If the failed slot still owns the key, the slot it displaced goes
    /// back. If a later fetch displaced it, it is unlinked from that fetch's
    /// fallback chain so it can never be restored.
    fn restore_slot(&self, id: u64, key: &StorageKey) {
        let mut state = self.state.lock();
        let Some(current) = state.routes.get(key) else {
            return;
        };

        let replacement = if current.id() == id {
            current.fallback().cloned()
        } else {
            match current.without(id) {
                Some(spliced) => Some(spliced),
                None => return,
            }
        };

        match replacement {
            Some(slot) => {
                state.routes.insert(key.clone(), slot);
            }
            None => {
                state.routes.remove(key);
            }
        }
    }

    fn finish_request(&self) {
        {
            let mut state = self.state.lock();
            state.in_flight = state.in_flight.saturating_sub(1);
        }
        self.publish_loading();
    }

    fn publish_loading(&self) {
        let loading = self.state.lock().in_flight > 0;
        self.loading.send_if_modified(|current| {
            if *current == loading {
                false
            } else {
                *current = loading;
                true
            }
        });
    }
}

impl fmt::Debug for RouteDataModule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RouteDataModule")
            .field("state", &self.state())
            .field("ignored_query_params", &self.ignored_query_params)
            .finish_non_exhaustive()
    }
}

/// Drive a fetch to completion on the ambient tokio runtime, so dropping
/// every caller handle does not cancel the round-trip.
fn drive(future: &RouteDataFuture) {
    if let Ok(handle) = tokio::runtime::Handle::try_current() {
        handle.spawn(future.clone().map(|_| ()));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicUsize;

    use async_trait::async_trait;
    use fetch_route_core::{QueryValue, TransportError};
    use serde_json::json;

    /// Transport that counts calls and answers from a fixed outcome.
    struct StubTransport {
        calls: AtomicUsize,
        urls: Mutex<Vec<String>>,
        outcome: Result<RoutePayload, TransportError>,
    }

    impl StubTransport {
        fn ok(payload: RoutePayload) -> Arc<Self> {
            Arc::new(Self {
                calls: AtomicUsize::new(0),
                urls: Mutex::new(Vec::new()),
                outcome: Ok(payload),
            })
        }

        fn failing(err: TransportError) -> Arc<Self> {
            Arc::new(Self {
                calls: AtomicUsize::new(0),
                urls: Mutex::new(Vec::new()),
                outcome: Err(err),
            })
        }

        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl Transport for StubTransport {
        async fn fetch(&self, url: &str) -> Result<RoutePayload, TransportError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.urls.lock().push(url.to_string());
            tokio::task::yield_now().await;
            self.outcome.clone()
        }
    }

    fn module(transport: Arc<StubTransport>) -> Arc<RouteDataModule> {
        Arc::new(RouteDataModule::new(transport))
    }

    fn key(s: &str) -> StorageKey {
        StorageKey::new(s)
    }

    // === set_route_data Tests ===

    #[tokio::test]
    async fn test_set_route_data_stores_settled_future() {
        let m = module(StubTransport::ok(RoutePayload::default()));

        let future = m.set_route_data(&key("/api/app"), RoutePayload::new(json!({ "x": 1 })));

        assert_eq!(m.slot(&key("/api/app")).unwrap().status(), SlotStatus::Resolved);
        assert_eq!(future.await.unwrap(), json!({ "x": 1 }));
    }

    #[test]
    fn test_set_route_data_registers_partials() {
        let m = module(StubTransport::ok(RoutePayload::default()));
        let payload = RoutePayload::new(json!(null)).with_partial("nav", json!(["home"]));

        let _ = m.set_route_data(&key("/api/app"), payload);

        assert_eq!(m.partial("nav"), Some(json!(["home"])));
    }

    #[test]
    fn test_set_route_data_replaces_previous_future() {
        let m = module(StubTransport::ok(RoutePayload::default()));
        let first = m.set_route_data(&key("/api/app"), RoutePayload::new(json!(1)));
        let second = m.set_route_data(&key("/api/app"), RoutePayload::new(json!(2)));

        assert!(!first.ptr_eq(&second));
        assert!(m.slot(&key("/api/app")).unwrap().future().ptr_eq(&second));
    }

    // === get_route_data Tests ===

    #[tokio::test]
    async fn test_get_route_data_miss_fetches_and_caches() {
        let transport = StubTransport::ok(RoutePayload::new(json!({ "page": "app" })));
        let m = module(Arc::clone(&transport));

        let data = m
            .get_route_data(&key("/api/app"), &FetchKey::new("/api/app?partials=nav"), true)
            .await
            .unwrap();

        assert_eq!(data, json!({ "page": "app" }));
        assert_eq!(transport.calls(), 1);
        assert_eq!(transport.urls.lock()[0], "/api/app?partials=nav");
        assert_eq!(m.slot(&key("/api/app")).unwrap().status(), SlotStatus::Resolved);
    }

    #[tokio::test]
    async fn test_get_route_data_hit_skips_transport() {
        let transport = StubTransport::ok(RoutePayload::new(json!("remote")));
        let m = module(Arc::clone(&transport));
        let _ = m.set_route_data(&key("/api/app"), RoutePayload::new(json!("local")));

        let data = m
            .get_route_data(&key("/api/app"), &FetchKey::new("/api/app"), true)
            .await
            .unwrap();

        assert_eq!(data, json!("local"));
        assert_eq!(transport.calls(), 0);
    }

    #[tokio::test]
    async fn test_get_route_data_without_cache_refetches() {
        let transport = StubTransport::ok(RoutePayload::new(json!("remote")));
        let m = module(Arc::clone(&transport));
        let _ = m.set_route_data(&key("/api/app"), RoutePayload::new(json!("local")));

        let data = m
            .get_route_data(&key("/api/app"), &FetchKey::new("/api/app"), false)
            .await
            .unwrap();

        assert_eq!(data, json!("remote"));
        assert_eq!(transport.calls(), 1);
    }

    #[tokio::test]
    async fn test_get_route_data_single_flight() {
        let transport = StubTransport::ok(RoutePayload::new(json!("once")));
        let m = module(Arc::clone(&transport));
        let (storage, fetch) = (key("/api/app"), FetchKey::new("/api/app"));

        let first = m.get_route_data(&storage, &fetch, true);
        let second = m.get_route_data(&storage, &fetch, true);

        assert!(first.ptr_eq(&second));
        let (a, b) = futures::join!(first, second);
        assert_eq!(a.unwrap(), json!("once"));
        assert_eq!(b.unwrap(), json!("once"));
        assert_eq!(transport.calls(), 1);
    }

    #[tokio::test]
    async fn test_get_route_data_failure_propagates_and_leaves_no_entry() {
        let err = TransportError::Http {
            status: 500,
            url: "/api/app".to_string(),
        };
        let transport = StubTransport::failing(err.clone());
        let m = module(Arc::clone(&transport));

        let result = m
            .get_route_data(&key("/api/app"), &FetchKey::new("/api/app"), true)
            .await;

        assert_eq!(result.unwrap_err(), RouteDataError::Transport(err));
        assert!(!m.contains(&key("/api/app")));
        assert!(!m.is_loading());
        assert_eq!(transport.calls(), 1);
    }

    #[tokio::test]
    async fn test_get_route_data_failure_restores_previous_entry() {
        let transport = StubTransport::failing(TransportError::Connection("down".to_string()));
        let m = module(Arc::clone(&transport));
        let _ = m.set_route_data(&key("/api/app"), RoutePayload::new(json!("stale")));

        let result = m
            .get_route_data(&key("/api/app"), &FetchKey::new("/api/app"), false)
            .await;

        assert!(result.is_err());
        let cached = m.slot(&key("/api/app")).unwrap().future().await.unwrap();
        assert_eq!(cached, json!("stale"));
    }

    #[tokio::test]
    async fn test_overlapping_failures_leave_no_entry() {
        let transport = StubTransport::failing(TransportError::Connection("/api/app".to_string()));
        let m = module(Arc::clone(&transport));
        let (storage, fetch) = (key("/api/app"), FetchKey::new("/api/app"));

        let first = m.get_route_data(&storage, &fetch, false);
        let second = m.get_route_data(&storage, &fetch, false);
        let (a, b) = futures::join!(first, second);

        assert!(a.is_err() && b.is_err());
        assert!(!m.contains(&storage));

        let third = m.get_route_data(&storage, &fetch, true).await;
        assert!(third.is_err());
        assert_eq!(transport.calls(), 3);
    }

    #[tokio::test]
    async fn test_overlapping_failures_restore_resolved_entry() {
        let transport = StubTransport::failing(TransportError::Connection("down".to_string()));
        let m = module(Arc::clone(&transport));
        let (storage, fetch) = (key("/api/app"), FetchKey::new("/api/app"));
        let _ = m.set_route_data(&storage, RoutePayload::new(json!("stale")));

        let first = m.get_route_data(&storage, &fetch, false);
        let second = m.get_route_data(&storage, &fetch, false);
        let (a, b) = futures::join!(first, second);

        assert!(a.is_err() && b.is_err());
        assert_eq!(m.slot(&storage).unwrap().status(), SlotStatus::Resolved);
        let cached = m.get_route_data(&storage, &fetch, true).await.unwrap();
        assert_eq!(cached, json!("stale"));
        assert_eq!(transport.calls(), 2);
    }

    #[tokio::test]
    async fn test_loading_flag_brackets_request() {
        let transport = StubTransport::ok(RoutePayload::new(json!(1)));
        let m = module(transport);
        let mut rx = m.subscribe_loading();

        assert!(!m.is_loading());
        let future = m.get_route_data(&key("/a"), &FetchKey::new("/a"), true);
        assert!(m.is_loading());
        assert!(m.state().is_loading);
        assert!(rx.has_changed().unwrap());
        assert!(*rx.borrow_and_update());

        future.await.unwrap();
        assert!(!m.is_loading());
        assert!(!*rx.borrow_and_update());
    }

    #[tokio::test]
    async fn test_loading_flag_cleared_on_failure() {
        let m = module(StubTransport::failing(TransportError::Request("bad".to_string())));

        let future = m.get_route_data(&key("/a"), &FetchKey::new("/a"), true);
        assert!(m.is_loading());

        assert!(future.await.is_err());
        assert!(!m.is_loading());
    }

    #[tokio::test]
    async fn test_cache_hit_leaves_loading_flag_alone() {
        let m = module(StubTransport::ok(RoutePayload::default()));
        let _ = m.set_route_data(&key("/a"), RoutePayload::new(json!(1)));

        let _future = m.get_route_data(&key("/a"), &FetchKey::new("/a"), true);
        assert!(!m.is_loading());
    }

    #[tokio::test]
    async fn test_dropped_future_still_commits_to_cache() {
        let transport = StubTransport::ok(RoutePayload::new(json!("late")));
        let m = module(Arc::clone(&transport));

        drop(m.get_route_data(&key("/a"), &FetchKey::new("/a"), true));

        for _ in 0..10 {
            tokio::task::yield_now().await;
        }
        assert_eq!(transport.calls(), 1);
        assert_eq!(m.slot(&key("/a")).unwrap().status(), SlotStatus::Resolved);
        assert!(!m.is_loading());
    }

    // === flush_cache Tests ===

    #[tokio::test]
    async fn test_flush_cache_forces_refetch() {
        let transport =
            StubTransport::ok(RoutePayload::new(json!(1)).with_partial("nav", json!(2)));
        let m = module(Arc::clone(&transport));
        let (storage, fetch) = (key("/a"), FetchKey::new("/a"));

        m.get_route_data(&storage, &fetch, true).await.unwrap();
        m.get_route_data(&storage, &fetch, true).await.unwrap();
        assert_eq!(transport.calls(), 1);

        m.flush_cache();
        assert!(m.state().routes.is_empty());
        assert!(m.state().partials.is_empty());

        m.get_route_data(&storage, &fetch, true).await.unwrap();
        assert_eq!(transport.calls(), 2);
    }

    // === derive_keys Tests ===

    #[test]
    fn test_derive_keys_narrows_against_registry() {
        let m = module(StubTransport::ok(RoutePayload::default()));
        let _ = m.set_route_data(
            &key("/other"),
            RoutePayload::new(json!(null)).with_partial("nav", json!({})),
        );

        let mut query = Query::new();
        query.insert("partials".to_string(), QueryValue::from(vec!["nav", "footer"]));
        let keys = m.derive_keys("/api/app", &Params::new(), &query);

        assert_eq!(keys.fetch_key.as_str(), "/api/app?partials=footer");
        assert_eq!(keys.storage_key.as_str(), "/api/app");
    }

    #[test]
    fn test_derive_keys_omits_partials_when_all_cached() {
        let m = module(StubTransport::ok(RoutePayload::default()));
        let _ = m.set_route_data(
            &key("/other"),
            RoutePayload::new(json!(null)).with_partial("nav", json!({})),
        );

        let mut query = Query::new();
        query.insert("partials".to_string(), QueryValue::from(vec!["nav"]));
        let keys = m.derive_keys("/api/app", &Params::new(), &query);

        assert_eq!(keys.fetch_key.as_str(), "/api/app");
    }

    #[test]
    fn test_state_snapshot_serializes_camel_case() {
        let m = module(StubTransport::ok(RoutePayload::default()));
        let _ = m.set_route_data(&key("/a"), RoutePayload::new(json!(1)));

        let value = serde_json::to_value(m.state()).unwrap();
        assert_eq!(value["isLoading"], json!(false));
        assert_eq!(value["routes"]["/a"], json!("resolved"));
    }
}
