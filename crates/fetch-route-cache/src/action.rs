//! Named actions dispatched against a route-data module.

use std::sync::Arc;

use fetch_route_core::RoutePayload;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::key::{FetchKey, StorageKey};
use crate::module::RouteDataModule;
use crate::slot::{settled, RouteDataFuture};

/// An action understood by [`RouteDataModule::dispatch`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "payload", rename_all = "camelCase")]
pub enum RouteAction {
    /// Write route data under a storage key.
    #[serde(rename_all = "camelCase")]
    SetRouteData { key: StorageKey, value: RoutePayload },
    /// Read route data, from cache or over the transport.
    #[serde(rename_all = "camelCase")]
    GetRouteData {
        storage_key: StorageKey,
        fetch_key: FetchKey,
        use_cache: bool,
    },
    /// Drop all cached routes and partials.
    FlushCache,
}

impl RouteAction {
    pub const SET_ROUTE_DATA: &'static str = "setRouteData";
    pub const GET_ROUTE_DATA: &'static str = "getRouteData";
    pub const FLUSH_CACHE: &'static str = "flushCache";

    /// Names of every action, as registered in a store.
    pub const NAMES: [&'static str; 3] = [
        Self::SET_ROUTE_DATA,
        Self::GET_ROUTE_DATA,
        Self::FLUSH_CACHE,
    ];

    /// The action's registered name.
    pub fn name(&self) -> &'static str {
        match self {
            Self::SetRouteData { .. } => Self::SET_ROUTE_DATA,
            Self::GetRouteData { .. } => Self::GET_ROUTE_DATA,
            Self::FlushCache => Self::FLUSH_CACHE,
        }
    }
}

impl RouteDataModule {
    /// Run an action. `flushCache` resolves with `null`.
    pub fn dispatch(self: &Arc<Self>, action: RouteAction) -> RouteDataFuture {
        match action {
            RouteAction::SetRouteData { key, value } => self.set_route_data(&key, value),
            RouteAction::GetRouteData {
                storage_key,
                fetch_key,
                use_cache,
            } => self.get_route_data(&storage_key, &fetch_key, use_cache),
            RouteAction::FlushCache => {
                self.flush_cache();
                settled(Ok(Value::Null))
            }
        }
    }
}
