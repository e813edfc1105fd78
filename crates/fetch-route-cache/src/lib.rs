//! Route-data cache for fetch-route.
//!
//! This crate provides:
//! - `compile_url` / `derive_keys` - Storage and fetch key composition
//! - `RouteDataModule` - Cache actions with single-flight memoization
//! - `RouteAction` - Named actions dispatched against the module
//! - `CacheSlot` / `SlotState` - Observable memoized futures
//!
//! # Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use fetch_route_cache::{RouteDataModule, StorageKey, FetchKey};
//!
//! let module = Arc::new(RouteDataModule::new(transport));
//! let keys = module.derive_keys("/api/:section", &params, &query);
//! let data = module
//!     .get_route_data(&keys.storage_key, &keys.fetch_key, true)
//!     .await?;
//! ```

mod action;
mod key;
mod module;
mod slot;
mod status;

pub use action::*;
pub use key::*;
pub use module::*;
pub use slot::*;
pub use status::*;
