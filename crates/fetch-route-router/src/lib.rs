//! Route-bound data fetching for a client-side router.
//!
//! Route records carrying an `api.fetch` descriptor are decorated with a
//! [`RouteEndpoint`] that reads through the shared route-data cache:
//!
//! ```text
//! { path: "/app", api: { fetch: { url: "/api/:section", params: { section: "app" } } } }
//!     -> meta.hierarchy = ["/app"]
//!     -> meta.api       = endpoint for "/api/app"
//! ```
//!
//! # Usage
//!
//! ```rust,ignore
//! use fetch_route_router::prelude::*;
//!
//! let fetch_route = FetchRoute::new(FetchRouteConfig::new());
//! let routes = fetch_route.decorate_records(&records);
//! let data = fetch_route.invoke_fetch(&routes[0].location(params, query)).await?;
//! ```

mod config;
mod decorate;
mod endpoint;
mod location;
mod plugin;
pub mod prelude;
mod record;
mod store;

pub use config::*;
pub use decorate::*;
pub use endpoint::*;
pub use location::*;
pub use plugin::*;
pub use record::*;
pub use store::*;
