//! Public SDK for fetch-route.
//!
//! This crate re-exports all fetch-route functionality:
//!
//! ```ignore
//! use fetch_route_sdk::prelude::*;
//!
//! let transport = HttpTransport::new().with_base_url("https://shop.example");
//! let fetch_route = FetchRoute::new(FetchRouteConfig::new().with_transport(transport));
//! let unsync = fetch_route.connect(store.clone())?;
//!
//! let routes = fetch_route.decorate_records(&[RouteRecord::new("/app")
//!     .with_name("app")
//!     .with_fetch(ApiDescriptor::new("/api/:section").with_param("section", "app"))]);
//!
//! let data = fetch_route.invoke_fetch(&routes[0].location(params, query)).await?;
//! ```

pub use fetch_route_cache;
pub use fetch_route_core;
pub use fetch_route_data;
pub use fetch_route_observability;
pub use fetch_route_router;

/// Prelude for convenient imports.
pub mod prelude {
    pub use fetch_route_cache::*;
    pub use fetch_route_core::*;
    pub use fetch_route_data::*;
    pub use fetch_route_observability::*;
    pub use fetch_route_router::*;
}
