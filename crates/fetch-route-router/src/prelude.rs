//! Prelude for convenient imports.
//!
//! ```rust,ignore
//! use fetch_route_router::prelude::*;
//! ```

pub use crate::{
    ApiDescriptor, DecoratedRoute, FetchRoute, FetchRouteConfig, ReactiveStore, RouteEndpoint,
    RouteLocation, RouteNode, RouteRecord, StateContainer,
};
