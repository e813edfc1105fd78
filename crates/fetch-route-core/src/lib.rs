//! Core abstractions for route-bound data fetching.
//!
//! This crate provides the fundamental types and traits:
//! - `Params` / `Query` / `QueryValue` - Route parameters and query strings
//! - `RouteRequest` - Runtime input to a route's fetch endpoint
//! - `RoutePayload` - Route data plus enclosed partials
//! - `Namespace` - Store module path
//! - `Transport` trait - Injected network fetch
//! - `Logger` trait - Injected diagnostics sink

mod context;
mod error;
mod logger;
mod namespace;
mod payload;
mod transport;

pub use context::*;
pub use error::*;
pub use logger::*;
pub use namespace::*;
pub use payload::*;
pub use transport::*;
