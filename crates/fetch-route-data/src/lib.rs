//! Network transports for route data.
//!
//! This crate provides:
//! - `HttpTransport` - GET over HTTP with JSON decoding (the default transport)
//! - `FnTransport` - Adapts an async closure into a `Transport`

mod client;
mod func;

pub use client::*;
pub use func::*;

pub use fetch_route_core::{RoutePayload, Transport, TransportError};
