//! Closure-backed transports.

use std::fmt;
use std::future::Future;

use async_trait::async_trait;
use fetch_route_core::{RoutePayload, Transport, TransportError};

/// Adapts an async closure `Fn(String) -> Future<Output = Result<RoutePayload, _>>`
/// into a `Transport`.
///
/// ```rust,ignore
/// let transport = FnTransport::new(|url| async move {
///     Ok(RoutePayload::new(serde_json::json!({ "url": url })))
/// });
/// ```
pub struct FnTransport<F> {
    f: F,
}

impl<F> FnTransport<F> {
    /// Wrap a closure.
    pub fn new(f: F) -> Self {
        Self { f }
    }
}

impl<F> fmt::Debug for FnTransport<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FnTransport").finish_non_exhaustive()
    }
}

#[async_trait]
impl<F, Fut> Transport for FnTransport<F>
where
    F: Fn(String) -> Fut + Send + Sync,
    Fut: Future<Output = Result<RoutePayload, TransportError>> + Send,
{
    async fn fetch(&self, url: &str) -> Result<RoutePayload, TransportError> {
        (self.f)(url.to_string()).await
    }
}
