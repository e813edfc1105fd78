//! Network transport seam.

use std::sync::Arc;

use async_trait::async_trait;

use crate::error::TransportError;
use crate::payload::RoutePayload;

/// Fetches route data for a compiled URL.
///
/// Exactly one attempt is made per call; retry policy is the transport's own
/// business.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Fetch and decode the payload behind `url`.
    async fn fetch(&self, url: &str) -> Result<RoutePayload, TransportError>;
}

#[async_trait]
impl<T: Transport + ?Sized> Transport for Arc<T> {
    async fn fetch(&self, url: &str) -> Result<RoutePayload, TransportError> {
        (**self).fetch(url).await
    }
}
