//! HTTP transport backed by reqwest.

use std::collections::HashMap;

use async_trait::async_trait;
use fetch_route_core::{RoutePayload, Transport, TransportError};

/// Default transport: issues a GET and decodes the JSON body as a
/// `RoutePayload` (`{ "data": ..., "partials": {...} }`).
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: reqwest::Client,
    base_url: Option<String>,
    default_headers: HashMap<String, String>,
}

impl Default for HttpTransport {
    fn default() -> Self {
        Self::new()
    }
}

impl HttpTransport {
    /// Create a transport with a fresh client.
    pub fn new() -> Self {
        Self::with_client(reqwest::Client::new())
    }

    /// Create a transport around an existing client.
    pub fn with_client(client: reqwest::Client) -> Self {
        Self {
            client,
            base_url: None,
            default_headers: HashMap::new(),
        }
    }

    /// Prepend a base URL to relative fetch keys.
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = Some(base_url.into());
        self
    }

    /// Add a header sent with every request.
    pub fn with_default_header(
        mut self,
        key: impl Into<String>,
        value: impl Into<String>,
    ) -> Self {
        self.default_headers.insert(key.into(), value.into());
        self
    }

    /// Resolve a fetch key against the base URL.
    pub fn resolve_url(&self, url: &str) -> String {
        match &self.base_url {
            Some(base) if !(url.starts_with("http://") || url.starts_with("https://")) => {
                format!(
                    "{}/{}",
                    base.trim_end_matches('/'),
                    url.trim_start_matches('/')
                )
            }
            _ => url.to_string(),
        }
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn fetch(&self, url: &str) -> Result<RoutePayload, TransportError> {
        let full_url = self.resolve_url(url);

        let mut request = self
            .client
            .get(&full_url)
            .header("Accept", "application/json");
        for (key, value) in &self.default_headers {
            request = request.header(key.as_str(), value.as_str());
        }

        let response = request.send().await.map_err(|e| {
            if e.is_connect() || e.is_timeout() {
                TransportError::Connection(e.to_string())
            } else {
                TransportError::Request(e.to_string())
            }
        })?;

        let status = response.status().as_u16();
        if status >= 400 {
            return Err(TransportError::Http {
                status,
                url: full_url,
            });
        }

        let bytes = response
            .bytes()
            .await
            .map_err(|e| TransportError::Request(e.to_string()))?;

        serde_json::from_slice(&bytes).map_err(|e| TransportError::Deserialization(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_url_without_base() {
        let transport = HttpTransport::new();
        assert_eq!(transport.resolve_url("/api/app"), "/api/app");
    }

    #[test]
    fn test_resolve_url_joins_base() {
        let transport = HttpTransport::new().with_base_url("https://example.com/");
        assert_eq!(
            transport.resolve_url("/api/app?page=2"),
            "https://example.com/api/app?page=2"
        );
    }

    #[test]
    fn test_resolve_url_keeps_absolute() {
        let transport = HttpTransport::new().with_base_url("https://example.com");
        assert_eq!(
            transport.resolve_url("http://other.test/api"),
            "http://other.test/api"
        );
    }

    #[tokio::test]
    async fn test_fetch_invalid_url_is_request_error() {
        let transport = HttpTransport::new();
        let err = transport.fetch("not a url").await.unwrap_err();
        assert!(matches!(err, TransportError::Request(_)));
    }
}
