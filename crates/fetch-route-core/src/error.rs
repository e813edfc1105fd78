//! Error types shared across the fetch-route crates.

/// Error raised by a network transport.
///
/// `Clone` so that one failure can be handed to every caller sharing an
/// in-flight request.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TransportError {
    #[error("HTTP error: {status} for {url}")]
    Http { status: u16, url: String },

    #[error("Connection error: {0}")]
    Connection(String),

    #[error("Deserialization error: {0}")]
    Deserialization(String),

    #[error("Request error: {0}")]
    Request(String),
}

/// Error surfaced through a route's fetch future.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RouteDataError {
    /// The injected transport rejected.
    #[error(transparent)]
    Transport(#[from] TransportError),

    /// The compiled URL still contains `:name` placeholders.
    #[error("unresolved placeholders {placeholders:?} in '{url}'")]
    UnresolvedPlaceholder {
        url: String,
        placeholders: Vec<String>,
    },

    /// The route carries no fetch endpoint.
    #[error("route '{0}' has no fetch endpoint")]
    NotFetchable(String),
}
