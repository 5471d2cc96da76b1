use thiserror::Error;

/// Errors from [`crate::places::PlacesProvider`] calls.
///
/// URLs carried by the variants never include the API key.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PlacesError {
    /// The request could not be delivered or the connection failed.
    #[error("network error calling {url}: {message}")]
    Network {
        /// Endpoint that was called.
        url: String,
        /// Transport error description.
        message: String,
    },
    /// The provider did not answer within the configured timeout.
    #[error("request to {url} timed out after {timeout_secs}s")]
    Timeout {
        /// Endpoint that was called.
        url: String,
        /// Configured timeout in seconds.
        timeout_secs: u64,
    },
    /// The provider answered with a non-success HTTP status.
    #[error("request to {url} failed with HTTP {status}: {message}")]
    Http {
        /// Endpoint that was called.
        url: String,
        /// HTTP status code.
        status: u16,
        /// Error description.
        message: String,
    },
    /// The provider reported an application-level status such as
    /// `OVER_QUERY_LIMIT` or `REQUEST_DENIED`.
    #[error("places provider returned {code}: {message}")]
    Provider {
        /// Status code reported by the provider.
        code: String,
        /// Optional explanation supplied by the provider.
        message: String,
    },
    /// No place exists for the requested identifier.
    #[error("place {place_id} was not found")]
    NotFound {
        /// Identifier that was looked up.
        place_id: String,
    },
    /// The provider payload could not be decoded.
    #[error("failed to parse places response: {message}")]
    Parse {
        /// Decoder error description.
        message: String,
    },
    /// The place has no photo to resolve.
    #[error("no photo is available for this place")]
    PhotoUnavailable,
}
