//! Error types for inference clients.

use thiserror::Error;

/// Result type alias using the crate's error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while talking to an inference backend.
#[derive(Debug, Error)]
pub enum Error {
    /// The client is disabled or the backend is not reachable.
    #[error("inference client unavailable: {0}")]
    Unavailable(String),

    /// Request failed before a response was received.
    #[error("request failed: {0}")]
    Request(String),

    /// Backend answered with a non-success status.
    #[error("provider API error: {0}")]
    ProviderApi(String),

    /// The request did not complete in time.
    #[error("request timed out after {0}s")]
    Timeout(u64),

    /// Response text did not contain a payload of the expected shape.
    #[error("malformed payload: {0}")]
    MalformedPayload(String),

    /// Serialization/deserialization error.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}
