//! Things service error types and result alias.
//!
//! This module defines the error types a things-service client can produce.
//! All client implementations must map their internal errors to these
//! standardized variants.
//!
//! # Error Types
//!
//! - [`ClientError::Unauthenticated`] - Credential token not recognized
//! - [`ClientError::Forbidden`] - Thing is not allowed on the channel
//! - [`ClientError::Connection`] - Network or connection-related failures
//! - [`ClientError::Timeout`] - Request exceeded its time limit
//! - [`ClientError::Internal`] - Client-specific internal errors
//!
//! # Example
//!
//! ```
//! use gridmq_things::{ClientError, ClientResult};
//!
//! fn check(thing_id: &str, channel_id: &str) -> ClientResult<()> {
//!     Err(ClientError::forbidden(thing_id, channel_id))
//! }
//! ```

use std::sync::Arc;

use thiserror::Error;

/// A boxed error type for source chain tracking.
pub type BoxError = Arc<dyn std::error::Error + Send + Sync>;

/// Result type alias for things service operations.
pub type ClientResult<T> = Result<T, ClientError>;

/// Errors that can occur when talking to the things service.
///
/// This enum represents the canonical set of errors that any client
/// implementation can produce. Transport-backed implementations should map
/// their wire-level errors to these variants.
///
/// Errors preserve their source chain via the `#[source]` attribute,
/// enabling debugging tools to display the full error context.
///
/// # Non-exhaustive
///
/// This enum is marked `#[non_exhaustive]` — new variants may be added in
/// future minor releases without a semver-breaking change. Downstream match
/// expressions must include a wildcard arm (`_ =>`).
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ClientError {
    /// The presented credential token is not recognized by the things service.
    #[error("Unknown credentials")]
    Unauthenticated,

    /// The things service denied the thing access to the channel.
    ///
    /// This is a definitive policy decision, not a transport failure.
    #[error("Access denied: {thing_id} on {channel_id}")]
    Forbidden {
        /// The thing that requested access.
        thing_id: String,
        /// The channel access was checked against.
        channel_id: String,
    },

    /// Connection or network error.
    ///
    /// Indicates a failure to reach the things service, such as a DNS
    /// failure, connection refused, or a dropped stream.
    #[error("Connection error: {message}")]
    Connection {
        /// Description of the connection error.
        message: String,
        /// The underlying error that caused this connection failure.
        #[source]
        source: Option<BoxError>,
    },

    /// Request timed out.
    ///
    /// The request exceeded its configured time limit before the things
    /// service produced a decision.
    #[error("Request timeout")]
    Timeout,

    /// Internal client error.
    ///
    /// Catch-all for implementation-specific errors that don't fit the
    /// other categories.
    #[error("Internal error: {message}")]
    Internal {
        /// Description of the internal error.
        message: String,
        /// The underlying error that caused this internal failure.
        #[source]
        source: Option<BoxError>,
    },
}

impl ClientError {
    /// Creates a new `Unauthenticated` error.
    #[must_use]
    pub fn unauthenticated() -> Self {
        Self::Unauthenticated
    }

    /// Creates a new `Forbidden` error for the given thing and channel.
    #[must_use]
    pub fn forbidden(thing_id: impl Into<String>, channel_id: impl Into<String>) -> Self {
        Self::Forbidden { thing_id: thing_id.into(), channel_id: channel_id.into() }
    }

    /// Creates a new `Connection` error with the given message.
    #[must_use]
    pub fn connection(message: impl Into<String>) -> Self {
        Self::Connection { message: message.into(), source: None }
    }

    /// Creates a new `Connection` error with a message and source error.
    #[must_use]
    pub fn connection_with_source(
        message: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self::Connection { message: message.into(), source: Some(Arc::new(source)) }
    }

    /// Creates a new `Timeout` error.
    #[must_use]
    pub fn timeout() -> Self {
        Self::Timeout
    }

    /// Creates a new `Internal` error with the given message.
    #[must_use]
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal { message: message.into(), source: None }
    }

    /// Creates a new `Internal` error with a message and source error.
    #[must_use]
    pub fn internal_with_source(
        message: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self::Internal { message: message.into(), source: Some(Arc::new(source)) }
    }

    /// Returns true for errors that indicate the things service was
    /// unreachable rather than a definitive decision.
    #[must_use]
    pub fn is_transient(&self) -> bool {
        matches!(self, Self::Connection { .. } | Self::Timeout)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = ClientError::unauthenticated();
        assert_eq!(err.to_string(), "Unknown credentials");

        let err = ClientError::forbidden("thing1", "chan1");
        assert_eq!(err.to_string(), "Access denied: thing1 on chan1");

        let err = ClientError::connection("connection refused");
        assert_eq!(err.to_string(), "Connection error: connection refused");

        let err = ClientError::timeout();
        assert_eq!(err.to_string(), "Request timeout");
    }

    #[test]
    fn test_transient_classification() {
        assert!(ClientError::connection("down").is_transient());
        assert!(ClientError::timeout().is_transient());
        assert!(!ClientError::forbidden("t", "c").is_transient());
        assert!(!ClientError::unauthenticated().is_transient());
        assert!(!ClientError::internal("oops").is_transient());
    }

    #[test]
    fn test_source_chain_preserved() {
        use std::error::Error;

        let io_err = std::io::Error::new(std::io::ErrorKind::ConnectionRefused, "refused");
        let err = ClientError::connection_with_source("dial failed", io_err);

        let source = err.source();
        assert!(source.is_some(), "source chain must be preserved");
        assert_eq!(source.map(|s| s.to_string()), Some("refused".to_string()));
    }
}
