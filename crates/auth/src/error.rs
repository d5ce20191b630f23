//! Authorization error types.
//!
//! This module defines errors the authorization gate can surface. The
//! access cache itself never fails; every error here originates from the
//! remote things service.

use gridmq_things::ClientError;
use thiserror::Error;

/// Authorization errors.
///
/// # Non-exhaustive
///
/// This enum is marked `#[non_exhaustive]` — new variants may be added in
/// future minor releases without a semver-breaking change. Downstream match
/// expressions must include a wildcard arm (`_ =>`).
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum AuthError {
    /// The presented credential token was not recognized.
    #[error("Invalid credentials")]
    InvalidCredentials,

    /// The things service denied the thing access to the channel.
    #[error("Access denied: {thing_id} on {channel_id}")]
    AccessDenied {
        /// The thing that requested access.
        thing_id: String,
        /// The channel access was checked against.
        channel_id: String,
    },

    /// The things service could not produce a decision.
    ///
    /// Wraps the original [`ClientError`] to preserve the full error source
    /// chain for debugging and structured logging.
    #[error("Things service error: {0}")]
    Service(
        /// The underlying client error that prevented a decision.
        #[source]
        ClientError,
    ),
}

impl AuthError {
    /// Creates a new `AccessDenied` error for the given thing and channel.
    #[must_use]
    pub fn access_denied(thing_id: impl Into<String>, channel_id: impl Into<String>) -> Self {
        Self::AccessDenied { thing_id: thing_id.into(), channel_id: channel_id.into() }
    }
}

impl From<ClientError> for AuthError {
    fn from(err: ClientError) -> Self {
        match err {
            ClientError::Unauthenticated => AuthError::InvalidCredentials,
            ClientError::Forbidden { thing_id, channel_id } => {
                AuthError::AccessDenied { thing_id, channel_id }
            },
            other => AuthError::Service(other),
        }
    }
}

/// Result type alias for authorization operations.
pub type Result<T> = std::result::Result<T, AuthError>;
