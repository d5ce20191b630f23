//! Client trait for the things service plus an in-memory implementation.
//!
//! This module provides the [`ThingsClient`] trait that abstracts the two
//! calls protocol adapters make against the things service: translating a
//! credential token into a thing identifier, and asking whether a thing may
//! access a channel. Implementations can use different transports (gRPC for
//! production, in-memory for testing).
//!
//! # Usage
//!
//! ```no_run
//! // Demonstrates the trait interface; requires a concrete client.
//! use gridmq_things::{ClientResult, ThingsClient};
//!
//! async fn gatekeep<C: ThingsClient>(
//!     client: &C,
//!     token: &str,
//!     channel_id: &str,
//! ) -> ClientResult<()> {
//!     let thing_id = client.identify(token).await?;
//!     client.can_access_by_id(&thing_id, channel_id).await
//! }
//! ```

use std::{
    collections::{HashMap, HashSet},
    sync::{
        Arc,
        atomic::{AtomicU64, Ordering},
    },
};

use async_trait::async_trait;

use crate::error::{ClientError, ClientResult};

/// Client interface to the things service.
///
/// The things service is the authoritative source for thing identities and
/// channel memberships. Adapters never decide access themselves; they ask
/// through this trait and may cache the answer locally for a bounded time.
///
/// # Error Handling
///
/// Operations return [`ClientResult`] with appropriate [`ClientError`]
/// variants. A denial ([`ClientError::Forbidden`]) is a definitive policy
/// decision; [`ClientError::Connection`] and [`ClientError::Timeout`]
/// indicate the service could not be reached and the decision is unknown.
#[async_trait]
pub trait ThingsClient: Send + Sync {
    /// Resolves a credential token to the thing identifier it belongs to.
    ///
    /// # Arguments
    ///
    /// * `token` - The credential presented by the connecting thing
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::Unauthenticated`] if the token is not
    /// recognized, or a transport error if the service is unreachable.
    async fn identify(&self, token: &str) -> ClientResult<String>;

    /// Checks whether a thing is allowed to access a channel.
    ///
    /// # Arguments
    ///
    /// * `thing_id` - The thing requesting access
    /// * `channel_id` - The channel access is checked against
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::Forbidden`] if the thing is not connected to
    /// the channel, or a transport error if the service is unreachable.
    async fn can_access_by_id(&self, thing_id: &str, channel_id: &str) -> ClientResult<()>;
}

/// In-memory things service client.
///
/// Holds token registrations and channel connections in process memory.
/// Primarily intended for testing and development; production adapters use
/// a transport-backed implementation of [`ThingsClient`].
///
/// # Cloning
///
/// `MemoryThingsClient` is cheaply cloneable via [`Arc`]. All clones share
/// the same underlying state.
///
/// # Example
///
/// ```
/// use gridmq_things::{MemoryThingsClient, ThingsClient};
///
/// # tokio::runtime::Builder::new_current_thread().enable_all().build().unwrap().block_on(async {
/// let client = MemoryThingsClient::new();
/// client.register_thing("secret-token", "thing1");
/// client.connect("thing1", "chan1");
///
/// let thing_id = client.identify("secret-token").await.unwrap();
/// assert_eq!(thing_id, "thing1");
/// assert!(client.can_access_by_id("thing1", "chan1").await.is_ok());
/// # });
/// ```
#[derive(Debug, Default, Clone)]
pub struct MemoryThingsClient {
    /// Credential token → thing identifier.
    tokens: Arc<parking_lot::RwLock<HashMap<String, String>>>,
    /// Granted (thing, channel) connections.
    connections: Arc<parking_lot::RwLock<HashSet<(String, String)>>>,
    /// Number of `can_access_by_id` calls served, for cache-behavior tests.
    access_checks: Arc<AtomicU64>,
}

impl MemoryThingsClient {
    /// Creates a new empty in-memory client.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a credential token for a thing.
    ///
    /// A token registered twice keeps the most recent thing identifier.
    pub fn register_thing(&self, token: impl Into<String>, thing_id: impl Into<String>) {
        self.tokens.write().insert(token.into(), thing_id.into());
    }

    /// Connects a thing to a channel, granting access.
    pub fn connect(&self, thing_id: impl Into<String>, channel_id: impl Into<String>) {
        self.connections.write().insert((thing_id.into(), channel_id.into()));
    }

    /// Disconnects a thing from a channel, revoking access.
    ///
    /// Disconnecting a pair that was never connected is a no-op.
    pub fn disconnect(&self, thing_id: &str, channel_id: &str) {
        self.connections.write().remove(&(thing_id.to_owned(), channel_id.to_owned()));
    }

    /// Returns the number of `can_access_by_id` calls this client served.
    ///
    /// Lets tests assert that a caching layer in front of the client
    /// actually short-circuited the remote round-trip.
    #[must_use]
    pub fn access_checks(&self) -> u64 {
        self.access_checks.load(Ordering::Relaxed)
    }
}

#[async_trait]
impl ThingsClient for MemoryThingsClient {
    #[tracing::instrument(skip(self, token))]
    async fn identify(&self, token: &str) -> ClientResult<String> {
        let tokens = self.tokens.read();
        tokens.get(token).cloned().ok_or_else(ClientError::unauthenticated)
    }

    #[tracing::instrument(skip(self))]
    async fn can_access_by_id(&self, thing_id: &str, channel_id: &str) -> ClientResult<()> {
        self.access_checks.fetch_add(1, Ordering::Relaxed);
        let connections = self.connections.read();
        if connections.contains(&(thing_id.to_owned(), channel_id.to_owned())) {
            Ok(())
        } else {
            Err(ClientError::forbidden(thing_id, channel_id))
        }
    }
}
