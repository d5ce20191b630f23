//! Pass-through authorization gate backed by the access cache.
//!
//! This module provides [`Authorizer`], which wraps a
//! [`ThingsClient`] with the [`AccessCache`] so that repeated channel
//! access checks within the freshness window skip the remote round-trip.
//!
//! # Control Flow
//!
//! ```text
//! authorize(thing, channel)
//!   → cache fresh? allow
//!   → miss? ask the things service
//!   → allowed? record the grant, allow
//!   → denied or unreachable? propagate, cache untouched
//! ```
//!
//! The cache is only ever populated after a successful remote decision, so
//! a things service failure can never seed the cache with a grant that was
//! not actually issued.

use std::{sync::Arc, time::Duration};

use gridmq_things::ThingsClient;

use crate::{
    cache::AccessCache,
    config::AuthConfig,
    error::{AuthError, Result},
};

/// Authorization gate for protocol adapters.
///
/// Owns the local [`AccessCache`] and the [`ThingsClient`] used on cache
/// misses. One `Authorizer` is shared by all connection handlers of an
/// adapter; every method takes `&self` and is safe for concurrent use.
///
/// # Example
///
/// ```
/// use std::{sync::Arc, time::Duration};
/// use gridmq_auth::Authorizer;
/// use gridmq_things::MemoryThingsClient;
///
/// # tokio::runtime::Builder::new_current_thread().enable_all().build().unwrap().block_on(async {
/// let things = MemoryThingsClient::new();
/// things.register_thing("secret-token", "thing1");
/// things.connect("thing1", "chan1");
///
/// let authorizer = Authorizer::new(Arc::new(things), Duration::from_secs(60));
///
/// let thing_id = authorizer.identify("secret-token").await.unwrap();
/// authorizer.authorize(&thing_id, "chan1").await.unwrap();
/// # });
/// ```
pub struct Authorizer {
    /// Local time-bounded grant cache.
    cache: AccessCache,
    /// Authoritative remote decision point.
    things: Arc<dyn ThingsClient>,
}

impl Authorizer {
    /// Creates an authorizer with the given cache freshness window.
    #[must_use]
    pub fn new(things: Arc<dyn ThingsClient>, cache_ttl: Duration) -> Self {
        Self { cache: AccessCache::new(cache_ttl), things }
    }

    /// Creates an authorizer from configuration.
    #[must_use]
    pub fn from_config(things: Arc<dyn ThingsClient>, config: &AuthConfig) -> Self {
        Self::new(things, config.cache_ttl)
    }

    /// Resolves a credential token to the thing identifier it belongs to.
    ///
    /// Identification is a pure pass-through; token-to-thing mappings are
    /// not cached.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::InvalidCredentials`] for unknown tokens, or
    /// [`AuthError::Service`] if the things service is unreachable.
    #[tracing::instrument(skip(self, token))]
    pub async fn identify(&self, token: &str) -> Result<String> {
        self.things.identify(token).await.map_err(AuthError::from)
    }

    /// Checks whether a thing may access a channel.
    ///
    /// A fresh cached grant allows the access without a remote call. On a
    /// miss, the things service decides; a successful decision is recorded
    /// in the cache so subsequent checks within the freshness window stay
    /// local.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::AccessDenied`] if the things service denies
    /// access, or [`AuthError::Service`] if it cannot produce a decision.
    /// The cache is left untouched on every error path.
    #[tracing::instrument(skip(self))]
    pub async fn authorize(&self, thing_id: &str, channel_id: &str) -> Result<()> {
        if self.cache.validate(thing_id, channel_id) {
            tracing::debug!("channel access allowed from cache");
            return Ok(());
        }
        tracing::debug!("cache miss, consulting things service");

        self.things.can_access_by_id(thing_id, channel_id).await?;
        self.cache.add(thing_id, channel_id);
        Ok(())
    }

    /// Invalidates a cached grant immediately, regardless of remaining TTL.
    ///
    /// Call this on receipt of an out-of-band revocation signal (e.g. a
    /// thing disconnected from a channel). The next access check for the
    /// pair consults the things service again. An audit event is emitted
    /// at INFO level for compliance tracking.
    #[tracing::instrument(skip(self))]
    pub fn revoke(&self, thing_id: &str, channel_id: &str) {
        self.cache.remove(thing_id, channel_id);
        tracing::info!(
            audit.action = "revoke_channel_grant",
            audit.resource = %format_args!("thing:{thing_id}/channel:{channel_id}"),
            audit.result = "success",
            "audit_event"
        );
    }

    /// Returns the underlying grant cache.
    ///
    /// Exposed for introspection (entry counts, stats) and for callers
    /// that need bulk invalidation via [`AccessCache::clear`].
    #[must_use]
    pub fn cache(&self) -> &AccessCache {
        &self.cache
    }
}

impl std::fmt::Debug for Authorizer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Authorizer").field("cache", &self.cache).finish_non_exhaustive()
    }
}
