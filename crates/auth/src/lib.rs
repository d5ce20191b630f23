//! # gridmq Adapter Authorization
//!
//! Time-bounded channel access caching for gridmq protocol adapters.
//!
//! This crate provides:
//! - **[`AccessCache`]**: per-thing cache of recently confirmed channel grants with
//!   move-to-front promotion and lazy expiry
//! - **[`Authorizer`]**: pass-through gate that consults the things service on a
//!   cache miss and records successful decisions
//! - **[`AuthConfig`]**: the freshness window configuration
//!
//! ## Design
//!
//! The cache is strictly local, single-process, and best-effort. It never
//! has to agree with the things service beyond its own TTL: a grant stays
//! valid locally for the configured window even if revoked remotely in the
//! meantime, and [`Authorizer::revoke`] exists for out-of-band revocation
//! signals that must take effect immediately.
//!
//! ## Example
//!
//! ```no_run
//! use std::{sync::Arc, time::Duration};
//! use gridmq_auth::Authorizer;
//! use gridmq_things::MemoryThingsClient;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let things = MemoryThingsClient::new();
//! things.register_thing("secret-token", "thing1");
//! things.connect("thing1", "chan1");
//!
//! let authorizer = Authorizer::new(Arc::new(things), Duration::from_secs(300));
//!
//! // On connect: translate the credential into a thing identity.
//! let thing_id = authorizer.identify("secret-token").await?;
//!
//! // Per message: allowed from cache after the first confirmation.
//! authorizer.authorize(&thing_id, "chan1").await?;
//! # Ok(())
//! # }
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

/// Pass-through authorization gate.
pub mod authorizer;
/// Time-bounded channel access cache.
pub mod cache;
/// Configuration types.
pub mod config;
/// Authorization error types.
pub mod error;

// Re-export key types for convenience
pub use authorizer::Authorizer;
pub use cache::{AccessCache, CacheStats};
pub use config::{AuthConfig, DEFAULT_CACHE_TTL};
pub use error::{AuthError, Result};
