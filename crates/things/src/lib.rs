//! # gridmq Things Service Client
//!
//! Shared client surface for the gridmq things service, used by protocol
//! adapters to identify connecting things and check channel access.
//!
//! This crate provides:
//! - **[`ThingsClient`]**: the trait adapters program against
//! - **[`MemoryThingsClient`]**: an in-memory implementation for testing and development
//! - **[`ClientError`]**: the canonical error taxonomy for client implementations
//!
//! The things service is the authoritative decision point; callers that
//! want to avoid a round-trip per message put a time-bounded cache in
//! front of this trait (see the `gridmq-auth` crate).
//!
//! ## Example
//!
//! ```
//! use gridmq_things::{MemoryThingsClient, ThingsClient};
//!
//! # tokio::runtime::Builder::new_current_thread().enable_all().build().unwrap().block_on(async {
//! let client = MemoryThingsClient::new();
//! client.register_thing("secret-token", "thing1");
//! client.connect("thing1", "chan1");
//!
//! let thing_id = client.identify("secret-token").await.unwrap();
//! assert!(client.can_access_by_id(&thing_id, "chan1").await.is_ok());
//! # });
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

/// Client trait and in-memory implementation.
pub mod client;
/// Things service error types.
pub mod error;

// Re-export key types for convenience
pub use client::{MemoryThingsClient, ThingsClient};
pub use error::{BoxError, ClientError, ClientResult};
