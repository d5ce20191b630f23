//! Configuration for the authorization layer.
//!
//! The cache consumes a single setting: the freshness window after which a
//! recorded grant must be re-confirmed against the things service.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Default grant freshness window (5 minutes).
///
/// This balances security (revoked channel access propagates within this
/// window) with performance (reduces things service round-trips).
pub const DEFAULT_CACHE_TTL: Duration = Duration::from_secs(300);

/// Configuration for [`Authorizer`](crate::Authorizer).
///
/// Durations deserialize from humantime strings (`"300s"`, `"5m"`).
///
/// # Example
///
/// ```
/// use gridmq_auth::AuthConfig;
///
/// let config: AuthConfig = serde_json::from_str(r#"{"cache_ttl": "30s"}"#).unwrap();
/// assert_eq!(config.cache_ttl.as_secs(), 30);
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AuthConfig {
    /// Freshness window for cached channel grants.
    ///
    /// A zero duration disables caching: every access check consults the
    /// things service.
    #[serde(with = "humantime_serde", default = "default_cache_ttl")]
    pub cache_ttl: Duration,
}

fn default_cache_ttl() -> Duration {
    DEFAULT_CACHE_TTL
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self { cache_ttl: DEFAULT_CACHE_TTL }
    }
}
