//! Time-bounded channel access cache.
//!
//! This module provides [`AccessCache`], a per-thing record of recently
//! confirmed channel grants used by protocol adapters to avoid a things
//! service round-trip on every message.
//!
//! # Architecture
//!
//! ```text
//! message arrives → validate(thing, channel)
//!                 → fresh grant cached? allow without remote call
//!                 → miss? gate asks the things service
//!                 → allowed? add(thing, channel) for the next window
//! ```
//!
//! # Data Model
//!
//! Each thing maps to an ordered sequence of channel grants, front-ordered
//! by most-recently-confirmed. A grant that is re-confirmed is promoted to
//! the front, so a thing hammering the same channel finds its grant in the
//! first position. Distinct channels per thing are expected to be few, so
//! the cold-path scan stays short.
//!
//! # Expiry
//!
//! Expiry is lazy: a stale grant is removed only when a lookup trips over
//! it. There is no background sweeper, so grants for things that are never
//! looked up again stay resident until removed explicitly. Callers that
//! need bounded memory must layer eviction on top.
//!
//! # Example
//!
//! ```
//! use std::time::Duration;
//! use gridmq_auth::AccessCache;
//!
//! let cache = AccessCache::new(Duration::from_secs(60));
//!
//! assert!(!cache.validate("thing1", "chan1"));
//! cache.add("thing1", "chan1");
//! assert!(cache.validate("thing1", "chan1"));
//!
//! cache.remove("thing1", "chan1");
//! assert!(!cache.validate("thing1", "chan1"));
//! ```

use std::{
    collections::HashMap,
    sync::atomic::{AtomicU64, Ordering},
    time::{Duration, Instant},
};

use parking_lot::RwLock;

/// A single cached grant: one channel a thing was recently allowed on.
#[derive(Debug, Clone)]
struct Grant {
    /// Channel identifier the grant covers.
    channel_id: String,
    /// When this grant was last confirmed against the things service.
    granted_at: Instant,
}

impl Grant {
    /// A grant is fresh while strictly less than `ttl` has elapsed since
    /// its last confirmation. `duration_since` saturates to zero for a
    /// `granted_at` in the future, so a concurrent refresh can never make
    /// this underflow.
    fn is_fresh(&self, now: Instant, ttl: Duration) -> bool {
        now.duration_since(self.granted_at) < ttl
    }
}

/// Point-in-time snapshot of cache counters.
///
/// Counters are cumulative since cache construction and are updated with
/// relaxed ordering; a snapshot taken during concurrent traffic is
/// internally consistent only per-field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CacheStats {
    /// Lookups answered from a fresh cached grant.
    pub hits: u64,
    /// Lookups that found no fresh grant (unknown thing, unknown channel,
    /// or stale entry).
    pub misses: u64,
    /// Stale grants removed by lazy expiry.
    pub evictions: u64,
}

/// Per-thing cache of recently confirmed channel grants with time-based
/// expiry.
///
/// The cache answers "was this thing recently allowed on this channel?"
/// without consulting the things service. It is strictly local,
/// best-effort, and never required to agree with the remote source of
/// truth beyond its own freshness window: a grant added now stays valid
/// for `ttl`, regardless of what the things service decides in between.
/// Out-of-band revocation signals should call [`remove`](Self::remove).
///
/// # Concurrency
///
/// All state sits behind a single [`RwLock`] at cache granularity.
/// [`validate`](Self::validate) takes shared access on its fast path and
/// upgrades to exclusive access only to evict a stale grant; [`add`](Self::add)
/// and [`remove`](Self::remove) always take exclusive access. No operation
/// performs I/O or blocks beyond lock acquisition.
///
/// # TTL
///
/// The freshness window is fixed at construction. A `Duration::ZERO` TTL
/// is valid and makes every grant immediately stale, so `validate` returns
/// false even right after `add` — useful for disabling caching without
/// changing call sites.
pub struct AccessCache {
    /// Thing identifier → front-ordered channel grants.
    grants: RwLock<HashMap<String, Vec<Grant>>>,
    /// Freshness window shared by all grants.
    ttl: Duration,
    /// Lookups answered from a fresh grant.
    hits: AtomicU64,
    /// Lookups that found no fresh grant.
    misses: AtomicU64,
    /// Stale grants removed by lazy expiry.
    evictions: AtomicU64,
}

impl AccessCache {
    /// Creates an empty cache with the given freshness window.
    #[must_use]
    pub fn new(ttl: Duration) -> Self {
        Self {
            grants: RwLock::new(HashMap::new()),
            ttl,
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
            evictions: AtomicU64::new(0),
        }
    }

    /// Records that `thing_id` is currently allowed on `channel_id`,
    /// refreshing recency.
    ///
    /// If the grant already exists its timestamp is refreshed and it is
    /// promoted to the front of the thing's record; the relative order of
    /// the other grants is preserved. Otherwise a new grant is inserted at
    /// the front. Records have no capacity bound and nothing is dropped.
    ///
    /// After `add` returns, [`validate`](Self::validate) for the same pair
    /// is true for the next `ttl`.
    pub fn add(&self, thing_id: &str, channel_id: &str) {
        let now = Instant::now();
        let mut grants = self.grants.write();
        let record = grants.entry(thing_id.to_owned()).or_default();

        if let Some(pos) = record.iter().position(|g| g.channel_id == channel_id) {
            let mut grant = record.remove(pos);
            grant.granted_at = now;
            record.insert(0, grant);
        } else {
            record.insert(0, Grant { channel_id: channel_id.to_owned(), granted_at: now });
        }
    }

    /// Drops the grant for `(thing_id, channel_id)` immediately, regardless
    /// of remaining TTL.
    ///
    /// Unknown things and channels are a no-op. The relative order of the
    /// remaining grants is preserved; a record emptied by removal stays in
    /// the map and behaves exactly like an absent one.
    pub fn remove(&self, thing_id: &str, channel_id: &str) {
        let mut grants = self.grants.write();
        if let Some(record) = grants.get_mut(thing_id)
            && let Some(pos) = record.iter().position(|g| g.channel_id == channel_id)
        {
            record.remove(pos);
        }
    }

    /// Answers whether the grant for `(thing_id, channel_id)` is currently
    /// fresh.
    ///
    /// A stale grant found along the way is lazily evicted; expired grants
    /// are never swept proactively. Repeated calls on a fresh grant return
    /// true without side effects, and the set of cached things is never
    /// changed by validation.
    pub fn validate(&self, thing_id: &str, channel_id: &str) -> bool {
        let now = Instant::now();
        {
            let grants = self.grants.read();
            let Some(record) = grants.get(thing_id) else {
                self.misses.fetch_add(1, Ordering::Relaxed);
                return false;
            };
            match record.iter().find(|g| g.channel_id == channel_id) {
                Some(grant) if grant.is_fresh(now, self.ttl) => {
                    self.hits.fetch_add(1, Ordering::Relaxed);
                    return true;
                },
                Some(_) => {},
                None => {
                    self.misses.fetch_add(1, Ordering::Relaxed);
                    return false;
                },
            }
        }

        // Stale grant: reacquire exclusively and evict it. The record may
        // have changed between the two lock acquisitions, so re-locate the
        // grant and re-check staleness — an entry refreshed by a concurrent
        // add must not be thrown away.
        let mut grants = self.grants.write();
        if let Some(record) = grants.get_mut(thing_id)
            && let Some(pos) = record.iter().position(|g| g.channel_id == channel_id)
            && !record[pos].is_fresh(now, self.ttl)
        {
            record.remove(pos);
            self.evictions.fetch_add(1, Ordering::Relaxed);
            tracing::debug!(thing_id, channel_id, "evicted stale channel grant");
        }
        self.misses.fetch_add(1, Ordering::Relaxed);
        false
    }

    /// Drops every cached grant for every thing.
    ///
    /// Useful on bulk revocation events; the next validation for any pair
    /// misses and forces a fresh decision from the things service.
    pub fn clear(&self) {
        self.grants.write().clear();
    }

    /// Returns the configured freshness window.
    #[must_use]
    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Returns the number of grants currently cached for a thing,
    /// including stale grants not yet evicted.
    #[must_use]
    pub fn entry_count(&self, thing_id: &str) -> usize {
        self.grants.read().get(thing_id).map_or(0, Vec::len)
    }

    /// Returns the number of things with a (possibly empty) record.
    #[must_use]
    pub fn thing_count(&self) -> usize {
        self.grants.read().len()
    }

    /// Returns a snapshot of the hit/miss/eviction counters.
    #[must_use]
    pub fn stats(&self) -> CacheStats {
        CacheStats {
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
            evictions: self.evictions.load(Ordering::Relaxed),
        }
    }

    /// Returns a thing's channel identifiers front-to-back.
    ///
    /// Used in tests to assert promotion and ordering behavior.
    #[cfg(test)]
    fn channels(&self, thing_id: &str) -> Vec<String> {
        self.grants
            .read()
            .get(thing_id)
            .map(|record| record.iter().map(|g| g.channel_id.clone()).collect())
            .unwrap_or_default()
    }
}

impl std::fmt::Debug for AccessCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AccessCache")
            .field("ttl", &self.ttl)
            .field("things", &self.thing_count())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
mod tests {
    use std::{thread, time::Duration};

    use rstest::rstest;

    use super::*;

    const TTL: Duration = Duration::from_millis(100);

    #[test]
    fn test_fresh_cache_misses_everything() {
        let cache = AccessCache::new(TTL);
        assert!(!cache.validate("thing1", "chan1"));
        assert!(!cache.validate("", ""));
        assert_eq!(cache.thing_count(), 0, "validate must not create records");
    }

    #[test]
    fn test_write_then_read() {
        let cache = AccessCache::new(TTL);
        cache.add("thing1", "chan1");
        assert!(cache.validate("thing1", "chan1"));
    }

    #[rstest]
    #[case::unknown_thing("thing2", "chan1")]
    #[case::unknown_channel("thing1", "chan2")]
    fn test_miss_dimensions(#[case] thing_id: &str, #[case] channel_id: &str) {
        let cache = AccessCache::new(TTL);
        cache.add("thing1", "chan1");
        assert!(!cache.validate(thing_id, channel_id));
    }

    #[test]
    fn test_expiry_and_no_resurrection() {
        let cache = AccessCache::new(TTL);
        cache.add("thing1", "chan1");
        thread::sleep(Duration::from_millis(50));
        assert!(cache.validate("thing1", "chan1"), "fresh before the window closes");

        thread::sleep(Duration::from_millis(100));
        assert!(!cache.validate("thing1", "chan1"), "stale after the window");
        assert!(!cache.validate("thing1", "chan1"), "stays stale on re-check");
        assert_eq!(cache.entry_count("thing1"), 0, "stale grant is evicted on lookup");
    }

    #[test]
    fn test_removal_beats_ttl() {
        let cache = AccessCache::new(Duration::from_secs(3600));
        cache.add("thing1", "chan1");
        cache.add("thing1", "chan2");
        cache.remove("thing1", "chan1");

        assert!(!cache.validate("thing1", "chan1"));
        assert!(cache.validate("thing1", "chan2"));
    }

    #[test]
    fn test_remove_unknown_is_noop() {
        let cache = AccessCache::new(TTL);
        cache.remove("thing1", "chan1");

        cache.add("thing1", "chan1");
        cache.remove("thing1", "chan2");
        assert!(cache.validate("thing1", "chan1"));
    }

    #[test]
    fn test_emptied_record_behaves_like_absent() {
        let cache = AccessCache::new(TTL);
        cache.add("thing1", "chan1");
        cache.remove("thing1", "chan1");

        assert_eq!(cache.entry_count("thing1"), 0);
        assert!(!cache.validate("thing1", "chan1"));

        // The record can be repopulated normally.
        cache.add("thing1", "chan1");
        assert!(cache.validate("thing1", "chan1"));
    }

    #[test]
    fn test_idempotent_add_keeps_single_grant() {
        let cache = AccessCache::new(TTL);
        cache.add("thing1", "chan1");
        cache.add("thing1", "chan1");
        assert_eq!(cache.entry_count("thing1"), 1);

        cache.add("thing1", "chan2");
        assert_eq!(cache.entry_count("thing1"), 2);
        assert!(cache.validate("thing1", "chan1"), "older grant undisturbed by new channel");
    }

    #[test]
    fn test_readd_refreshes_timestamp() {
        let cache = AccessCache::new(Duration::from_millis(200));
        cache.add("thing1", "chan1");
        thread::sleep(Duration::from_millis(120));

        // Re-confirmation restarts the freshness window: 240ms after the
        // first add, but only 120ms after the refresh.
        cache.add("thing1", "chan1");
        thread::sleep(Duration::from_millis(120));
        assert!(cache.validate("thing1", "chan1"));
    }

    #[test]
    fn test_new_grants_insert_at_front() {
        let cache = AccessCache::new(Duration::from_secs(3600));
        cache.add("thing1", "chan1");
        cache.add("thing1", "chan2");
        cache.add("thing1", "chan3");

        assert_eq!(cache.channels("thing1"), ["chan3", "chan2", "chan1"]);
    }

    #[test]
    fn test_promotion_preserves_relative_order_of_rest() {
        let cache = AccessCache::new(Duration::from_secs(3600));
        cache.add("thing1", "chan1");
        cache.add("thing1", "chan2");
        cache.add("thing1", "chan3");

        // Re-confirming the back entry moves it to the front and leaves
        // the other two in their existing relative order.
        cache.add("thing1", "chan1");
        assert_eq!(cache.channels("thing1"), ["chan1", "chan3", "chan2"]);

        // Promoting the middle entry shifts only the entries in front of it.
        cache.add("thing1", "chan3");
        assert_eq!(cache.channels("thing1"), ["chan3", "chan1", "chan2"]);
    }

    #[test]
    fn test_removal_preserves_order_of_rest() {
        let cache = AccessCache::new(Duration::from_secs(3600));
        cache.add("thing1", "chan1");
        cache.add("thing1", "chan2");
        cache.add("thing1", "chan3");

        cache.remove("thing1", "chan2");
        assert_eq!(cache.channels("thing1"), ["chan3", "chan1"]);
    }

    #[test]
    fn test_things_are_independent() {
        let cache = AccessCache::new(TTL);
        cache.add("thing1", "chan1");
        cache.add("thing2", "chan1");

        cache.remove("thing1", "chan1");
        assert!(!cache.validate("thing1", "chan1"));
        assert!(cache.validate("thing2", "chan1"));
    }

    #[test]
    fn test_zero_ttl_is_immediately_stale() {
        let cache = AccessCache::new(Duration::ZERO);
        cache.add("thing1", "chan1");
        assert!(!cache.validate("thing1", "chan1"), "a zero window can never hold a fresh grant");
    }

    #[test]
    fn test_stats_counters() {
        let cache = AccessCache::new(TTL);
        assert_eq!(cache.stats(), CacheStats::default());

        cache.add("thing1", "chan1");
        assert!(cache.validate("thing1", "chan1"));
        assert!(!cache.validate("thing1", "chan2"));

        thread::sleep(Duration::from_millis(120));
        assert!(!cache.validate("thing1", "chan1"));

        let stats = cache.stats();
        assert_eq!(stats.hits, 1);
        assert_eq!(stats.misses, 2);
        assert_eq!(stats.evictions, 1);
    }

    #[test]
    fn test_clear_drops_all_things() {
        let cache = AccessCache::new(TTL);
        cache.add("thing1", "chan1");
        cache.add("thing2", "chan2");

        cache.clear();
        assert_eq!(cache.thing_count(), 0);
        assert!(!cache.validate("thing1", "chan1"));
        assert!(!cache.validate("thing2", "chan2"));
    }

    #[test]
    fn test_large_ttl_no_overflow() {
        // ~100 years; exercises the duration arithmetic without risking
        // Instant overflow, since freshness is computed from elapsed time.
        let cache = AccessCache::new(Duration::from_secs(100 * 365 * 24 * 3600));
        cache.add("thing1", "chan1");
        assert!(cache.validate("thing1", "chan1"));
    }
}
