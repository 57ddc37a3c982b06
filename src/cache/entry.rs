//! Cache Entry Module
//!
//! Defines the structure for individual cache entries with TTL support.

use std::time::{Duration, Instant};

// == Cache Entry ==
/// A single cache entry: key, value and expiration instant.
#[derive(Debug, Clone)]
pub(crate) struct CacheEntry<K, V> {
    key: K,
    /// The stored value
    pub(crate) value: V,
    /// Expiration instant, None = never expires
    pub(crate) expires_at: Option<Instant>,
}

impl<K, V> CacheEntry<K, V> {
    // == Constructor ==
    /// Creates a new cache entry.
    ///
    /// A zero `ttl` produces an entry that never expires.
    pub(crate) fn new(key: K, value: V, ttl: Duration) -> Self {
        Self {
            key,
            value,
            expires_at: expiry_after(Instant::now(), ttl),
        }
    }

    /// The entry's key. Fixed for the lifetime of the entry.
    pub(crate) fn key(&self) -> &K {
        &self.key
    }

    // == Refresh ==
    /// Replaces the value, and the expiration only when `ttl` is non-zero.
    ///
    /// A zero `ttl` keeps whatever expiration the entry already had.
    pub(crate) fn update(&mut self, value: V, ttl: Duration) {
        self.value = value;
        if !ttl.is_zero() {
            self.expires_at = expiry_after(Instant::now(), ttl);
        }
    }

    // == Is Expired ==
    /// Checks if the entry has expired as of now.
    pub(crate) fn is_expired(&self) -> bool {
        self.is_expired_at(Instant::now())
    }

    /// Checks expiration against a given instant.
    ///
    /// An entry is expired strictly after its expiration instant; entries
    /// without one never expire.
    pub(crate) fn is_expired_at(&self, now: Instant) -> bool {
        match self.expires_at {
            Some(expires) => now > expires,
            None => false,
        }
    }
}

/// Expiration instant for a TTL starting at `now`. Zero and unrepresentable
/// TTLs both mean "never".
fn expiry_after(now: Instant, ttl: Duration) -> Option<Instant> {
    if ttl.is_zero() {
        None
    } else {
        now.checked_add(ttl)
    }
}
