//! Cache Store Module
//!
//! Main cache engine combining a hash index with a recency list, TTL
//! expiration and LRU eviction.

use std::borrow::Borrow;
use std::collections::HashMap;
use std::hash::Hash;
use std::sync::Arc;
use std::time::{Duration, Instant};

use parking_lot::{Mutex, RwLock};
use tracing::debug;

use crate::cache::{CacheEntry, CacheStats, NodeId, RecencyList};
use crate::config::CacheConfig;
use crate::error::Result;
use crate::tasks::{Janitor, JanitorState, Sweep};

// == Cache State ==
/// Index, recency list and counters. Every method here expects the caller to
/// hold the write lock, which `&mut self` enforces.
#[derive(Debug)]
pub(crate) struct CacheState<K, V> {
    /// Key to position in `order`
    index: HashMap<K, NodeId>,
    /// Entries from most (front) to least (back) recently used
    order: RecencyList<CacheEntry<K, V>>,
    /// Performance statistics
    stats: CacheStats,
    /// Maximum number of entries allowed, zero = unbounded
    max_entries: usize,
}

impl<K, V> CacheState<K, V>
where
    K: Eq + Hash + Clone,
    V: Clone,
{
    pub(crate) fn new(max_entries: usize) -> Self {
        Self {
            index: HashMap::new(),
            order: RecencyList::new(),
            stats: CacheStats::new(),
            max_entries,
        }
    }

    // == Set ==
    pub(crate) fn set(&mut self, key: K, value: V, ttl: Duration) {
        if let Some(&id) = self.index.get(&key) {
            if let Some(entry) = self.order.get_mut(id) {
                entry.update(value, ttl);
            }
            self.order.move_to_front(id);
            return;
        }

        if self.max_entries > 0 && self.order.len() >= self.max_entries {
            self.evict_oldest();
        }

        let id = self.order.push_front(CacheEntry::new(key.clone(), value, ttl));
        self.index.insert(key, id);
    }

    // == Get ==
    pub(crate) fn get<Q>(&mut self, key: &Q) -> Option<V>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        let Some(&id) = self.index.get(key) else {
            self.stats.record_miss();
            return None;
        };

        let expired = self.order.get(id).map_or(true, CacheEntry::is_expired);
        if expired {
            self.remove_element(id);
            self.stats.record_miss();
            return None;
        }

        self.order.move_to_front(id);
        self.stats.record_hit();
        self.order.get(id).map(|entry| entry.value.clone())
    }

    // == Delete ==
    pub(crate) fn delete<Q>(&mut self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        match self.index.get(key) {
            Some(&id) => self.remove_element(id).is_some(),
            None => false,
        }
    }

    // == Evict Oldest ==
    /// Removes the least recently used entry, if any.
    fn evict_oldest(&mut self) {
        let Some(id) = self.order.back() else {
            return;
        };
        if self.remove_element(id).is_some() {
            self.stats.record_eviction();
            debug!("Evicted least recently used entry ({} live)", self.order.len());
        }
    }

    // == Remove Element ==
    /// Detaches a node from the recency list, then drops its key from the
    /// index. Eviction, lazy expiration, active expiration and delete all go
    /// through here so the two structures never disagree.
    fn remove_element(&mut self, id: NodeId) -> Option<CacheEntry<K, V>> {
        let entry = self.order.remove(id)?;
        self.index.remove(entry.key());
        Some(entry)
    }

    // == Delete Expired ==
    /// Walks the recency list from oldest to newest and removes every
    /// expired entry. Returns the number of entries removed.
    pub(crate) fn delete_expired(&mut self) -> usize {
        let now = Instant::now();
        let mut removed = 0;
        let mut cursor = self.order.back();

        while let Some(id) = cursor {
            cursor = self.order.prev(id);
            let expired = self
                .order
                .get(id)
                .is_some_and(|entry| entry.is_expired_at(now));
            if expired && self.remove_element(id).is_some() {
                removed += 1;
            }
        }

        removed
    }

    pub(crate) fn stats(&self) -> CacheStats {
        self.stats
    }

    pub(crate) fn len(&self) -> usize {
        self.order.len()
    }

    /// Panics if the index and the recency list disagree.
    #[cfg(test)]
    pub(crate) fn assert_consistent(&self) {
        assert_eq!(self.index.len(), self.order.len(), "index/list size mismatch");
        for entry in self.order.iter() {
            let id = self.index.get(entry.key()).expect("list node without index entry");
            let indexed = self.order.get(*id).expect("dangling index handle");
            assert!(indexed.key() == entry.key(), "index points at the wrong node");
        }
        if self.max_entries > 0 {
            assert!(self.order.len() <= self.max_entries, "capacity exceeded");
        }
    }

    /// Keys from most to least recently used.
    #[cfg(test)]
    pub(crate) fn keys_by_recency(&self) -> Vec<K> {
        self.order.iter().map(|entry| entry.key().clone()).collect()
    }
}

// == Shared ==
struct Shared<K, V> {
    state: RwLock<CacheState<K, V>>,
    janitor: Mutex<Janitor>,
}

impl<K, V> Sweep for Shared<K, V>
where
    K: Eq + Hash + Clone + Send + Sync + 'static,
    V: Clone + Send + Sync + 'static,
{
    fn sweep(&self) -> usize {
        self.state.write().delete_expired()
    }
}

// == Cache ==
/// Thread-safe cache with per-entry TTL and LRU eviction.
///
/// Cloning produces another handle to the same cache. All operations are
/// synchronous and serialized by a single lock; only [`Cache::stats`] and
/// [`Cache::len`] take it shared. When the last handle is dropped the
/// background sweep, if any, exits.
///
/// # Example
/// ```
/// use std::time::Duration;
/// use tempus_cache::{Cache, CacheConfig};
///
/// let cache = Cache::new(CacheConfig::new().with_max_entries(2)).unwrap();
/// cache.set("a", 1, Duration::ZERO);
/// cache.set("b", 2, Duration::ZERO);
/// assert_eq!(cache.get("a"), Some(1));
///
/// cache.set("c", 3, Duration::ZERO);
/// assert_eq!(cache.get("b"), None);
/// assert_eq!(cache.stats().evictions, 1);
/// ```
pub struct Cache<K, V> {
    shared: Arc<Shared<K, V>>,
}

impl<K, V> Clone for Cache<K, V> {
    fn clone(&self) -> Self {
        Self {
            shared: Arc::clone(&self.shared),
        }
    }
}

impl<K, V> Cache<K, V>
where
    K: Eq + Hash + Clone + Send + Sync + 'static,
    V: Clone + Send + Sync + 'static,
{
    // == Constructor ==
    /// Creates a cache from `config`, starting the background sweep when a
    /// sweep interval is set.
    ///
    /// # Errors
    /// [`CacheError::RuntimeUnavailable`](crate::CacheError::RuntimeUnavailable)
    /// if a sweep interval is set and no Tokio runtime is running.
    pub fn new(config: CacheConfig) -> Result<Self> {
        let shared = Arc::new(Shared {
            state: RwLock::new(CacheState::new(config.max_entries)),
            janitor: Mutex::new(Janitor::disabled()),
        });

        if config.sweep_enabled() {
            let weak = Arc::downgrade(&shared);
            *shared.janitor.lock() = Janitor::spawn(weak, config.sweep_interval)?;
        }

        debug!(
            "Cache created: max_entries={}, sweep_interval={:?}",
            config.max_entries, config.sweep_interval
        );
        Ok(Self { shared })
    }

    /// Stores `value` under `key`.
    ///
    /// A zero `ttl` means the entry never expires; on an existing key it
    /// keeps the previous expiration. Inserting a new key into a full cache
    /// first evicts the least recently used entry.
    pub fn set(&self, key: K, value: V, ttl: Duration) {
        self.shared.state.write().set(key, value, ttl);
    }

    /// Returns a clone of the value if present and not expired, marking the
    /// entry as most recently used. Expired entries are removed and count as
    /// misses.
    pub fn get<Q>(&self, key: &Q) -> Option<V>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.shared.state.write().get(key)
    }

    /// Removes `key` if present. Returns whether anything was removed.
    pub fn delete<Q>(&self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.shared.state.write().delete(key)
    }

    /// Snapshot of the hit, miss and eviction counters.
    pub fn stats(&self) -> CacheStats {
        self.shared.state.read().stats()
    }

    /// Number of stored entries, including expired ones not yet removed.
    pub fn len(&self) -> usize {
        self.shared.state.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Runs the active expiration sweep now. Blocks all other operations
    /// for the length of the walk.
    pub fn delete_expired(&self) -> usize {
        self.shared.sweep()
    }

    pub fn janitor_state(&self) -> JanitorState {
        self.shared.janitor.lock().state()
    }

    /// Stops the background sweep. The task exits after any sweep in
    /// progress; the cache stays usable afterwards, with lazy expiration
    /// only.
    ///
    /// # Errors
    /// [`CacheError::AlreadyStopped`](crate::CacheError::AlreadyStopped) on
    /// every call after the first.
    pub fn stop(&self) -> Result<()> {
        self.shared.janitor.lock().stop()?;
        debug!("Cache stopped");
        Ok(())
    }
}

impl<K, V> Default for Cache<K, V>
where
    K: Eq + Hash + Clone + Send + Sync + 'static,
    V: Clone + Send + Sync + 'static,
{
    /// Unbounded cache without a background sweep.
    fn default() -> Self {
        Self {
            shared: Arc::new(Shared {
                state: RwLock::new(CacheState::new(0)),
                janitor: Mutex::new(Janitor::disabled()),
            }),
        }
    }
}

impl<K, V> std::fmt::Debug for Cache<K, V> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = self.shared.state.read();
        f.debug_struct("Cache")
            .field("len", &state.order.len())
            .field("max_entries", &state.max_entries)
            .field("stats", &state.stats)
            .finish()
    }
}
