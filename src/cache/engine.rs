//! Cache Engine Module
//!
//! The TTL cache: one store behind one reader/writer lock, a default TTL, and
//! an optional background reaper.
//!
//! # Locking
//! - `get`, `contains_key`, `ttl_remaining` and `size` take the shared lock.
//! - `set`, `delete` and the removal phase of `clean` take the exclusive lock.
//! - A `get` that finds an expired entry releases the shared lock, takes the
//!   exclusive lock and removes the entry only if it is still expired.

use std::any::Any;
use std::borrow::Borrow;
use std::hash::Hash;
use std::sync::Arc;
use std::time::Duration;

use parking_lot::RwLock;
use tokio::time::Instant;
use tracing::{debug, trace, warn};

use crate::cache::{CacheStats, CacheStatsSnapshot, CacheStore};
use crate::config::CacheConfig;
use crate::error::{CacheError, Result};
use crate::tasks::{Reaper, Sweep};

/// Value type for caches holding payloads of unrelated types.
///
/// Recover the concrete type with [`Arc::downcast`].
pub type AnyValue = Arc<dyn Any + Send + Sync>;

/// State shared between the cache handle and its reaper.
struct Shared<K, V> {
    store: RwLock<CacheStore<K, V>>,
    stats: CacheStats,
}

impl<K, V> Shared<K, V>
where
    K: Eq + Hash + Clone,
{
    /// Scans under the shared lock, then removes under one exclusive
    /// acquisition, re-checking each key so a refreshed entry survives.
    fn clean(&self) -> usize {
        let expired = self.scan_expired();
        let removed = self.remove_expired(&expired);

        self.stats.record_sweep(removed);
        trace!(scanned = expired.len(), removed, "Sweep complete");
        removed
    }

    fn scan_expired(&self) -> Vec<K> {
        self.store.read().expired_keys(Instant::now())
    }

    fn remove_expired(&self, keys: &[K]) -> usize {
        if keys.is_empty() {
            return 0;
        }

        let mut store = self.store.write();
        let now = Instant::now();
        keys.iter()
            .filter(|key| store.remove_if_expired(*key, now))
            .count()
    }
}

impl<K, V> Sweep for Shared<K, V>
where
    K: Eq + Hash + Clone + Send + Sync + 'static,
    V: Send + Sync + 'static,
{
    fn sweep(&self) -> usize {
        self.clean()
    }
}

// == Cache ==
/// Thread-safe key-value cache with per-entry expiration.
///
/// Expired entries are never returned. They are removed lazily by the read
/// that finds them, by [`Cache::clean`], or by the background reaper when one
/// is configured. Dropping the cache stops its reaper.
///
/// The cache is not `Clone`; share it with `Arc<Cache<K, V>>`.
///
/// # Example
/// ```
/// use std::time::Duration;
/// use ttl_cache::{Cache, CacheError};
///
/// let cache: Cache<String, u32> = Cache::new(Duration::from_secs(5));
/// cache.set("a".to_string(), 1);
///
/// assert_eq!(cache.get("a"), Ok(1));
/// assert_eq!(cache.get("b"), Err(CacheError::NotFound));
/// assert_eq!(cache.size(), 1);
/// ```
pub struct Cache<K, V> {
    shared: Arc<Shared<K, V>>,
    default_ttl: Duration,
    reaper: Option<Reaper>,
}

impl<K, V> Cache<K, V>
where
    K: Eq + Hash + Clone + Send + Sync + 'static,
    V: Send + Sync + 'static,
{
    // == Constructors ==
    /// Creates a cache without a background reaper.
    ///
    /// # Arguments
    /// * `default_ttl` - Lifetime used when `set` gets no explicit TTL
    pub fn new(default_ttl: Duration) -> Self {
        debug!(?default_ttl, "Creating TTL cache");
        Self {
            shared: Arc::new(Shared {
                store: RwLock::new(CacheStore::new()),
                stats: CacheStats::new(),
            }),
            default_ttl,
            reaper: None,
        }
    }

    /// Creates a cache that sweeps expired entries every `sweep_interval`.
    ///
    /// A zero interval disables the reaper. Inside a Tokio runtime the reaper
    /// is a task on that runtime; elsewhere it gets a dedicated thread. If the
    /// reaper cannot be started, the cache still works and expired entries are
    /// removed by reads and [`Cache::clean`] only.
    pub fn with_sweep(default_ttl: Duration, sweep_interval: Duration) -> Self {
        let mut cache = Self::new(default_ttl);
        if !sweep_interval.is_zero() {
            match Reaper::spawn(Arc::downgrade(&cache.shared), sweep_interval) {
                Ok(reaper) => cache.reaper = Some(reaper),
                Err(err) => warn!(%err, "Failed to start TTL reaper"),
            }
        }
        cache
    }

    /// Creates a cache from a [`CacheConfig`].
    pub fn from_config(config: &CacheConfig) -> Self {
        match config.sweep_interval {
            Some(interval) => Self::with_sweep(config.default_ttl, interval),
            None => Self::new(config.default_ttl),
        }
    }
}

impl<K, V> Cache<K, V>
where
    K: Eq + Hash + Clone,
{
    // == Set ==
    /// Stores `value` under `key` for the default TTL.
    ///
    /// An existing entry is fully replaced, value and expiration alike.
    pub fn set(&self, key: K, value: V) {
        self.set_with_ttl(key, value, Duration::ZERO);
    }

    /// Stores `value` under `key` for `ttl`, or the default TTL if `ttl` is zero.
    pub fn set_with_ttl(&self, key: K, value: V, ttl: Duration) {
        let ttl = if ttl.is_zero() { self.default_ttl } else { ttl };
        let now = Instant::now();
        self.shared.store.write().insert(key, value, ttl, now);
    }

    // == Get ==
    /// Returns a clone of the live value for `key`.
    ///
    /// An expired entry is removed by this call and reported as
    /// [`CacheError::NotFound`], the same as a key that was never set.
    pub fn get<Q>(&self, key: &Q) -> Result<V>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
        V: Clone,
    {
        let now = Instant::now();
        {
            let store = self.shared.store.read();
            match store.get(key) {
                None => {
                    self.shared.stats.record_miss();
                    return Err(CacheError::NotFound);
                }
                Some(entry) if !entry.is_expired_at(now) => {
                    self.shared.stats.record_hit();
                    return Ok(entry.value.clone());
                }
                Some(_) => {}
            }
        }

        // A concurrent set may have refreshed the entry since the shared lock
        // was released; remove_if_expired leaves it alone in that case.
        if self.shared.store.write().remove_if_expired(key, now) {
            self.shared.stats.record_expired();
            trace!("Removed expired entry on read");
        }
        self.shared.stats.record_miss();
        Err(CacheError::NotFound)
    }

    /// Returns true if `key` has a live entry. Never mutates the store.
    pub fn contains_key<Q>(&self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        let now = Instant::now();
        self.shared
            .store
            .read()
            .get(key)
            .is_some_and(|entry| !entry.is_expired_at(now))
    }

    /// Returns the remaining lifetime of the live entry for `key`.
    pub fn ttl_remaining<Q>(&self, key: &Q) -> Option<Duration>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        let now = Instant::now();
        self.shared
            .store
            .read()
            .get(key)
            .filter(|entry| !entry.is_expired_at(now))
            .map(|entry| entry.ttl_remaining_at(now))
    }

    // == Delete ==
    /// Removes the entry for `key`.
    ///
    /// Returns [`CacheError::NotFound`] if the key has no live entry. An
    /// expired entry still in the store is removed and reported the same way.
    pub fn delete<Q>(&self, key: &Q) -> Result<()>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        let now = Instant::now();
        let removed = self.shared.store.write().remove(key);

        match removed {
            Some(entry) if !entry.is_expired_at(now) => Ok(()),
            Some(_) => {
                self.shared.stats.record_expired();
                Err(CacheError::NotFound)
            }
            None => Err(CacheError::NotFound),
        }
    }

    // == Clean ==
    /// Removes every expired entry and returns how many were removed.
    pub fn clean(&self) -> usize {
        self.shared.clean()
    }

    // == Size ==
    /// Returns the number of entries physically present.
    ///
    /// Expired entries not yet removed are counted, so this can exceed the
    /// number of keys `get` would return.
    pub fn size(&self) -> usize {
        self.shared.store.read().len()
    }

    /// Returns true if no entries are physically present.
    pub fn is_empty(&self) -> bool {
        self.shared.store.read().is_empty()
    }

    // == Accessors ==
    /// Returns the TTL applied when `set` gets none.
    pub fn default_ttl(&self) -> Duration {
        self.default_ttl
    }

    /// Returns the reaper's sweep interval, or None when no reaper was started.
    pub fn sweep_interval(&self) -> Option<Duration> {
        self.reaper.as_ref().map(Reaper::interval)
    }

    /// Returns true if a background reaper is running for this cache.
    pub fn has_reaper(&self) -> bool {
        self.reaper.as_ref().is_some_and(|reaper| !reaper.is_finished())
    }

    /// Returns the current activity counters.
    pub fn stats(&self) -> CacheStatsSnapshot {
        self.shared.stats.snapshot(self.size())
    }
}

impl<K, V> std::fmt::Debug for Cache<K, V> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Cache")
            .field("default_ttl", &self.default_ttl)
            .field("reaper", &self.reaper)
            .finish_non_exhaustive()
    }
}
