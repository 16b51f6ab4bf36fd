//! Cache Store Module
//!
//! The unlocked key-to-entry map. Callers serialize access through the
//! engine's reader/writer lock.

use std::borrow::Borrow;
use std::collections::HashMap;
use std::hash::Hash;
use std::time::Duration;

use tokio::time::Instant;

use crate::cache::CacheEntry;

// == Cache Store ==
/// Key-value storage holding at most one entry per key.
#[derive(Debug)]
pub struct CacheStore<K, V> {
    entries: HashMap<K, CacheEntry<V>>,
}

impl<K, V> Default for CacheStore<K, V> {
    fn default() -> Self {
        Self {
            entries: HashMap::new(),
        }
    }
}

impl<K, V> CacheStore<K, V>
where
    K: Eq + Hash,
{
    // == Constructor ==
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    // == Insert ==
    /// Inserts or fully replaces the entry for `key`, expiring `ttl` after `now`.
    ///
    /// Returns the replaced entry, if any.
    pub fn insert(
        &mut self,
        key: K,
        value: V,
        ttl: Duration,
        now: Instant,
    ) -> Option<CacheEntry<V>> {
        self.entries.insert(key, CacheEntry::new_at(value, ttl, now))
    }

    // == Get ==
    /// Returns the physical entry for `key`, expired or not.
    pub fn get<Q>(&self, key: &Q) -> Option<&CacheEntry<V>>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.entries.get(key)
    }

    // == Remove ==
    /// Removes the entry for `key`, returning it if it was present.
    pub fn remove<Q>(&mut self, key: &Q) -> Option<CacheEntry<V>>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.entries.remove(key)
    }

    /// Removes the entry for `key` only if it is expired at `now`.
    ///
    /// An entry refreshed since the caller last looked is left in place.
    pub fn remove_if_expired<Q>(&mut self, key: &Q, now: Instant) -> bool
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        match self.entries.get(key) {
            Some(entry) if entry.is_expired_at(now) => {
                self.entries.remove(key);
                true
            }
            _ => false,
        }
    }

    // == Expired Keys ==
    /// Collects the keys of every entry expired at `now`.
    pub fn expired_keys(&self, now: Instant) -> Vec<K>
    where
        K: Clone,
    {
        self.entries
            .iter()
            .filter(|(_, entry)| entry.is_expired_at(now))
            .map(|(key, _)| key.clone())
            .collect()
    }

    // == Length ==
    /// Returns the number of physically present entries, expired ones included.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    // == Is Empty ==
    /// Returns true if the store holds no entries.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;

    const TTL: Duration = Duration::from_secs(300);

    #[test]
    fn test_store_new() {
        let store: CacheStore<String, String> = CacheStore::new();
        assert_eq!(store.len(), 0);
        assert!(store.is_empty());
    }

    #[test]
    fn test_store_insert_and_get() {
        let mut store = CacheStore::new();
        let now = Instant::now();

        assert!(store.insert("key1".to_string(), "value1", TTL, now).is_none());

        let entry = store.get("key1").unwrap();
        assert_eq!(entry.value, "value1");
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_store_overwrite_replaces_expiry() {
        let mut store = CacheStore::new();
        let now = Instant::now();

        store.insert("key1", "value1", Duration::from_secs(600), now);
        let previous = store.insert("key1", "value2", Duration::from_secs(1), now);

        assert_eq!(previous.unwrap().value, "value1");
        let entry = store.get("key1").unwrap();
        assert_eq!(entry.value, "value2");
        assert_eq!(entry.expires_at, now + Duration::from_secs(1));
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_store_remove() {
        let mut store = CacheStore::new();
        store.insert("key1", 1, TTL, Instant::now());

        assert_eq!(store.remove("key1").map(|e| e.value), Some(1));
        assert!(store.remove("key1").is_none());
        assert!(store.is_empty());
    }

    #[test]
    fn test_store_expired_keys() {
        let mut store = CacheStore::new();
        let now = Instant::now();

        store.insert("short", 1, Duration::from_secs(1), now);
        store.insert("long", 2, Duration::from_secs(10), now);

        assert!(store.expired_keys(now).is_empty());

        let later = now + Duration::from_secs(5);
        assert_eq!(store.expired_keys(later), vec!["short"]);
    }

    #[test]
    fn test_store_remove_if_expired_rechecks() {
        let mut store = CacheStore::new();
        let now = Instant::now();
        let later = now + Duration::from_secs(5);

        store.insert("key1", 1, Duration::from_secs(1), now);
        let stale = store.expired_keys(later);
        assert_eq!(stale, vec!["key1"]);

        // Refreshed between the scan and the removal.
        store.insert("key1", 2, Duration::from_secs(60), later);

        assert!(!store.remove_if_expired("key1", later));
        assert_eq!(store.get("key1").unwrap().value, 2);

        assert!(store.remove_if_expired("key1", later + Duration::from_secs(61)));
        assert!(store.is_empty());
    }

    #[test]
    fn test_store_remove_if_expired_missing_key() {
        let mut store: CacheStore<&str, i32> = CacheStore::new();
        assert!(!store.remove_if_expired("ghost", Instant::now()));
    }
}
