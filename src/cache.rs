//! Time-bounded cache
//!
//! A small keyed store where every entry expires `ttl` after insertion.
//! Expiry is lazy: `get` simply refuses to return a stale entry, nothing
//! evicts in the background. Each cache holds at most a handful of keys,
//! so a full scan on insert is fine.

use std::collections::HashMap;
use std::hash::Hash;
use std::time::{Duration, Instant};

use tokio::sync::RwLock;

struct CacheEntry<V> {
    value: V,
    inserted_at: Instant,
}

/// Keyed store with per-entry time-to-live and a maximum entry count.
///
/// Reads clone the stored value out; entries are never mutated in place,
/// a refresh always replaces the whole entry.
pub struct TtlCache<K, V> {
    entries: RwLock<HashMap<K, CacheEntry<V>>>,
    max_entries: usize,
    ttl: Duration,
}

impl<K, V> TtlCache<K, V>
where
    K: Eq + Hash + Clone,
    V: Clone,
{
    pub fn new(max_entries: usize, ttl: Duration) -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
            max_entries,
            ttl,
        }
    }

    /// Return the cached value if the entry exists and is younger than the
    /// ttl. An entry whose age has reached the ttl behaves as absent.
    pub async fn get(&self, key: &K) -> Option<V> {
        let entries = self.entries.read().await;
        let entry = entries.get(key)?;
        if entry.inserted_at.elapsed() < self.ttl {
            Some(entry.value.clone())
        } else {
            None
        }
    }

    /// Insert or replace the entry for `key`, restarting its clock.
    ///
    /// Inserting a new key at capacity evicts the oldest entry (which is
    /// also the first to go stale).
    pub async fn put(&self, key: K, value: V) {
        let mut entries = self.entries.write().await;

        if !entries.contains_key(&key) && entries.len() >= self.max_entries {
            let oldest = entries
                .iter()
                .min_by_key(|(_, entry)| entry.inserted_at)
                .map(|(k, _)| k.clone());
            if let Some(oldest) = oldest {
                entries.remove(&oldest);
            }
        }

        entries.insert(
            key,
            CacheEntry {
                value,
                inserted_at: Instant::now(),
            },
        );
    }

    /// Remove a single entry. No-op when the key is absent.
    pub async fn remove(&self, key: &K) {
        self.entries.write().await.remove(key);
    }

    /// Drop every entry. Safe to call on an empty cache.
    pub async fn clear(&self) {
        self.entries.write().await.clear();
    }

    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.entries.read().await.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn get_within_ttl_returns_stored_value() {
        let cache: TtlCache<&str, u32> = TtlCache::new(4, Duration::from_secs(60));
        cache.put("a", 7).await;

        assert_eq!(cache.get(&"a").await, Some(7));
        assert_eq!(cache.get(&"missing").await, None);
    }

    #[tokio::test]
    async fn entry_expires_after_ttl() {
        let cache: TtlCache<&str, u32> = TtlCache::new(4, Duration::from_millis(50));
        cache.put("a", 7).await;

        assert_eq!(cache.get(&"a").await, Some(7));
        tokio::time::sleep(Duration::from_millis(100)).await;
        assert_eq!(cache.get(&"a").await, None);
    }

    #[tokio::test]
    async fn put_replaces_entry_and_restarts_clock() {
        let cache: TtlCache<&str, u32> = TtlCache::new(4, Duration::from_millis(300));
        cache.put("a", 1).await;
        tokio::time::sleep(Duration::from_millis(150)).await;

        cache.put("a", 2).await;
        tokio::time::sleep(Duration::from_millis(150)).await;

        // The refresh restarted the clock, so the entry is still fresh.
        assert_eq!(cache.get(&"a").await, Some(2));
    }

    #[tokio::test]
    async fn clear_is_safe_when_empty() {
        let cache: TtlCache<&str, u32> = TtlCache::new(4, Duration::from_secs(60));
        cache.clear().await;
        assert!(cache.is_empty().await);

        cache.put("a", 1).await;
        cache.clear().await;
        assert_eq!(cache.get(&"a").await, None);
    }

    #[tokio::test]
    async fn remove_is_safe_when_absent() {
        let cache: TtlCache<&str, u32> = TtlCache::new(4, Duration::from_secs(60));
        cache.remove(&"a").await;

        cache.put("a", 1).await;
        cache.remove(&"a").await;
        assert_eq!(cache.get(&"a").await, None);
    }

    #[tokio::test]
    async fn capacity_evicts_oldest_entry() {
        let cache: TtlCache<&str, u32> = TtlCache::new(2, Duration::from_secs(60));
        cache.put("first", 1).await;
        tokio::time::sleep(Duration::from_millis(5)).await;
        cache.put("second", 2).await;
        tokio::time::sleep(Duration::from_millis(5)).await;
        cache.put("third", 3).await;

        assert_eq!(cache.len().await, 2);
        assert_eq!(cache.get(&"first").await, None);
        assert_eq!(cache.get(&"second").await, Some(2));
        assert_eq!(cache.get(&"third").await, Some(3));
    }
}
