//! Rebuild Cache (C15): memoizes Incremental Builder outputs, keyed by
//! change-set identity. Thread-safe (spec §5); LRU subject to `max_entries`
//! plus a TTL that causes `get` to miss and purge the entry.

use std::collections::HashMap;
use std::time::{Duration, Instant};

use lru::LruCache;
use parking_lot::Mutex;

use crate::features::cache::config::RebuildCacheConfig;
use crate::features::rebuild_cache::cache_key::RebuildCacheKey;
use crate::shared::models::Graph;

#[derive(Debug, Clone)]
pub struct RebuildCacheEntry {
    pub updated_graph: Graph,
    pub rebuild_plan_meta: HashMap<String, String>,
    pub rebuild_stats: HashMap<String, String>,
    pub created_at: Instant,
    pub ttl: Duration,
}

impl RebuildCacheEntry {
    fn is_expired(&self, now: Instant) -> bool {
        now.duration_since(self.created_at) > self.ttl
    }
}

#[derive(Debug, Clone, Default)]
pub struct RebuildCacheStats {
    pub hits: u64,
    pub misses: u64,
    pub expirations: u64,
}

pub struct RebuildCache {
    config: RebuildCacheConfig,
    entries: Mutex<LruCache<RebuildCacheKey, RebuildCacheEntry>>,
    stats: Mutex<RebuildCacheStats>,
}

impl RebuildCache {
    pub fn new(config: RebuildCacheConfig) -> Self {
        let capacity = std::num::NonZeroUsize::new(config.max_entries.max(1)).unwrap();
        Self { config, entries: Mutex::new(LruCache::new(capacity)), stats: Mutex::new(RebuildCacheStats::default()) }
    }

    pub fn get(&self, key: &RebuildCacheKey) -> Option<RebuildCacheEntry> {
        let mut entries = self.entries.lock();
        let now = Instant::now();
        match entries.get(key) {
            Some(entry) if entry.is_expired(now) => {
                entries.pop(key);
                drop(entries);
                let mut stats = self.stats.lock();
                stats.misses += 1;
                stats.expirations += 1;
                None
            }
            Some(entry) => {
                let value = entry.clone();
                drop(entries);
                self.stats.lock().hits += 1;
                Some(value)
            }
            None => {
                drop(entries);
                self.stats.lock().misses += 1;
                None
            }
        }
    }

    pub fn put(
        &self,
        key: RebuildCacheKey,
        updated_graph: Graph,
        rebuild_plan_meta: HashMap<String, String>,
        rebuild_stats: HashMap<String, String>,
    ) {
        let entry = RebuildCacheEntry {
            updated_graph,
            rebuild_plan_meta,
            rebuild_stats,
            created_at: Instant::now(),
            ttl: self.config.ttl,
        };
        self.entries.lock().put(key, entry);
    }

    /// Removes a specific entry, or the whole cache if `key` is `None`.
    pub fn invalidate(&self, key: Option<&RebuildCacheKey>) {
        match key {
            Some(key) => {
                self.entries.lock().pop(key);
            }
            None => self.entries.lock().clear(),
        }
    }

    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn stats(&self) -> RebuildCacheStats {
        self.stats.lock().clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    fn key() -> RebuildCacheKey {
        let mut changes = BTreeMap::new();
        changes.insert("f1".to_string(), ("before".to_string(), "after".to_string()));
        RebuildCacheKey::build("repo", "snap", &changes)
    }

    #[test]
    fn put_then_get_hits() {
        let cache = RebuildCache::new(RebuildCacheConfig::default());
        cache.put(key(), Graph::new(), HashMap::new(), HashMap::new());
        assert!(cache.get(&key()).is_some());
        assert_eq!(cache.stats().hits, 1);
    }

    #[test]
    fn expired_entry_misses_and_is_purged() {
        let mut config = RebuildCacheConfig::default();
        config.ttl = Duration::from_millis(1);
        let cache = RebuildCache::new(config);
        cache.put(key(), Graph::new(), HashMap::new(), HashMap::new());
        std::thread::sleep(Duration::from_millis(5));

        assert!(cache.get(&key()).is_none());
        assert_eq!(cache.stats().expirations, 1);
        assert!(cache.is_empty());
    }

    #[test]
    fn invalidate_specific_key_removes_only_that_entry() {
        let cache = RebuildCache::new(RebuildCacheConfig::default());
        let k1 = key();
        let mut changes2 = BTreeMap::new();
        changes2.insert("f2".to_string(), ("a".to_string(), "b".to_string()));
        let k2 = RebuildCacheKey::build("repo", "snap", &changes2);

        cache.put(k1.clone(), Graph::new(), HashMap::new(), HashMap::new());
        cache.put(k2.clone(), Graph::new(), HashMap::new(), HashMap::new());
        cache.invalidate(Some(&k1));

        assert!(cache.get(&k1).is_none());
        assert!(cache.get(&k2).is_some());
    }

    #[test]
    fn invalidate_none_clears_whole_cache() {
        let cache = RebuildCache::new(RebuildCacheConfig::default());
        cache.put(key(), Graph::new(), HashMap::new(), HashMap::new());
        cache.invalidate(None);
        assert!(cache.is_empty());
    }
}
