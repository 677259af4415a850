//! L1 Priority Memory Cache (C3): bounded by entry count and total bytes,
//! evicted by a priority score instead of plain LRU.
//!
//! The teacher's L1 (`l1_adaptive_cache.rs`) delegates ARC+TTL eviction to
//! `moka`. That policy isn't expressible here: the required score is a
//! specific formula over frequency, age and size, so this tier is
//! hand-rolled over a `parking_lot`-guarded map instead.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Instant;

use crate::features::cache::config::PriorityCacheConfig;
use crate::shared::models::CacheKey;

/// Trait for estimating an entry's resident size, kept for parity with the
/// teacher's `EstimateSize` even though this tier takes sizes explicitly.
pub trait EstimateSize {
    fn estimated_size_bytes(&self) -> usize;
}

struct Entry<V> {
    value: Arc<V>,
    size_bytes: u64,
    access_count: u64,
    created: Instant,
    last_access: Instant,
}

impl<V> Entry<V> {
    fn priority(&self, decay: f64, now: Instant) -> f64 {
        let age_secs = now.duration_since(self.created).as_secs_f64();
        let size_kb = (self.size_bytes as f64 / 1024.0).max(1.0);
        (self.access_count as f64) * 2f64.powf(-decay * age_secs) / size_kb
    }
}

#[derive(Debug, Clone, Default)]
pub struct PriorityCacheStats {
    pub hits: u64,
    pub misses: u64,
    pub evictions: u64,
    pub entries: usize,
    pub bytes: u64,
}

/// In-process, single-machine priority cache. Not shared across processes
/// (no file locking, no cross-process invalidation).
pub struct PriorityCache<V> {
    config: PriorityCacheConfig,
    entries: parking_lot::Mutex<HashMap<CacheKey, Entry<V>>>,
    stats: parking_lot::Mutex<PriorityCacheStats>,
}

impl<V> PriorityCache<V> {
    pub fn new(config: PriorityCacheConfig) -> Self {
        Self {
            config,
            entries: parking_lot::Mutex::new(HashMap::new()),
            stats: parking_lot::Mutex::new(PriorityCacheStats::default()),
        }
    }

    pub fn get(&self, key: &CacheKey) -> Option<Arc<V>> {
        let mut entries = self.entries.lock();
        let now = Instant::now();
        if let Some(entry) = entries.get_mut(key) {
            entry.access_count += 1;
            entry.last_access = now;
            let value = Arc::clone(&entry.value);
            drop(entries);
            self.stats.lock().hits += 1;
            Some(value)
        } else {
            drop(entries);
            self.stats.lock().misses += 1;
            None
        }
    }

    pub fn insert(&self, key: CacheKey, value: Arc<V>, size_bytes: u64) {
        let now = Instant::now();
        let mut entries = self.entries.lock();
        entries.insert(
            key,
            Entry {
                value,
                size_bytes,
                access_count: 1,
                created: now,
                last_access: now,
            },
        );
        Self::evict_locked(&self.config, &mut entries);
        let mut stats = self.stats.lock();
        stats.entries = entries.len();
        stats.bytes = entries.values().map(|e| e.size_bytes).sum();
    }

    pub fn invalidate(&self, key: &CacheKey) {
        let mut entries = self.entries.lock();
        entries.remove(key);
        let mut stats = self.stats.lock();
        stats.entries = entries.len();
        stats.bytes = entries.values().map(|e| e.size_bytes).sum();
    }

    /// Remove every entry whose `logical_path` matches `predicate` — used
    /// by the Tiered Cache's `invalidate_repo`.
    pub fn invalidate_matching(&self, predicate: impl Fn(&CacheKey) -> bool) -> usize {
        let mut entries = self.entries.lock();
        let before = entries.len();
        entries.retain(|key, _| !predicate(key));
        let removed = before - entries.len();
        let mut stats = self.stats.lock();
        stats.entries = entries.len();
        stats.bytes = entries.values().map(|e| e.size_bytes).sum();
        removed
    }

    pub fn clear(&self) {
        let mut entries = self.entries.lock();
        entries.clear();
        *self.stats.lock() = PriorityCacheStats::default();
    }

    pub fn entry_count(&self) -> usize {
        self.entries.lock().len()
    }

    pub fn stats(&self) -> PriorityCacheStats {
        self.stats.lock().clone()
    }

    /// Evict lowest-priority entries until both bounds are satisfied.
    /// Ties in priority are broken by oldest `last_access`.
    fn evict_locked(config: &PriorityCacheConfig, entries: &mut HashMap<CacheKey, Entry<V>>) {
        let now = Instant::now();
        let total_bytes = || entries.values().map(|e| e.size_bytes).sum::<u64>();

        while entries.len() > config.max_entries || total_bytes() > config.max_bytes {
            let victim = entries
                .iter()
                .min_by(|(_, a), (_, b)| {
                    a.priority(config.decay, now)
                        .partial_cmp(&b.priority(config.decay, now))
                        .unwrap_or(std::cmp::Ordering::Equal)
                        .then_with(|| a.last_access.cmp(&b.last_access))
                })
                .map(|(k, _)| k.clone());

            match victim {
                Some(key) => {
                    entries.remove(&key);
                }
                None => break,
            }
        }
    }
}
