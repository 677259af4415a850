//! Tiered IR Cache (C5): facade cascading L1 -> L2 reads with automatic
//! promotion on an L2 hit, write-through writes, and repo-scoped
//! invalidation.

use std::sync::Arc;

use serde::{de::DeserializeOwned, Serialize};

use crate::errors::CoreResult;
use crate::features::cache::config::TieredCacheConfig;
use crate::features::cache::l1_priority_cache::PriorityCache;
use crate::features::cache::l2_disk_cache::{DiskCache, SerializerType};
use crate::shared::models::{CacheKey, VersionPair};

#[derive(Debug, Clone, Default)]
pub struct TieredCacheStats {
    pub l1_hits: u64,
    pub l1_misses: u64,
    pub l2_hits: u64,
    pub l2_misses: u64,
    pub promotions: u64,
}

/// Cascading L1 (memory) / L2 (disk) cache for lowered IR blobs. `T` must
/// be cheap to serialize: this tier is meant for IR-sized payloads, not
/// arbitrarily large graphs.
pub struct TieredCache<T> {
    l1: PriorityCache<T>,
    l2: DiskCache,
    versions: VersionPair,
    stats: parking_lot::Mutex<TieredCacheStats>,
}

impl<T> TieredCache<T>
where
    T: Serialize + DeserializeOwned + Clone,
{
    pub fn open(config: TieredCacheConfig, versions: VersionPair) -> CoreResult<Self> {
        Ok(Self {
            l1: PriorityCache::new(config.l1),
            l2: DiskCache::open(config.l2)?,
            versions,
            stats: parking_lot::Mutex::new(TieredCacheStats::default()),
        })
    }

    fn key_for(&self, content: &[u8], logical_path: &str) -> CacheKey {
        CacheKey::build(content, self.versions, logical_path)
    }

    /// Probe L1; on miss probe L2; on L2 hit, promote into L1 and return.
    pub fn get(&self, logical_path: &str, content: &[u8]) -> CoreResult<Option<Arc<T>>> {
        let key = self.key_for(content, logical_path);

        if let Some(value) = self.l1.get(&key) {
            self.stats.lock().l1_hits += 1;
            return Ok(Some(value));
        }
        self.stats.lock().l1_misses += 1;

        match self.l2.get::<T>(&key)? {
            Some(value) => {
                self.stats.lock().l2_hits += 1;
                let value = Arc::new(value);
                let size = estimate_size(&*value);
                self.l1.insert(key, Arc::clone(&value), size);
                self.stats.lock().promotions += 1;
                Ok(Some(value))
            }
            None => {
                self.stats.lock().l2_misses += 1;
                Ok(None)
            }
        }
    }

    /// Write both tiers. L1 write is unconditional; L2 is best-effort (an
    /// L2 write failure does not fail the overall `set`).
    pub fn set(&self, logical_path: &str, content: &[u8], value: T) -> CoreResult<()> {
        let key = self.key_for(content, logical_path);
        let value = Arc::new(value);
        let size = estimate_size(&*value);
        self.l1.insert(key.clone(), Arc::clone(&value), size);

        if let Err(err) = self.l2.put(&key, &*value, SerializerType::MsgPack) {
            tracing::debug!(error = %err, path = logical_path, "L2 write failed, continuing with L1 only");
        }
        Ok(())
    }

    /// Evict L1 entries whose `logical_path` starts with `repo_id` and
    /// schedule the matching L2 files for removal. L2 eviction is not
    /// required to be immediate by spec, but this tier has no background
    /// queue, so it runs inline.
    pub fn invalidate_repo(&self, repo_id: &str) {
        let repo_id = repo_id.to_string();
        self.l1.invalidate_matching(|key| key.logical_path.starts_with(&repo_id));
        self.l2.invalidate_matching(|key| key.logical_path.starts_with(&repo_id));
    }

    pub fn stats(&self) -> TieredCacheStats {
        self.stats.lock().clone()
    }
}

fn estimate_size<T: Serialize>(value: &T) -> u64 {
    serde_json::to_vec(value).map(|b| b.len() as u64).unwrap_or(0)
}
