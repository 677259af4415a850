//! Tunables for the cache tiers, mirroring the teacher's per-component
//! `*Config` structs (`AdaptiveCacheConfig`, `DiskCacheConfig`).

use std::path::PathBuf;
use std::time::Duration;

#[derive(Debug, Clone)]
pub struct PriorityCacheConfig {
    pub max_entries: usize,
    pub max_bytes: u64,
    /// Decay constant in the priority formula, per second of age.
    pub decay: f64,
}

impl Default for PriorityCacheConfig {
    fn default() -> Self {
        Self {
            max_entries: 10_000,
            max_bytes: 256 * 1024 * 1024,
            decay: 0.0001,
        }
    }
}

#[derive(Debug, Clone)]
pub struct DiskCacheConfig {
    pub cache_dir: PathBuf,
    pub fsync: bool,
    pub advisory_lock: bool,
}

impl Default for DiskCacheConfig {
    fn default() -> Self {
        Self {
            cache_dir: PathBuf::from(".reasoning-cache"),
            fsync: true,
            advisory_lock: false,
        }
    }
}

#[derive(Debug, Clone)]
pub struct TieredCacheConfig {
    pub l1: PriorityCacheConfig,
    pub l2: DiskCacheConfig,
}

impl Default for TieredCacheConfig {
    fn default() -> Self {
        Self {
            l1: PriorityCacheConfig::default(),
            l2: DiskCacheConfig::default(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct RebuildCacheConfig {
    pub max_entries: usize,
    pub ttl: Duration,
}

impl Default for RebuildCacheConfig {
    fn default() -> Self {
        Self {
            max_entries: 100,
            ttl: Duration::from_secs(300),
        }
    }
}
