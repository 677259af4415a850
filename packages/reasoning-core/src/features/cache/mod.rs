//! Tiered IR cache: content fingerprinting, atomic disk I/O, a priority
//! memory tier and a versioned disk tier behind one facade (C1-C5).

pub mod atomic_io;
pub mod config;
pub mod l1_priority_cache;
pub mod l2_disk_cache;
pub mod tiered_cache;

pub use config::{DiskCacheConfig, PriorityCacheConfig, RebuildCacheConfig, TieredCacheConfig};
pub use l1_priority_cache::{EstimateSize, PriorityCache, PriorityCacheStats};
pub use l2_disk_cache::{DiskCache, SerializerType};
pub use tiered_cache::{TieredCache, TieredCacheStats};
