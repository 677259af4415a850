//! Rebuild Cache (C15): memoized Incremental Builder outputs.

pub mod cache_key;
pub mod rebuild_cache;

pub use cache_key::RebuildCacheKey;
pub use rebuild_cache::{RebuildCache, RebuildCacheEntry, RebuildCacheStats};
