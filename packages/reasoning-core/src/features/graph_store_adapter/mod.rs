//! Graph Store Adapter View (C19): a caching wrapper in front of the
//! injected `GraphStorePort`, consumed by C10 and C17 (spec §4.19).

pub mod caching_adapter;

pub use caching_adapter::{AdapterCacheStats, CachingGraphStoreAdapter, RemoteNodeCachePort};
