//! Caching wrapper over a `GraphStorePort` (C19): a 3-tier cache for node
//! dicts (in-memory -> optional remote K/V -> underlying store) plus a
//! TTL'd in-memory cache for relation queries, normalized by query string.
//!
//! One adapter instance is scoped to a single `repo_id` (the underlying
//! `GraphStorePort` contract carries no repo tag per node or per query), so
//! the write-invalidation hooks compare the touched `repo_id` against that
//! scope rather than scanning cache keys for a substring — see DESIGN.md.

use std::time::{Duration, Instant};

use dashmap::DashMap;

use crate::errors::CoreResult;
use crate::shared::models::{Edge, Node, SymbolId};
use crate::shared::ports::GraphStorePort;

const DEFAULT_RELATION_TTL_SECS: u64 = 60;

/// Optional remote key/value tier sitting between the in-memory cache and
/// the underlying store (e.g. a shared Redis-like cache across processes).
pub trait RemoteNodeCachePort: Send + Sync {
    fn get(&self, key: &str) -> CoreResult<Option<Node>>;
    fn put(&self, key: &str, node: &Node) -> CoreResult<()>;
    fn invalidate_all(&self) -> CoreResult<()>;
}

#[derive(Debug, Clone, Default)]
pub struct AdapterCacheStats {
    pub node_memory_hits: u64,
    pub node_remote_hits: u64,
    pub node_store_hits: u64,
    pub node_misses: u64,
    pub relation_hits: u64,
    pub relation_misses: u64,
}

enum RelationQuery<'a> {
    CallersOfFile(&'a str),
    SubclassesOfFile(&'a str),
    ImportersOfFile(&'a str),
}

impl RelationQuery<'_> {
    fn normalized_key(&self) -> String {
        match self {
            RelationQuery::CallersOfFile(f) => format!("callers_of_file::{f}"),
            RelationQuery::SubclassesOfFile(f) => format!("subclasses_of_file::{f}"),
            RelationQuery::ImportersOfFile(f) => format!("importers_of_file::{f}"),
        }
    }
}

/// Caching façade over a `GraphStorePort`, scoped to one `repo_id`.
pub struct CachingGraphStoreAdapter<'a> {
    inner: &'a dyn GraphStorePort,
    remote: Option<&'a dyn RemoteNodeCachePort>,
    repo_id: String,
    relation_ttl: Duration,
    node_cache: DashMap<SymbolId, Node>,
    relation_cache: DashMap<String, (Instant, Vec<SymbolId>)>,
    stats: parking_lot::Mutex<AdapterCacheStats>,
}

impl<'a> CachingGraphStoreAdapter<'a> {
    pub fn new(inner: &'a dyn GraphStorePort, repo_id: impl Into<String>) -> Self {
        Self::with_remote_and_ttl(inner, None, repo_id, Duration::from_secs(DEFAULT_RELATION_TTL_SECS))
    }

    pub fn with_remote_and_ttl(
        inner: &'a dyn GraphStorePort,
        remote: Option<&'a dyn RemoteNodeCachePort>,
        repo_id: impl Into<String>,
        relation_ttl: Duration,
    ) -> Self {
        Self {
            inner,
            remote,
            repo_id: repo_id.into(),
            relation_ttl,
            node_cache: DashMap::new(),
            relation_cache: DashMap::new(),
            stats: parking_lot::Mutex::new(AdapterCacheStats::default()),
        }
    }

    pub fn stats(&self) -> AdapterCacheStats {
        self.stats.lock().clone()
    }

    /// In-memory -> remote -> underlying store, promoting on every hit
    /// below the top tier.
    pub fn get_node(&self, id: &SymbolId) -> CoreResult<Option<Node>> {
        if let Some(node) = self.node_cache.get(id) {
            self.stats.lock().node_memory_hits += 1;
            return Ok(Some(node.clone()));
        }

        if let Some(remote) = self.remote {
            if let Some(node) = remote.get(id)? {
                self.stats.lock().node_remote_hits += 1;
                self.node_cache.insert(id.clone(), node.clone());
                return Ok(Some(node));
            }
        }

        match self.inner.get_node(id)? {
            Some(node) => {
                self.stats.lock().node_store_hits += 1;
                self.node_cache.insert(id.clone(), node.clone());
                if let Some(remote) = self.remote {
                    let _ = remote.put(id, &node);
                }
                Ok(Some(node))
            }
            None => {
                self.stats.lock().node_misses += 1;
                Ok(None)
            }
        }
    }

    pub fn nodes_batch(&self, ids: &[SymbolId]) -> CoreResult<Vec<Option<Node>>> {
        ids.iter().map(|id| self.get_node(id)).collect()
    }

    pub fn get_outgoing(&self, id: &SymbolId) -> CoreResult<Vec<Edge>> {
        self.inner.get_outgoing(id)
    }

    pub fn get_incoming(&self, id: &SymbolId) -> CoreResult<Vec<Edge>> {
        self.inner.get_incoming(id)
    }

    pub fn node_exists(&self, id: &SymbolId) -> CoreResult<bool> {
        if self.node_cache.contains_key(id) {
            return Ok(true);
        }
        self.inner.node_exists(id)
    }

    pub fn callers_of_file(&self, file_path: &str) -> CoreResult<Vec<SymbolId>> {
        self.relation_query(RelationQuery::CallersOfFile(file_path), |f| self.inner.callers_of_file(f))
    }

    pub fn subclasses_of_file(&self, file_path: &str) -> CoreResult<Vec<SymbolId>> {
        self.relation_query(RelationQuery::SubclassesOfFile(file_path), |f| self.inner.subclasses_of_file(f))
    }

    pub fn importers_of_file(&self, file_path: &str) -> CoreResult<Vec<SymbolId>> {
        self.relation_query(RelationQuery::ImportersOfFile(file_path), |f| self.inner.importers_of_file(f))
    }

    fn relation_query(
        &self,
        query: RelationQuery<'_>,
        run: impl FnOnce(&str) -> CoreResult<Vec<SymbolId>>,
    ) -> CoreResult<Vec<SymbolId>> {
        let key = query.normalized_key();
        let now = Instant::now();

        if let Some(entry) = self.relation_cache.get(&key) {
            let (cached_at, ids) = entry.value();
            if now.duration_since(*cached_at) <= self.relation_ttl {
                self.stats.lock().relation_hits += 1;
                return Ok(ids.clone());
            }
        }
        self.stats.lock().relation_misses += 1;

        let file_path = match &query {
            RelationQuery::CallersOfFile(f) | RelationQuery::SubclassesOfFile(f) | RelationQuery::ImportersOfFile(f) => *f,
        };
        let ids = run(file_path)?;
        self.relation_cache.insert(key, (now, ids.clone()));
        Ok(ids)
    }

    /// Write-invalidation hook: a full graph save for `repo_id`. Clears
    /// every cache tier if `repo_id` matches this adapter's scope.
    pub fn save_graph(&self, repo_id: &str) -> CoreResult<()> {
        self.invalidate_scope(repo_id)
    }

    pub fn delete_repo(&self, repo_id: &str) -> CoreResult<()> {
        self.invalidate_scope(repo_id)
    }

    pub fn delete_snapshot(&self, repo_id: &str, _snapshot_id: &str) -> CoreResult<()> {
        self.invalidate_scope(repo_id)
    }

    /// Evicts only the node-cache entries for symbols whose file path is
    /// one of `file_paths`, plus every relation-cache entry that mentions
    /// one of them, leaving unrelated cached nodes in place.
    pub fn delete_nodes_for_deleted_files(&self, repo_id: &str, file_paths: &[String]) -> CoreResult<()> {
        if repo_id != self.repo_id {
            return Ok(());
        }
        self.node_cache.retain(|_, node| !node.symbol.as_ref().is_some_and(|s| file_paths.iter().any(|f| f == &s.location.file_path)));
        self.relation_cache.retain(|key, _| !file_paths.iter().any(|f| key.contains(f.as_str())));
        Ok(())
    }

    fn invalidate_scope(&self, repo_id: &str) -> CoreResult<()> {
        if repo_id != self.repo_id {
            return Ok(());
        }
        self.node_cache.clear();
        self.relation_cache.clear();
        if let Some(remote) = self.remote {
            remote.invalidate_all()?;
        }
        Ok(())
    }
}
