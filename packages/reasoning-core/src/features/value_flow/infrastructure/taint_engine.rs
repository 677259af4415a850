//! VFG Taint Engine (C10) — the hottest path in the core (spec §4.10).
//!
//! Loads an adapter-provided VFG into a compact `petgraph` representation
//! indexed by dense integers (spec §9 "IDs are interned to compact
//! integers inside hot components"), and caches `trace_taint` results in an
//! LRU keyed by the sorted `(sources, sinks)` pair. All methods are
//! blocking and take the internal lock only around the LRU and graph
//! structures (spec §5); there is no cooperative yielding mid-BFS.

use std::collections::{HashMap, HashSet, VecDeque};
use std::time::{Duration, Instant};

use lru::LruCache;
use parking_lot::Mutex;
use petgraph::graph::{DiGraph, NodeIndex};
use petgraph::Direction;

use crate::errors::CoreResult;
use crate::shared::ports::VfgExtractorPort;

use super::domain::{VfgNode, VfgNodeId};

const DEFAULT_MAX_PATHS: usize = 100;
const DEFAULT_TIMEOUT_SECS: u64 = 10;
const DEFAULT_LRU_CAPACITY: usize = 512;

#[derive(Debug, Clone)]
struct TaintCacheKey {
    sources: Vec<VfgNodeId>,
    sinks: Vec<VfgNodeId>,
}

impl TaintCacheKey {
    fn new(mut sources: Vec<VfgNodeId>, mut sinks: Vec<VfgNodeId>) -> Self {
        sources.sort();
        sinks.sort();
        Self { sources, sinks }
    }
}

impl PartialEq for TaintCacheKey {
    fn eq(&self, other: &Self) -> bool {
        self.sources == other.sources && self.sinks == other.sinks
    }
}
impl Eq for TaintCacheKey {}
impl std::hash::Hash for TaintCacheKey {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.sources.hash(state);
        self.sinks.hash(state);
    }
}

#[derive(Debug, Clone, Default)]
pub struct TaintEngineStats {
    pub num_nodes: usize,
    pub num_edges: usize,
    pub cache_size: usize,
    pub cache_hits: u64,
    pub cache_misses: u64,
}

impl TaintEngineStats {
    pub fn cache_hit_rate(&self) -> f64 {
        let total = self.cache_hits + self.cache_misses;
        if total == 0 {
            0.0
        } else {
            self.cache_hits as f64 / total as f64
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct TaintQueryOutcome {
    pub paths: Vec<Vec<VfgNodeId>>,
    pub timed_out: bool,
}

struct Loaded {
    graph: DiGraph<VfgNode, ()>,
    index_of: HashMap<VfgNodeId, NodeIndex>,
}

/// Owns a read-only internal graph representation and an LRU of taint
/// paths; no outside mutation (spec §3 ownership rules).
pub struct VfgTaintEngine {
    loaded: Mutex<Option<Loaded>>,
    cache: Mutex<LruCache<TaintCacheKey, Vec<Vec<VfgNodeId>>>>,
    cache_hits: Mutex<u64>,
    cache_misses: Mutex<u64>,
}

impl VfgTaintEngine {
    pub fn new() -> Self {
        Self {
            loaded: Mutex::new(None),
            cache: Mutex::new(LruCache::new(std::num::NonZeroUsize::new(DEFAULT_LRU_CAPACITY).unwrap())),
            cache_hits: Mutex::new(0),
            cache_misses: Mutex::new(0),
        }
    }

    /// Build the internal graph from an adapter-provided extractor. Clears
    /// the LRU and resets counters (spec §4.10 step 1).
    pub fn load(&self, extractor: &dyn VfgExtractorPort) -> CoreResult<()> {
        let nodes = extractor.nodes()?;
        let edges = extractor.edges()?;

        let mut graph = DiGraph::new();
        let mut index_of = HashMap::new();
        for node in nodes {
            let id = node.node_id.clone();
            let idx = graph.add_node(node);
            index_of.insert(id, idx);
        }

        for edge in edges {
            // "Edges referencing unknown ids are logged and dropped on load" (spec §6).
            match (index_of.get(&edge.source), index_of.get(&edge.target)) {
                (Some(&s), Some(&t)) => {
                    graph.add_edge(s, t, ());
                }
                _ => {
                    tracing::debug!(source = %edge.source, target = %edge.target, "dropping VFG edge with unknown endpoint");
                }
            }
        }

        *self.loaded.lock() = Some(Loaded { graph, index_of });
        self.cache.lock().clear();
        *self.cache_hits.lock() = 0;
        *self.cache_misses.lock() = 0;
        Ok(())
    }

    /// Hash `(sorted_sources, sorted_sinks)`; on hit, move-to-front and
    /// return the cached list; on miss, run BFS reachability per
    /// source×sink pair and cache the result (spec §4.10 step 2).
    pub fn trace_taint(
        &self,
        sources: &[VfgNodeId],
        sinks: &[VfgNodeId],
        max_paths: Option<usize>,
        timeout: Option<Duration>,
    ) -> TaintQueryOutcome {
        let key = TaintCacheKey::new(sources.to_vec(), sinks.to_vec());

        if let Some(cached) = self.cache.lock().get(&key) {
            *self.cache_hits.lock() += 1;
            return TaintQueryOutcome { paths: cached.clone(), timed_out: false };
        }
        *self.cache_misses.lock() += 1;

        let loaded = self.loaded.lock();
        let Some(loaded) = loaded.as_ref() else {
            return TaintQueryOutcome::default();
        };

        let max_paths = max_paths.unwrap_or(DEFAULT_MAX_PATHS);
        let timeout = timeout.unwrap_or(Duration::from_secs(DEFAULT_TIMEOUT_SECS));
        let deadline = Instant::now() + timeout;

        // (source_index, sink_index) lexicographic order, then by path length (spec §4.10 ordering).
        let mut sorted_sources = sources.to_vec();
        sorted_sources.sort();
        let mut sorted_sinks = sinks.to_vec();
        sorted_sinks.sort();

        let mut paths = Vec::new();
        let mut timed_out = false;

        'outer: for source in &sorted_sources {
            let Some(&source_idx) = loaded.index_of.get(source) else { continue };
            for sink in &sorted_sinks {
                if Instant::now() >= deadline {
                    timed_out = true;
                    break 'outer;
                }
                if paths.len() >= max_paths {
                    break 'outer;
                }
                let Some(&sink_idx) = loaded.index_of.get(sink) else { continue };
                if source_idx == sink_idx {
                    continue;
                }
                if let Some(path_indices) = shortest_path(&loaded.graph, source_idx, sink_idx) {
                    let path_ids: Vec<VfgNodeId> = path_indices
                        .into_iter()
                        .map(|idx| loaded.graph[idx].node_id.clone())
                        .collect();
                    paths.push(path_ids);
                }
            }
        }

        drop(loaded);
        self.cache.lock().put(key, paths.clone());
        TaintQueryOutcome { paths, timed_out }
    }

    /// `trace_taint` without path construction.
    pub fn fast_reachability(&self, source: &VfgNodeId, sink: &VfgNodeId) -> bool {
        let loaded = self.loaded.lock();
        let Some(loaded) = loaded.as_ref() else { return false };
        let (Some(&s), Some(&t)) = (loaded.index_of.get(source), loaded.index_of.get(sink)) else {
            return false;
        };
        shortest_path(&loaded.graph, s, t).is_some()
    }

    /// Discard every cached path that intersects `affected_nodes`.
    pub fn invalidate(&self, affected_nodes: &[VfgNodeId]) -> usize {
        let affected: HashSet<&VfgNodeId> = affected_nodes.iter().collect();
        let mut cache = self.cache.lock();
        let stale: Vec<TaintCacheKey> = cache
            .iter()
            .filter(|(_, paths)| paths.iter().any(|p| p.iter().any(|id| affected.contains(id))))
            .map(|(key, _)| key.clone())
            .collect();
        let removed = stale.len();
        for key in stale {
            cache.pop(&key);
        }
        removed
    }

    /// Node ids whose `file_path` is one of `file_paths`, used by the
    /// Reasoning Pipeline (C17) to translate a changed-files set into the
    /// VFG node ids `invalidate` expects.
    pub fn node_ids_by_file(&self, file_paths: &[String]) -> Vec<VfgNodeId> {
        let loaded = self.loaded.lock();
        let Some(loaded) = loaded.as_ref() else { return Vec::new() };
        loaded
            .graph
            .node_weights()
            .filter(|n| file_paths.iter().any(|f| f == &n.file_path))
            .map(|n| n.node_id.clone())
            .collect()
    }

    /// Every loaded node marked as a source or a sink, read directly off
    /// the payload table built at `load` time (spec §6 `sources_and_sinks`).
    pub fn sources_and_sinks(&self) -> (Vec<VfgNodeId>, Vec<VfgNodeId>) {
        let loaded = self.loaded.lock();
        let Some(loaded) = loaded.as_ref() else { return (Vec::new(), Vec::new()) };
        let sources = loaded.graph.node_weights().filter(|n| n.is_source).map(|n| n.node_id.clone()).collect();
        let sinks = loaded.graph.node_weights().filter(|n| n.is_sink).map(|n| n.node_id.clone()).collect();
        (sources, sinks)
    }

    /// True once `load` has successfully built an internal graph.
    pub fn is_loaded(&self) -> bool {
        self.loaded.lock().is_some()
    }

    pub fn stats(&self) -> TaintEngineStats {
        let loaded = self.loaded.lock();
        let (num_nodes, num_edges) = loaded
            .as_ref()
            .map(|l| (l.graph.node_count(), l.graph.edge_count()))
            .unwrap_or((0, 0));
        TaintEngineStats {
            num_nodes,
            num_edges,
            cache_size: self.cache.lock().len(),
            cache_hits: *self.cache_hits.lock(),
            cache_misses: *self.cache_misses.lock(),
        }
    }
}

impl Default for VfgTaintEngine {
    fn default() -> Self {
        Self::new()
    }
}

/// BFS shortest path with uniform edge weights.
fn shortest_path(graph: &DiGraph<VfgNode, ()>, source: NodeIndex, sink: NodeIndex) -> Option<Vec<NodeIndex>> {
    let mut visited = HashSet::new();
    let mut parent: HashMap<NodeIndex, NodeIndex> = HashMap::new();
    let mut queue = VecDeque::new();

    visited.insert(source);
    queue.push_back(source);

    while let Some(current) = queue.pop_front() {
        if current == sink {
            let mut path = vec![sink];
            let mut node = sink;
            while node != source {
                node = parent[&node];
                path.push(node);
            }
            path.reverse();
            return Some(path);
        }
        for neighbor in graph.neighbors_directed(current, Direction::Outgoing) {
            if visited.insert(neighbor) {
                parent.insert(neighbor, current);
                queue.push_back(neighbor);
            }
        }
    }
    None
}
