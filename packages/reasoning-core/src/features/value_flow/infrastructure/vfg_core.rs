//! Value Flow Graph Core (C9): the general-purpose VFG value backing ad hoc
//! path enumeration and statistics. The hot, cache-backed reachability path
//! lives in `taint_engine` (C10) — this module is the uncached general
//! graph the taint engine loads its compact view from.

use std::collections::{HashMap, HashSet, VecDeque};

use crate::errors::{CoreError, CoreResult};
use crate::shared::models::EdgeKind;

use super::domain::{VfgEdge, VfgNode, VfgNodeId};

const DEFAULT_PATH_CAP: usize = 50;

/// A general directed value-flow graph. Invariant (spec §3): every edge's
/// endpoints are nodes present in this same loaded view.
#[derive(Debug, Default)]
pub struct VfgCore {
    nodes: HashMap<VfgNodeId, VfgNode>,
    edges: Vec<VfgEdge>,
    forward: HashMap<VfgNodeId, Vec<usize>>,
    reverse: HashMap<VfgNodeId, Vec<usize>>,
}

impl VfgCore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_node(&mut self, node: VfgNode) {
        self.nodes.insert(node.node_id.clone(), node);
    }

    /// Returns an error if either endpoint is missing, preserving the
    /// graph invariant instead of silently dropping the edge.
    pub fn add_edge(&mut self, edge: VfgEdge) -> CoreResult<()> {
        if !self.nodes.contains_key(&edge.source) {
            return Err(CoreError::NotFound(format!("vfg node {}", edge.source)));
        }
        if !self.nodes.contains_key(&edge.target) {
            return Err(CoreError::NotFound(format!("vfg node {}", edge.target)));
        }
        let idx = self.edges.len();
        self.forward.entry(edge.source.clone()).or_default().push(idx);
        self.reverse.entry(edge.target.clone()).or_default().push(idx);
        self.edges.push(edge);
        Ok(())
    }

    pub fn node(&self, id: &str) -> Option<&VfgNode> {
        self.nodes.get(id)
    }

    pub fn outgoing(&self, id: &str) -> impl Iterator<Item = &VfgEdge> {
        self.forward.get(id).into_iter().flatten().map(move |&i| &self.edges[i])
    }

    pub fn incoming(&self, id: &str) -> impl Iterator<Item = &VfgEdge> {
        self.reverse.get(id).into_iter().flatten().map(move |&i| &self.edges[i])
    }

    pub fn node_ids(&self) -> impl Iterator<Item = &VfgNodeId> {
        self.nodes.keys()
    }

    /// Enumerate simple paths forward from `id`, bounded by `max_depth`
    /// hops and capped at `DEFAULT_PATH_CAP` results.
    pub fn trace_forward(&self, id: &str, max_depth: usize) -> Vec<Vec<VfgNodeId>> {
        let mut results = Vec::new();
        let mut visiting = HashSet::new();
        let mut path = vec![id.to_string()];
        visiting.insert(id.to_string());
        self.walk_forward(id, max_depth, &mut path, &mut visiting, &mut results);
        results
    }

    fn walk_forward(
        &self,
        current: &str,
        remaining_depth: usize,
        path: &mut Vec<VfgNodeId>,
        visiting: &mut HashSet<VfgNodeId>,
        results: &mut Vec<Vec<VfgNodeId>>,
    ) {
        if results.len() >= DEFAULT_PATH_CAP {
            return;
        }
        if remaining_depth == 0 {
            return;
        }

        for edge in self.outgoing(current) {
            if results.len() >= DEFAULT_PATH_CAP {
                return;
            }
            if visiting.contains(&edge.target) {
                continue; // avoid infinite loops on cycles
            }
            path.push(edge.target.clone());
            results.push(path.clone());
            visiting.insert(edge.target.clone());
            self.walk_forward(&edge.target, remaining_depth - 1, path, visiting, results);
            visiting.remove(&edge.target);
            path.pop();
        }
    }

    /// Enumerate simple paths backward (via reverse edges) from `id`.
    pub fn trace_backward(&self, id: &str, max_depth: usize) -> Vec<Vec<VfgNodeId>> {
        let mut results = Vec::new();
        let mut visiting = HashSet::new();
        let mut path = vec![id.to_string()];
        visiting.insert(id.to_string());
        self.walk_backward(id, max_depth, &mut path, &mut visiting, &mut results);
        results
    }

    fn walk_backward(
        &self,
        current: &str,
        remaining_depth: usize,
        path: &mut Vec<VfgNodeId>,
        visiting: &mut HashSet<VfgNodeId>,
        results: &mut Vec<Vec<VfgNodeId>>,
    ) {
        if results.len() >= DEFAULT_PATH_CAP || remaining_depth == 0 {
            return;
        }

        for edge in self.incoming(current) {
            if results.len() >= DEFAULT_PATH_CAP {
                return;
            }
            if visiting.contains(&edge.source) {
                continue;
            }
            path.push(edge.source.clone());
            results.push(path.clone());
            visiting.insert(edge.source.clone());
            self.walk_backward(&edge.source, remaining_depth - 1, path, visiting, results);
            visiting.remove(&edge.source);
            path.pop();
        }
    }

    /// Enumerate paths from (source-marked ∪ label-bearing nodes) to
    /// sink-marked nodes, capped at `DEFAULT_PATH_CAP`.
    pub fn trace_taint(&self, taint_label: Option<&str>, source_id: Option<&str>, sink_id: Option<&str>) -> Vec<Vec<VfgNodeId>> {
        let sources: Vec<VfgNodeId> = match source_id {
            Some(id) => vec![id.to_string()],
            None => self
                .nodes
                .values()
                .filter(|n| n.is_source || taint_label.is_some_and(|l| n.has_taint_label(l)))
                .map(|n| n.node_id.clone())
                .collect(),
        };
        let sinks: HashSet<VfgNodeId> = match sink_id {
            Some(id) => [id.to_string()].into_iter().collect(),
            None => self.nodes.values().filter(|n| n.is_sink).map(|n| n.node_id.clone()).collect(),
        };

        let mut results = Vec::new();
        for source in &sources {
            if results.len() >= DEFAULT_PATH_CAP {
                break;
            }
            if let Some(path) = self.shortest_path_to_any(source, &sinks) {
                results.push(path);
            }
        }
        results
    }

    fn shortest_path_to_any(&self, source: &str, sinks: &HashSet<VfgNodeId>) -> Option<Vec<VfgNodeId>> {
        let mut queue = VecDeque::new();
        let mut visited = HashSet::new();
        let mut parent: HashMap<VfgNodeId, VfgNodeId> = HashMap::new();

        queue.push_back(source.to_string());
        visited.insert(source.to_string());

        while let Some(current) = queue.pop_front() {
            if sinks.contains(&current) && current != source {
                return Some(reconstruct_path(&parent, source, &current));
            }
            for edge in self.outgoing(&current) {
                if visited.insert(edge.target.clone()) {
                    parent.insert(edge.target.clone(), current.clone());
                    queue.push_back(edge.target.clone());
                }
            }
        }
        None
    }

    /// Paths that traverse at least one edge whose endpoints have
    /// different `service_context` (spec §4.9 `find_cross_service_flows`).
    pub fn find_cross_service_flows(&self) -> Vec<Vec<VfgNodeId>> {
        let mut results = Vec::new();
        for edge in &self.edges {
            let Some(source_node) = self.nodes.get(&edge.source) else { continue };
            let Some(target_node) = self.nodes.get(&edge.target) else { continue };
            match (&source_node.service_context, &target_node.service_context) {
                (Some(a), Some(b)) if a != b => {
                    results.push(vec![edge.source.clone(), edge.target.clone()]);
                }
                _ => {}
            }
            if results.len() >= DEFAULT_PATH_CAP {
                break;
            }
        }
        results
    }

    /// Human-readable dump of a path, purely for debugging (spec §4.9).
    pub fn visualize_path(&self, path: &[VfgNodeId]) -> String {
        path.iter()
            .map(|id| {
                self.nodes
                    .get(id)
                    .map(|n| format!("{}@{}:{}", n.symbol_name, n.file_path, n.line))
                    .unwrap_or_else(|| id.clone())
            })
            .collect::<Vec<_>>()
            .join(" -> ")
    }

    pub fn statistics(&self) -> VfgStatistics {
        let mut languages: HashSet<String> = HashSet::new();
        let mut boundaries_count = 0usize;
        for node in self.nodes.values() {
            languages.insert(node.language.clone());
        }
        for edge in &self.edges {
            if edge.boundary_spec.is_some() {
                boundaries_count += 1;
            }
        }
        VfgStatistics {
            total_nodes: self.nodes.len(),
            total_edges: self.edges.len(),
            languages: languages.into_iter().collect(),
            boundaries_count,
        }
    }
}

fn reconstruct_path(parent: &HashMap<VfgNodeId, VfgNodeId>, source: &str, target: &str) -> Vec<VfgNodeId> {
    let mut path = vec![target.to_string()];
    let mut current = target.to_string();
    while current != source {
        let prev = parent.get(&current).expect("BFS parent chain must reach source");
        path.push(prev.clone());
        current = prev.clone();
    }
    path.reverse();
    path
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VfgStatistics {
    pub total_nodes: usize,
    pub total_edges: usize,
    pub languages: Vec<String>,
    pub boundaries_count: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn node(id: &str) -> VfgNode {
        VfgNode::new(id, id, "a.py", 1, "python")
    }

    fn build_chain() -> VfgCore {
        let mut vfg = VfgCore::new();
        vfg.add_node(node("source").as_source().with_taint_label("PII"));
        vfg.add_node(node("middle"));
        vfg.add_node(node("sink").as_sink());
        vfg.add_edge(VfgEdge::new("source", "middle", EdgeKind::Assigns)).unwrap();
        vfg.add_edge(VfgEdge::new("middle", "sink", EdgeKind::DbWrite)).unwrap();
        vfg
    }

    #[test]
    fn add_edge_rejects_missing_endpoint() {
        let mut vfg = VfgCore::new();
        vfg.add_node(node("a"));
        assert!(vfg.add_edge(VfgEdge::new("a", "missing", EdgeKind::FlowsTo)).is_err());
    }

    // Testable scenario S5.
    #[test]
    fn trace_taint_by_label_finds_source_to_sink_path() {
        let vfg = build_chain();
        let paths = vfg.trace_taint(Some("PII"), None, None);
        assert_eq!(paths.len(), 1);
        assert_eq!(paths[0], vec!["source".to_string(), "middle".to_string(), "sink".to_string()]);
    }

    #[test]
    fn trace_forward_respects_depth_bound() {
        let vfg = build_chain();
        let paths = vfg.trace_forward("source", 1);
        assert!(paths.iter().all(|p| p.len() <= 2));
        assert!(paths.iter().any(|p| p.last().unwrap() == "middle"));
    }

    // Testable scenario S6.
    #[test]
    fn find_cross_service_flows_detects_differing_contexts() {
        let mut vfg = VfgCore::new();
        vfg.add_node(node("fe").with_service_context("frontend"));
        vfg.add_node(node("be").with_service_context("backend"));
        vfg.add_edge(VfgEdge::new("fe", "be", EdgeKind::HttpRequest)).unwrap();

        let flows = vfg.find_cross_service_flows();
        assert_eq!(flows.len(), 1);
        assert_eq!(flows[0], vec!["fe".to_string(), "be".to_string()]);
    }

    #[test]
    fn statistics_counts_nodes_edges_languages_and_boundaries() {
        let vfg = build_chain();
        let stats = vfg.statistics();
        assert_eq!(stats.total_nodes, 3);
        assert_eq!(stats.total_edges, 2);
        assert_eq!(stats.languages, vec!["python".to_string()]);
        assert_eq!(stats.boundaries_count, 0);
    }

    #[test]
    fn visualize_path_includes_symbol_and_location() {
        let vfg = build_chain();
        let rendered = vfg.visualize_path(&["source".to_string(), "sink".to_string()]);
        assert!(rendered.contains("source@a.py:1"));
        assert!(rendered.contains("->"));
    }
}
