//! Delta Graph (C11): a copy-on-write overlay over a shared immutable base
//! graph. The base is never mutated by any overlay method.

use std::collections::{HashMap, HashSet};

use crate::errors::{CoreError, CoreResult};
use crate::features::delta_graph::domain::Delta;
use crate::shared::models::{EdgeRef, Graph, SymbolId};

/// A materialized view of one node's data as seen through the overlay:
/// either untouched base data, or base data patched/replaced by deltas.
#[derive(Debug, Clone)]
pub struct NodeView {
    pub id: SymbolId,
    pub fields: HashMap<String, String>,
}

pub struct DeltaGraph<'a> {
    base: &'a Graph,
    deltas: Vec<Delta>,
    /// Index of the latest AddNode/UpdateNode delta touching each id.
    latest_update: HashMap<SymbolId, usize>,
    deleted: HashSet<SymbolId>,
    added_edges: Vec<crate::shared::models::Edge>,
    deleted_edges: HashSet<EdgeRef>,
}

impl<'a> DeltaGraph<'a> {
    pub fn new(base: &'a Graph) -> Self {
        Self {
            base,
            deltas: Vec::new(),
            latest_update: HashMap::new(),
            deleted: HashSet::new(),
            added_edges: Vec::new(),
            deleted_edges: HashSet::new(),
        }
    }

    pub fn delta_count(&self) -> usize {
        self.deltas.len()
    }

    pub fn base(&self) -> &'a Graph {
        self.base
    }

    /// Appends `delta`, updating the node-latest index; a DELETE flips the
    /// deleted bit and clears any update entry for that id.
    pub fn apply_delta(&mut self, delta: Delta) -> CoreResult<()> {
        if !delta.is_well_formed() {
            return Err(CoreError::SimulationError("malformed delta".into()));
        }

        let idx = self.deltas.len();
        match &delta {
            Delta::AddNode { id, .. } | Delta::UpdateNode { id, .. } => {
                self.deleted.remove(id);
                self.latest_update.insert(id.clone(), idx);
            }
            Delta::DeleteNode { id } => {
                self.deleted.insert(id.clone());
                self.latest_update.remove(id);
            }
            Delta::AddEdge { edge } => {
                self.deleted_edges.remove(&EdgeRef::from(edge));
                self.added_edges.push(edge.clone());
            }
            Delta::DeleteEdge { edge_ref } => {
                self.deleted_edges.insert(edge_ref.clone());
                self.added_edges.retain(|e| EdgeRef::from(e) != *edge_ref);
            }
        }
        self.deltas.push(delta);
        Ok(())
    }

    /// Checks the deleted set, then the latest-update index, then the base.
    pub fn get_node(&self, id: &str) -> Option<NodeView> {
        if self.deleted.contains(id) {
            return None;
        }
        if let Some(&idx) = self.latest_update.get(id) {
            return match &self.deltas[idx] {
                Delta::AddNode { id, data } => Some(NodeView { id: id.clone(), fields: data.clone() }),
                Delta::UpdateNode { id, new_data } => {
                    let mut fields = self.base_fields(id);
                    fields.extend(new_data.clone());
                    Some(NodeView { id: id.clone(), fields })
                }
                _ => unreachable!("latest_update only indexes AddNode/UpdateNode"),
            };
        }
        self.base.node(id).map(|node| NodeView { id: node.id.clone(), fields: self.base_fields(id) })
    }

    fn base_fields(&self, id: &str) -> HashMap<String, String> {
        let mut fields = HashMap::new();
        if let Some(node) = self.base.node(id) {
            if let Some(symbol) = &node.symbol {
                fields.insert("name".to_string(), symbol.fqn.clone());
                fields.insert("file_path".to_string(), symbol.location.file_path.clone());
            }
        }
        fields
    }

    /// Merged view without materializing a new base: every base id not
    /// deleted, plus every id added purely by a delta.
    pub fn get_all_nodes(&self) -> Vec<NodeView> {
        let mut ids: HashSet<SymbolId> = self.base.node_ids().cloned().collect();
        ids.extend(self.latest_update.keys().cloned());
        ids.retain(|id| !self.deleted.contains(id));

        let mut out: Vec<NodeView> = ids.iter().filter_map(|id| self.get_node(id)).collect();
        out.sort_by(|a, b| a.id.cmp(&b.id));
        out
    }

    /// `true` iff `id` appears in the latest-update index or the deleted set.
    pub fn is_modified(&self, id: &str) -> bool {
        self.latest_update.contains_key(id) || self.deleted.contains(id)
    }

    /// Outgoing edges from `id` through the overlay: base edges minus
    /// deletions, plus delta-added edges, excluding edges touching a
    /// deleted node.
    pub fn outgoing(&self, id: &str) -> Vec<crate::shared::models::Edge> {
        if self.deleted.contains(id) {
            return Vec::new();
        }
        let mut out: Vec<_> = self
            .base
            .outgoing(id)
            .filter(|e| !self.deleted.contains(&e.target) && !self.deleted_edges.contains(&EdgeRef::from(*e)))
            .cloned()
            .collect();
        out.extend(self.added_edges.iter().filter(|e| e.source == id).cloned());
        out
    }

    /// Pops the last `n` deltas and rebuilds the indices from scratch.
    pub fn rollback(&mut self, n: usize) -> CoreResult<()> {
        if n > self.deltas.len() {
            return Err(CoreError::SimulationError(format!(
                "cannot rollback {n} deltas, only {} applied",
                self.deltas.len()
            )));
        }
        let keep = self.deltas.len() - n;
        let remaining: Vec<Delta> = self.deltas.drain(..keep).collect();

        self.deltas.clear();
        self.latest_update.clear();
        self.deleted.clear();
        self.added_edges.clear();
        self.deleted_edges.clear();

        for delta in remaining {
            self.apply_delta(delta)?;
        }
        Ok(())
    }

    /// Estimate: sum of delta sizes plus index sizes.
    pub fn memory_overhead(&self) -> usize {
        let delta_size: usize = self
            .deltas
            .iter()
            .map(|d| match d {
                Delta::AddNode { id, data } | Delta::UpdateNode { id, new_data: data } => {
                    id.len() + data.iter().map(|(k, v)| k.len() + v.len()).sum::<usize>()
                }
                Delta::DeleteNode { id } => id.len(),
                Delta::AddEdge { edge } => edge.source.len() + edge.target.len(),
                Delta::DeleteEdge { edge_ref } => edge_ref.source.len() + edge_ref.target.len(),
            })
            .sum();
        let index_size = self.latest_update.len() * std::mem::size_of::<(SymbolId, usize)>()
            + self.deleted.len() * std::mem::size_of::<SymbolId>();
        delta_size + index_size
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shared::models::{Edge, Node, SourceLocation, Symbol, SymbolKind};

    fn base_graph() -> Graph {
        let mut g = Graph::new();
        g.add_node(Node::from_symbol(Symbol::new("a", "mod.a", SymbolKind::Function, SourceLocation::new("a.py", 1, 0))));
        g.add_node(Node::from_symbol(Symbol::new("b", "mod.b", SymbolKind::Function, SourceLocation::new("a.py", 5, 0))));
        g.add_edge(Edge::new("a", "b", EdgeKind::Calls));
        g
    }

    // Testable property #8.
    #[test]
    fn rollback_to_zero_matches_base_view() {
        let base = base_graph();
        let mut dg = DeltaGraph::new(&base);
        dg.apply_delta(Delta::UpdateNode { id: "a".into(), new_data: [("name".to_string(), "renamed".to_string())].into() }).unwrap();
        dg.apply_delta(Delta::DeleteNode { id: "b".into() }).unwrap();
        assert_eq!(dg.delta_count(), 2);

        dg.rollback(2).unwrap();
        assert_eq!(dg.delta_count(), 0);

        let view_a = dg.get_node("a").unwrap();
        assert_eq!(view_a.fields.get("name"), Some(&"mod.a".to_string()));
        assert!(dg.get_node("b").is_some());
        assert!(!dg.is_modified("a"));
        assert!(!dg.is_modified("b"));

        // base untouched
        assert!(base.has_node("a"));
        assert!(base.has_node("b"));
        assert_eq!(base.node_count(), 2);
    }

    #[test]
    fn get_node_checks_deleted_then_update_then_base() {
        let base = base_graph();
        let mut dg = DeltaGraph::new(&base);
        dg.apply_delta(Delta::UpdateNode { id: "a".into(), new_data: [("name".to_string(), "new_a".to_string())].into() }).unwrap();
        assert_eq!(dg.get_node("a").unwrap().fields.get("name"), Some(&"new_a".to_string()));

        dg.apply_delta(Delta::DeleteNode { id: "a".into() }).unwrap();
        assert!(dg.get_node("a").is_none());
        assert!(dg.is_modified("a"));
    }

    #[test]
    fn rollback_beyond_delta_count_fails() {
        let base = base_graph();
        let mut dg = DeltaGraph::new(&base);
        dg.apply_delta(Delta::DeleteNode { id: "a".into() }).unwrap();
        let err = dg.rollback(5);
        assert!(err.is_err());
    }

    #[test]
    fn get_all_nodes_includes_added_and_excludes_deleted() {
        let base = base_graph();
        let mut dg = DeltaGraph::new(&base);
        dg.apply_delta(Delta::AddNode { id: "c".into(), data: Default::default() }).unwrap();
        dg.apply_delta(Delta::DeleteNode { id: "b".into() }).unwrap();

        let ids: Vec<_> = dg.get_all_nodes().into_iter().map(|v| v.id).collect();
        assert!(ids.contains(&"a".to_string()));
        assert!(ids.contains(&"c".to_string()));
        assert!(!ids.contains(&"b".to_string()));
    }

    #[test]
    fn malformed_delta_fails_fast() {
        let base = base_graph();
        let mut dg = DeltaGraph::new(&base);
        let err = dg.apply_delta(Delta::AddNode { id: "".into(), data: Default::default() });
        assert!(err.is_err());
    }
}
