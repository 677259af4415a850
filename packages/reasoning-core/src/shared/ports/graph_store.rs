//! Graph Store Port (C19) — narrow read interface over the authoritative
//! graph store. The authoritative store itself (persistent graph DB) is out
//! of scope; this crate only defines and consumes the read contract. The
//! structural queries (`callers_of_file`/`subclasses_of_file`/
//! `importers_of_file`) mirror spec §4.19; `nodes_batch` is a default
//! sequential fallback so a concrete adapter only needs to implement the
//! single-node lookup unless it can do better.

use crate::errors::CoreResult;
use crate::shared::models::{Edge, Node, SymbolId};

/// Read-only view onto the authoritative graph.
pub trait GraphStorePort: Send + Sync {
    fn get_node(&self, id: &SymbolId) -> CoreResult<Option<Node>>;
    fn get_outgoing(&self, id: &SymbolId) -> CoreResult<Vec<Edge>>;
    fn get_incoming(&self, id: &SymbolId) -> CoreResult<Vec<Edge>>;
    fn node_exists(&self, id: &SymbolId) -> CoreResult<bool>;

    /// Batch node fetch; missing ids are simply absent from the adapter's
    /// backing store (spec §6 "missing ids return null").
    fn nodes_batch(&self, ids: &[SymbolId]) -> CoreResult<Vec<Option<Node>>> {
        ids.iter().map(|id| self.get_node(id)).collect()
    }

    fn callers_of_file(&self, file_path: &str) -> CoreResult<Vec<SymbolId>>;
    fn subclasses_of_file(&self, file_path: &str) -> CoreResult<Vec<SymbolId>>;
    fn importers_of_file(&self, file_path: &str) -> CoreResult<Vec<SymbolId>>;
}
