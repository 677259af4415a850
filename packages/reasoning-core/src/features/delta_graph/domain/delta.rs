//! Delta records applied by a `DeltaGraph` overlay (spec §3 "Delta").

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::shared::models::{Edge, EdgeRef, SymbolId};

/// A single ordered mutation against a base graph. Later deltas shadow
/// earlier ones for the same id.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Delta {
    AddNode { id: SymbolId, data: HashMap<String, String> },
    UpdateNode { id: SymbolId, new_data: HashMap<String, String> },
    DeleteNode { id: SymbolId },
    AddEdge { edge: Edge },
    DeleteEdge { edge_ref: EdgeRef },
}

impl Delta {
    /// The node id this delta primarily concerns, if any (used by the
    /// overlay's update/delete indices).
    pub fn node_id(&self) -> Option<&SymbolId> {
        match self {
            Delta::AddNode { id, .. } | Delta::UpdateNode { id, .. } | Delta::DeleteNode { id } => Some(id),
            Delta::AddEdge { .. } | Delta::DeleteEdge { .. } => None,
        }
    }

    /// A delta is malformed if it names no id for node variants, or carries
    /// an edge whose endpoints are empty strings.
    pub fn is_well_formed(&self) -> bool {
        match self {
            Delta::AddNode { id, .. } | Delta::UpdateNode { id, .. } | Delta::DeleteNode { id } => !id.is_empty(),
            Delta::AddEdge { edge } => !edge.source.is_empty() && !edge.target.is_empty(),
            Delta::DeleteEdge { edge_ref } => !edge_ref.source.is_empty() && !edge_ref.target.is_empty(),
        }
    }
}
