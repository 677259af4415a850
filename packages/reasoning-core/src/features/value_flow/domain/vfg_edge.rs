//! VFG edge model (spec §3 "VFG"). Edge kind is drawn from the subset of
//! `EdgeKind` that involves flow; reusing the shared enum keeps the
//! structural graph (C8/C9) and the value-flow graph speaking the same
//! vocabulary at the points where they overlap (HTTP/gRPC/GraphQL/DB edges).

use serde::{Deserialize, Serialize};

use super::vfg_node::VfgNodeId;
use crate::features::boundary_types::BoundarySpec;
use crate::shared::models::{Confidence, EdgeKind};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VfgEdge {
    pub source: VfgNodeId,
    pub target: VfgNodeId,
    pub kind: EdgeKind,
    pub confidence: Option<Confidence>,
    pub boundary_spec: Option<BoundarySpec>,
    /// Source field -> target field, for edges that carry a boundary spec.
    pub field_mapping: Option<Vec<(String, String)>>,
}

impl VfgEdge {
    pub fn new(source: impl Into<String>, target: impl Into<String>, kind: EdgeKind) -> Self {
        Self {
            source: source.into(),
            target: target.into(),
            kind,
            confidence: None,
            boundary_spec: None,
            field_mapping: None,
        }
    }

    pub fn with_boundary(mut self, spec: BoundarySpec) -> Self {
        self.boundary_spec = Some(spec);
        self
    }

    pub fn is_flow_edge(&self) -> bool {
        matches!(
            self.kind,
            EdgeKind::FlowsTo
                | EdgeKind::Assigns
                | EdgeKind::Returns
                | EdgeKind::Parameter
                | EdgeKind::HttpRequest
                | EdgeKind::GrpcCall
                | EdgeKind::GraphqlQuery
                | EdgeKind::DbRead
                | EdgeKind::DbWrite
        )
    }
}
