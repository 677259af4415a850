//! `analyze_cross_language_flows` (C17, via the VFG builder and C18):
//! turns adapter-mined `BoundarySpec`s into scored `FLOWS_TO`-family edges
//! and reports the resulting cross-service paths (SPEC_FULL §B.6).

use crate::features::boundary_types::{BoundaryMatcher, BoundarySpec, ProtocolType};
use crate::features::reasoning_pipeline::context::VfgArtifacts;
use crate::features::value_flow::domain::{VfgEdge, VfgNode};
use crate::features::value_flow::infrastructure::VfgCore;
use crate::shared::models::{EdgeKind, SymbolId};

/// Below this confidence score, a candidate caller/callee match is
/// discarded rather than turned into an edge (mirrors the Risk Analyzer's
/// `min_confidence`-style thresholds elsewhere in the core).
const MIN_MATCH_SCORE: f64 = 0.3;

/// One symbol's cross-language surface, as mined by the (out-of-scope)
/// ingestion layer: its own VFG identity plus, if it makes a cross-service
/// call, the `BoundarySpec` and request shape it was observed using.
#[derive(Debug, Clone)]
pub struct IrDocument {
    pub symbol_id: SymbolId,
    pub file_path: String,
    pub language: String,
    pub line: u32,
    pub service_context: Option<String>,
    pub caller_fields: Vec<String>,
    pub caller_endpoint: Option<String>,
    pub boundary: Option<BoundarySpec>,
}

impl IrDocument {
    pub fn new(symbol_id: impl Into<String>, file_path: impl Into<String>, language: impl Into<String>, line: u32) -> Self {
        Self {
            symbol_id: symbol_id.into(),
            file_path: file_path.into(),
            language: language.into(),
            line,
            service_context: None,
            caller_fields: Vec::new(),
            caller_endpoint: None,
            boundary: None,
        }
    }

    pub fn with_service(mut self, service: impl Into<String>) -> Self {
        self.service_context = Some(service.into());
        self
    }

    pub fn with_boundary(mut self, spec: BoundarySpec, caller_fields: Vec<String>, caller_endpoint: Option<String>) -> Self {
        self.boundary = Some(spec);
        self.caller_fields = caller_fields;
        self.caller_endpoint = caller_endpoint;
        self
    }
}

fn protocol_edge_kind(protocol: ProtocolType) -> EdgeKind {
    match protocol {
        ProtocolType::RestApi => EdgeKind::HttpRequest,
        ProtocolType::Grpc => EdgeKind::GrpcCall,
        ProtocolType::GraphQl => EdgeKind::GraphqlQuery,
    }
}

/// Builds a throwaway VFG from `documents`, wiring a boundary edge from
/// each caller with a mined `BoundarySpec` to every candidate callee in
/// the matching service whose match score clears `MIN_MATCH_SCORE`, then
/// reports every path `VfgCore::find_cross_service_flows` finds in it.
pub fn analyze_cross_language_flows(documents: &[IrDocument]) -> VfgArtifacts {
    let mut vfg = VfgCore::new();

    for doc in documents {
        let mut node = VfgNode::new(doc.symbol_id.clone(), doc.symbol_id.clone(), doc.file_path.clone(), doc.line, doc.language.clone());
        if let Some(service) = &doc.service_context {
            node = node.with_service_context(service.clone());
        }
        vfg.add_node(node);
    }

    for caller in documents.iter().filter(|d| d.boundary.is_some()) {
        let spec = caller.boundary.as_ref().expect("filtered above");
        for callee in documents {
            if callee.symbol_id == caller.symbol_id {
                continue;
            }
            let Some(callee_service) = &callee.service_context else { continue };
            if callee_service != &spec.service_name {
                continue;
            }
            let score = BoundaryMatcher::score_match(spec, &caller.caller_fields, caller.caller_endpoint.as_deref());
            if score < MIN_MATCH_SCORE {
                continue;
            }
            let edge = VfgEdge::new(caller.symbol_id.clone(), callee.symbol_id.clone(), protocol_edge_kind(spec.protocol))
                .with_boundary(spec.clone());
            // Both endpoints were just added above; this can only fail if
            // a document set carries duplicate symbol ids, which the
            // adapter contract disallows.
            let _ = vfg.add_edge(edge);
        }
    }

    let cross_service_flows = vfg.find_cross_service_flows();
    let stats = vfg.statistics();
    VfgArtifacts { cross_service_flows, stats: Some(stats) }
}
