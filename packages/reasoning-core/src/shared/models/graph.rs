//! The shared code graph data model (spec §3 "Graph").
//!
//! This is the in-memory structural graph that feeds the effect analyzer,
//! impact propagator and boundary matcher. It is deliberately separate from
//! the value-flow graph in `features::value_flow` — nodes here are Symbols
//! and containers, not taint-carrying values.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use super::symbol::{Symbol, SymbolId};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, PartialOrd, Ord)]
pub enum EdgeKind {
    Contains,
    Calls,
    Reads,
    Writes,
    Imports,
    Inherits,
    References,
    Returns,
    Assigns,
    Parameter,
    HttpRequest,
    GrpcCall,
    GraphqlQuery,
    DbRead,
    DbWrite,
    FlowsTo,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, PartialOrd, Ord)]
pub enum Confidence {
    Low,
    Medium,
    High,
}

impl Confidence {
    pub fn as_f64(self) -> f64 {
        match self {
            Confidence::Low => 0.3,
            Confidence::Medium => 0.6,
            Confidence::High => 0.9,
        }
    }
}

/// A node in the structural graph: either a `Symbol` or a bare container
/// (a file or package with no symbol of its own yet).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Node {
    pub id: SymbolId,
    pub symbol: Option<Symbol>,
}

impl Node {
    pub fn from_symbol(symbol: Symbol) -> Self {
        Self {
            id: symbol.id.clone(),
            symbol: Some(symbol),
        }
    }

    pub fn container(id: impl Into<String>) -> Self {
        let id = id.into();
        Self { id, symbol: None }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Edge {
    pub source: SymbolId,
    pub target: SymbolId,
    pub kind: EdgeKind,
    pub confidence: Option<Confidence>,
}

impl Edge {
    pub fn new(source: impl Into<String>, target: impl Into<String>, kind: EdgeKind) -> Self {
        Self {
            source: source.into(),
            target: target.into(),
            kind,
            confidence: None,
        }
    }

    pub fn with_confidence(mut self, confidence: Confidence) -> Self {
        self.confidence = Some(confidence);
        self
    }
}

/// A reference identifying one specific edge for deletion (C11 `Delta`).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EdgeRef {
    pub source: SymbolId,
    pub target: SymbolId,
    pub kind: EdgeKind,
}

impl From<&Edge> for EdgeRef {
    fn from(edge: &Edge) -> Self {
        Self {
            source: edge.source.clone(),
            target: edge.target.clone(),
            kind: edge.kind,
        }
    }
}

/// The structural code graph. Adjacency is indexed both forward and
/// reverse so that impact propagation (which walks reverse-call,
/// reverse-import and reverse-inherits edges) doesn't need a linear scan.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Graph {
    nodes: HashMap<SymbolId, Node>,
    edges: Vec<Edge>,
    /// source id -> indices into `edges`
    forward: HashMap<SymbolId, Vec<usize>>,
    /// target id -> indices into `edges`
    reverse: HashMap<SymbolId, Vec<usize>>,
}

impl Graph {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_node(&mut self, node: Node) {
        self.nodes.insert(node.id.clone(), node);
    }

    pub fn has_node(&self, id: &str) -> bool {
        self.nodes.contains_key(id)
    }

    pub fn node(&self, id: &str) -> Option<&Node> {
        self.nodes.get(id)
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    /// Adds an edge. Per the graph invariant, both endpoints must already
    /// exist; returns `false` without mutating anything if either is
    /// missing, leaving the caller to decide how to surface that.
    pub fn add_edge(&mut self, edge: Edge) -> bool {
        if !self.nodes.contains_key(&edge.source) || !self.nodes.contains_key(&edge.target) {
            return false;
        }
        let idx = self.edges.len();
        self.forward.entry(edge.source.clone()).or_default().push(idx);
        self.reverse.entry(edge.target.clone()).or_default().push(idx);
        self.edges.push(edge);
        true
    }

    pub fn outgoing(&self, id: &str) -> impl Iterator<Item = &Edge> {
        self.forward
            .get(id)
            .into_iter()
            .flatten()
            .map(move |&i| &self.edges[i])
    }

    pub fn incoming(&self, id: &str) -> impl Iterator<Item = &Edge> {
        self.reverse
            .get(id)
            .into_iter()
            .flatten()
            .map(move |&i| &self.edges[i])
    }

    /// Fast pre-filter used by the Impact Propagator (SPEC_FULL §B.5): true
    /// if `id` participates in any edge, forward or reverse, without
    /// walking the adjacency lists themselves.
    pub fn has_any_edge(&self, id: &str) -> bool {
        self.forward.get(id).is_some_and(|v| !v.is_empty())
            || self.reverse.get(id).is_some_and(|v| !v.is_empty())
    }

    pub fn node_ids(&self) -> impl Iterator<Item = &SymbolId> {
        self.nodes.keys()
    }

    pub fn edges(&self) -> impl Iterator<Item = &Edge> {
        self.edges.iter()
    }
}
