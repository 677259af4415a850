//! Impact Propagator (C8): BFS over call/inheritance/import edges with
//! distance-and-confidence-weighted scoring (spec §4.8).

use std::collections::{HashSet, VecDeque};

use crate::features::effect_analysis::domain::{EffectDiff, Severity};
use crate::features::impact::domain::{ImpactLevel, ImpactNode, ImpactPath, ImpactReport, PropagationKind};
use crate::shared::models::{EdgeKind, Graph, SymbolId};

#[derive(Debug, Clone, Copy)]
pub struct ImpactConfig {
    pub max_depth: u32,
    pub min_confidence: f64,
}

impl Default for ImpactConfig {
    fn default() -> Self {
        Self { max_depth: 5, min_confidence: 0.3 }
    }
}

fn edge_factor(kind: EdgeKind) -> Option<f64> {
    match kind {
        EdgeKind::Calls => Some(0.9),
        EdgeKind::Inherits => Some(0.8),
        EdgeKind::Imports => Some(0.8),
        _ => None,
    }
}

fn propagation_kind_of(kind: EdgeKind) -> PropagationKind {
    match kind {
        EdgeKind::Calls => PropagationKind::DirectCall,
        EdgeKind::Inherits => PropagationKind::Inheritance,
        EdgeKind::Imports => PropagationKind::Import,
        _ => PropagationKind::DataFlow,
    }
}

/// Lexicographic order over the three traversed edge kinds, used to break
/// BFS path ties (spec §4.8 "ties broken by lexicographic edge kind
/// order"). `Calls < Imports < Inherits` alphabetically by spec name.
fn edge_rank(kind: EdgeKind) -> u8 {
    match kind {
        EdgeKind::Calls => 0,
        EdgeKind::Imports => 1,
        EdgeKind::Inherits => 2,
        _ => 3,
    }
}

struct Frontier {
    symbol_id: SymbolId,
    distance: u32,
    confidence: f64,
    propagation_kind: PropagationKind,
    path: Vec<SymbolId>,
    path_kinds: Vec<PropagationKind>,
}

pub struct ImpactPropagator<'a> {
    graph: &'a Graph,
    config: ImpactConfig,
}

impl<'a> ImpactPropagator<'a> {
    pub fn new(graph: &'a Graph, config: ImpactConfig) -> Self {
        Self { graph, config }
    }

    /// BFS from `source_id` up reverse-call/inheritance/import edges.
    pub fn analyze(&self, source_id: &str, effect_diff: Option<&EffectDiff>) -> ImpactReport {
        if !self.graph.has_node(source_id) {
            return ImpactReport::empty(source_id, "unknown symbol");
        }

        if !self.graph.has_any_edge(source_id) {
            return ImpactReport {
                source_id: source_id.to_string(),
                impacted: Vec::new(),
                paths: Vec::new(),
                total_impact: ImpactLevel::None,
                note: None,
            };
        }

        let mut visited: HashSet<SymbolId> = HashSet::new();
        visited.insert(source_id.to_string());

        let mut queue = VecDeque::new();
        queue.push_back(Frontier {
            symbol_id: source_id.to_string(),
            distance: 0,
            confidence: 1.0,
            propagation_kind: PropagationKind::DirectCall,
            path: vec![source_id.to_string()],
            path_kinds: Vec::new(),
        });

        let mut impacted = Vec::new();
        let mut paths = Vec::new();

        while let Some(current) = queue.pop_front() {
            if current.distance >= self.config.max_depth {
                continue;
            }

            let mut neighbors: Vec<_> = self
                .graph
                .incoming(&current.symbol_id)
                .filter_map(|edge| edge_factor(edge.kind).map(|factor| (edge.source.clone(), edge.kind, factor)))
                .collect();
            neighbors.sort_by_key(|(_, kind, _)| edge_rank(*kind));

            for (neighbor_id, kind, factor) in neighbors {
                if visited.contains(&neighbor_id) {
                    continue;
                }
                let next_confidence = current.confidence * factor;
                if next_confidence < self.config.min_confidence {
                    continue; // dropped from the frontier
                }

                visited.insert(neighbor_id.clone());
                let distance = current.distance + 1;
                let propagation_kind = propagation_kind_of(kind);

                let mut level = ImpactLevel::from_distance(distance);
                if next_confidence < 0.5 {
                    level = level.step_down(1);
                }
                if let Some(diff) = effect_diff {
                    if diff.severity == Severity::Critical {
                        level = level.step_up(2);
                    } else if diff.is_breaking {
                        level = level.step_up(1);
                    }
                }

                let mut path = current.path.clone();
                path.push(neighbor_id.clone());
                let mut path_kinds = current.path_kinds.clone();
                path_kinds.push(propagation_kind);

                let node = self.graph.node(&neighbor_id);
                impacted.push(ImpactNode {
                    symbol_id: neighbor_id.clone(),
                    kind: node
                        .and_then(|n| n.symbol.as_ref())
                        .map(|s| format!("{:?}", s.kind))
                        .unwrap_or_else(|| "unknown".to_string()),
                    file_path: node
                        .and_then(|n| n.symbol.as_ref())
                        .map(|s| s.location.file_path.clone())
                        .unwrap_or_default(),
                    level,
                    distance,
                    propagation_kind,
                    confidence: next_confidence,
                    metadata: Default::default(),
                });

                paths.push(ImpactPath {
                    source: source_id.to_string(),
                    target: neighbor_id.clone(),
                    intermediate: path[1..path.len().saturating_sub(1)].to_vec(),
                    propagation_kinds: path_kinds.clone(),
                });

                queue.push_back(Frontier {
                    symbol_id: neighbor_id,
                    distance,
                    confidence: next_confidence,
                    propagation_kind,
                    path,
                    path_kinds,
                });
            }
        }

        let total_impact = ImpactReport::aggregate_total(&impacted);
        ImpactReport { source_id: source_id.to_string(), impacted, paths, total_impact, note: None }
    }

    /// Bounded-depth reverse-call closure: every caller transitively
    /// reachable from `symbol_id` (SPEC_FULL §B.3).
    pub fn callers_of(&self, symbol_id: &str, max_depth: u32) -> Vec<SymbolId> {
        self.reverse_closure(symbol_id, max_depth, EdgeKind::Calls)
    }

    /// Bounded-depth reverse-import closure (SPEC_FULL §B.3).
    pub fn importers_of(&self, symbol_id: &str, max_depth: u32) -> Vec<SymbolId> {
        self.reverse_closure(symbol_id, max_depth, EdgeKind::Imports)
    }

    fn reverse_closure(&self, symbol_id: &str, max_depth: u32, kind: EdgeKind) -> Vec<SymbolId> {
        let mut visited = HashSet::new();
        let mut queue = VecDeque::new();
        queue.push_back((symbol_id.to_string(), 0u32));
        visited.insert(symbol_id.to_string());

        let mut result = Vec::new();
        while let Some((current, depth)) = queue.pop_front() {
            if depth >= max_depth {
                continue;
            }
            for edge in self.graph.incoming(&current) {
                if edge.kind != kind || visited.contains(&edge.source) {
                    continue;
                }
                visited.insert(edge.source.clone());
                result.push(edge.source.clone());
                queue.push_back((edge.source.clone(), depth + 1));
            }
        }
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shared::models::{Edge, Node, SourceLocation, Symbol, SymbolKind};

    fn chain_graph() -> Graph {
        let mut g = Graph::new();
        for id in ["f1", "f2", "f3"] {
            g.add_node(Node::from_symbol(Symbol::new(id, id, SymbolKind::Function, SourceLocation::new("a.py", 1, 0))));
        }
        // f1 -> f2 -> f3 (f1 calls f2, f2 calls f3)
        g.add_edge(Edge::new("f1", "f2", EdgeKind::Calls));
        g.add_edge(Edge::new("f2", "f3", EdgeKind::Calls));
        g
    }

    // Testable property #6.
    #[test]
    fn analyze_f3_finds_f2_at_distance_1_and_f1_at_distance_2() {
        let graph = chain_graph();
        let propagator = ImpactPropagator::new(&graph, ImpactConfig { max_depth: 2, min_confidence: 0.0 });
        let report = propagator.analyze("f3", None);

        let f2 = report.impacted.iter().find(|n| n.symbol_id == "f2").unwrap();
        assert_eq!(f2.distance, 1);
        assert_eq!(f2.level, ImpactLevel::High);

        let f1 = report.impacted.iter().find(|n| n.symbol_id == "f1").unwrap();
        assert_eq!(f1.distance, 2);
    }

    #[test]
    fn max_depth_one_excludes_f1() {
        let graph = chain_graph();
        let propagator = ImpactPropagator::new(&graph, ImpactConfig { max_depth: 1, min_confidence: 0.0 });
        let report = propagator.analyze("f3", None);

        assert!(report.impacted.iter().any(|n| n.symbol_id == "f2"));
        assert!(!report.impacted.iter().any(|n| n.symbol_id == "f1"));
    }

    #[test]
    fn unknown_symbol_returns_empty_report_with_note() {
        let graph = chain_graph();
        let propagator = ImpactPropagator::new(&graph, ImpactConfig::default());
        let report = propagator.analyze("ghost", None);
        assert!(report.impacted.is_empty());
        assert_eq!(report.total_impact, ImpactLevel::None);
        assert!(report.note.is_some());
    }

    #[test]
    fn low_confidence_drops_node_from_frontier() {
        let mut graph = Graph::new();
        graph.add_node(Node::from_symbol(Symbol::new("a", "a", SymbolKind::Function, SourceLocation::new("a.py", 1, 0))));
        graph.add_node(Node::from_symbol(Symbol::new("b", "b", SymbolKind::Function, SourceLocation::new("a.py", 1, 0))));
        graph.add_edge(Edge::new("a", "b", EdgeKind::Calls));

        let propagator = ImpactPropagator::new(&graph, ImpactConfig { max_depth: 5, min_confidence: 0.95 });
        let report = propagator.analyze("b", None);
        assert!(report.impacted.is_empty(), "0.9 factor < 0.95 min_confidence must drop the neighbor");
    }

    #[test]
    fn breaking_effect_diff_raises_impact_level() {
        use crate::features::effect_analysis::domain::{EffectSet, EffectType, Provenance};

        let graph = chain_graph();
        let propagator = ImpactPropagator::new(&graph, ImpactConfig { max_depth: 1, min_confidence: 0.0 });

        let before = EffectSet::pure("f3");
        let after = EffectSet::new("f3", [EffectType::GlobalMutation].into_iter().collect(), false, 1.0, Provenance::Static);
        let diff = EffectDiff::compute("f3", before, after);

        let report = propagator.analyze("f3", Some(&diff));
        let f2 = report.impacted.iter().find(|n| n.symbol_id == "f2").unwrap();
        assert_eq!(f2.level, ImpactLevel::Critical, "critical severity raises level by two steps from HIGH, clamped");
    }

    #[test]
    fn callers_of_returns_transitive_callers() {
        let graph = chain_graph();
        let propagator = ImpactPropagator::new(&graph, ImpactConfig::default());
        let callers = propagator.callers_of("f3", 5);
        assert!(callers.contains(&"f2".to_string()));
        assert!(callers.contains(&"f1".to_string()));
    }
}
