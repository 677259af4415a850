//! Incremental Builder (C16): turns a change set into an impact map, a
//! rebuild strategy, and (for partial/minimal strategies) a rebuilt graph
//! isolated from the old one.

use std::collections::{BTreeMap, HashMap, HashSet};

use crate::errors::{CoreError, CoreResult};
use crate::features::effect_analysis::infrastructure::{EffectAnalyzer, EffectDiffer, TextAstView};
use crate::features::impact::domain::{ImpactLevel, ImpactNode, ImpactReport, PropagationKind};
use crate::features::impact::infrastructure::{ImpactConfig, ImpactPropagator};
use crate::features::incremental_builder::domain::{RebuildCostEstimate, RebuildPlan, RebuildStrategy};
use crate::features::rebuild_cache::{RebuildCache, RebuildCacheKey};
use crate::shared::models::{Graph, SymbolId};
use crate::shared::ports::SlicerPort;

const SLICE_BUDGET_TOKENS: usize = 2000;
const SLICE_CONFIDENCE_THRESHOLD: f64 = 0.5;
const MINIMAL_FILE_THRESHOLD: usize = 5;
const PARTIAL_FILE_THRESHOLD: usize = 20;

pub struct IncrementalBuilder<'a> {
    old_graph: &'a Graph,
    new_graph: Option<&'a Graph>,
    slicer: Option<&'a dyn SlicerPort>,
    cache: Option<&'a RebuildCache>,
}

impl<'a> IncrementalBuilder<'a> {
    pub fn new(
        old_graph: &'a Graph,
        new_graph: Option<&'a Graph>,
        slicer: Option<&'a dyn SlicerPort>,
        cache: Option<&'a RebuildCache>,
    ) -> Self {
        Self { old_graph, new_graph, slicer, cache }
    }

    /// 1. Diffs effects per change (C7). 2. For breaking changes,
    /// propagates impact (C8). 3. Widens high-confidence slices into the
    /// impacted set when a slicer is available; a slicer failure is never
    /// fatal (spec §7).
    pub fn analyze_changes(&self, changes: &BTreeMap<SymbolId, (String, String)>) -> CoreResult<HashMap<SymbolId, ImpactReport>> {
        let mut reports = HashMap::new();

        for (id, (before_code, after_code)) in changes {
            let before_key = format!("{id}::before");
            let after_key = format!("{id}::after");
            let view = TextAstView::new().with_body(before_key.clone(), before_code.clone()).with_body(after_key.clone(), after_code.clone());
            let analyzer = EffectAnalyzer::new(&view);
            let before = analyzer.analyze(&before_key)?;
            let after = analyzer.analyze(&after_key)?;
            let diff = EffectDiffer::compare(before, after, id.clone());

            let mut report = if diff.is_breaking {
                let propagator = ImpactPropagator::new(self.old_graph, ImpactConfig::default());
                propagator.analyze(id, Some(&diff))
            } else {
                ImpactReport::empty(id.clone(), "change is not breaking; no propagation performed")
            };

            if let Some(slicer) = self.slicer {
                if let Ok(slice) = slicer.forward_slice(id, SLICE_BUDGET_TOKENS) {
                    for fragment in slice.fragments {
                        if fragment.confidence < SLICE_CONFIDENCE_THRESHOLD {
                            continue;
                        }
                        if report.impacted.iter().any(|n| n.symbol_id == fragment.symbol_id) {
                            continue;
                        }
                        let file_path = self
                            .old_graph
                            .node(&fragment.symbol_id)
                            .and_then(|n| n.symbol.as_ref())
                            .map(|s| s.location.file_path.clone())
                            .unwrap_or_default();
                        report.impacted.push(ImpactNode {
                            symbol_id: fragment.symbol_id,
                            kind: "slice".to_string(),
                            file_path,
                            level: ImpactLevel::Low,
                            distance: 0,
                            propagation_kind: PropagationKind::DataFlow,
                            confidence: fragment.confidence,
                            metadata: HashMap::new(),
                        });
                    }
                    report.total_impact = ImpactReport::aggregate_total(&report.impacted);
                }
                // slicer error: fall back to the graph-only propagation already computed above.
            }

            reports.insert(id.clone(), report);
        }

        Ok(reports)
    }

    /// Selects `minimal`/`partial`/`full` from the union of changed and
    /// impacted files (spec §4.16, testable property #12).
    pub fn create_rebuild_plan(
        &self,
        changes: &BTreeMap<SymbolId, (String, String)>,
        impacted: &HashMap<SymbolId, ImpactReport>,
        max_files: Option<usize>,
    ) -> RebuildPlan {
        let mut changed_files: HashSet<String> = HashSet::new();
        let mut symbols_to_rebuild: HashSet<SymbolId> = HashSet::new();

        for id in changes.keys() {
            symbols_to_rebuild.insert(id.clone());
            if let Some(file_path) = self.old_graph.node(id).and_then(|n| n.symbol.as_ref()).map(|s| s.location.file_path.clone()) {
                changed_files.insert(file_path);
            }
        }
        for report in impacted.values() {
            for node in &report.impacted {
                symbols_to_rebuild.insert(node.symbol_id.clone());
                if !node.file_path.is_empty() {
                    changed_files.insert(node.file_path.clone());
                }
            }
        }

        let strategy = if max_files.is_some_and(|max| changed_files.len() > max) {
            RebuildStrategy::Full
        } else if changed_files.len() <= MINIMAL_FILE_THRESHOLD {
            RebuildStrategy::Minimal
        } else if changed_files.len() <= PARTIAL_FILE_THRESHOLD {
            RebuildStrategy::Partial
        } else {
            RebuildStrategy::Full
        };

        RebuildPlan { strategy, symbols_to_rebuild: symbols_to_rebuild.into_iter().collect(), changed_files }
    }

    /// Cheap affected-count heuristic (SPEC_FULL §B.4), not a real
    /// build-time predictor.
    pub fn estimate_rebuild_cost(&self, plan: &RebuildPlan) -> RebuildCostEstimate {
        RebuildCostEstimate::for_file_count(plan.changed_files.len())
    }

    /// `full`: returns the supplied new graph verbatim. `partial`/
    /// `minimal`: deep-copies the old graph, overwrites the rebuilt
    /// symbols from the new graph, and re-points their incident edges.
    /// The old graph is never mutated.
    pub fn execute_rebuild(&self, plan: &RebuildPlan) -> CoreResult<Graph> {
        match plan.strategy {
            RebuildStrategy::Full => {
                self.new_graph.cloned().ok_or_else(|| CoreError::NotFound("full rebuild requires a new graph".into()))
            }
            RebuildStrategy::Partial | RebuildStrategy::Minimal => {
                let new_graph = self.new_graph.ok_or_else(|| CoreError::NotFound("partial rebuild requires a new graph".into()))?;
                let affected: HashSet<&SymbolId> = plan.symbols_to_rebuild.iter().collect();

                let mut rebuilt = Graph::new();
                for id in self.old_graph.node_ids() {
                    if affected.contains(id) {
                        continue;
                    }
                    if let Some(node) = self.old_graph.node(id) {
                        rebuilt.add_node(node.clone());
                    }
                }
                for id in &plan.symbols_to_rebuild {
                    if let Some(node) = new_graph.node(id) {
                        rebuilt.add_node(node.clone());
                    }
                }

                for edge in self.old_graph.edges() {
                    if !affected.contains(&edge.source) && !affected.contains(&edge.target) {
                        rebuilt.add_edge(edge.clone());
                    }
                }
                for edge in new_graph.edges() {
                    if affected.contains(&edge.source) || affected.contains(&edge.target) {
                        rebuilt.add_edge(edge.clone());
                    }
                }

                Ok(rebuilt)
            }
        }
    }

    /// `execute_rebuild` memoized in the Rebuild Cache, keyed as in §4.15.
    pub fn execute_rebuild_cached(
        &self,
        repo_id: &str,
        snapshot_id: &str,
        changes: &BTreeMap<SymbolId, (String, String)>,
        plan: &RebuildPlan,
    ) -> CoreResult<Graph> {
        let key = RebuildCacheKey::build(repo_id, snapshot_id, changes);
        if let Some(cache) = self.cache {
            if let Some(entry) = cache.get(&key) {
                return Ok(entry.updated_graph);
            }
        }

        let graph = self.execute_rebuild(plan)?;

        if let Some(cache) = self.cache {
            let mut meta = HashMap::new();
            meta.insert("strategy".to_string(), format!("{:?}", plan.strategy));
            let mut stats = HashMap::new();
            stats.insert("symbols_rebuilt".to_string(), plan.symbols_to_rebuild.len().to_string());
            stats.insert("changed_files".to_string(), plan.changed_files.len().to_string());
            cache.put(key, graph.clone(), meta, stats);
        }

        Ok(graph)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shared::models::{Edge, EdgeKind, Node, SourceLocation, Symbol, SymbolKind};

    fn node(id: &str, file: &str) -> Node {
        Node::from_symbol(Symbol::new(id, format!("mod.{id}"), SymbolKind::Function, SourceLocation::new(file, 1, 0)))
    }

    fn small_graph() -> Graph {
        let mut g = Graph::new();
        g.add_node(node("f1", "a.py"));
        g.add_node(node("f2", "b.py"));
        g.add_edge(Edge::new("f1", "f2", EdgeKind::Calls));
        g
    }

    // Scenario S1.
    #[test]
    fn pure_to_io_change_produces_minimal_or_partial_plan() {
        let old = small_graph();
        let builder = IncrementalBuilder::new(&old, None, None, None);

        let mut changes = BTreeMap::new();
        changes.insert("f1".to_string(), ("def f1():\n    return 1".to_string(), "def f1():\n    print(1)\n    return 1".to_string()));

        let impacted = builder.analyze_changes(&changes).unwrap();
        let plan = builder.create_rebuild_plan(&changes, &impacted, None);
        assert!(matches!(plan.strategy, RebuildStrategy::Minimal | RebuildStrategy::Partial));
        assert!(plan.changed_files.contains("a.py"));
    }

    // Testable property #12.
    #[test]
    fn file_count_drives_strategy_thresholds() {
        let mut old = Graph::new();
        let mut changes = BTreeMap::new();
        for i in 0..3 {
            let id = format!("s{i}");
            old.add_node(node(&id, &format!("f{i}.py")));
            changes.insert(id, ("a".to_string(), "b".to_string()));
        }
        let builder = IncrementalBuilder::new(&old, None, None, None);
        let plan = builder.create_rebuild_plan(&changes, &HashMap::new(), None);
        assert_eq!(plan.strategy, RebuildStrategy::Minimal);

        let mut old12 = Graph::new();
        let mut changes12 = BTreeMap::new();
        for i in 0..12 {
            let id = format!("s{i}");
            old12.add_node(node(&id, &format!("f{i}.py")));
            changes12.insert(id, ("a".to_string(), "b".to_string()));
        }
        let builder12 = IncrementalBuilder::new(&old12, None, None, None);
        let plan12 = builder12.create_rebuild_plan(&changes12, &HashMap::new(), None);
        assert_eq!(plan12.strategy, RebuildStrategy::Partial);

        let mut old50 = Graph::new();
        let mut changes50 = BTreeMap::new();
        for i in 0..50 {
            let id = format!("s{i}");
            old50.add_node(node(&id, &format!("f{i}.py")));
            changes50.insert(id, ("a".to_string(), "b".to_string()));
        }
        let builder50 = IncrementalBuilder::new(&old50, None, None, None);
        let plan50 = builder50.create_rebuild_plan(&changes50, &HashMap::new(), None);
        assert_eq!(plan50.strategy, RebuildStrategy::Full);
    }

    // Testable property #14.
    #[test]
    fn partial_rebuild_is_isolated_from_old_graph() {
        let old = small_graph();
        let mut new_graph = small_graph();
        new_graph.add_node(node("f1", "a.py")); // stand-in for a retyped f1

        let builder = IncrementalBuilder::new(&old, Some(&new_graph), None, None);
        let plan = RebuildPlan {
            strategy: RebuildStrategy::Partial,
            symbols_to_rebuild: vec!["f1".to_string()],
            changed_files: ["a.py".to_string()].into_iter().collect(),
        };

        let mut rebuilt = builder.execute_rebuild(&plan).unwrap();
        assert_eq!(rebuilt.node_count(), old.node_count());

        rebuilt.add_node(node("f3", "c.py"));
        assert_eq!(old.node_count(), 2, "mutating the rebuilt graph must not affect the old graph");
    }

    #[test]
    fn full_rebuild_requires_new_graph() {
        let old = small_graph();
        let builder = IncrementalBuilder::new(&old, None, None, None);
        let plan = RebuildPlan { strategy: RebuildStrategy::Full, symbols_to_rebuild: vec![], changed_files: HashSet::new() };
        assert!(builder.execute_rebuild(&plan).is_err());
    }
}
