//! `ReasoningPipeline` (C17): the façade wiring C6-C12/C16/C18/C19 into
//! the staged workflow spec §4.17 describes. Each stage is a method that
//! reads and extends a `ReasoningContext`; nothing here owns state across
//! calls except the injected ports and the VFG taint engine's own cache.

use std::collections::BTreeMap;
use std::time::Duration;

use tracing::warn;

use crate::errors::{CoreError, CoreResult};
use crate::features::effect_analysis::domain::EffectDiff;
use crate::features::effect_analysis::infrastructure::{EffectAnalyzer, EffectDiffer, TextAstView};
use crate::features::impact::domain::ImpactReport;
use crate::features::impact::infrastructure::{ImpactConfig, ImpactPropagator};
use crate::features::incremental_builder::RebuildPlan;
use crate::features::incremental_builder::infrastructure::IncrementalBuilder;
use crate::features::rebuild_cache::RebuildCache;
use crate::features::reasoning_pipeline::context::ReasoningContext;
use crate::features::reasoning_pipeline::cross_language::{analyze_cross_language_flows as compute_cross_language_flows, IrDocument};
use crate::features::reasoning_pipeline::result::ReasoningResult;
use crate::features::risk::domain::RiskReport;
use crate::features::risk::infrastructure::RiskAnalyzer;
use crate::features::simulation::domain::PatchDescriptor;
use crate::features::simulation::infrastructure::GraphSimulator;
use crate::features::value_flow::domain::VfgNodeId;
use crate::features::value_flow::infrastructure::{TaintQueryOutcome, VfgTaintEngine};
use crate::shared::models::{Graph, SymbolId};
use crate::shared::ports::{SlicerPort, SliceResult, VfgExtractorPort};

/// Reasoning Pipeline (C17): stateless across stages except for its
/// injected ports and the taint engine's own load/cache state.
pub struct ReasoningPipeline<'a> {
    slicer: Option<&'a dyn SlicerPort>,
    rebuild_cache: Option<&'a RebuildCache>,
    impact_config: ImpactConfig,
    simulator: GraphSimulator,
    taint_engine: VfgTaintEngine,
}

impl<'a> Default for ReasoningPipeline<'a> {
    fn default() -> Self {
        Self::new()
    }
}

impl<'a> ReasoningPipeline<'a> {
    pub fn new() -> Self {
        Self {
            slicer: None,
            rebuild_cache: None,
            impact_config: ImpactConfig::default(),
            simulator: GraphSimulator::new(),
            taint_engine: VfgTaintEngine::new(),
        }
    }

    pub fn with_slicer(mut self, slicer: &'a dyn SlicerPort) -> Self {
        self.slicer = Some(slicer);
        self
    }

    pub fn with_rebuild_cache(mut self, cache: &'a RebuildCache) -> Self {
        self.rebuild_cache = Some(cache);
        self
    }

    pub fn with_impact_config(mut self, config: ImpactConfig) -> Self {
        self.impact_config = config;
        self
    }

    /// Stage 1 (C6/C7): diffs before/after effect sets for every change
    /// and records them on the context, keyed by symbol id.
    pub fn analyze_effects(&self, ctx: &mut ReasoningContext, changes: &BTreeMap<SymbolId, (String, String)>) -> CoreResult<()> {
        for (id, (before_code, after_code)) in changes {
            let before_key = format!("{id}::before");
            let after_key = format!("{id}::after");
            let view = TextAstView::new().with_body(before_key.clone(), before_code.clone()).with_body(after_key.clone(), after_code.clone());
            let analyzer = EffectAnalyzer::new(&view);
            let before = analyzer.analyze(&before_key)?;
            let after = analyzer.analyze(&after_key)?;
            let diff = EffectDiffer::compare(before, after, id.clone());
            ctx.effect_diffs.insert(id.clone(), diff);
        }
        Ok(())
    }

    /// Stage 2 (C16): folds `changes` into a rebuild plan via the
    /// Incremental Builder, rebuilds through the Rebuild Cache, and
    /// replaces `ctx.graph` in place with the result. Also records the
    /// builder's own impact analysis per changed symbol.
    pub fn rebuild_graph_incrementally(
        &self,
        ctx: &mut ReasoningContext,
        new_graph: &Graph,
        changes: &BTreeMap<SymbolId, (String, String)>,
        repo_id: &str,
        snapshot_id: &str,
        max_files: Option<usize>,
    ) -> CoreResult<RebuildPlan> {
        let builder = IncrementalBuilder::new(&ctx.graph, Some(new_graph), self.slicer, self.rebuild_cache);
        let reports = builder.analyze_changes(changes)?;
        let plan = builder.create_rebuild_plan(changes, &reports, max_files);
        let rebuilt = builder.execute_rebuild_cached(repo_id, snapshot_id, changes, &plan)?;

        ctx.impact_reports.extend(reports);
        ctx.graph = rebuilt;
        Ok(plan)
    }

    /// Stage 3 (C8): propagates impact from `source_id` over the current
    /// context graph, reusing the effect diff recorded for it if present.
    pub fn analyze_impact(&self, ctx: &mut ReasoningContext, source_id: &SymbolId) -> ImpactReport {
        let effect_diff: Option<&EffectDiff> = ctx.effect_diffs.get(source_id);
        let propagator = ImpactPropagator::new(&ctx.graph, self.impact_config);
        let report = propagator.analyze(source_id, effect_diff);
        ctx.impact_reports.insert(source_id.clone(), report.clone());
        report
    }

    /// Stage 4: widens the impacted set for `symbol_id` with a forward
    /// slice, when a slicer is configured. A missing slicer or a slicer
    /// error degrades to an empty slice plus a warning, never a failure
    /// (spec §7, mirroring the Incremental Builder's own fallback).
    pub fn extract_slices(&self, ctx: &mut ReasoningContext, symbol_id: &SymbolId, budget_tokens: usize) -> SliceResult {
        let Some(slicer) = self.slicer else {
            ctx.warnings.push(format!("no slicer configured; skipped slice for {symbol_id}"));
            return SliceResult::default();
        };
        match slicer.forward_slice(symbol_id, budget_tokens) {
            Ok(slice) => {
                ctx.slices.insert(symbol_id.clone(), slice.clone());
                slice
            }
            Err(err) => {
                warn!(symbol_id = %symbol_id, error = %err, "slicer failed; degrading to empty slice");
                ctx.warnings.push(format!("slicer failed for {symbol_id}: {err}"));
                SliceResult::default()
            }
        }
    }

    /// Stage 5 (C11/C12/C13): compiles `patch` onto a throwaway delta
    /// overlay of the current context graph and scores its risk. The
    /// overlay itself is not retained; only the resulting `RiskReport` is.
    pub fn simulate_patch(&self, ctx: &mut ReasoningContext, patch: &PatchDescriptor, validate: bool) -> CoreResult<RiskReport> {
        let effect_diff = ctx.effect_diffs.get(patch.target());
        let delta_graph = self.simulator.simulate_patch(patch, &ctx.graph, validate)?;
        let risk = RiskAnalyzer::analyze(patch, &delta_graph, &ctx.graph, effect_diff)?;
        ctx.risk_reports.insert(patch.id(), risk.clone());
        Ok(risk)
    }

    /// Stage 6 (C9/C18): builds a throwaway VFG from `documents` and
    /// reports every cross-service path found in it.
    pub fn analyze_cross_language_flows(&self, ctx: &mut ReasoningContext, documents: &[IrDocument]) {
        let artifacts = compute_cross_language_flows(documents);
        ctx.vfg_artifacts = Some(artifacts);
    }

    /// Stage 7 (C10): loads the taint engine from `extractor` on first
    /// use (or when forced via `reload`), then traces taint. Falls back
    /// to an error rather than a silent empty result when neither a
    /// loaded engine nor an extractor is available.
    pub fn analyze_taint_fast(
        &self,
        extractor: Option<&dyn VfgExtractorPort>,
        reload: bool,
        sources: &[VfgNodeId],
        sinks: &[VfgNodeId],
        max_paths: Option<usize>,
        timeout: Option<Duration>,
    ) -> CoreResult<TaintQueryOutcome> {
        if reload || !self.taint_engine.is_loaded() {
            let extractor = extractor.ok_or_else(|| {
                CoreError::NotFound("vfg taint engine has no loaded graph and no extractor was supplied".to_string())
            })?;
            self.taint_engine.load(extractor)?;
        }
        Ok(self.taint_engine.trace_taint(sources, sinks, max_paths, timeout))
    }

    /// Every declared source/sink pair in the loaded VFG, or `None` if
    /// nothing has been loaded yet.
    pub fn taint_sources_and_sinks(&self) -> Option<(Vec<VfgNodeId>, Vec<VfgNodeId>)> {
        if !self.taint_engine.is_loaded() {
            return None;
        }
        Some(self.taint_engine.sources_and_sinks())
    }

    /// Stage 8 (C10): translates a changed-files set into VFG node ids
    /// and drops every cached taint path touching them.
    pub fn invalidate_taint_cache(&self, file_paths: &[String]) -> usize {
        let affected = self.taint_engine.node_ids_by_file(file_paths);
        self.taint_engine.invalidate(&affected)
    }

    /// Stage 9: the terminal aggregate for a run.
    pub fn get_result(&self, ctx: &ReasoningContext) -> ReasoningResult {
        ReasoningResult::from_context(ctx)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::boundary_types::{BoundarySpec, ProtocolType};
    use crate::shared::models::{Edge, EdgeKind, Node, SourceLocation, Symbol, SymbolKind};

    fn node(id: &str, file: &str) -> Node {
        Node::from_symbol(Symbol::new(id, format!("mod.{id}"), SymbolKind::Function, SourceLocation::new(file, 1, 0)))
    }

    fn graph_with_call(caller: &str, callee: &str) -> Graph {
        let mut g = Graph::new();
        g.add_node(node(caller, "a.py"));
        g.add_node(node(callee, "b.py"));
        g.add_edge(Edge::new(caller, callee, EdgeKind::Calls));
        g
    }

    // Testable scenario S1: effect diff drives impact propagation, which
    // then drives a non-safe risk score for a patch touching the callee.
    #[test]
    fn effect_diff_then_impact_then_simulate_patch_end_to_end() {
        let base = graph_with_call("caller", "callee");
        let pipeline = ReasoningPipeline::new();
        let mut ctx = ReasoningContext::new(base);

        let mut changes = BTreeMap::new();
        changes.insert("callee".to_string(), ("def f(): pass".to_string(), "def f():\n    GLOBAL = 1".to_string()));
        pipeline.analyze_effects(&mut ctx, &changes).unwrap();
        assert!(ctx.effect_diffs["callee"].is_breaking);

        let report = pipeline.analyze_impact(&mut ctx, &"callee".to_string());
        assert!(!report.impacted.is_empty());

        let patch = PatchDescriptor::DeleteFunction { target: "callee".to_string() };
        let risk = pipeline.simulate_patch(&mut ctx, &patch, true).unwrap();
        assert_ne!(risk.risk_level, crate::features::risk::domain::RiskLevel::Safe);

        let result = pipeline.get_result(&ctx);
        assert!(result.breaking_change_ids.contains(&"callee".to_string()));
    }

    #[test]
    fn missing_slicer_records_a_warning_instead_of_failing() {
        let pipeline = ReasoningPipeline::new();
        let mut ctx = ReasoningContext::new(Graph::new());
        let slice = pipeline.extract_slices(&mut ctx, &"whatever".to_string(), 500);
        assert!(slice.fragments.is_empty());
        assert_eq!(ctx.warnings.len(), 1);
    }

    #[test]
    fn analyze_taint_fast_without_extractor_or_load_errors() {
        let pipeline = ReasoningPipeline::new();
        let result = pipeline.analyze_taint_fast(None, false, &[], &[], None, None);
        assert!(result.is_err());
    }

    #[test]
    fn cross_language_stage_populates_context_artifacts() {
        let pipeline = ReasoningPipeline::new();
        let mut ctx = ReasoningContext::new(Graph::new());
        let spec = BoundarySpec::new(ProtocolType::RestApi, "backend", "/users");
        let fe = IrDocument::new("fe", "fe.py", "python", 1)
            .with_service("frontend")
            .with_boundary(spec, vec![], Some("/users".to_string()));
        let be = IrDocument::new("be", "be.py", "python", 1).with_service("backend");

        pipeline.analyze_cross_language_flows(&mut ctx, &[fe, be]);
        let artifacts = ctx.vfg_artifacts.as_ref().unwrap();
        assert_eq!(artifacts.cross_service_flows.len(), 1);
    }
}
