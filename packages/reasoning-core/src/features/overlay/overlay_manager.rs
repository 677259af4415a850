//! Overlay Manager (C14): a bounded LIFO stack of speculative patch
//! layers, each carrying its own risk verdict. Not thread-safe by itself;
//! each caller owns one instance or guards it externally (spec §5).

use crate::errors::{CoreError, CoreResult};
use crate::features::delta_graph::DeltaGraph;
use crate::features::risk::{RiskAnalyzer, RiskLevel, RiskReport};
use crate::features::simulation::{GraphSimulator, PatchDescriptor};
use crate::shared::models::Graph;

const DEFAULT_MAX_STACK_DEPTH: usize = 100;

#[derive(Debug, Clone, Default)]
pub struct OverlayStats {
    pub applied: usize,
    pub rejected: usize,
    pub rollbacks: usize,
}

struct Layer {
    patch: PatchDescriptor,
    delta_count: usize,
    risk: RiskReport,
}

pub struct OverlayManager<'a> {
    base: &'a Graph,
    simulator: GraphSimulator,
    current: DeltaGraph<'a>,
    layers: Vec<Layer>,
    max_stack_depth: usize,
    auto_reject_breaking: bool,
    stats: OverlayStats,
}

impl<'a> OverlayManager<'a> {
    pub fn new(base: &'a Graph) -> Self {
        Self::with_config(base, DEFAULT_MAX_STACK_DEPTH, false)
    }

    pub fn with_config(base: &'a Graph, max_stack_depth: usize, auto_reject_breaking: bool) -> Self {
        Self {
            base,
            simulator: GraphSimulator::new(),
            current: DeltaGraph::new(base),
            layers: Vec::new(),
            max_stack_depth,
            auto_reject_breaking,
            stats: OverlayStats::default(),
        }
    }

    /// Simulates `patch` on the current state, analyzes risk, and pushes
    /// on success. Rejects without pushing if `auto_reject_breaking` is
    /// set and the risk is BREAKING, unless `force` overrides it.
    pub fn apply_patch(&mut self, patch: PatchDescriptor, force: bool) -> CoreResult<RiskReport> {
        if self.layers.len() >= self.max_stack_depth {
            self.stats.rejected += 1;
            return Err(CoreError::SimulationError("overlay stack depth exceeded".into()));
        }

        let deltas = self.simulator.plan(&patch, self.base, true)?;

        // Risk is assessed against a throwaway overlay carrying only this
        // patch's own deltas, per §4.13's `analyze(patch, delta_graph,
        // base_graph)` contract.
        let mut probe = DeltaGraph::new(self.base);
        for delta in deltas.clone() {
            probe.apply_delta(delta)?;
        }
        let risk = RiskAnalyzer::analyze(&patch, &probe, self.base, None)?;

        if !force && self.auto_reject_breaking && risk.risk_level == RiskLevel::Breaking {
            self.stats.rejected += 1;
            return Err(CoreError::InvalidPatch("patch rejected: risk level BREAKING".into()));
        }

        for delta in deltas {
            self.current.apply_delta(delta)?;
        }
        let delta_count = self.current.delta_count() - self.layers.iter().map(|l| l.delta_count).sum::<usize>();
        self.layers.push(Layer { patch, delta_count, risk: risk.clone() });
        self.stats.applied += 1;
        Ok(risk)
    }

    /// Applies each patch in order, stopping early when `stop_on_breaking`
    /// and a patch is rejected or comes back BREAKING.
    pub fn apply_patches(&mut self, patches: Vec<PatchDescriptor>, stop_on_breaking: bool) -> Vec<CoreResult<RiskReport>> {
        let mut results = Vec::with_capacity(patches.len());
        for patch in patches {
            let result = self.apply_patch(patch, false);
            let should_stop = stop_on_breaking
                && match &result {
                    Ok(r) => r.risk_level == RiskLevel::Breaking,
                    Err(_) => true,
                };
            results.push(result);
            if should_stop {
                break;
            }
        }
        results
    }

    /// Pops the last `n` layers and rebuilds the cumulative overlay.
    pub fn rollback(&mut self, n: usize) -> CoreResult<()> {
        if n > self.layers.len() {
            return Err(CoreError::SimulationError(format!("cannot rollback {n} layers, only {} applied", self.layers.len())));
        }
        let popped: usize = self.layers.split_off(self.layers.len() - n).iter().map(|l| l.delta_count).sum();
        self.current.rollback(popped)?;
        self.stats.rollbacks += 1;
        Ok(())
    }

    /// Pops layers until the top's risk is SAFE or the stack is empty.
    pub fn rollback_to_safe(&mut self) -> CoreResult<()> {
        while let Some(top) = self.layers.last() {
            if top.risk.risk_level == RiskLevel::Safe {
                break;
            }
            self.rollback(1)?;
        }
        Ok(())
    }

    pub fn current_graph(&self) -> &DeltaGraph<'a> {
        &self.current
    }

    pub fn stats(&self) -> OverlayStats {
        self.stats.clone()
    }

    pub fn depth(&self) -> usize {
        self.layers.len()
    }
}
