//! `ReasoningContext` (C17): the mutable state one pipeline run accumulates
//! across its stages (spec §4.17).

use std::collections::HashMap;

use crate::features::effect_analysis::domain::EffectDiff;
use crate::features::impact::domain::ImpactReport;
use crate::features::risk::domain::RiskReport;
use crate::features::value_flow::VfgStatistics;
use crate::shared::models::{Graph, SymbolId};
use crate::shared::ports::SliceResult;

/// Artifacts produced by `analyze_cross_language_flows` (C18/C9): the
/// cross-service paths found plus the backing VFG's summary statistics.
#[derive(Debug, Clone, Default)]
pub struct VfgArtifacts {
    pub cross_service_flows: Vec<Vec<String>>,
    pub stats: Option<VfgStatistics>,
}

/// Per-run state threaded through `analyze_effects` / `analyze_impact` /
/// `extract_slices` / `simulate_patch` / `analyze_cross_language_flows`.
/// Concurrent stage calls on the same context are disallowed (spec §5); a
/// caller needing concurrency runs independent `ReasoningPipeline`s.
pub struct ReasoningContext {
    pub graph: Graph,
    pub effect_diffs: HashMap<SymbolId, EffectDiff>,
    pub impact_reports: HashMap<SymbolId, ImpactReport>,
    pub slices: HashMap<SymbolId, SliceResult>,
    pub risk_reports: HashMap<String, RiskReport>,
    pub vfg_artifacts: Option<VfgArtifacts>,
    pub warnings: Vec<String>,
}

impl ReasoningContext {
    pub fn new(graph: Graph) -> Self {
        Self {
            graph,
            effect_diffs: HashMap::new(),
            impact_reports: HashMap::new(),
            slices: HashMap::new(),
            risk_reports: HashMap::new(),
            vfg_artifacts: None,
            warnings: Vec::new(),
        }
    }
}
