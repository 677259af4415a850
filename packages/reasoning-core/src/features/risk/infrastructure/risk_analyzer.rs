//! Risk Analyzer (C13): classifies a patch's blast radius against the
//! base graph's call/inheritance edges.

use std::collections::HashSet;

use crate::errors::{CoreError, CoreResult};
use crate::features::boundary_types::domain::ValueType;
use crate::features::boundary_types::infrastructure::from_python_annotation;
use crate::features::delta_graph::DeltaGraph;
use crate::features::effect_analysis::domain::EffectDiff;
use crate::features::risk::domain::{BreakingChange, RiskLevel, RiskReport};
use crate::features::simulation::domain::PatchDescriptor;
use crate::shared::models::{EdgeKind, Graph, SymbolId};

pub struct RiskAnalyzer;

impl RiskAnalyzer {
    /// Every direct caller of `target` in `base_graph` (reverse `CALLS`
    /// edges).
    fn callers_of(base_graph: &Graph, target: &str) -> Vec<SymbolId> {
        base_graph.incoming(target).filter(|e| e.kind == EdgeKind::Calls).map(|e| e.source.clone()).collect()
    }

    /// Every direct subclass of `target` (reverse `INHERITS` edges).
    fn subclasses_of(base_graph: &Graph, target: &str) -> Vec<SymbolId> {
        base_graph.incoming(target).filter(|e| e.kind == EdgeKind::Inherits).map(|e| e.source.clone()).collect()
    }

    fn references_of(base_graph: &Graph, target: &str) -> Vec<SymbolId> {
        base_graph
            .incoming(target)
            .filter(|e| matches!(e.kind, EdgeKind::Calls | EdgeKind::References | EdgeKind::Reads | EdgeKind::Writes))
            .map(|e| e.source.clone())
            .collect()
    }

    /// The target's return type as currently understood: an overlay
    /// update shadows the base signature (earlier layers in an Overlay
    /// Manager stack may have already retyped it).
    fn return_type_of(delta_graph: &DeltaGraph<'_>, base_graph: &Graph, target: &str) -> Option<ValueType> {
        if let Some(view) = delta_graph.get_node(target) {
            if let Some(overridden) = view.fields.get("return_type") {
                return Some(from_python_annotation(overridden));
            }
        }
        base_graph
            .node(target)
            .and_then(|n| n.symbol.as_ref())
            .and_then(|s| s.signature.as_ref())
            .and_then(|sig| sig.return_type.as_deref())
            .map(from_python_annotation)
    }

    /// `analyze(patch, delta_graph, base_graph) -> RiskReport` (spec §4.13).
    pub fn analyze(
        patch: &PatchDescriptor,
        delta_graph: &DeltaGraph<'_>,
        base_graph: &Graph,
        effect_diff: Option<&EffectDiff>,
    ) -> CoreResult<RiskReport> {
        let target = patch.target();
        let patch_id = patch.id();

        let callers = Self::callers_of(base_graph, target);
        let references = Self::references_of(base_graph, target);
        let descendants = Self::subclasses_of(base_graph, target);

        let mut affected: HashSet<SymbolId> = references.iter().cloned().collect();
        affected.extend(descendants.iter().cloned());

        let (level, breaking) = match patch {
            PatchDescriptor::DeleteFunction { .. } => {
                if !references.is_empty() {
                    (
                        RiskLevel::Breaking,
                        vec![BreakingChange { symbol_id: target.clone(), reason: "function deleted with active callers".into() }],
                    )
                } else {
                    (RiskLevel::Safe, Vec::new())
                }
            }
            PatchDescriptor::RenameSymbol { .. } => {
                if !callers.is_empty() {
                    (RiskLevel::Medium, Vec::new())
                } else {
                    (RiskLevel::Low, Vec::new())
                }
            }
            PatchDescriptor::AddFunction { .. } => (RiskLevel::Safe, Vec::new()),
            PatchDescriptor::ModifyBody { .. } => {
                if effect_diff.map(|d| d.is_breaking).unwrap_or(false) {
                    (
                        RiskLevel::High,
                        vec![BreakingChange { symbol_id: target.clone(), reason: "effect diff crosses the breaking line".into() }],
                    )
                } else {
                    (RiskLevel::Low, Vec::new())
                }
            }
            PatchDescriptor::AddParameter { params, .. } => {
                let all_have_default = !params.is_empty() && params.iter().all(|p| p.has_default);
                if all_have_default {
                    (RiskLevel::Low, Vec::new())
                } else if !callers.is_empty() {
                    (
                        RiskLevel::High,
                        vec![BreakingChange { symbol_id: target.clone(), reason: "parameter added without a default".into() }],
                    )
                } else {
                    (RiskLevel::Low, Vec::new())
                }
            }
            PatchDescriptor::RemoveParameter { .. } => {
                if !callers.is_empty() {
                    (
                        RiskLevel::High,
                        vec![BreakingChange { symbol_id: target.clone(), reason: "parameter removed with active callers".into() }],
                    )
                } else {
                    (RiskLevel::Low, Vec::new())
                }
            }
            PatchDescriptor::ChangeReturnType { new_type, .. } => {
                let old_type = Self::return_type_of(delta_graph, base_graph, target);
                let new_type = from_python_annotation(new_type);
                let structurally_incompatible = match &old_type {
                    Some(old) => !old.is_compatible_with(&new_type).compatible,
                    None => false,
                };
                if structurally_incompatible {
                    (
                        RiskLevel::High,
                        vec![BreakingChange { symbol_id: target.clone(), reason: "new return type is structurally incompatible".into() }],
                    )
                } else {
                    (RiskLevel::Medium, Vec::new())
                }
            }
            PatchDescriptor::Refactor { .. } => {
                return Err(CoreError::RiskAnalysisError("REFACTOR cannot be risk-analyzed without a compiled delta".into()));
            }
        };

        let caller_count = callers.len();
        Ok(RiskReport::new(patch_id, level, caller_count, affected.into_iter().collect(), breaking))
    }
}
