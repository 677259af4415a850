//! `ReasoningResult` (C17 §4.17): the terminal aggregate a pipeline run
//! hands back to a presenter surface.

use crate::features::effect_analysis::domain::EffectType;
use crate::features::impact::domain::{ImpactLevel, ImpactNode, ImpactReport};
use crate::features::reasoning_pipeline::context::ReasoningContext;
use crate::features::risk::domain::RiskLevel;
use crate::shared::models::SymbolId;

const MIN_RECOMMENDATIONS: usize = 3;
const MAX_RECOMMENDATIONS: usize = 6;

/// Minimum count of combined breaking signals (breaking effect diffs plus
/// BREAKING-level risk reports) that forces `total_risk` up to `BREAKING`
/// regardless of the per-report maximum (spec §4.17, testable property #7).
const BREAKING_BUMP_THRESHOLD: usize = 3;

#[derive(Debug, Clone)]
pub struct ReasoningResult {
    pub summary: String,
    pub total_risk: RiskLevel,
    pub total_impact: ImpactLevel,
    pub breaking_change_ids: Vec<SymbolId>,
    pub impacted_symbol_ids: Vec<SymbolId>,
    pub recommended_actions: Vec<String>,
    pub warnings: Vec<String>,
}

impl ReasoningResult {
    pub fn from_context(ctx: &ReasoningContext) -> Self {
        let breaking_change_ids: Vec<SymbolId> = ctx
            .effect_diffs
            .values()
            .filter(|d| d.is_breaking)
            .map(|d| d.symbol_id.clone())
            .collect();

        let breaking_risk_count = ctx.risk_reports.values().filter(|r| r.risk_level == RiskLevel::Breaking).count();
        let breaking_signal_count = breaking_change_ids.len() + breaking_risk_count;

        let mut total_risk = ctx.risk_reports.values().map(|r| r.risk_level).max().unwrap_or(RiskLevel::Safe);
        if breaking_signal_count >= BREAKING_BUMP_THRESHOLD {
            total_risk = RiskLevel::Breaking;
        }

        let all_impacted: Vec<ImpactNode> = ctx.impact_reports.values().flat_map(|r| r.impacted.clone()).collect();
        let total_impact = ImpactReport::aggregate_total(&all_impacted);

        let mut impacted_symbol_ids: Vec<SymbolId> = all_impacted.iter().map(|n| n.symbol_id.clone()).collect();
        impacted_symbol_ids.sort();
        impacted_symbol_ids.dedup();

        let global_mutation_count =
            ctx.effect_diffs.values().filter(|d| d.added.contains(&EffectType::GlobalMutation)).count();

        let recommended_actions = build_recommendations(
            breaking_signal_count,
            global_mutation_count,
            total_risk,
            total_impact,
            ctx.warnings.len(),
        );

        let summary = format!(
            "{} breaking change(s), {} impacted symbol(s), risk={:?}, impact={:?}",
            breaking_signal_count,
            impacted_symbol_ids.len(),
            total_risk,
            total_impact
        );

        Self {
            summary,
            total_risk,
            total_impact,
            breaking_change_ids,
            impacted_symbol_ids,
            recommended_actions,
            warnings: ctx.warnings.clone(),
        }
    }
}

fn build_recommendations(
    breaking_signal_count: usize,
    global_mutation_count: usize,
    total_risk: RiskLevel,
    total_impact: ImpactLevel,
    warning_count: usize,
) -> Vec<String> {
    let mut actions = Vec::new();

    if breaking_signal_count > 0 {
        actions.push(format!("Review {breaking_signal_count} breaking change(s) before merging"));
    }
    if global_mutation_count > 0 {
        actions.push(format!("Refactor {global_mutation_count} global mutation(s) introduced by this change"));
    }
    if total_risk == RiskLevel::Breaking {
        actions.push("Do not auto-merge: at least one patch is BREAKING".to_string());
    } else if total_risk == RiskLevel::High {
        actions.push("Request a second reviewer before applying this patch".to_string());
    }
    if matches!(total_impact, ImpactLevel::High | ImpactLevel::Critical) {
        actions.push("Coordinate with owners of impacted symbols before merging".to_string());
    }
    if warning_count > 0 {
        actions.push(format!("Review {warning_count} pipeline warning(s) (degraded analysis)"));
    }

    if actions.is_empty() {
        actions.push("No blocking findings; safe to proceed".to_string());
    }
    while actions.len() < MIN_RECOMMENDATIONS {
        actions.push("Re-run analysis after the next incremental build".to_string());
    }
    actions.truncate(MAX_RECOMMENDATIONS);
    actions
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::effect_analysis::domain::{EffectDiff, EffectSet, Provenance};
    use crate::features::risk::domain::RiskReport;
    use crate::shared::models::Graph;
    use std::collections::HashSet;

    fn breaking_diff(id: &str) -> EffectDiff {
        let before = EffectSet::pure(id);
        let mut effects = HashSet::new();
        effects.insert(EffectType::GlobalMutation);
        let after = EffectSet::new(id, effects, false, 1.0, Provenance::Static);
        EffectDiff::compute(id, before, after)
    }

    #[test]
    fn three_breaking_signals_bump_total_risk_to_breaking() {
        let mut ctx = ReasoningContext::new(Graph::new());
        for id in ["a", "b", "c"] {
            ctx.effect_diffs.insert(id.to_string(), breaking_diff(id));
        }
        // No risk report is individually BREAKING, but three breaking
        // effect diffs alone must bump total_risk.
        ctx.risk_reports.insert("p1".to_string(), RiskReport::new("p1", RiskLevel::Low, 0, vec![], vec![]));

        let result = ReasoningResult::from_context(&ctx);
        assert_eq!(result.total_risk, RiskLevel::Breaking);
        assert_eq!(result.breaking_change_ids.len(), 3);
    }

    #[test]
    fn recommendations_are_between_three_and_six() {
        let ctx = ReasoningContext::new(Graph::new());
        let result = ReasoningResult::from_context(&ctx);
        assert!(result.recommended_actions.len() >= MIN_RECOMMENDATIONS);
        assert!(result.recommended_actions.len() <= MAX_RECOMMENDATIONS);
    }

    #[test]
    fn three_safe_plus_three_breaking_patches_give_breaking_total_risk() {
        let mut ctx = ReasoningContext::new(Graph::new());
        for i in 0..3 {
            ctx.risk_reports.insert(format!("safe{i}"), RiskReport::new(format!("safe{i}"), RiskLevel::Safe, 0, vec![], vec![]));
        }
        for i in 0..3 {
            ctx.risk_reports.insert(format!("break{i}"), RiskReport::new(format!("break{i}"), RiskLevel::Breaking, 0, vec![], vec![]));
        }

        let result = ReasoningResult::from_context(&ctx);
        assert_eq!(result.total_risk, RiskLevel::Breaking);
    }
}
