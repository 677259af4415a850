//! Risk model (spec §3 "RiskReport").

use serde::{Deserialize, Serialize};

use crate::shared::models::SymbolId;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum RiskLevel {
    Safe,
    Low,
    Medium,
    High,
    Breaking,
}

impl RiskLevel {
    /// Fixed bucket per spec §4.13 step 3.
    pub fn base_score(self) -> f64 {
        match self {
            RiskLevel::Safe => 0.1,
            RiskLevel::Low => 0.25,
            RiskLevel::Medium => 0.5,
            RiskLevel::High => 0.75,
            RiskLevel::Breaking => 0.95,
        }
    }

    /// The score ceiling of the next bucket up, used to cap the
    /// per-caller nudge.
    fn next_bucket_ceiling(self) -> f64 {
        match self {
            RiskLevel::Safe => RiskLevel::Low.base_score(),
            RiskLevel::Low => RiskLevel::Medium.base_score(),
            RiskLevel::Medium => RiskLevel::High.base_score(),
            RiskLevel::High => RiskLevel::Breaking.base_score(),
            RiskLevel::Breaking => 1.0,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BreakingChange {
    pub symbol_id: SymbolId,
    pub reason: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RiskReport {
    pub patch_id: String,
    pub risk_level: RiskLevel,
    pub risk_score: f64,
    pub affected_symbols: Vec<SymbolId>,
    pub breaking_changes: Vec<BreakingChange>,
    pub safe_to_apply: bool,
}

impl RiskReport {
    /// Maps `level` to its fixed bucket then nudges by `+0.05` per
    /// distinct caller, capped at the next bucket's ceiling.
    pub fn score_for(level: RiskLevel, caller_count: usize) -> f64 {
        let base = level.base_score();
        let nudged = base + 0.05 * caller_count as f64;
        nudged.min(level.next_bucket_ceiling())
    }

    pub fn new(
        patch_id: impl Into<String>,
        risk_level: RiskLevel,
        caller_count: usize,
        affected_symbols: Vec<SymbolId>,
        breaking_changes: Vec<BreakingChange>,
    ) -> Self {
        let risk_score = Self::score_for(risk_level, caller_count);
        let safe_to_apply = matches!(risk_level, RiskLevel::Safe | RiskLevel::Low);
        Self { patch_id: patch_id.into(), risk_level, risk_score, affected_symbols, breaking_changes, safe_to_apply }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn score_nudges_but_caps_at_next_bucket() {
        assert_eq!(RiskReport::score_for(RiskLevel::Safe, 0), 0.1);
        assert!((RiskReport::score_for(RiskLevel::Safe, 1) - 0.15).abs() < 1e-9);
        assert_eq!(RiskReport::score_for(RiskLevel::Safe, 100), RiskLevel::Low.base_score());
    }

    #[test]
    fn safe_to_apply_only_for_safe_and_low() {
        assert!(RiskReport::new("p", RiskLevel::Safe, 0, vec![], vec![]).safe_to_apply);
        assert!(RiskReport::new("p", RiskLevel::Low, 0, vec![], vec![]).safe_to_apply);
        assert!(!RiskReport::new("p", RiskLevel::Medium, 0, vec![], vec![]).safe_to_apply);
        assert!(!RiskReport::new("p", RiskLevel::Breaking, 0, vec![], vec![]).safe_to_apply);
    }
}
