//! `ImpactReport` aggregation (spec §4.8).

use serde::{Deserialize, Serialize};

use super::impact_node::{ImpactLevel, ImpactNode, ImpactPath};
use crate::shared::models::SymbolId;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImpactReport {
    pub source_id: SymbolId,
    pub impacted: Vec<ImpactNode>,
    pub paths: Vec<ImpactPath>,
    pub total_impact: ImpactLevel,
    pub note: Option<String>,
}

impl ImpactReport {
    pub fn empty(source_id: impl Into<String>, note: impl Into<String>) -> Self {
        Self {
            source_id: source_id.into(),
            impacted: Vec::new(),
            paths: Vec::new(),
            total_impact: ImpactLevel::None,
            note: Some(note.into()),
        }
    }

    /// Aggregation rule (spec §4.8): start from the max per-node level,
    /// upgrade to CRITICAL if >=1 CRITICAL or >=5 HIGH nodes exist, else
    /// upgrade to HIGH if >=2 HIGH nodes exist.
    pub fn aggregate_total(impacted: &[ImpactNode]) -> ImpactLevel {
        let max = impacted.iter().map(|n| n.level).max().unwrap_or(ImpactLevel::None);
        let critical_count = impacted.iter().filter(|n| n.level == ImpactLevel::Critical).count();
        let high_count = impacted.iter().filter(|n| n.level == ImpactLevel::High).count();

        if critical_count >= 1 || high_count >= 5 {
            ImpactLevel::Critical
        } else if high_count >= 2 {
            std::cmp::max(max, ImpactLevel::High)
        } else {
            max
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::impact::domain::impact_node::PropagationKind;

    fn node(level: ImpactLevel) -> ImpactNode {
        ImpactNode {
            symbol_id: "x".into(),
            kind: "function".into(),
            file_path: "a.py".into(),
            level,
            distance: 1,
            propagation_kind: PropagationKind::DirectCall,
            confidence: 1.0,
            metadata: Default::default(),
        }
    }

    // Testable property #7 (first half).
    #[test]
    fn ten_high_nodes_aggregate_to_critical() {
        let nodes: Vec<ImpactNode> = (0..10).map(|_| node(ImpactLevel::High)).collect();
        assert_eq!(ImpactReport::aggregate_total(&nodes), ImpactLevel::Critical);
    }

    #[test]
    fn two_high_nodes_upgrade_to_high() {
        let nodes = vec![node(ImpactLevel::Low), node(ImpactLevel::High), node(ImpactLevel::High)];
        assert_eq!(ImpactReport::aggregate_total(&nodes), ImpactLevel::High);
    }

    #[test]
    fn single_critical_node_upgrades_total() {
        let nodes = vec![node(ImpactLevel::Low), node(ImpactLevel::Critical)];
        assert_eq!(ImpactReport::aggregate_total(&nodes), ImpactLevel::Critical);
    }
}
