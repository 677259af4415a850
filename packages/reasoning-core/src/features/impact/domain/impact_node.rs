//! Impact model (spec §3 "ImpactNode"/"ImpactReport").

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::shared::models::SymbolId;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum ImpactLevel {
    None,
    Low,
    Medium,
    High,
    Critical,
}

impl ImpactLevel {
    pub fn from_distance(distance: u32) -> Self {
        match distance {
            1 => ImpactLevel::High,
            2 => ImpactLevel::Medium,
            _ => ImpactLevel::Low,
        }
    }

    pub fn step_down(self, steps: u8) -> Self {
        let idx = (self as i8 - steps as i8).max(ImpactLevel::None as i8);
        Self::from_ordinal(idx)
    }

    pub fn step_up(self, steps: u8) -> Self {
        let idx = (self as i8 + steps as i8).min(ImpactLevel::Critical as i8);
        Self::from_ordinal(idx)
    }

    fn from_ordinal(idx: i8) -> Self {
        match idx {
            0 => ImpactLevel::None,
            1 => ImpactLevel::Low,
            2 => ImpactLevel::Medium,
            3 => ImpactLevel::High,
            _ => ImpactLevel::Critical,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PropagationKind {
    DirectCall,
    Inheritance,
    Import,
    DataFlow,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImpactNode {
    pub symbol_id: SymbolId,
    pub kind: String,
    pub file_path: String,
    pub level: ImpactLevel,
    pub distance: u32,
    pub propagation_kind: PropagationKind,
    pub confidence: f64,
    pub metadata: HashMap<String, String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImpactPath {
    pub source: SymbolId,
    pub target: SymbolId,
    pub intermediate: Vec<SymbolId>,
    pub propagation_kinds: Vec<PropagationKind>,
}
