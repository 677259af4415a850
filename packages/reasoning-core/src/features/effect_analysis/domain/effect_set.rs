//! Effect set model (C6) plus the hierarchy-aware queries supplementing
//! the distillation (`includes`, `is_compatible_with`).

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use super::effect_type::EffectType;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Provenance {
    Static,
    Inferred,
    Allowlist,
    Annotation,
    Unknown,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EffectSet {
    pub symbol_id: String,
    pub effects: HashSet<EffectType>,
    pub idempotent: bool,
    pub confidence: f64,
    pub provenance: Provenance,
}

impl EffectSet {
    pub fn new(
        symbol_id: impl Into<String>,
        effects: HashSet<EffectType>,
        idempotent: bool,
        confidence: f64,
        provenance: Provenance,
    ) -> Self {
        Self {
            symbol_id: symbol_id.into(),
            effects,
            idempotent,
            confidence: confidence.clamp(0.0, 1.0),
            provenance,
        }
    }

    pub fn pure(symbol_id: impl Into<String>) -> Self {
        let mut effects = HashSet::new();
        effects.insert(EffectType::Pure);
        Self::new(symbol_id, effects, true, 1.0, Provenance::Static)
    }

    /// `is_pure` ⇔ the set is empty or equals `{PURE}`.
    pub fn is_pure(&self) -> bool {
        self.effects.is_empty() || (self.effects.len() == 1 && self.effects.contains(&EffectType::Pure))
    }

    pub fn has_side_effects(&self) -> bool {
        !self.is_pure()
    }

    pub fn max_severity(&self) -> u8 {
        self.effects.iter().map(|e| e.severity_score()).max().unwrap_or(0)
    }

    /// Hierarchy-aware containment: true if `effect` is a direct member or
    /// a member's fixed hierarchy parent.
    pub fn includes(&self, effect: EffectType) -> bool {
        if self.effects.contains(&effect) {
            return true;
        }
        self.effects.iter().any(|e| e.parent() == Some(effect))
    }

    /// True if `self` is the same or weaker than `other` — every effect in
    /// `self` also (directly) appears in `other`. A pure set is compatible
    /// with anything; nothing but pure is compatible with a pure `other`.
    pub fn is_compatible_with(&self, other: &EffectSet) -> bool {
        if self.is_pure() {
            return true;
        }
        if other.is_pure() {
            return false;
        }
        self.effects.is_subset(&other.effects)
    }

    pub fn merge(&mut self, other: &EffectSet) {
        self.effects.extend(other.effects.iter().copied());
        self.confidence = self.confidence.min(other.confidence);
        if !other.idempotent {
            self.idempotent = false;
        }
        if self.effects.len() > 1 {
            self.effects.remove(&EffectType::Pure);
        }
    }

    pub fn summary(&self) -> String {
        if self.is_pure() {
            return "PURE".to_string();
        }
        let mut names: Vec<_> = self
            .effects
            .iter()
            .filter(|e| **e != EffectType::Pure)
            .map(|e| e.to_string())
            .collect();
        names.sort();
        names.join(", ")
    }
}
