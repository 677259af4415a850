//! EffectDiff and severity classification (C7).

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use super::effect_set::EffectSet;
use super::effect_type::EffectType;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Severity {
    None,
    Low,
    Medium,
    High,
    Critical,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EffectDiff {
    pub symbol_id: String,
    pub before: EffectSet,
    pub after: EffectSet,
    pub added: HashSet<EffectType>,
    pub removed: HashSet<EffectType>,
    pub severity: Severity,
    pub is_breaking: bool,
}

impl EffectDiff {
    pub fn compute(symbol_id: impl Into<String>, before: EffectSet, after: EffectSet) -> Self {
        let before_effects: HashSet<EffectType> =
            before.effects.iter().copied().filter(|e| *e != EffectType::Pure).collect();
        let after_effects: HashSet<EffectType> =
            after.effects.iter().copied().filter(|e| *e != EffectType::Pure).collect();

        let added: HashSet<EffectType> = after_effects.difference(&before_effects).copied().collect();
        let removed: HashSet<EffectType> = before_effects.difference(&after_effects).copied().collect();

        let (severity, is_breaking) = classify_severity(&before, &after, &added);

        Self {
            symbol_id: symbol_id.into(),
            before,
            after,
            added,
            removed,
            severity,
            is_breaking,
        }
    }

    pub fn has_changes(&self) -> bool {
        !self.added.is_empty() || !self.removed.is_empty()
    }

    pub fn is_safe(&self) -> bool {
        !self.is_breaking && matches!(self.severity, Severity::None | Severity::Low)
    }
}

/// First matching rule wins, in the order spec §3 lists them.
fn classify_severity(before: &EffectSet, after: &EffectSet, added: &HashSet<EffectType>) -> (Severity, bool) {
    // (a) GLOBAL_MUTATION added -> critical, breaking.
    if added.contains(&EffectType::GlobalMutation) {
        return (Severity::Critical, true);
    }

    // (b) transition from purity to any side-effect -> high, breaking.
    if before.is_pure() && !after.is_pure() {
        return (Severity::High, true);
    }

    // (c) DB_WRITE or NETWORK added -> high, breaking.
    if added.contains(&EffectType::DbWrite) || added.contains(&EffectType::Network) {
        return (Severity::High, true);
    }

    // (d) IO or LOG added -> medium.
    if added.contains(&EffectType::Io) || added.contains(&EffectType::Log) {
        return (Severity::Medium, false);
    }

    // (e) pure removal with no additions -> low.
    let removed_without_additions = {
        let before_effects: HashSet<EffectType> =
            before.effects.iter().copied().filter(|e| *e != EffectType::Pure).collect();
        let after_effects: HashSet<EffectType> =
            after.effects.iter().copied().filter(|e| *e != EffectType::Pure).collect();
        !before_effects.is_empty() && after_effects.is_subset(&before_effects) && after_effects != before_effects
    };
    if removed_without_additions && added.is_empty() {
        return (Severity::Low, false);
    }

    // (f) otherwise none.
    (Severity::None, false)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::effect_analysis::domain::effect_set::Provenance;

    fn with_effects(id: &str, effects: &[EffectType]) -> EffectSet {
        EffectSet::new(id, effects.iter().copied().collect(), effects.is_empty(), 1.0, Provenance::Static)
    }

    #[test]
    fn global_mutation_is_critical_and_breaking() {
        let before = EffectSet::pure("f");
        let after = with_effects("f", &[EffectType::GlobalMutation]);
        let diff = EffectDiff::compute("f", before, after);
        assert_eq!(diff.severity, Severity::Critical);
        assert!(diff.is_breaking);
    }

    #[test]
    fn purity_to_side_effect_is_high_and_breaking() {
        let before = EffectSet::pure("f");
        let after = with_effects("f", &[EffectType::ReadState]);
        let diff = EffectDiff::compute("f", before, after);
        assert_eq!(diff.severity, Severity::High);
        assert!(diff.is_breaking);
    }

    #[test]
    fn db_write_added_is_high_and_breaking() {
        let before = with_effects("f", &[EffectType::ReadState]);
        let after = with_effects("f", &[EffectType::ReadState, EffectType::DbWrite]);
        let diff = EffectDiff::compute("f", before, after);
        assert_eq!(diff.severity, Severity::High);
        assert!(diff.is_breaking);
    }

    #[test]
    fn io_added_is_medium_and_not_breaking() {
        let before = with_effects("f", &[EffectType::ReadState]);
        let after = with_effects("f", &[EffectType::ReadState, EffectType::Io]);
        let diff = EffectDiff::compute("f", before, after);
        assert_eq!(diff.severity, Severity::Medium);
        assert!(!diff.is_breaking);
    }

    #[test]
    fn removal_only_is_low_and_not_breaking() {
        let before = with_effects("f", &[EffectType::ReadState, EffectType::Io]);
        let after = with_effects("f", &[EffectType::ReadState]);
        let diff = EffectDiff::compute("f", before, after);
        assert_eq!(diff.severity, Severity::Low);
        assert!(!diff.is_breaking);
        assert!(diff.is_safe());
    }

    #[test]
    fn no_changes_is_none() {
        let before = with_effects("f", &[EffectType::ReadState]);
        let after = with_effects("f", &[EffectType::ReadState]);
        let diff = EffectDiff::compute("f", before, after);
        assert_eq!(diff.severity, Severity::None);
        assert!(!diff.has_changes());
    }
}
