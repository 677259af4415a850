//! Effect Differ (C7): compares `EffectSet`s and reports on a batch.

use std::collections::HashMap;

use crate::features::effect_analysis::domain::{EffectDiff, EffectSet, Severity};

pub struct EffectDiffer;

impl EffectDiffer {
    pub fn compare(before: EffectSet, after: EffectSet, symbol_id: impl Into<String>) -> EffectDiff {
        EffectDiff::compute(symbol_id, before, after)
    }

    pub fn batch_compare(changes: Vec<(String, EffectSet, EffectSet)>) -> Vec<EffectDiff> {
        changes
            .into_iter()
            .map(|(symbol_id, before, after)| EffectDiff::compute(symbol_id, before, after))
            .collect()
    }

    pub fn get_breaking(diffs: &[EffectDiff]) -> Vec<&EffectDiff> {
        diffs.iter().filter(|d| d.is_breaking).collect()
    }

    pub fn summarize(diffs: &[EffectDiff]) -> HashMap<Severity, usize> {
        let mut counts = HashMap::new();
        for diff in diffs {
            *counts.entry(diff.severity).or_insert(0) += 1;
        }
        counts
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn batch_compare_and_get_breaking() {
        let changes = vec![
            ("a".to_string(), EffectSet::pure("a"), EffectSet::pure("a")),
            (
                "b".to_string(),
                EffectSet::pure("b"),
                EffectSet::new(
                    "b",
                    [crate::features::effect_analysis::domain::EffectType::GlobalMutation]
                        .into_iter()
                        .collect(),
                    false,
                    1.0,
                    crate::features::effect_analysis::domain::Provenance::Static,
                ),
            ),
        ];

        let diffs = EffectDiffer::batch_compare(changes);
        assert_eq!(diffs.len(), 2);

        let breaking = EffectDiffer::get_breaking(&diffs);
        assert_eq!(breaking.len(), 1);
        assert_eq!(breaking[0].symbol_id, "b");
    }

    #[test]
    fn summarize_counts_by_severity() {
        let diffs = vec![
            EffectDiff::compute("a", EffectSet::pure("a"), EffectSet::pure("a")),
            EffectDiff::compute("b", EffectSet::pure("b"), EffectSet::pure("b")),
        ];
        let counts = EffectDiffer::summarize(&diffs);
        assert_eq!(counts.get(&Severity::None), Some(&2));
    }
}
