//! Rebuild plan model (spec §4.16, glossary "Rebuild plan").

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::shared::models::SymbolId;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RebuildStrategy {
    Minimal,
    Partial,
    Full,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RebuildPlan {
    pub strategy: RebuildStrategy,
    pub symbols_to_rebuild: Vec<SymbolId>,
    pub changed_files: HashSet<String>,
}

/// Cheap affected-count heuristic (SPEC_FULL §B.4): not a real build-time
/// predictor, just a presenter-facing estimate.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct RebuildCostEstimate {
    pub estimated_files: usize,
    pub estimated_time_ms: u64,
}

impl RebuildCostEstimate {
    /// ~150ms per file, with a 50ms floor for the rebuild machinery itself.
    const MS_PER_FILE: u64 = 150;
    const FIXED_OVERHEAD_MS: u64 = 50;

    pub fn for_file_count(estimated_files: usize) -> Self {
        Self { estimated_files, estimated_time_ms: Self::FIXED_OVERHEAD_MS + estimated_files as u64 * Self::MS_PER_FILE }
    }
}
