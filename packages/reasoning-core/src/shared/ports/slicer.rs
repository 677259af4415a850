//! Slicer port — optional capability used by the Incremental Builder (C16)
//! and Reasoning Pipeline (C17) to widen an impact set with a forward
//! program slice. Slicing itself (tree-sitter/PDG-based) is out of scope;
//! callers treat a missing or failing slicer as "fall back to graph-only
//! propagation", never as fatal.

use crate::errors::CoreResult;
use crate::shared::models::SymbolId;

#[derive(Debug, Clone)]
pub struct CodeFragment {
    pub symbol_id: SymbolId,
    pub confidence: f64,
}

#[derive(Debug, Clone, Default)]
pub struct SliceResult {
    pub fragments: Vec<CodeFragment>,
}

pub trait SlicerPort: Send + Sync {
    /// Forward slice from `symbol_id`, budgeted in an approximate token count.
    fn forward_slice(&self, symbol_id: &SymbolId, budget_tokens: usize) -> CoreResult<SliceResult>;
}
