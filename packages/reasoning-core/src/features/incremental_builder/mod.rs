//! Incremental Builder (C16): turns a change set into an impact map and a
//! partial-rebuild plan, memoizing its output in the Rebuild Cache.

pub mod domain;
pub mod infrastructure;

pub use domain::{RebuildCostEstimate, RebuildPlan, RebuildStrategy};
pub use infrastructure::IncrementalBuilder;
