pub mod rebuild_plan;

pub use rebuild_plan::{RebuildCostEstimate, RebuildPlan, RebuildStrategy};
