//! Value Flow Graph Core and Taint Engine (C9/C10).

pub mod domain;
pub mod infrastructure;

pub use domain::{VfgEdge, VfgNode, VfgNodeId};
pub use infrastructure::{TaintEngineStats, TaintQueryOutcome, VfgCore, VfgStatistics, VfgTaintEngine};
