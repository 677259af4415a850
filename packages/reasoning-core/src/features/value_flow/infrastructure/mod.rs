pub mod taint_engine;
pub mod vfg_core;

pub use taint_engine::{TaintEngineStats, TaintQueryOutcome, VfgTaintEngine};
pub use vfg_core::{VfgCore, VfgStatistics};
