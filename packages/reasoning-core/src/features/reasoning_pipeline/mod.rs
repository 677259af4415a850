//! Reasoning Pipeline (C17): the staged façade over effect analysis,
//! impact propagation, incremental rebuilds, patch simulation, boundary
//! flows, and taint tracing (spec §4.17).

pub mod context;
pub mod cross_language;
pub mod pipeline;
pub mod result;

pub use context::{ReasoningContext, VfgArtifacts};
pub use cross_language::{analyze_cross_language_flows, IrDocument};
pub use pipeline::ReasoningPipeline;
pub use result::ReasoningResult;
