//! Impact Propagation (C8): reverse-edge BFS estimating the blast radius
//! of a change to a single symbol.

pub mod domain;
pub mod infrastructure;

pub use domain::{ImpactLevel, ImpactNode, ImpactPath, ImpactReport, PropagationKind};
pub use infrastructure::{ImpactConfig, ImpactPropagator};
