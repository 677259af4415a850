//! Graph Simulator (C12): speculative patch compilation onto delta overlays.

pub mod domain;
pub mod infrastructure;

pub use domain::PatchDescriptor;
pub use infrastructure::GraphSimulator;
