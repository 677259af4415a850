pub mod delta_graph;

pub use delta_graph::{DeltaGraph, NodeView};
