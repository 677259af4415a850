//! Delta Graph (C11): copy-on-write overlay for speculative graph edits.

pub mod domain;
pub mod infrastructure;

pub use domain::Delta;
pub use infrastructure::{DeltaGraph, NodeView};
