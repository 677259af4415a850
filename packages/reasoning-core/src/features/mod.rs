//! Feature slices (C1-C19). Each module owns its `domain` (pure types and
//! rules) and `infrastructure` (port-consuming orchestration), per spec.

pub mod boundary_types;
pub mod cache;
pub mod delta_graph;
pub mod effect_analysis;
pub mod graph_store_adapter;
pub mod impact;
pub mod incremental_builder;
pub mod overlay;
pub mod reasoning_pipeline;
pub mod rebuild_cache;
pub mod risk;
pub mod simulation;
pub mod value_flow;
