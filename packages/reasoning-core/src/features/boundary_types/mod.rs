//! Boundary Types & Type Inference (C18): a structural-subtyping lattice
//! for cross-service edges, plus schema inference from the four recognized
//! boundary surfaces (OpenAPI, Protobuf, GraphQL, Python annotations).

pub mod domain;
pub mod infrastructure;

pub use domain::{BaseType, BoundarySpec, Compatibility, ProtocolType, ValueType};
pub use infrastructure::BoundaryMatcher;
