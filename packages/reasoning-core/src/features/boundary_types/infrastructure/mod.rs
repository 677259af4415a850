pub mod boundary_matcher;
pub mod inference;

pub use boundary_matcher::BoundaryMatcher;
pub use inference::{from_graphql_type, from_openapi_schema, from_protobuf_scalar, from_python_annotation};
