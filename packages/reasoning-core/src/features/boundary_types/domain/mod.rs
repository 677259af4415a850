pub mod boundary_spec;
pub mod value_type;

pub use boundary_spec::{BoundarySpec, ProtocolType};
pub use value_type::{BaseType, Compatibility, ValueType};
