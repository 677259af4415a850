pub mod ast_view;
pub mod graph_store;
pub mod serializer;
pub mod slicer;
pub mod vfg_extractor;

pub use ast_view::{AstViewPort, ObservedOperation};
pub use graph_store::GraphStorePort;
pub use serializer::{SerializerKind, SerializerPort};
pub use slicer::{CodeFragment, SliceResult, SlicerPort};
pub use vfg_extractor::VfgExtractorPort;
