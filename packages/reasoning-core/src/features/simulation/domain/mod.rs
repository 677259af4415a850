pub mod patch;

pub use patch::PatchDescriptor;
