pub mod builder;

pub use builder::IncrementalBuilder;
