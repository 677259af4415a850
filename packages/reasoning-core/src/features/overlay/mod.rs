//! Overlay Manager (C14): a bounded stack of speculative patch layers.

pub mod overlay_manager;

pub use overlay_manager::{OverlayManager, OverlayStats};
