pub mod propagator;

pub use propagator::{ImpactConfig, ImpactPropagator};
