pub mod effect_diff;
pub mod effect_set;
pub mod effect_type;

pub use effect_diff::{EffectDiff, Severity};
pub use effect_set::{EffectSet, Provenance};
pub use effect_type::EffectType;
