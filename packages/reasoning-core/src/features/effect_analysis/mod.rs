//! Effect Analyzer and Effect Differ (C6/C7): classifies a symbol's
//! side-effect lattice and the severity of a before/after transition.

pub mod domain;
pub mod infrastructure;

pub use domain::{EffectDiff, EffectSet, EffectType, Provenance, Severity};
pub use infrastructure::{EffectAnalyzer, EffectDiffer, TextAstView};
