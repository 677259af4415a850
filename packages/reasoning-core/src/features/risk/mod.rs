//! Risk Analyzer (C13): classifies a speculative patch's blast radius.

pub mod domain;
pub mod infrastructure;

pub use domain::{BreakingChange, RiskLevel, RiskReport};
pub use infrastructure::RiskAnalyzer;
