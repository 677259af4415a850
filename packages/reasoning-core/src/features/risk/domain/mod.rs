pub mod risk_report;

pub use risk_report::{BreakingChange, RiskLevel, RiskReport};
