pub mod impact_node;
pub mod impact_report;

pub use impact_node::{ImpactLevel, ImpactNode, ImpactPath, PropagationKind};
pub use impact_report::ImpactReport;
