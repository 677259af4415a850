//! VFG extractor port — adapter-provided value flow graph, consumed by the
//! VFG Taint Engine's `load` stage (C10). Building the VFG from source is
//! out of scope; this crate only consumes the already-extracted nodes and
//! edges.

use crate::errors::CoreResult;
use crate::features::value_flow::domain::{VfgEdge, VfgNode};

pub trait VfgExtractorPort: Send + Sync {
    fn nodes(&self) -> CoreResult<Vec<VfgNode>>;
    fn edges(&self) -> CoreResult<Vec<VfgEdge>>;
}
