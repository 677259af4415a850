//! Unified error surface for the reasoning core.
//!
//! Every public operation returns `CoreResult<T>`. Panics are not permitted
//! to cross a component boundary (see design note in spec §9): hot paths
//! that can tolerate a miss (C10 trace, C11 merge, C3 lookup) convert
//! integrity failures into an empty result plus a metadata flag instead of
//! propagating an error — see the call sites in `features::cache` and
//! `features::value_flow`.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum CoreError {
    #[error("invalid patch: {0}")]
    InvalidPatch(String),

    #[error("simulation error: {0}")]
    SimulationError(String),

    #[error("risk analysis error: {0}")]
    RiskAnalysisError(String),

    #[error("cache corrupted: {0}")]
    CacheCorrupt(String),

    #[error("cache version mismatch: found {found}, expected {expected}")]
    CacheVersionMismatch { found: String, expected: String },

    #[error("cache serialization error: {0}")]
    CacheSerializationError(String),

    #[error("disk full")]
    CacheDiskFull,

    #[error("permission denied: {0}")]
    CachePermission(String),

    #[error("adapter error: {0}")]
    AdapterError(String),

    #[error("operation timed out after {0:?}")]
    Timeout(std::time::Duration),

    #[error("not found: {0}")]
    NotFound(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("internal error: {0}")]
    Internal(String),
}

pub type CoreResult<T> = Result<T, CoreError>;
