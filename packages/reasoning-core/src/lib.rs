//! Incremental program-reasoning core: value-flow taint tracing, effect
//! diffing, impact propagation, speculative patch simulation and risk
//! scoring, a tiered IR cache, and the incremental builder and reasoning
//! pipeline that tie them together (C1-C19).

pub mod errors;
pub mod features;
pub mod shared;

pub use errors::{CoreError, CoreResult};

pub use features::boundary_types::{BaseType, BoundaryMatcher, BoundarySpec, Compatibility, ProtocolType, ValueType};
pub use features::cache::{
    DiskCache, DiskCacheConfig, EstimateSize, PriorityCache, PriorityCacheConfig, PriorityCacheStats, RebuildCacheConfig,
    SerializerType, TieredCache, TieredCacheConfig, TieredCacheStats,
};
pub use features::delta_graph::{Delta, DeltaGraph, NodeView};
pub use features::effect_analysis::{EffectAnalyzer, EffectDiff, EffectDiffer, EffectSet, EffectType, Provenance, Severity, TextAstView};
pub use features::graph_store_adapter::{AdapterCacheStats, CachingGraphStoreAdapter, RemoteNodeCachePort};
pub use features::impact::{ImpactConfig, ImpactLevel, ImpactNode, ImpactPath, ImpactPropagator, ImpactReport, PropagationKind};
pub use features::incremental_builder::{IncrementalBuilder, RebuildCostEstimate, RebuildPlan, RebuildStrategy};
pub use features::overlay::{OverlayManager, OverlayStats};
pub use features::reasoning_pipeline::{IrDocument, ReasoningContext, ReasoningPipeline, ReasoningResult, VfgArtifacts};
pub use features::rebuild_cache::{RebuildCache, RebuildCacheEntry, RebuildCacheKey, RebuildCacheStats};
pub use features::risk::{BreakingChange, RiskAnalyzer, RiskLevel, RiskReport};
pub use features::simulation::{GraphSimulator, PatchDescriptor};
pub use features::value_flow::{
    TaintEngineStats, TaintQueryOutcome, VfgCore, VfgEdge, VfgNode, VfgNodeId, VfgStatistics, VfgTaintEngine,
};

pub use shared::models::{
    CacheKey, Confidence, Edge, EdgeKind, EdgeRef, Fingerprint, Graph, Node, Parameter, Signature, SourceLocation, Symbol,
    SymbolId, SymbolKind, VersionPair,
};
pub use shared::ports::{
    AstViewPort, CodeFragment, GraphStorePort, ObservedOperation, SerializerKind, SerializerPort, SliceResult, SlicerPort,
    VfgExtractorPort,
};
