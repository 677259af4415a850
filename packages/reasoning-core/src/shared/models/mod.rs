pub mod fingerprint;
pub mod graph;
pub mod symbol;

pub use fingerprint::{CacheKey, Fingerprint, VersionPair};
pub use graph::{Confidence, Edge, EdgeKind, EdgeRef, Graph, Node};
pub use symbol::{Parameter, Signature, SourceLocation, Symbol, SymbolId, SymbolKind};
