//! Symbol and signature models (spec §3 "Symbol").

use serde::{Deserialize, Serialize};

pub type SymbolId = String;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SymbolKind {
    Module,
    Class,
    Function,
    Method,
    Variable,
    Parameter,
    Type,
    BoundaryEndpoint,
    External,
}

/// Source location of a symbol.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SourceLocation {
    pub file_path: String,
    pub line: u32,
    pub column: u32,
}

impl SourceLocation {
    pub fn new(file_path: impl Into<String>, line: u32, column: u32) -> Self {
        Self {
            file_path: file_path.into(),
            line,
            column,
        }
    }
}

/// A single parameter in an ordered signature.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Parameter {
    pub name: String,
    pub structural_type: Option<String>,
    pub has_default: bool,
}

impl Parameter {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            structural_type: None,
            has_default: false,
        }
    }
}

/// Ordered parameter list plus return type.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Signature {
    pub parameters: Vec<Parameter>,
    pub return_type: Option<String>,
}

/// A stably-identified code symbol.
///
/// Lifecycle: created when the IR is lowered, replaced by a newly lowered
/// node keyed by the same id on re-parse, removed when its file disappears.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Symbol {
    pub id: SymbolId,
    pub fqn: String,
    pub kind: SymbolKind,
    pub location: SourceLocation,
    pub signature: Option<Signature>,
    pub docstring: Option<String>,
}

impl Symbol {
    pub fn new(id: impl Into<String>, fqn: impl Into<String>, kind: SymbolKind, location: SourceLocation) -> Self {
        Self {
            id: id.into(),
            fqn: fqn.into(),
            kind,
            location,
            signature: None,
            docstring: None,
        }
    }

    pub fn with_signature(mut self, signature: Signature) -> Self {
        self.signature = Some(signature);
        self
    }
}
