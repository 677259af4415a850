//! Patch descriptor (spec §3): a closed tagged union over the eight
//! supported edit kinds. Serialized with explicit tag bytes, never via
//! runtime reflection.

use serde::{Deserialize, Serialize};

use crate::shared::models::{Fingerprint, Parameter, SymbolId};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind")]
pub enum PatchDescriptor {
    RenameSymbol { target: SymbolId, new_name: String },
    AddParameter { target: SymbolId, params: Vec<Parameter> },
    RemoveParameter { target: SymbolId, params: Vec<Parameter> },
    ChangeReturnType { target: SymbolId, new_type: String },
    AddFunction { target: SymbolId, after_code: String },
    DeleteFunction { target: SymbolId },
    ModifyBody { target: SymbolId, after_code: String },
    Refactor { target: SymbolId },
}

impl PatchDescriptor {
    pub fn target(&self) -> &SymbolId {
        match self {
            PatchDescriptor::RenameSymbol { target, .. }
            | PatchDescriptor::AddParameter { target, .. }
            | PatchDescriptor::RemoveParameter { target, .. }
            | PatchDescriptor::ChangeReturnType { target, .. }
            | PatchDescriptor::AddFunction { target, .. }
            | PatchDescriptor::DeleteFunction { target }
            | PatchDescriptor::ModifyBody { target, .. }
            | PatchDescriptor::Refactor { target } => target,
        }
    }

    pub fn kind_name(&self) -> &'static str {
        match self {
            PatchDescriptor::RenameSymbol { .. } => "RENAME_SYMBOL",
            PatchDescriptor::AddParameter { .. } => "ADD_PARAMETER",
            PatchDescriptor::RemoveParameter { .. } => "REMOVE_PARAMETER",
            PatchDescriptor::ChangeReturnType { .. } => "CHANGE_RETURN_TYPE",
            PatchDescriptor::AddFunction { .. } => "ADD_FUNCTION",
            PatchDescriptor::DeleteFunction { .. } => "DELETE_FUNCTION",
            PatchDescriptor::ModifyBody { .. } => "MODIFY_BODY",
            PatchDescriptor::Refactor { .. } => "REFACTOR",
        }
    }

    /// A stable id derived from the patch's content, used to memoize
    /// `simulate_patch` results (spec §4.12).
    pub fn id(&self) -> String {
        let encoded = serde_json::to_string(self).unwrap_or_default();
        Fingerprint::compute(encoded.as_bytes()).to_hex()
    }
}
