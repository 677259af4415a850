//! AST view port — the capability the Effect Analyzer (C6) needs from
//! whatever parses source into an IR. Parsing itself is out of scope; this
//! crate consumes an already-lowered view of a symbol's body.

use crate::errors::CoreResult;
use crate::shared::models::SymbolId;

/// One observed operation inside a symbol's body, coarse enough for effect
/// classification without needing a full AST.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ObservedOperation {
    Call { callee_fqn: String },
    FieldRead { target: String },
    FieldWrite { target: String },
    GlobalWrite { target: String },
    Raises,
}

pub trait AstViewPort: Send + Sync {
    fn operations_of(&self, symbol_id: &SymbolId) -> CoreResult<Vec<ObservedOperation>>;
}
