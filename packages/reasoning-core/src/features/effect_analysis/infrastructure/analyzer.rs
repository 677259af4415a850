//! Effect Analyzer (C6): walks the adapter-provided operations of a single
//! symbol's body and produces its `EffectSet`.

use std::collections::HashSet;

use crate::errors::CoreResult;
use crate::features::effect_analysis::domain::{EffectSet, EffectType, Provenance};
use crate::features::effect_analysis::infrastructure::call_registry::{classify_call, CallClass};
use crate::shared::models::SymbolId;
use crate::shared::ports::{AstViewPort, ObservedOperation};

const SELF_RECEIVER: &str = "self";

pub struct EffectAnalyzer<'a> {
    ast_view: &'a dyn AstViewPort,
}

impl<'a> EffectAnalyzer<'a> {
    pub fn new(ast_view: &'a dyn AstViewPort) -> Self {
        Self { ast_view }
    }

    pub fn analyze(&self, symbol_id: &SymbolId) -> CoreResult<EffectSet> {
        let operations = self.ast_view.operations_of(symbol_id)?;

        let mut effects = HashSet::new();
        let mut idempotent = true;
        let mut confidence = 1.0_f64;

        for op in &operations {
            match op {
                ObservedOperation::GlobalWrite { .. } => {
                    effects.insert(EffectType::GlobalMutation);
                    idempotent = false;
                }
                ObservedOperation::FieldWrite { target } if target != SELF_RECEIVER => {
                    effects.insert(EffectType::WriteState);
                }
                ObservedOperation::FieldRead { target } if target != SELF_RECEIVER => {
                    effects.insert(EffectType::ReadState);
                }
                ObservedOperation::FieldWrite { .. } | ObservedOperation::FieldRead { .. } => {
                    // Writes/reads on `self` are intra-object state, not an
                    // externally observable effect.
                }
                ObservedOperation::Call { callee_fqn } => match classify_call(callee_fqn) {
                    CallClass::Pure => {}
                    CallClass::Io => {
                        effects.insert(EffectType::Io);
                    }
                    CallClass::Log => {
                        effects.insert(EffectType::Log);
                    }
                    CallClass::DbRead => {
                        effects.insert(EffectType::DbRead);
                    }
                    CallClass::DbWrite => {
                        effects.insert(EffectType::DbWrite);
                        idempotent = false;
                    }
                    CallClass::Network => {
                        effects.insert(EffectType::Network);
                        idempotent = false;
                    }
                    CallClass::Unknown => {
                        effects.insert(EffectType::Unknown);
                        confidence *= 0.9;
                    }
                },
                ObservedOperation::Raises => {}
            }
        }

        if effects.is_empty() {
            return Ok(EffectSet::new(symbol_id.clone(), effects, true, 1.0, Provenance::Static));
        }

        Ok(EffectSet::new(symbol_id.clone(), effects, idempotent, confidence, Provenance::Static))
    }
}
