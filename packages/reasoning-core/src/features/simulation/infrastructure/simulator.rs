//! Graph Simulator (C12): compiles a `PatchDescriptor` into a minimal
//! ordered delta list and applies it to a fresh overlay over the base
//! graph, without ever touching the base.

use std::collections::HashMap;

use parking_lot::Mutex;

use crate::errors::{CoreError, CoreResult};
use crate::features::delta_graph::{Delta, DeltaGraph};
use crate::features::simulation::domain::PatchDescriptor;
use crate::shared::models::Graph;

pub struct GraphSimulator {
    cache: Mutex<HashMap<String, Vec<Delta>>>,
}

impl Default for GraphSimulator {
    fn default() -> Self {
        Self::new()
    }
}

impl GraphSimulator {
    pub fn new() -> Self {
        Self { cache: Mutex::new(HashMap::new()) }
    }

    pub fn cache_size(&self) -> usize {
        self.cache.lock().len()
    }

    /// Compiles a patch into its minimal ordered delta list per §4.12's
    /// mapping. `REFACTOR` is explicitly unsupported at this layer.
    fn compile(&self, patch: &PatchDescriptor) -> CoreResult<Vec<Delta>> {
        let deltas = match patch {
            PatchDescriptor::RenameSymbol { target, new_name } => {
                vec![Delta::UpdateNode { id: target.clone(), new_data: field("name", new_name) }]
            }
            PatchDescriptor::AddParameter { target, params } => {
                vec![Delta::UpdateNode { id: target.clone(), new_data: field("parameters", &encode_params(params)) }]
            }
            PatchDescriptor::RemoveParameter { target, params } => {
                vec![Delta::UpdateNode { id: target.clone(), new_data: field("parameters", &encode_params(params)) }]
            }
            PatchDescriptor::ChangeReturnType { target, new_type } => {
                vec![Delta::UpdateNode { id: target.clone(), new_data: field("return_type", new_type) }]
            }
            PatchDescriptor::AddFunction { target, after_code } => {
                vec![Delta::AddNode { id: target.clone(), data: field("code", after_code) }]
            }
            PatchDescriptor::DeleteFunction { target } => vec![Delta::DeleteNode { id: target.clone() }],
            PatchDescriptor::ModifyBody { target, after_code } => {
                vec![Delta::UpdateNode { id: target.clone(), new_data: field("code", after_code) }]
            }
            PatchDescriptor::Refactor { .. } => {
                return Err(CoreError::SimulationError("REFACTOR is not supported at this layer".into()));
            }
        };
        Ok(deltas)
    }

    fn compiled_deltas(&self, patch: &PatchDescriptor) -> CoreResult<Vec<Delta>> {
        let id = patch.id();
        if let Some(cached) = self.cache.lock().get(&id) {
            return Ok(cached.clone());
        }
        let compiled = self.compile(patch)?;
        self.cache.lock().insert(id, compiled.clone());
        Ok(compiled)
    }

    /// Validates required-field and target-existence rules per variant.
    fn validate(&self, patch: &PatchDescriptor, base: &Graph) -> CoreResult<()> {
        match patch {
            PatchDescriptor::AddFunction { target, after_code } => {
                if base.has_node(target) {
                    return Err(CoreError::InvalidPatch(format!("target {target} already exists")));
                }
                check_syntax(after_code)?;
            }
            PatchDescriptor::ModifyBody { target, after_code } => {
                require_target(base, target)?;
                check_syntax(after_code)?;
            }
            PatchDescriptor::RenameSymbol { target, .. }
            | PatchDescriptor::AddParameter { target, .. }
            | PatchDescriptor::RemoveParameter { target, .. }
            | PatchDescriptor::ChangeReturnType { target, .. }
            | PatchDescriptor::DeleteFunction { target } => require_target(base, target)?,
            PatchDescriptor::Refactor { target } => require_target(base, target)?,
        }
        Ok(())
    }

    /// Validates (if requested) and compiles `patch` into its delta list,
    /// consulting the memoization cache. Exposed so callers that maintain
    /// their own cumulative overlay (the Overlay Manager, C14) can replay
    /// the plan without constructing a throwaway `DeltaGraph` over the bare
    /// base first.
    pub fn plan(&self, patch: &PatchDescriptor, base: &Graph, validate: bool) -> CoreResult<Vec<Delta>> {
        if validate {
            self.validate(patch, base)?;
        }
        self.compiled_deltas(patch)
    }

    /// `simulate_patch(patch, validate=true) -> DeltaGraph`.
    pub fn simulate_patch<'a>(&self, patch: &PatchDescriptor, base: &'a Graph, validate: bool) -> CoreResult<DeltaGraph<'a>> {
        let deltas = self.plan(patch, base, validate)?;
        let mut overlay = DeltaGraph::new(base);
        for delta in deltas {
            overlay.apply_delta(delta)?;
        }
        Ok(overlay)
    }

    /// Applies all patches in order onto one overlay. Any failure stops
    /// and is reported with its index.
    pub fn simulate_multi_patch<'a>(
        &self,
        patches: &[PatchDescriptor],
        base: &'a Graph,
        validate: bool,
    ) -> Result<DeltaGraph<'a>, (usize, CoreError)> {
        let mut overlay = DeltaGraph::new(base);
        for (index, patch) in patches.iter().enumerate() {
            if validate {
                self.validate(patch, base).map_err(|e| (index, e))?;
            }
            let deltas = self.compiled_deltas(patch).map_err(|e| (index, e))?;
            for delta in deltas {
                overlay.apply_delta(delta).map_err(|e| (index, e))?;
            }
        }
        Ok(overlay)
    }
}

fn field(key: &str, value: &str) -> HashMap<String, String> {
    let mut m = HashMap::new();
    m.insert(key.to_string(), value.to_string());
    m
}

fn encode_params(params: &[crate::shared::models::Parameter]) -> String {
    params
        .iter()
        .map(|p| format!("{}{}", p.name, if p.has_default { "=default" } else { "" }))
        .collect::<Vec<_>>()
        .join(",")
}

fn require_target(base: &Graph, target: &str) -> CoreResult<()> {
    if base.has_node(target) {
        Ok(())
    } else {
        Err(CoreError::InvalidPatch(format!("target {target} does not exist")))
    }
}

/// A lightweight brace/paren/bracket balance check standing in for a full
/// per-language parser (out of scope for this layer).
fn check_syntax(code: &str) -> CoreResult<()> {
    let mut depth = 0i32;
    for c in code.chars() {
        match c {
            '(' | '{' | '[' => depth += 1,
            ')' | '}' | ']' => depth -= 1,
            _ => {}
        }
        if depth < 0 {
            return Err(CoreError::InvalidPatch("unbalanced code fragment".into()));
        }
    }
    if depth != 0 {
        return Err(CoreError::InvalidPatch("unbalanced code fragment".into()));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shared::models::{EdgeKind, Edge, Node, SourceLocation, Symbol, SymbolKind};

    fn base_graph() -> Graph {
        let mut g = Graph::new();
        g.add_node(Node::from_symbol(Symbol::new("f1", "mod.f1", SymbolKind::Function, SourceLocation::new("a.py", 1, 0))));
        g.add_node(Node::from_symbol(Symbol::new("f2", "mod.f2", SymbolKind::Function, SourceLocation::new("a.py", 5, 0))));
        g.add_edge(Edge::new("f1", "f2", EdgeKind::Calls));
        g
    }

    #[test]
    fn rename_symbol_compiles_to_update_node() {
        let base = base_graph();
        let sim = GraphSimulator::new();
        let patch = PatchDescriptor::RenameSymbol { target: "f1".into(), new_name: "f1_renamed".into() };
        let overlay = sim.simulate_patch(&patch, &base, true).unwrap();
        assert_eq!(overlay.get_node("f1").unwrap().fields.get("name"), Some(&"f1_renamed".to_string()));
    }

    #[test]
    fn refactor_is_explicit_error() {
        let base = base_graph();
        let sim = GraphSimulator::new();
        let patch = PatchDescriptor::Refactor { target: "f1".into() };
        assert!(sim.simulate_patch(&patch, &base, true).is_err());
    }

    #[test]
    fn delete_function_requires_existing_target() {
        let base = base_graph();
        let sim = GraphSimulator::new();
        let patch = PatchDescriptor::DeleteFunction { target: "ghost".into() };
        assert!(sim.simulate_patch(&patch, &base, true).is_err());
    }

    #[test]
    fn add_function_requires_absent_target() {
        let base = base_graph();
        let sim = GraphSimulator::new();
        let patch = PatchDescriptor::AddFunction { target: "f1".into(), after_code: "def f1(): pass".into() };
        assert!(sim.simulate_patch(&patch, &base, true).is_err());
    }

    // Testable property #9.
    #[test]
    fn repeated_simulate_patch_hits_cache_exactly_once() {
        let base = base_graph();
        let sim = GraphSimulator::new();
        let patch = PatchDescriptor::RenameSymbol { target: "f1".into(), new_name: "x".into() };

        let first = sim.simulate_patch(&patch, &base, true).unwrap();
        assert_eq!(sim.cache_size(), 1);
        let second = sim.simulate_patch(&patch, &base, true).unwrap();
        assert_eq!(sim.cache_size(), 1, "cache size must increase by exactly one total, not per call");

        assert_eq!(
            first.get_node("f1").unwrap().fields.get("name"),
            second.get_node("f1").unwrap().fields.get("name")
        );
    }

    #[test]
    fn multi_patch_stops_at_first_failure_with_index() {
        let base = base_graph();
        let sim = GraphSimulator::new();
        let patches = vec![
            PatchDescriptor::RenameSymbol { target: "f1".into(), new_name: "a".into() },
            PatchDescriptor::DeleteFunction { target: "ghost".into() },
            PatchDescriptor::RenameSymbol { target: "f2".into(), new_name: "b".into() },
        ];
        let err = sim.simulate_multi_patch(&patches, &base, true).unwrap_err();
        assert_eq!(err.0, 1);
    }
}
