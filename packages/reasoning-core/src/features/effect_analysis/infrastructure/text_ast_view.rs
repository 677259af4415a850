//! A minimal textual `AstViewPort` over Python-style source snippets.
//!
//! The core never parses source itself (spec §9: parsing is out of
//! scope, consumed from an already-lowered view). This view exists so the
//! Incremental Builder and Reasoning Pipeline can diff effects for a raw
//! `(old_code, new_code)` change pair when no adapter-provided AST view is
//! wired up — a coarse stand-in, not a parser.

use std::collections::{HashMap, HashSet};

use crate::errors::CoreResult;
use crate::shared::models::SymbolId;
use crate::shared::ports::{AstViewPort, ObservedOperation};

const KEYWORDS: &[&str] = &[
    "def", "class", "if", "elif", "else", "for", "while", "return", "global", "nonlocal", "import",
    "from", "try", "except", "finally", "with", "as", "pass", "break", "continue", "raise", "lambda",
    "and", "or", "not", "in", "is", "yield", "async", "await",
];

pub struct TextAstView {
    bodies: HashMap<SymbolId, String>,
}

impl TextAstView {
    pub fn new() -> Self {
        Self { bodies: HashMap::new() }
    }

    pub fn with_body(mut self, symbol_id: impl Into<String>, code: impl Into<String>) -> Self {
        self.bodies.insert(symbol_id.into(), code.into());
        self
    }

    fn scan(code: &str) -> Vec<ObservedOperation> {
        let globals = Self::declared_globals(code);
        let mut ops = Vec::new();

        for raw_line in code.lines() {
            let line = raw_line.trim();
            if line.starts_with("global ") || line.starts_with("def ") || line.starts_with("class ") {
                continue;
            }

            if let Some(target) = Self::assignment_target(line) {
                if globals.contains(&target) {
                    ops.push(ObservedOperation::GlobalWrite { target });
                    continue;
                }
                if let Some(receiver) = target.split('.').next() {
                    if target.contains('.') {
                        ops.push(ObservedOperation::FieldWrite { target: receiver.to_string() });
                        continue;
                    }
                }
            }

            for callee in Self::calls_in(line) {
                ops.push(ObservedOperation::Call { callee_fqn: callee });
            }

            if line.starts_with("raise") {
                ops.push(ObservedOperation::Raises);
            }
        }
        ops
    }

    fn declared_globals(code: &str) -> HashSet<String> {
        let mut names = HashSet::new();
        for line in code.lines() {
            let line = line.trim();
            if let Some(rest) = line.strip_prefix("global ") {
                for name in rest.split(',') {
                    names.insert(name.trim().to_string());
                }
            }
        }
        names
    }

    /// `name = ...` / `name += ...` style assignment target, or `obj.attr = ...`.
    fn assignment_target(line: &str) -> Option<String> {
        const OPS: &[&str] = &["+=", "-=", "*=", "/=", "="];
        for op in OPS {
            if let Some(idx) = line.find(op) {
                // Don't treat `==` as assignment.
                if *op == "=" && line[idx..].starts_with("==") {
                    continue;
                }
                let target = line[..idx].trim();
                if is_identifier_path(target) {
                    return Some(target.to_string());
                }
            }
        }
        None
    }

    /// Bare or dotted callee names immediately followed by `(`, skipping
    /// language keywords and control-flow constructs.
    fn calls_in(line: &str) -> Vec<String> {
        let mut calls = Vec::new();
        let bytes: Vec<char> = line.chars().collect();
        let mut i = 0;
        while i < bytes.len() {
            if bytes[i].is_alphabetic() || bytes[i] == '_' {
                let start = i;
                while i < bytes.len() && (bytes[i].is_alphanumeric() || bytes[i] == '_' || bytes[i] == '.') {
                    i += 1;
                }
                let ident: String = bytes[start..i].iter().collect();
                if i < bytes.len() && bytes[i] == '(' {
                    let bare = ident.split('.').next_back().unwrap_or(&ident);
                    if !KEYWORDS.contains(&bare) {
                        calls.push(ident);
                    }
                }
            } else {
                i += 1;
            }
        }
        calls
    }
}

fn is_identifier_path(s: &str) -> bool {
    !s.is_empty() && s.chars().all(|c| c.is_alphanumeric() || c == '_' || c == '.')
}

impl Default for TextAstView {
    fn default() -> Self {
        Self::new()
    }
}

impl AstViewPort for TextAstView {
    fn operations_of(&self, symbol_id: &SymbolId) -> CoreResult<Vec<ObservedOperation>> {
        Ok(self.bodies.get(symbol_id).map(|code| Self::scan(code)).unwrap_or_default())
    }
}
