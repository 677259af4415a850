//! VFG node model (spec §3 "VFG").

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::features::boundary_types::ValueType;

pub type VfgNodeId = String;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VfgNode {
    pub node_id: VfgNodeId,
    pub symbol_name: String,
    pub file_path: String,
    pub line: u32,
    pub language: String,
    pub value_type: Option<ValueType>,
    pub schema: Option<String>,
    pub function_context: Option<String>,
    pub service_context: Option<String>,
    pub taint_labels: Vec<String>,
    pub is_source: bool,
    pub is_sink: bool,
    pub metadata: HashMap<String, String>,
    /// Carried so `extract_vfg(repo_id?, snapshot_id?, ...)` can filter a
    /// loaded view (spec §6); not part of the node's own identity.
    pub repo_id: Option<String>,
    pub snapshot_id: Option<String>,
}

impl VfgNode {
    pub fn new(node_id: impl Into<String>, symbol_name: impl Into<String>, file_path: impl Into<String>, line: u32, language: impl Into<String>) -> Self {
        Self {
            node_id: node_id.into(),
            symbol_name: symbol_name.into(),
            file_path: file_path.into(),
            line,
            language: language.into(),
            value_type: None,
            schema: None,
            function_context: None,
            service_context: None,
            taint_labels: Vec::new(),
            is_source: false,
            is_sink: false,
            metadata: HashMap::new(),
            repo_id: None,
            snapshot_id: None,
        }
    }

    pub fn as_source(mut self) -> Self {
        self.is_source = true;
        self
    }

    pub fn as_sink(mut self) -> Self {
        self.is_sink = true;
        self
    }

    pub fn with_taint_label(mut self, label: impl Into<String>) -> Self {
        self.taint_labels.push(label.into());
        self
    }

    pub fn with_service_context(mut self, service: impl Into<String>) -> Self {
        self.service_context = Some(service.into());
        self
    }

    pub fn has_taint_label(&self, label: &str) -> bool {
        self.taint_labels.iter().any(|l| l == label)
    }
}
