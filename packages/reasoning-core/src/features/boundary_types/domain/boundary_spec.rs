//! Cross-service boundary descriptor (spec §3 "BoundarySpec").

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::shared::models::Confidence;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ProtocolType {
    RestApi,
    Grpc,
    GraphQl,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BoundarySpec {
    pub protocol: ProtocolType,
    pub service_name: String,
    pub endpoint_or_method: String,
    /// Field name -> type string, as mined from the originating schema
    /// surface (OpenAPI/Protobuf/GraphQL); kept as raw strings here and
    /// resolved to the `ValueType` lattice by the inference layer.
    pub request_schema: BTreeMap<String, String>,
    pub response_schema: BTreeMap<String, String>,
    pub http_method: Option<String>,
    pub confidence: Confidence,
}

impl BoundarySpec {
    pub fn new(protocol: ProtocolType, service_name: impl Into<String>, endpoint_or_method: impl Into<String>) -> Self {
        Self {
            protocol,
            service_name: service_name.into(),
            endpoint_or_method: endpoint_or_method.into(),
            request_schema: BTreeMap::new(),
            response_schema: BTreeMap::new(),
            http_method: None,
            confidence: Confidence::Medium,
        }
    }
}
