//! Schema -> type lattice inference (C18). Maps the scalar/structural
//! vocabularies of the four recognized boundary surfaces (spec §6 "Boundary
//! spec surface") onto `ValueType`. Unknown scalar names map to `UNKNOWN`,
//! never to an error — a boundary whose schema can't be parsed is still a
//! boundary, just a low-confidence one.

use std::collections::BTreeMap;

use crate::features::boundary_types::domain::{BaseType, ValueType};

/// OpenAPI 3.0 / Swagger `{"type": ..., "nullable": ..., "properties": ...}`.
pub fn from_openapi_schema(schema: &serde_json::Value) -> ValueType {
    let nullable = schema.get("nullable").and_then(|v| v.as_bool()).unwrap_or(false);
    let base = match schema.get("type").and_then(|v| v.as_str()) {
        Some("integer") => BaseType::Int,
        Some("number") => BaseType::Float,
        Some("string") => BaseType::String,
        Some("boolean") => BaseType::Bool,
        Some("null") => BaseType::Null,
        Some("array") => {
            let element = schema
                .get("items")
                .map(from_openapi_schema)
                .unwrap_or_else(ValueType::unknown);
            return ValueType { base: BaseType::Array(Box::new(element)), nullable };
        }
        Some("object") => {
            let fields = schema
                .get("properties")
                .and_then(|v| v.as_object())
                .map(|props| {
                    props
                        .iter()
                        .map(|(name, sub)| (name.clone(), from_openapi_schema(sub)))
                        .collect::<BTreeMap<_, _>>()
                })
                .unwrap_or_default();
            return ValueType { base: BaseType::Object(fields), nullable };
        }
        _ => BaseType::Unknown,
    };
    ValueType { base, nullable }
}

/// Protobuf scalar field type names (`int32`, `string`, `bytes`, ...).
/// Protobuf has no native `null`; a field is "nullable" only via `optional`.
pub fn from_protobuf_scalar(scalar: &str, optional: bool) -> ValueType {
    let base = match scalar {
        "int32" | "int64" | "uint32" | "uint64" | "sint32" | "sint64" | "fixed32" | "fixed64"
        | "sfixed32" | "sfixed64" => BaseType::Int,
        "float" | "double" => BaseType::Float,
        "string" => BaseType::String,
        "bool" => BaseType::Bool,
        "bytes" => BaseType::Bytes,
        _ => BaseType::Unknown,
    };
    ValueType { base, nullable: optional }
}

/// GraphQL type strings (`String`, `Int!`, `[User]`, ...). A trailing `!`
/// marks non-null; a `[...]` wrapper marks a list.
pub fn from_graphql_type(type_str: &str) -> ValueType {
    let non_null = type_str.ends_with('!');
    let trimmed = type_str.strip_suffix('!').unwrap_or(type_str);

    if let Some(inner) = trimmed.strip_prefix('[').and_then(|s| s.strip_suffix(']')) {
        let element = from_graphql_type(inner);
        return ValueType { base: BaseType::Array(Box::new(element)), nullable: !non_null };
    }

    let base = match trimmed {
        "Int" => BaseType::Int,
        "Float" => BaseType::Float,
        "String" | "ID" => BaseType::String,
        "Boolean" => BaseType::Bool,
        _ => BaseType::Unknown,
    };
    ValueType { base, nullable: !non_null }
}

/// Python-style annotations (`int`, `Optional[str]`, `List[int]`, `dict`).
pub fn from_python_annotation(annotation: &str) -> ValueType {
    let annotation = annotation.trim();

    if let Some(inner) = annotation
        .strip_prefix("Optional[")
        .and_then(|s| s.strip_suffix(']'))
    {
        let mut inferred = from_python_annotation(inner);
        inferred.nullable = true;
        return inferred;
    }

    if let Some(inner) = annotation
        .strip_prefix("List[")
        .or_else(|| annotation.strip_prefix("list["))
        .and_then(|s| s.strip_suffix(']'))
    {
        return ValueType::array(from_python_annotation(inner));
    }

    let base = match annotation {
        "int" => BaseType::Int,
        "float" => BaseType::Float,
        "str" => BaseType::String,
        "bool" => BaseType::Bool,
        "bytes" => BaseType::Bytes,
        "None" | "NoneType" => BaseType::Null,
        "dict" | "Dict" => BaseType::Object(BTreeMap::new()),
        "Any" => BaseType::Any,
        _ => BaseType::Unknown,
    };
    ValueType::new(base)
}
