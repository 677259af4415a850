//! The boundary type lattice (C18): primitives, ARRAY/OBJECT composites,
//! plus ANY and UNKNOWN, each possibly nullable. `extract_vfg` edges that
//! cross a service boundary carry a `value_type` drawn from this lattice so
//! the taint engine and risk analyzer can reason about structural
//! compatibility without a runtime type registry (spec §9 design note).

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum BaseType {
    Int,
    Float,
    String,
    Bool,
    Bytes,
    Null,
    Array(Box<ValueType>),
    Object(BTreeMap<String, ValueType>),
    Any,
    Unknown,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValueType {
    pub base: BaseType,
    pub nullable: bool,
}

impl ValueType {
    pub fn new(base: BaseType) -> Self {
        Self { base, nullable: false }
    }

    pub fn nullable(base: BaseType) -> Self {
        Self { base, nullable: true }
    }

    pub fn any() -> Self {
        Self::new(BaseType::Any)
    }

    pub fn unknown() -> Self {
        Self::new(BaseType::Unknown)
    }

    pub fn array(element: ValueType) -> Self {
        Self::new(BaseType::Array(Box::new(element)))
    }

    pub fn object(fields: BTreeMap<String, ValueType>) -> Self {
        Self::new(BaseType::Object(fields))
    }

    fn is_numeric(&self) -> bool {
        matches!(self.base, BaseType::Int | BaseType::Float)
    }

    /// `S ⊑ T` (spec §4.18). Returns whether `self` (S) is compatible with
    /// `target` (T), and whether the conversion loses precision.
    pub fn is_compatible_with(&self, target: &ValueType) -> Compatibility {
        if matches!(self.base, BaseType::Any) || matches!(target.base, BaseType::Any) {
            return Compatibility::ok();
        }

        if matches!(self.base, BaseType::Null) {
            return if target.nullable {
                Compatibility::ok()
            } else {
                Compatibility::no()
            };
        }

        // Non-nullable S ⊑ nullable T is allowed; nullable S ⊑ non-nullable T is not,
        // independent of base compatibility (spec §4.18).
        if self.nullable && !target.nullable {
            return Compatibility::no();
        }

        match (&self.base, &target.base) {
            (BaseType::Int, BaseType::Float) | (BaseType::Float, BaseType::Int) => Compatibility::lossy(),
            (BaseType::Array(a), BaseType::Array(b)) => a.is_compatible_with(b),
            (BaseType::Object(s_fields), BaseType::Object(t_fields)) => {
                for (field_name, t_type) in t_fields {
                    match s_fields.get(field_name) {
                        Some(s_type) if s_type.is_compatible_with(t_type).compatible => {}
                        _ => return Compatibility::no(),
                    }
                }
                Compatibility::ok()
            }
            (a, b) if a == b => Compatibility::ok(),
            _ => Compatibility::no(),
        }
    }

    /// Widest common type for union use: intersection of fields for
    /// OBJECT, ANY for heterogeneous bases (spec §4.18 merge operator).
    pub fn merge(&self, other: &ValueType) -> ValueType {
        if self.base == other.base {
            return ValueType {
                base: self.base.clone(),
                nullable: self.nullable || other.nullable,
            };
        }

        if self.is_numeric() && other.is_numeric() {
            return ValueType {
                base: BaseType::Float,
                nullable: self.nullable || other.nullable,
            };
        }

        if let (BaseType::Array(a), BaseType::Array(b)) = (&self.base, &other.base) {
            return ValueType::array(a.merge(b));
        }

        if let (BaseType::Object(a), BaseType::Object(b)) = (&self.base, &other.base) {
            let merged: BTreeMap<String, ValueType> = a
                .iter()
                .filter_map(|(name, a_type)| b.get(name).map(|b_type| (name.clone(), a_type.merge(b_type))))
                .collect();
            return ValueType::object(merged);
        }

        ValueType {
            base: BaseType::Any,
            nullable: self.nullable || other.nullable,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Compatibility {
    pub compatible: bool,
    pub lossy: bool,
}

impl Compatibility {
    fn ok() -> Self {
        Self { compatible: true, lossy: false }
    }
    fn lossy() -> Self {
        Self { compatible: true, lossy: true }
    }
    fn no() -> Self {
        Self { compatible: false, lossy: false }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn t(base: BaseType) -> ValueType {
        ValueType::new(base)
    }

    #[test]
    fn any_is_compatible_both_directions() {
        assert!(t(BaseType::String).is_compatible_with(&ValueType::any()).compatible);
        assert!(ValueType::any().is_compatible_with(&t(BaseType::Int)).compatible);
    }

    #[test]
    fn null_compatible_only_with_nullable_target() {
        assert!(t(BaseType::Null).is_compatible_with(&ValueType::nullable(BaseType::String)).compatible);
        assert!(!t(BaseType::Null).is_compatible_with(&t(BaseType::String)).compatible);
    }

    #[test]
    fn nullable_to_non_nullable_disallowed_reverse_allowed() {
        let nullable_string = ValueType::nullable(BaseType::String);
        let plain_string = t(BaseType::String);
        assert!(plain_string.is_compatible_with(&nullable_string).compatible);
        assert!(!nullable_string.is_compatible_with(&plain_string).compatible);
    }

    #[test]
    fn numeric_widening_both_directions_marked_lossy() {
        let int_to_float = t(BaseType::Int).is_compatible_with(&t(BaseType::Float));
        let float_to_int = t(BaseType::Float).is_compatible_with(&t(BaseType::Int));
        assert!(int_to_float.compatible && int_to_float.lossy);
        assert!(float_to_int.compatible && float_to_int.lossy);
    }

    #[test]
    fn string_not_compatible_with_int() {
        assert!(!t(BaseType::String).is_compatible_with(&t(BaseType::Int)).compatible);
    }

    // Testable property #13.
    #[test]
    fn object_structural_subtyping_is_one_directional() {
        let mut narrow = BTreeMap::new();
        narrow.insert("id".to_string(), t(BaseType::Int));
        let narrow_obj = ValueType::object(narrow);

        let mut wide = BTreeMap::new();
        wide.insert("id".to_string(), t(BaseType::Int));
        wide.insert("name".to_string(), t(BaseType::String));
        let wide_obj = ValueType::object(wide);

        assert!(wide_obj.is_compatible_with(&narrow_obj).compatible, "extra fields satisfy a narrower target");
        assert!(!narrow_obj.is_compatible_with(&wide_obj).compatible, "missing field must fail");
    }

    #[test]
    fn array_covariance_follows_element_type() {
        let int_array = ValueType::array(t(BaseType::Int));
        let float_array = ValueType::array(t(BaseType::Float));
        assert!(int_array.is_compatible_with(&float_array).compatible);
    }

    #[test]
    fn merge_objects_intersects_fields() {
        let mut a = BTreeMap::new();
        a.insert("id".to_string(), t(BaseType::Int));
        a.insert("name".to_string(), t(BaseType::String));

        let mut b = BTreeMap::new();
        b.insert("id".to_string(), t(BaseType::Int));
        b.insert("age".to_string(), t(BaseType::Int));

        let merged = ValueType::object(a).merge(&ValueType::object(b));
        match merged.base {
            BaseType::Object(fields) => {
                assert_eq!(fields.len(), 1);
                assert!(fields.contains_key("id"));
            }
            _ => panic!("expected object"),
        }
    }

    #[test]
    fn merge_heterogeneous_bases_is_any() {
        let merged = t(BaseType::String).merge(&t(BaseType::Bool));
        assert_eq!(merged.base, BaseType::Any);
    }
}
