//! Typed values
//!
//! A [`TypedValue`] pairs a structural type with a knowledge tag: the value
//! is either known, explicitly null, or unknown (not yet determined). Only
//! known values hold content, so an unknown node can never carry children.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::{Number, Value as JsonValue};
use std::fmt;

use crate::types::{ScalarKind, StructuralType};

/// Kind of an untyped value, used in diagnostics
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ValueKind {
    Null,
    Bool,
    Number,
    String,
    Sequence,
    Mapping,
}

impl ValueKind {
    pub fn of(value: &JsonValue) -> Self {
        match value {
            JsonValue::Null => Self::Null,
            JsonValue::Bool(_) => Self::Bool,
            JsonValue::Number(_) => Self::Number,
            JsonValue::String(_) => Self::String,
            JsonValue::Array(_) => Self::Sequence,
            JsonValue::Object(_) => Self::Mapping,
        }
    }
}

impl fmt::Display for ValueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Null => write!(f, "null"),
            Self::Bool => write!(f, "bool"),
            Self::Number => write!(f, "number"),
            Self::String => write!(f, "string"),
            Self::Sequence => write!(f, "sequence"),
            Self::Mapping => write!(f, "mapping"),
        }
    }
}

/// Content of a known node
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum KnownValue {
    Number(Number),
    Bool(bool),
    String(String),
    Sequence(Vec<TypedValue>),
    Mapping(IndexMap<String, TypedValue>),
}

/// Knowledge tag of a node
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ValueState {
    Known(KnownValue),
    Null,
    Unknown,
}

/// A node of a typed value tree
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TypedValue {
    #[serde(rename = "type")]
    ty: StructuralType,
    value: ValueState,
}

impl TypedValue {
    pub fn known(ty: StructuralType, value: KnownValue) -> Self {
        Self {
            ty,
            value: ValueState::Known(value),
        }
    }

    pub fn null(ty: StructuralType) -> Self {
        Self {
            ty,
            value: ValueState::Null,
        }
    }

    pub fn unknown(ty: StructuralType) -> Self {
        Self {
            ty,
            value: ValueState::Unknown,
        }
    }

    pub fn string(value: impl Into<String>) -> Self {
        Self::known(StructuralType::string(), KnownValue::String(value.into()))
    }

    pub fn bool(value: bool) -> Self {
        Self::known(StructuralType::bool(), KnownValue::Bool(value))
    }

    /// Known number; integral floats are stored as integers
    pub fn number(value: impl Into<Number>) -> Self {
        Self::known(
            StructuralType::number(),
            KnownValue::Number(normalize_number(&value.into())),
        )
    }

    /// Known scalar of the given kind from an untyped scalar
    pub(crate) fn scalar(kind: ScalarKind, value: &JsonValue) -> Option<Self> {
        let known = match (kind, value) {
            (ScalarKind::Number, JsonValue::Number(n)) => KnownValue::Number(normalize_number(n)),
            (ScalarKind::Bool, JsonValue::Bool(b)) => KnownValue::Bool(*b),
            (ScalarKind::String, JsonValue::String(s)) => KnownValue::String(s.clone()),
            _ => return None,
        };
        Some(Self::known(StructuralType::Scalar(kind), known))
    }

    /// Record whose type is built from its fields
    pub fn object<I, K>(fields: I) -> Self
    where
        I: IntoIterator<Item = (K, TypedValue)>,
        K: Into<String>,
    {
        let fields: IndexMap<String, TypedValue> =
            fields.into_iter().map(|(k, v)| (k.into(), v)).collect();
        Self::known(record_type(&fields), KnownValue::Mapping(fields))
    }

    /// Mapping with a common element type
    pub fn map<I, K>(element: StructuralType, entries: I) -> Self
    where
        I: IntoIterator<Item = (K, TypedValue)>,
        K: Into<String>,
    {
        let entries: IndexMap<String, TypedValue> =
            entries.into_iter().map(|(k, v)| (k.into(), v)).collect();
        Self::known(mapping_type(&element, &entries), KnownValue::Mapping(entries))
    }

    /// Sequence typed the way the decoder types it
    pub fn list(element: StructuralType, items: Vec<TypedValue>) -> Self {
        let ty = sequence_type(&StructuralType::sequence(element), &items);
        Self::known(ty, KnownValue::Sequence(items))
    }

    /// Heterogeneous tuple typed from its items
    pub fn tuple(items: Vec<TypedValue>) -> Self {
        let ty = StructuralType::Tuple(items.iter().map(|i| i.ty.clone()).collect());
        Self::known(ty, KnownValue::Sequence(items))
    }

    pub fn ty(&self) -> &StructuralType {
        &self.ty
    }

    pub fn state(&self) -> &ValueState {
        &self.value
    }

    pub fn into_parts(self) -> (StructuralType, ValueState) {
        (self.ty, self.value)
    }

    pub fn is_known(&self) -> bool {
        matches!(self.value, ValueState::Known(_))
    }

    pub fn is_null(&self) -> bool {
        matches!(self.value, ValueState::Null)
    }

    pub fn is_unknown(&self) -> bool {
        matches!(self.value, ValueState::Unknown)
    }

    pub fn as_known(&self) -> Option<&KnownValue> {
        match &self.value {
            ValueState::Known(known) => Some(known),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self.as_known() {
            Some(KnownValue::String(s)) => Some(s),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self.as_known() {
            Some(KnownValue::Bool(b)) => Some(*b),
            _ => None,
        }
    }

    pub fn as_number(&self) -> Option<&Number> {
        match self.as_known() {
            Some(KnownValue::Number(n)) => Some(n),
            _ => None,
        }
    }

    /// Child of a known mapping
    pub fn get(&self, name: &str) -> Option<&TypedValue> {
        match self.as_known() {
            Some(KnownValue::Mapping(entries)) => entries.get(name),
            _ => None,
        }
    }

    /// Element of a known sequence
    pub fn index(&self, index: usize) -> Option<&TypedValue> {
        match self.as_known() {
            Some(KnownValue::Sequence(items)) => items.get(index),
            _ => None,
        }
    }

    /// Follow a dotted chain of mapping names, for tests and callers
    /// inspecting a decoded object
    pub fn pointer(&self, dotted: &str) -> Option<&TypedValue> {
        dotted.split('.').try_fold(self, |node, name| node.get(name))
    }
}

/// Store integral floats as integers so `3` and `3.0` compare equal
pub(crate) fn normalize_number(n: &Number) -> Number {
    if n.is_f64() {
        if let Some(f) = n.as_f64() {
            if f.fract() == 0.0 && f >= i64::MIN as f64 && f < i64::MAX as f64 {
                return Number::from(f as i64);
            }
        }
    }
    n.clone()
}

/// Type of a sequence given the type it was read against and its children
///
/// Children sharing one scalar type keep a homogeneous sequence; anything
/// else degrades to a tuple of the children's types.
pub(crate) fn sequence_type(declared: &StructuralType, items: &[TypedValue]) -> StructuralType {
    match items.split_first() {
        None => match declared {
            StructuralType::Tuple(_) => StructuralType::Tuple(Vec::new()),
            StructuralType::Sequence(element) => StructuralType::Sequence(element.clone()),
            _ => StructuralType::sequence(StructuralType::Dynamic),
        },
        Some((first, rest)) if first.ty.is_scalar() && rest.iter().all(|i| i.ty == first.ty) => {
            StructuralType::sequence(first.ty.clone())
        }
        Some(_) => StructuralType::Tuple(items.iter().map(|i| i.ty.clone()).collect()),
    }
}

/// Type of a mapping read against a common element type
///
/// Stays a mapping while every entry carries the element type (or the
/// element type is dynamic), otherwise becomes a record of the entries.
pub(crate) fn mapping_type(
    element: &StructuralType,
    entries: &IndexMap<String, TypedValue>,
) -> StructuralType {
    if element.is_dynamic() || entries.values().all(|v| &v.ty == element) {
        StructuralType::mapping(element.clone())
    } else {
        record_type(entries)
    }
}

/// Record type built from the children's own types
pub(crate) fn record_type(fields: &IndexMap<String, TypedValue>) -> StructuralType {
    StructuralType::Structured(
        fields
            .iter()
            .map(|(name, value)| (name.clone(), value.ty.clone()))
            .collect(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_number_normalization() {
        let float = serde_json::from_value::<Number>(json!(3.0)).unwrap();
        assert_eq!(TypedValue::number(float), TypedValue::number(3));
        let fraction = serde_json::from_value::<Number>(json!(1.5)).unwrap();
        assert_eq!(
            TypedValue::number(fraction).as_number().and_then(Number::as_f64),
            Some(1.5)
        );
    }

    #[test]
    fn test_list_typing() {
        let strings = TypedValue::list(
            StructuralType::Dynamic,
            vec![TypedValue::string("a"), TypedValue::string("b")],
        );
        assert_eq!(strings.ty(), &StructuralType::sequence(StructuralType::string()));

        let mixed = TypedValue::list(
            StructuralType::Dynamic,
            vec![TypedValue::string("a"), TypedValue::number(1)],
        );
        assert_eq!(
            mixed.ty(),
            &StructuralType::Tuple(vec![StructuralType::string(), StructuralType::number()])
        );

        let empty = TypedValue::list(StructuralType::string(), vec![]);
        assert_eq!(empty.ty(), &StructuralType::sequence(StructuralType::string()));
    }

    #[test]
    fn test_map_degrades_to_record() {
        let uniform = TypedValue::map(
            StructuralType::string(),
            [("a", TypedValue::string("x"))],
        );
        assert_eq!(uniform.ty(), &StructuralType::mapping(StructuralType::string()));

        let mixed = TypedValue::map(
            StructuralType::string(),
            [("a", TypedValue::string("x")), ("b", TypedValue::number(1))],
        );
        assert_eq!(
            mixed.ty(),
            &StructuralType::structured([
                ("a", StructuralType::string()),
                ("b", StructuralType::number()),
            ])
        );
    }

    #[test]
    fn test_pointer() {
        let value = TypedValue::object([(
            "metadata",
            TypedValue::object([("name", TypedValue::string("web"))]),
        )]);

        assert_eq!(value.pointer("metadata.name").and_then(TypedValue::as_str), Some("web"));
        assert!(value.pointer("metadata.namespace").is_none());
    }
}
