//! Structural types
//!
//! A structural type is the language-neutral shape assigned to a subtree:
//! a scalar, a homogeneous sequence, a heterogeneous tuple, a mapping with a
//! common element type, a record with named fields, or `Dynamic` when the
//! shape is only known from the data itself.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Kind of a scalar leaf
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScalarKind {
    Number,
    Bool,
    String,
}

impl fmt::Display for ScalarKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Number => write!(f, "number"),
            Self::Bool => write!(f, "bool"),
            Self::String => write!(f, "string"),
        }
    }
}

/// Ordered record fields
///
/// Iteration follows declaration order, equality does not.
pub type Fields = IndexMap<String, StructuralType>;

/// Shape of a typed subtree
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StructuralType {
    Scalar(ScalarKind),
    Sequence(Box<StructuralType>),
    Tuple(Vec<StructuralType>),
    Mapping(Box<StructuralType>),
    Structured(Fields),
    Dynamic,
}

impl StructuralType {
    pub fn number() -> Self {
        Self::Scalar(ScalarKind::Number)
    }

    pub fn bool() -> Self {
        Self::Scalar(ScalarKind::Bool)
    }

    pub fn string() -> Self {
        Self::Scalar(ScalarKind::String)
    }

    pub fn sequence(element: StructuralType) -> Self {
        Self::Sequence(Box::new(element))
    }

    pub fn mapping(element: StructuralType) -> Self {
        Self::Mapping(Box::new(element))
    }

    /// Build a record type from `(name, type)` pairs, keeping their order
    pub fn structured<I, K>(fields: I) -> Self
    where
        I: IntoIterator<Item = (K, StructuralType)>,
        K: Into<String>,
    {
        Self::Structured(fields.into_iter().map(|(k, v)| (k.into(), v)).collect())
    }

    /// Record type with no declared fields
    pub fn unshaped() -> Self {
        Self::Structured(Fields::new())
    }

    pub fn is_dynamic(&self) -> bool {
        matches!(self, Self::Dynamic)
    }

    pub fn is_scalar(&self) -> bool {
        matches!(self, Self::Scalar(_))
    }

    /// Whether values of this type hold children
    pub fn is_composite(&self) -> bool {
        matches!(
            self,
            Self::Sequence(_) | Self::Tuple(_) | Self::Mapping(_) | Self::Structured(_)
        )
    }

    /// Scalar kind, if this is a scalar type
    pub fn scalar_kind(&self) -> Option<ScalarKind> {
        match self {
            Self::Scalar(kind) => Some(*kind),
            _ => None,
        }
    }

    /// Whether a scalar of `kind` may be stored in a slot of this type
    pub fn admits(&self, kind: ScalarKind) -> bool {
        match self {
            Self::Scalar(k) => *k == kind,
            Self::Dynamic => true,
            _ => false,
        }
    }

    /// Declared field type of a record
    pub fn field(&self, name: &str) -> Option<&StructuralType> {
        match self {
            Self::Structured(fields) => fields.get(name),
            _ => None,
        }
    }
}

impl fmt::Display for StructuralType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Scalar(kind) => write!(f, "{}", kind),
            Self::Sequence(element) => write!(f, "list({})", element),
            Self::Tuple(elements) => {
                write!(f, "tuple[")?;
                for (i, element) in elements.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", element)?;
                }
                write!(f, "]")
            }
            Self::Mapping(element) => write!(f, "map({})", element),
            Self::Structured(fields) => {
                write!(f, "object{{")?;
                for (i, (name, ty)) in fields.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}: {}", name, ty)?;
                }
                write!(f, "}}")
            }
            Self::Dynamic => write!(f, "dynamic"),
        }
    }
}
