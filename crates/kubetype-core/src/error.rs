//! Error types for the codec

use thiserror::Error;

use crate::path::Path;
use crate::types::StructuralType;
use crate::value::ValueKind;

/// Result type for codec operations that may fail in more than one stage
pub type Result<T> = std::result::Result<T, CodecError>;

/// Any error raised by the codec
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum CodecError {
    #[error(transparent)]
    Schema(#[from] SchemaError),

    #[error(transparent)]
    Decode(#[from] DecodeError),

    #[error(transparent)]
    Encode(#[from] EncodeError),

    #[error(transparent)]
    Path(#[from] PathError),

    #[error(transparent)]
    Narrow(#[from] NarrowError),

    #[error("Failed to parse JSON: {0}")]
    JsonParse(#[from] serde_json::Error),

    #[error("Failed to parse YAML: {0}")]
    YamlParse(#[from] serde_yaml::Error),
}

/// Unsupported or malformed schema shape
///
/// Derivation aborts on the first error; no partial type is returned.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SchemaError {
    #[error("unexpected schema type '{0}'")]
    UnsupportedType(String),

    #[error("schema node has no type, no int-or-string format and no usable composition")]
    Untyped,

    #[error("unresolved schema reference '{0}'")]
    UnresolvedReference(String),

    #[error("invalid schema at '{location}': {message}")]
    InvalidNode { location: String, message: String },

    #[error("schema nesting exceeds {limit} levels")]
    TooDeep { limit: usize },
}

/// Untyped data does not fit the expected structural type
#[derive(Debug, Clone, PartialEq, Error)]
pub enum DecodeError {
    #[error("{path}: expected {expected}, got {actual}")]
    TypeMismatch {
        path: Path,
        expected: StructuralType,
        actual: ValueKind,
    },

    #[error("{path}: nesting exceeds {limit} levels")]
    TooDeep { path: Path, limit: usize },
}

/// A typed tree cannot be turned back into untyped data
#[derive(Debug, Clone, PartialEq, Error)]
pub enum EncodeError {
    #[error("{path}: cannot encode an unknown value")]
    UnknownValue { path: Path },

    #[error("expected an object, got {actual}")]
    NotAnObject { actual: String },
}

/// Malformed path expression
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PathError {
    #[error("path expression is empty")]
    Empty,

    #[error("empty step at position {position} in '{expression}'")]
    EmptyStep { expression: String, position: usize },

    #[error("unclosed bracket at position {position} in '{expression}'")]
    UnclosedBracket { expression: String, position: usize },

    #[error("invalid index '{index}' in '{expression}'")]
    InvalidIndex { expression: String, index: String },

    #[error("unexpected character '{found}' at position {position} in '{expression}'")]
    UnexpectedCharacter {
        expression: String,
        position: usize,
        found: char,
    },
}

/// A typed value cannot be re-expressed under the requested type
#[derive(Debug, Clone, PartialEq, Error)]
pub enum NarrowError {
    #[error("{path}: cannot narrow {actual} to {expected}")]
    ShapeMismatch {
        path: Path,
        expected: StructuralType,
        actual: StructuralType,
    },

    #[error("{path}: nesting exceeds {limit} levels")]
    TooDeep { path: Path, limit: usize },
}
