//! Decoding untyped data into typed value trees
//!
//! The decoder walks an untyped value together with the structural type
//! derived for it. At every node it first consults the ignore set (the node
//! is dropped from its parent), then the unknown set (the node becomes
//! unknown without its content being inspected), and only then dispatches on
//! the value kind against the declared type.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::DecodeError;
use crate::path::{Path, PathSet, PathStep};
use crate::types::{Fields, ScalarKind, StructuralType};
use crate::value::{
    KnownValue, TypedValue, ValueKind, mapping_type, record_type, sequence_type,
};

/// Default limit on value nesting
pub const DEFAULT_MAX_DEPTH: usize = 256;

static DYNAMIC: StructuralType = StructuralType::Dynamic;
static NULL: Value = Value::Null;

/// How declared record fields missing from the data are treated
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum DecodeMode {
    /// Only keys present in the data appear in the result
    #[default]
    PresentOnly,
    /// Every declared field appears; missing ones decode as null
    DeclaredComplete,
}

/// Decode with default settings (present-only, default depth limit)
///
/// Returns `Ok(None)` when `path` itself is ignored.
pub fn decode(
    ignore: &PathSet,
    unknown: &PathSet,
    ty: &StructuralType,
    value: &Value,
    path: &Path,
) -> Result<Option<TypedValue>, DecodeError> {
    Decoder::new(ignore, unknown).decode(ty, value, path)
}

/// Decode a value whose shape is taken entirely from the data
pub fn decode_dynamic(value: &Value) -> Result<TypedValue, DecodeError> {
    let empty = PathSet::new();
    let decoded = Decoder::new(&empty, &empty).decode(&StructuralType::Dynamic, value, &Path::root())?;
    // nothing is ignored, so the root is always present
    Ok(decoded.unwrap_or_else(|| TypedValue::null(StructuralType::Dynamic)))
}

/// Configurable decoder
#[derive(Debug, Clone, Copy)]
pub struct Decoder<'a> {
    ignore: &'a PathSet,
    unknown: &'a PathSet,
    mode: DecodeMode,
    max_depth: usize,
}

impl<'a> Decoder<'a> {
    pub fn new(ignore: &'a PathSet, unknown: &'a PathSet) -> Self {
        Self {
            ignore,
            unknown,
            mode: DecodeMode::default(),
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }

    pub fn with_mode(mut self, mode: DecodeMode) -> Self {
        self.mode = mode;
        self
    }

    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    pub fn mode(&self) -> DecodeMode {
        self.mode
    }

    /// Decode `value` found at `path` against `ty`
    pub fn decode(
        &self,
        ty: &StructuralType,
        value: &Value,
        path: &Path,
    ) -> Result<Option<TypedValue>, DecodeError> {
        let mut path = path.clone();
        self.decode_at(ty, value, &mut path, 0)
    }

    fn decode_at(
        &self,
        ty: &StructuralType,
        value: &Value,
        path: &mut Path,
        depth: usize,
    ) -> Result<Option<TypedValue>, DecodeError> {
        if self.ignore.matches(path) {
            tracing::trace!(%path, "ignoring field");
            return Ok(None);
        }

        if self.unknown.matches(path) {
            tracing::trace!(%path, "forcing field to unknown");
            return Ok(Some(TypedValue::unknown(ty.clone())));
        }

        if depth > self.max_depth {
            return Err(DecodeError::TooDeep {
                path: path.clone(),
                limit: self.max_depth,
            });
        }

        let decoded = match value {
            Value::Null => TypedValue::null(ty.clone()),
            Value::Bool(_) => self.decode_scalar(ty, ScalarKind::Bool, value, path)?,
            Value::Number(_) => self.decode_scalar(ty, ScalarKind::Number, value, path)?,
            Value::String(_) => self.decode_scalar(ty, ScalarKind::String, value, path)?,
            Value::Array(items) => self.decode_sequence(ty, items, path, depth)?,
            Value::Object(entries) => match ty {
                StructuralType::Structured(fields) => {
                    self.decode_structured(fields, entries, path, depth)?
                }
                StructuralType::Mapping(element) => {
                    self.decode_mapping(element, entries, path, depth)?
                }
                StructuralType::Dynamic => {
                    self.decode_structured(&Fields::new(), entries, path, depth)?
                }
                _ => return Err(mismatch(ty, value, path)),
            },
        };

        Ok(Some(decoded))
    }

    fn decode_scalar(
        &self,
        ty: &StructuralType,
        kind: ScalarKind,
        value: &Value,
        path: &Path,
    ) -> Result<TypedValue, DecodeError> {
        if !ty.admits(kind) {
            return Err(mismatch(ty, value, path));
        }
        TypedValue::scalar(kind, value).ok_or_else(|| mismatch(ty, value, path))
    }

    fn decode_sequence(
        &self,
        ty: &StructuralType,
        items: &[Value],
        path: &mut Path,
        depth: usize,
    ) -> Result<TypedValue, DecodeError> {
        if !matches!(
            ty,
            StructuralType::Sequence(_) | StructuralType::Tuple(_) | StructuralType::Dynamic
        ) {
            return Err(DecodeError::TypeMismatch {
                path: path.clone(),
                expected: ty.clone(),
                actual: ValueKind::Sequence,
            });
        }

        let mut children = Vec::with_capacity(items.len());
        for (index, item) in items.iter().enumerate() {
            let element = match ty {
                StructuralType::Sequence(element) => element.as_ref(),
                StructuralType::Tuple(elements) => elements.get(index).unwrap_or(&DYNAMIC),
                _ => &DYNAMIC,
            };

            path.push(PathStep::Index(index));
            let child = self.decode_at(element, item, path, depth + 1);
            path.pop();

            if let Some(child) = child? {
                children.push(child);
            }
        }

        Ok(TypedValue::known(
            sequence_type(ty, &children),
            KnownValue::Sequence(children),
        ))
    }

    fn decode_structured(
        &self,
        fields: &Fields,
        entries: &Map<String, Value>,
        path: &mut Path,
        depth: usize,
    ) -> Result<TypedValue, DecodeError> {
        let mut children = IndexMap::with_capacity(fields.len().max(entries.len()));

        for (name, field_type) in fields {
            let value = match entries.get(name) {
                Some(value) => value,
                None if self.mode == DecodeMode::DeclaredComplete => &NULL,
                None => continue,
            };
            if let Some(child) = self.decode_child(field_type, value, name, path, depth)? {
                children.insert(name.clone(), child);
            }
        }

        for (name, value) in entries {
            if fields.contains_key(name) {
                continue;
            }
            if let Some(child) = self.decode_child(&DYNAMIC, value, name, path, depth)? {
                children.insert(name.clone(), child);
            }
        }

        Ok(TypedValue::known(
            record_type(&children),
            KnownValue::Mapping(children),
        ))
    }

    fn decode_child(
        &self,
        ty: &StructuralType,
        value: &Value,
        name: &str,
        path: &mut Path,
        depth: usize,
    ) -> Result<Option<TypedValue>, DecodeError> {
        path.push(PathStep::Name(name.to_string()));
        let child = self.decode_at(ty, value, path, depth + 1);
        path.pop();
        child
    }

    fn decode_mapping(
        &self,
        element: &StructuralType,
        entries: &Map<String, Value>,
        path: &mut Path,
        depth: usize,
    ) -> Result<TypedValue, DecodeError> {
        let mut children = IndexMap::with_capacity(entries.len());

        for (key, value) in entries {
            path.push(PathStep::Key(key.clone()));
            let child = self.decode_at(element, value, path, depth + 1);
            path.pop();

            if let Some(child) = child? {
                children.insert(key.clone(), child);
            }
        }

        Ok(TypedValue::known(
            mapping_type(element, &children),
            KnownValue::Mapping(children),
        ))
    }
}

fn mismatch(expected: &StructuralType, value: &Value, path: &Path) -> DecodeError {
    DecodeError::TypeMismatch {
        path: path.clone(),
        expected: expected.clone(),
        actual: ValueKind::of(value),
    }
}
