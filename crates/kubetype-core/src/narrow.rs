//! Re-typing values under a stricter structural type
//!
//! Narrowing takes a value that was typed loosely (typically decoded against
//! `Dynamic`) and re-expresses it under the type derived from a schema,
//! forcing selected paths to unknown along the way. This is how a planned
//! object marks the fields only the server can fill in.
//!
//! Composite results are typed from the children actually produced, the
//! same way the decoder types what it reads, so a fully known result
//! decodes back to itself from its own encoding.

use indexmap::IndexMap;

use crate::decode::DEFAULT_MAX_DEPTH;
use crate::error::NarrowError;
use crate::path::{Path, PathSet, PathStep};
use crate::types::StructuralType;
use crate::value::{KnownValue, TypedValue, mapping_type, record_type, sequence_type};

static DYNAMIC: StructuralType = StructuralType::Dynamic;

/// Narrow with the default depth limit
pub fn narrow(
    ty: &StructuralType,
    force_unknown: &PathSet,
    value: &TypedValue,
    path: &Path,
) -> Result<TypedValue, NarrowError> {
    Narrower::new(force_unknown).narrow(ty, value, path)
}

#[derive(Debug, Clone, Copy)]
pub struct Narrower<'a> {
    force_unknown: &'a PathSet,
    max_depth: usize,
}

impl<'a> Narrower<'a> {
    pub fn new(force_unknown: &'a PathSet) -> Self {
        Self {
            force_unknown,
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }

    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    pub fn narrow(
        &self,
        ty: &StructuralType,
        value: &TypedValue,
        path: &Path,
    ) -> Result<TypedValue, NarrowError> {
        let mut path = path.clone();
        self.narrow_at(ty, value, &mut path, 0)
    }

    fn narrow_at(
        &self,
        ty: &StructuralType,
        value: &TypedValue,
        path: &mut Path,
        depth: usize,
    ) -> Result<TypedValue, NarrowError> {
        if self.force_unknown.matches(path) || value.is_unknown() {
            return Ok(TypedValue::unknown(ty.clone()));
        }

        if value.ty() == ty && !self.force_unknown.reaches(path) {
            return Ok(value.clone());
        }

        if depth > self.max_depth {
            return Err(NarrowError::TooDeep {
                path: path.clone(),
                limit: self.max_depth,
            });
        }

        let Some(known) = value.as_known() else {
            // null under a different type carries nothing to keep
            return Ok(TypedValue::unknown(ty.clone()));
        };

        let target = match ty {
            StructuralType::Dynamic => value.ty(),
            other => other,
        };

        match (target, known) {
            (StructuralType::Scalar(_) | StructuralType::Dynamic, _) => {
                if value.ty() == target {
                    Ok(value.clone())
                } else {
                    Ok(TypedValue::unknown(ty.clone()))
                }
            }
            (StructuralType::Sequence(element), KnownValue::Sequence(items)) => {
                let children = self.narrow_items(items, |_| element.as_ref(), path, depth)?;
                Ok(TypedValue::known(
                    sequence_type(target, &children),
                    KnownValue::Sequence(children),
                ))
            }
            (StructuralType::Tuple(elements), KnownValue::Sequence(items)) => {
                let children = self.narrow_items(
                    items,
                    |index| elements.get(index).unwrap_or(&DYNAMIC),
                    path,
                    depth,
                )?;
                Ok(TypedValue::known(
                    sequence_type(target, &children),
                    KnownValue::Sequence(children),
                ))
            }
            (StructuralType::Mapping(element), KnownValue::Mapping(entries)) => {
                let mut children = IndexMap::with_capacity(entries.len());
                for (key, entry) in entries {
                    path.push(PathStep::Key(key.clone()));
                    let child = self.narrow_at(element, entry, path, depth + 1);
                    path.pop();
                    children.insert(key.clone(), child?);
                }
                Ok(TypedValue::known(
                    mapping_type(element, &children),
                    KnownValue::Mapping(children),
                ))
            }
            (StructuralType::Structured(fields), KnownValue::Mapping(entries)) => {
                let mut children = IndexMap::with_capacity(entries.len());
                for (name, entry) in entries {
                    let field_type = fields.get(name).unwrap_or(&DYNAMIC);
                    path.push(PathStep::Name(name.clone()));
                    let child = self.narrow_at(field_type, entry, path, depth + 1);
                    path.pop();
                    children.insert(name.clone(), child?);
                }
                Ok(TypedValue::known(
                    record_type(&children),
                    KnownValue::Mapping(children),
                ))
            }
            _ => Err(NarrowError::ShapeMismatch {
                path: path.clone(),
                expected: target.clone(),
                actual: value.ty().clone(),
            }),
        }
    }

    fn narrow_items<'t>(
        &self,
        items: &[TypedValue],
        element: impl Fn(usize) -> &'t StructuralType,
        path: &mut Path,
        depth: usize,
    ) -> Result<Vec<TypedValue>, NarrowError> {
        let mut children = Vec::with_capacity(items.len());
        for (index, item) in items.iter().enumerate() {
            path.push(PathStep::Index(index));
            let child = self.narrow_at(element(index), item, path, depth + 1);
            path.pop();
            children.push(child?);
        }
        Ok(children)
    }
}
