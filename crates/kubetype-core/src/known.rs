//! Knowledge classification

use crate::path::{Path, PathStep};
use crate::types::StructuralType;
use crate::value::{KnownValue, TypedValue};

/// Whether no node of the tree is unknown
///
/// Walks an explicit stack, so arbitrarily deep trees are safe.
pub fn is_fully_known(value: &TypedValue) -> bool {
    let mut pending = vec![value];

    while let Some(node) = pending.pop() {
        if node.is_unknown() {
            return false;
        }
        match node.as_known() {
            Some(KnownValue::Sequence(items)) => pending.extend(items),
            Some(KnownValue::Mapping(entries)) => pending.extend(entries.values()),
            _ => {}
        }
    }

    true
}

/// Paths of every unknown node, in document order
///
/// Entries of a `Mapping`-typed node are addressed by key, fields of any
/// other object by name, matching the paths the encoder reports.
pub fn unknown_paths(value: &TypedValue) -> Vec<Path> {
    let mut found = Vec::new();
    let mut pending = vec![(value, Path::root())];

    while let Some((node, path)) = pending.pop() {
        if node.is_unknown() {
            found.push(path);
            continue;
        }
        match node.as_known() {
            Some(KnownValue::Sequence(items)) => {
                for (index, item) in items.iter().enumerate().rev() {
                    let mut child = path.clone();
                    child.push(PathStep::Index(index));
                    pending.push((item, child));
                }
            }
            Some(KnownValue::Mapping(entries)) => {
                let keyed = matches!(node.ty(), StructuralType::Mapping(_));
                for (name, entry) in entries.iter().rev() {
                    let mut child = path.clone();
                    child.push(if keyed {
                        PathStep::Key(name.clone())
                    } else {
                        PathStep::Name(name.clone())
                    });
                    pending.push((entry, child));
                }
            }
            _ => {}
        }
    }

    found
}
