//! Schema lookup in OpenAPI documents
//!
//! The API server publishes one OpenAPI v3 document per group version.
//! Component schemas describing a top-level resource carry the
//! `x-kubernetes-group-version-kind` extension, which is how a schema is
//! found for a given kind.

use kube::core::GroupVersionKind;
use kubetype_core::schema::EXT_GROUP_VERSION_KIND;
use kubetype_core::{SchemaDocument, SchemaNode, SchemaParser};
use serde_json::Value;
use std::path::Path;

use crate::error::{KubeError, Result};
use crate::gvk::display_gvk;

/// Load an OpenAPI document from a JSON or YAML file
pub fn load_document(path: &Path) -> Result<SchemaDocument> {
    let content = std::fs::read_to_string(path)?;
    let is_json = path
        .extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));

    let document = if is_json {
        SchemaParser::document_from_json(&content)?
    } else {
        SchemaParser::document_from_yaml(&content)?
    };

    tracing::debug!(path = %path.display(), schemas = document.len(), "loaded OpenAPI document");
    Ok(document)
}

/// Find the component schema describing `gvk`
///
/// Only schemas whose extension names exactly one group/version/kind are
/// considered; list and option types that apply to many kinds are skipped.
pub fn find_schema<'d>(
    document: &'d SchemaDocument,
    gvk: &GroupVersionKind,
) -> Result<(&'d str, &'d SchemaNode)> {
    for (name, node) in document.iter() {
        let Some(extension) = node.extension(EXT_GROUP_VERSION_KIND) else {
            continue;
        };

        let Some(entries) = extension.as_array() else {
            tracing::warn!(schema = name, "ignoring malformed {}", EXT_GROUP_VERSION_KIND);
            continue;
        };

        if let [entry] = entries.as_slice() {
            if entry_matches(entry, gvk) {
                tracing::debug!(schema = name, gvk = %display_gvk(gvk), "found schema");
                return Ok((name, node));
            }
        }
    }

    Err(KubeError::SchemaNotFound {
        gvk: display_gvk(gvk),
    })
}

fn entry_matches(entry: &Value, gvk: &GroupVersionKind) -> bool {
    let field = |name: &str| entry.get(name).and_then(Value::as_str).unwrap_or_default();

    field("group") == gvk.group && field("version") == gvk.version && field("kind") == gvk.kind
}
