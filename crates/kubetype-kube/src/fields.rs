//! Field policies for objects returned by the API server
//!
//! A [`FieldPolicy`] is the pair of path sets applied when decoding server
//! responses: fields that are dropped because only the server manages them,
//! and fields forced to unknown because their value is not known until a
//! write completes.
//!
//! [`strip_server_side_fields`] is the imperative alternative that edits an
//! untyped object in place. Decoding never calls it; hosts opt in.

use kubetype_core::{DecodeMode, PathExpression, PathSet};
use serde_json::{Map, Value};

use crate::error::{KubeError, Result};

/// Metadata fields only the server sets
pub const SERVER_MANAGED_METADATA: &[&str] = &[
    "creationTimestamp",
    "deletionGracePeriodSeconds",
    "deletionTimestamp",
    "finalizers",
    "generateName",
    "generation",
    "managedFields",
    "minReadySeconds",
    "ownerReferences",
    "paused",
    "resourceVersion",
    "selfLink",
];

/// Top-level fields only the server sets
pub const SERVER_MANAGED_FIELDS: &[&str] = &["status"];

/// Metadata fields removed by [`strip_server_side_fields`]
const STRIPPED_METADATA: &[&str] = &["creationTimestamp", "generation", "resourceVersion", "selfLink"];

/// Ignore and unknown path sets plus the decode mode
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FieldPolicy {
    pub ignore: PathSet,
    pub unknown: PathSet,
    pub mode: DecodeMode,
}

impl FieldPolicy {
    /// Policy with nothing ignored and nothing unknown
    pub fn new() -> Self {
        Self::default()
    }

    /// Drop every server-managed field
    pub fn server_managed() -> Self {
        let mut ignore: PathSet = SERVER_MANAGED_METADATA
            .iter()
            .map(|field| PathExpression::root().name("metadata").name(*field))
            .collect();
        ignore.extend(
            SERVER_MANAGED_FIELDS
                .iter()
                .map(|field| PathExpression::root().name(*field)),
        );

        Self {
            ignore,
            ..Self::default()
        }
    }

    /// Policy for an object computed before it is written
    ///
    /// Annotations may be filled in by admission webhooks, so they are
    /// unknown; the uid is unknown only until the object is created. Every
    /// declared field appears in the result.
    pub fn planned(creating: bool) -> Self {
        let mut policy = Self::server_managed()
            .with_unknown(PathExpression::root().name("metadata").name("annotations"))
            .with_mode(DecodeMode::DeclaredComplete);

        if creating {
            policy = policy.with_unknown(PathExpression::root().name("metadata").name("uid"));
        }

        policy
    }

    pub fn with_ignore(mut self, expression: PathExpression) -> Self {
        self.ignore.push(expression);
        self
    }

    pub fn with_unknown(mut self, expression: PathExpression) -> Self {
        self.unknown.push(expression);
        self
    }

    pub fn with_mode(mut self, mode: DecodeMode) -> Self {
        self.mode = mode;
        self
    }

    /// Add the other policy's paths to this one
    ///
    /// The mode of `other` wins.
    pub fn merge(mut self, other: &FieldPolicy) -> Self {
        self.ignore.extend(other.ignore.iter().cloned());
        self.unknown.extend(other.unknown.iter().cloned());
        self.mode = other.mode;
        self
    }
}

/// What [`strip_server_side_fields`] removes besides server-only metadata
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StripOptions {
    /// Remove labels not present in the manifest
    pub labels: bool,
    /// Remove annotations not present in the manifest
    pub annotations: bool,
}

/// Remove server-side fields from an object read back from the server
///
/// Server-only metadata and `status` are removed. Managed-field entries are
/// kept only when they belong to `manager` with operation `Update`, minus
/// their `time`. Labels and annotations absent from `manifest` are removed
/// when the options ask for it.
pub fn strip_server_side_fields(
    manager: &str,
    manifest: &Map<String, Value>,
    object: &mut Map<String, Value>,
    options: StripOptions,
) -> Result<()> {
    let meta = match object.get_mut("metadata") {
        Some(Value::Object(meta)) => meta,
        other => {
            return Err(KubeError::InvalidManifest(format!(
                "expected metadata field, got {}",
                describe(other.map(|v| &*v))
            )));
        }
    };

    // entries are checked before anything is removed, so a rejected
    // object is left as it was
    let managed_fields = match meta.get("managedFields") {
        Some(Value::Array(entries)) => Some(owned_managed_fields(manager, entries)?),
        _ => None,
    };

    for field in STRIPPED_METADATA {
        meta.remove(*field);
    }

    if options.labels {
        retain_manifest_keys(meta, manifest, "labels");
    }

    if options.annotations {
        retain_manifest_keys(meta, manifest, "annotations");
    }

    if let Some(kept) = managed_fields {
        meta.insert("managedFields".to_string(), Value::Array(kept));
    }

    for field in SERVER_MANAGED_FIELDS {
        object.remove(*field);
    }

    Ok(())
}

/// Update entries written by `manager`, without their timestamps
fn owned_managed_fields(manager: &str, entries: &[Value]) -> Result<Vec<Value>> {
    let mut kept = Vec::with_capacity(1);
    for entry in entries {
        let Value::Object(entry) = entry else {
            return Err(KubeError::InvalidManifest(format!(
                "expected managedFields entry, got {}",
                describe(Some(entry))
            )));
        };

        let owned = entry.get("manager").and_then(Value::as_str) == Some(manager)
            && entry.get("operation").and_then(Value::as_str) == Some("Update");
        if owned {
            let mut entry = entry.clone();
            entry.remove("time");
            kept.push(Value::Object(entry));
        }
    }
    Ok(kept)
}

fn retain_manifest_keys(meta: &mut Map<String, Value>, manifest: &Map<String, Value>, field: &str) {
    let Some(Value::Object(current)) = meta.get_mut(field) else {
        return;
    };

    let source = manifest
        .get("metadata")
        .and_then(|m| m.get(field))
        .and_then(Value::as_object);

    current.retain(|key, _| source.is_some_and(|s| s.contains_key(key)));
}

fn describe(value: Option<&Value>) -> &'static str {
    match value {
        None => "nothing",
        Some(Value::Null) => "null",
        Some(Value::Bool(_)) => "a bool",
        Some(Value::Number(_)) => "a number",
        Some(Value::String(_)) => "a string",
        Some(Value::Array(_)) => "a list",
        Some(Value::Object(_)) => "an object",
    }
}
