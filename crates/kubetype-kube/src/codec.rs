//! Resource codec
//!
//! [`ResourceCodec`] is the context value a host creates once per
//! configuration: it owns the OpenAPI document and the field policy and
//! types objects read from, or about to be written to, the API server.

use kube::core::{DynamicObject, ObjectList, TypeMeta};
use kubetype_core::{
    DEFAULT_MAX_DEPTH, DecodeMode, Decoder, Path, SchemaDocument, StructuralType, TypeDeriver,
    TypedValue, encode_object, unknown_paths,
};
use serde_json::{Map, Value};

use crate::config::PolicyConfig;
use crate::error::{KubeError, Result};
use crate::fields::FieldPolicy;
use crate::gvk::{gvk_of, parse_gvk};
use crate::openapi::find_schema;

/// Flatten a list response into untyped objects
///
/// List responses usually omit `apiVersion` and `kind` on their items; those
/// are filled in from the list's own type, e.g. `DeploymentList` items become
/// `Deployment`.
pub fn list_items(list: &ObjectList<DynamicObject>) -> Result<Vec<Value>> {
    let item_types = list
        .types
        .kind
        .strip_suffix("List")
        .filter(|kind| !kind.is_empty())
        .map(|kind| TypeMeta {
            api_version: list.types.api_version.clone(),
            kind: kind.to_string(),
        });

    list.items
        .iter()
        .map(|item| {
            if item.types.is_some() || item_types.is_none() {
                return serde_json::to_value(item).map_err(KubeError::from);
            }
            let mut item = item.clone();
            item.types = item_types.clone();
            serde_json::to_value(&item).map_err(KubeError::from)
        })
        .collect()
}

/// Read an untyped value as a list response
///
/// Returns `None` when the value is a single object rather than a `*List`.
pub fn parse_list(value: &Value) -> Result<Option<ObjectList<DynamicObject>>> {
    let is_list = value
        .get("kind")
        .and_then(Value::as_str)
        .is_some_and(|kind| kind.ends_with("List"))
        && value.get("items").is_some_and(Value::is_array);

    if !is_list {
        return Ok(None);
    }

    let list = serde_json::from_value(value.clone())?;
    Ok(Some(list))
}

/// Schema-aware codec for Kubernetes objects
#[derive(Debug, Clone)]
pub struct ResourceCodec {
    document: SchemaDocument,
    policy: FieldPolicy,
    max_depth: usize,
}

impl ResourceCodec {
    /// Codec dropping the server-managed fields
    pub fn new(document: SchemaDocument) -> Self {
        Self {
            document,
            policy: FieldPolicy::server_managed(),
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }

    /// Codec using the policy described by a configuration file
    pub fn from_config(document: SchemaDocument, config: &PolicyConfig) -> Self {
        Self {
            document,
            policy: config.field_policy(),
            max_depth: config.max_depth,
        }
    }

    pub fn with_policy(mut self, policy: FieldPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    pub fn document(&self) -> &SchemaDocument {
        &self.document
    }

    pub fn policy(&self) -> &FieldPolicy {
        &self.policy
    }

    /// Structural type of a resource kind
    pub fn type_for(&self, api_version: &str, kind: &str) -> Result<StructuralType> {
        let gvk = parse_gvk(api_version, kind)?;
        let (name, schema) = find_schema(&self.document, &gvk)?;
        tracing::debug!(schema = name, "deriving resource type");
        Ok(TypeDeriver::with_document(&self.document).derive(schema)?)
    }

    fn type_of(&self, object: &Value) -> Result<StructuralType> {
        let gvk = gvk_of(object)?;
        self.type_for(&gvk.api_version(), &gvk.kind)
    }

    /// Decode an object read from the server with the codec's policy
    pub fn decode_object(&self, object: &Value) -> Result<TypedValue> {
        let ty = self.type_of(object)?;
        self.decode_with(&self.policy, &ty, object)
    }

    /// Decode every item of a list response
    pub fn decode_list(&self, list: &ObjectList<DynamicObject>) -> Result<Vec<TypedValue>> {
        list_items(list)?
            .iter()
            .map(|item| self.decode_object(item))
            .collect()
    }

    /// Decode the server's answer to a dry-run apply as a planned object
    ///
    /// Fields the server fills in on write are unknown, and every declared
    /// field appears so the plan exposes the full shape of the resource.
    pub fn plan_object(&self, object: &Value, creating: bool) -> Result<TypedValue> {
        let ty = self.type_of(object)?;
        let policy = self.policy.clone().merge(&FieldPolicy::planned(creating));
        self.decode_with(&policy, &ty, object)
    }

    fn decode_with(
        &self,
        policy: &FieldPolicy,
        ty: &StructuralType,
        object: &Value,
    ) -> Result<TypedValue> {
        let decoded = Decoder::new(&policy.ignore, &policy.unknown)
            .with_mode(policy.mode)
            .with_max_depth(self.max_depth)
            .decode(ty, object, &Path::root())?;

        decoded.ok_or_else(|| KubeError::InvalidManifest("the whole object is ignored".to_string()))
    }

    /// Encode a typed manifest for the resource store
    ///
    /// Fails with every unknown path when the manifest is not fully known.
    pub fn encode_manifest(&self, manifest: &TypedValue) -> Result<Map<String, Value>> {
        let unknown = unknown_paths(manifest);
        if !unknown.is_empty() {
            return Err(KubeError::UnknownValues {
                paths: unknown.iter().map(ToString::to_string).collect(),
            });
        }

        let object = encode_object(manifest)?;
        if object.is_empty() {
            return Err(KubeError::InvalidManifest("manifest is empty".to_string()));
        }
        Ok(object)
    }

    /// Decode mode in effect for `decode_object`
    pub fn mode(&self) -> DecodeMode {
        self.policy.mode
    }
}
