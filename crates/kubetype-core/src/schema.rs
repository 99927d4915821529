//! OpenAPI schema representation
//!
//! This module provides structured types for the subset of OpenAPI v3
//! schemas that determine the shape of a resource: type tags, properties,
//! items, additional properties, compositions, references and the
//! Kubernetes vendor extensions.

use indexmap::IndexMap;
use serde_json::Value;
use std::collections::BTreeMap;

use crate::error::SchemaError;

/// Vendor extension marking a node as accepting integers or strings
pub const EXT_INT_OR_STRING: &str = "x-kubernetes-int-or-string";

/// Vendor extension marking a node as accepting arbitrary content
pub const EXT_PRESERVE_UNKNOWN_FIELDS: &str = "x-kubernetes-preserve-unknown-fields";

/// Vendor extension associating a schema with resource kinds
pub const EXT_GROUP_VERSION_KIND: &str = "x-kubernetes-group-version-kind";

/// Either an inline schema or a `$ref` to a named component
#[derive(Debug, Clone, PartialEq)]
pub enum SchemaRef {
    Inline(SchemaNode),
    Reference(String),
}

impl SchemaRef {
    pub fn reference(name: &str) -> Self {
        Self::Reference(format!("#/components/schemas/{}", name))
    }
}

impl From<SchemaNode> for SchemaRef {
    fn from(node: SchemaNode) -> Self {
        Self::Inline(node)
    }
}

/// Schema for a single node
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SchemaNode {
    /// Type tags, as written in the source
    pub types: Vec<String>,
    /// Format hint (e.g., "int-or-string", "date-time")
    pub format: Option<String>,
    /// Human-readable description
    pub description: Option<String>,
    /// Whether null is allowed
    pub nullable: bool,
    /// Declared object properties, in schema order
    pub properties: Option<IndexMap<String, SchemaRef>>,
    /// Array item schema
    pub items: Option<Box<SchemaRef>>,
    /// Additional properties for objects
    pub additional_properties: Option<AdditionalProperties>,
    pub one_of: Vec<SchemaRef>,
    pub any_of: Vec<SchemaRef>,
    pub all_of: Vec<SchemaRef>,
    /// `x-*` vendor extensions
    pub extensions: BTreeMap<String, Value>,
}

impl SchemaNode {
    /// Create a node with a single type tag
    pub fn typed(tag: &str) -> Self {
        Self {
            types: vec![tag.to_string()],
            ..Default::default()
        }
    }

    pub fn string() -> Self {
        Self::typed("string")
    }

    pub fn integer() -> Self {
        Self::typed("integer")
    }

    pub fn number() -> Self {
        Self::typed("number")
    }

    pub fn boolean() -> Self {
        Self::typed("boolean")
    }

    /// Create an array node with an item schema
    pub fn array(items: impl Into<SchemaRef>) -> Self {
        Self {
            items: Some(Box::new(items.into())),
            ..Self::typed("array")
        }
    }

    /// Create an object node with properties, in the given order
    pub fn object<I, K>(properties: I) -> Self
    where
        I: IntoIterator<Item = (K, SchemaRef)>,
        K: Into<String>,
    {
        Self {
            properties: Some(properties.into_iter().map(|(k, v)| (k.into(), v)).collect()),
            ..Self::typed("object")
        }
    }

    /// Create an object node whose values all follow one schema
    pub fn map(values: impl Into<SchemaRef>) -> Self {
        Self {
            additional_properties: Some(AdditionalProperties::Schema(Box::new(values.into()))),
            ..Self::typed("object")
        }
    }

    /// Canonical type tag: tags sorted and joined with `-`
    ///
    /// Empty when the node has no type.
    pub fn type_tag(&self) -> String {
        let mut tags: Vec<&str> = self.types.iter().map(String::as_str).collect();
        tags.sort_unstable();
        tags.join("-")
    }

    pub fn extension(&self, name: &str) -> Option<&Value> {
        self.extensions.get(name)
    }

    fn extension_flag(&self, name: &str) -> bool {
        self.extension(name).and_then(Value::as_bool).unwrap_or(false)
    }

    /// Whether the node accepts both integers and strings
    pub fn is_int_or_string(&self) -> bool {
        matches!(
            self.format.as_deref(),
            Some("int-or-string") | Some("integer-or-string")
        ) || self.extension_flag(EXT_INT_OR_STRING)
    }

    pub fn preserves_unknown_fields(&self) -> bool {
        self.extension_flag(EXT_PRESERVE_UNKNOWN_FIELDS)
    }

    /// Check if this node declares any properties
    pub fn has_properties(&self) -> bool {
        self.properties.as_ref().is_some_and(|p| !p.is_empty())
    }
}

/// Additional properties configuration for objects
#[derive(Debug, Clone, PartialEq, Default)]
pub enum AdditionalProperties {
    /// Additional properties are allowed (any type)
    #[default]
    Allowed,
    /// Additional properties are not allowed
    Denied,
    /// Additional properties must match a schema
    Schema(Box<SchemaRef>),
}

/// Named component schemas of an OpenAPI document
///
/// Resolves `$ref` strings of the form `#/components/schemas/<name>` (and
/// the Swagger 2 `#/definitions/<name>`).
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SchemaDocument {
    schemas: IndexMap<String, SchemaNode>,
}

impl SchemaDocument {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, name: impl Into<String>, node: SchemaNode) {
        self.schemas.insert(name.into(), node);
    }

    pub fn with(mut self, name: impl Into<String>, node: SchemaNode) -> Self {
        self.insert(name, node);
        self
    }

    pub fn get(&self, name: &str) -> Option<&SchemaNode> {
        self.schemas.get(name)
    }

    pub fn len(&self) -> usize {
        self.schemas.len()
    }

    pub fn is_empty(&self) -> bool {
        self.schemas.is_empty()
    }

    /// Iterate over `(name, schema)` pairs in document order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &SchemaNode)> {
        self.schemas.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Resolve a `$ref` string to its component schema
    pub fn resolve(&self, reference: &str) -> Result<&SchemaNode, SchemaError> {
        reference
            .strip_prefix("#/components/schemas/")
            .or_else(|| reference.strip_prefix("#/definitions/"))
            .and_then(|name| self.schemas.get(name))
            .ok_or_else(|| SchemaError::UnresolvedReference(reference.to_string()))
    }
}
