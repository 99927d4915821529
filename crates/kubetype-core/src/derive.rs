//! Structural type derivation from schema nodes
//!
//! | schema                                   | structural type        |
//! |------------------------------------------|------------------------|
//! | `integer`, `number`                      | `Scalar(number)`       |
//! | `boolean`                                | `Scalar(bool)`         |
//! | `string`                                 | `Scalar(string)`       |
//! | `array` with `items`                     | `Sequence(items)`      |
//! | `array` without `items`                  | `Sequence(Dynamic)`    |
//! | `object` with `properties`               | `Structured(fields)`   |
//! | `object` with `additionalProperties`     | `Mapping(values)`      |
//! | `object` with neither                    | `Structured({})`       |
//! | untyped, int-or-string                   | `Dynamic`              |
//! | untyped, preserve-unknown-fields         | `Dynamic`              |
//! | untyped, `oneOf`/`anyOf` with 2+ options | `Dynamic`              |
//! | untyped, `allOf` with one entry          | that entry             |
//!
//! Everything else is a [`SchemaError`].

use crate::error::SchemaError;
use crate::schema::{AdditionalProperties, SchemaDocument, SchemaNode, SchemaRef};
use crate::types::{Fields, StructuralType};

/// Default limit on schema nesting
pub const DEFAULT_SCHEMA_DEPTH: usize = 128;

/// Derive the structural type of a self-contained schema node
///
/// Any `$ref` inside `node` is an error; use [`TypeDeriver::with_document`]
/// to resolve references.
pub fn derive(node: &SchemaNode) -> Result<StructuralType, SchemaError> {
    TypeDeriver::new().derive(node)
}

/// Derives structural types, resolving references through a document
#[derive(Debug, Clone, Copy)]
pub struct TypeDeriver<'a> {
    document: Option<&'a SchemaDocument>,
    max_depth: usize,
}

impl Default for TypeDeriver<'_> {
    fn default() -> Self {
        Self::new()
    }
}

impl<'a> TypeDeriver<'a> {
    pub fn new() -> Self {
        Self {
            document: None,
            max_depth: DEFAULT_SCHEMA_DEPTH,
        }
    }

    pub fn with_document(document: &'a SchemaDocument) -> Self {
        Self {
            document: Some(document),
            max_depth: DEFAULT_SCHEMA_DEPTH,
        }
    }

    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    pub fn derive(&self, node: &SchemaNode) -> Result<StructuralType, SchemaError> {
        let mut active = Vec::new();
        self.derive_node(node, &mut active, 0)
    }

    /// Derive the type of a schema position, inline or referenced
    pub fn derive_ref(&self, schema: &SchemaRef) -> Result<StructuralType, SchemaError> {
        let mut active = Vec::new();
        self.derive_schema(schema, &mut active, 0)
    }

    fn derive_schema(
        &self,
        schema: &SchemaRef,
        active: &mut Vec<String>,
        depth: usize,
    ) -> Result<StructuralType, SchemaError> {
        match schema {
            SchemaRef::Inline(node) => self.derive_node(node, active, depth),
            SchemaRef::Reference(reference) => {
                // a schema that contains itself has no finite shape
                if active.iter().any(|r| r == reference) {
                    tracing::debug!(%reference, "recursive schema reference, deriving dynamic");
                    return Ok(StructuralType::Dynamic);
                }

                let document = self
                    .document
                    .ok_or_else(|| SchemaError::UnresolvedReference(reference.clone()))?;
                let node = document.resolve(reference)?;

                tracing::trace!(%reference, "deriving referenced schema");
                active.push(reference.clone());
                let derived = self.derive_node(node, active, depth);
                active.pop();
                derived
            }
        }
    }

    fn derive_node(
        &self,
        node: &SchemaNode,
        active: &mut Vec<String>,
        depth: usize,
    ) -> Result<StructuralType, SchemaError> {
        if depth > self.max_depth {
            return Err(SchemaError::TooDeep {
                limit: self.max_depth,
            });
        }

        match node.type_tag().as_str() {
            "integer" | "number" => Ok(StructuralType::number()),
            "boolean" => Ok(StructuralType::bool()),
            "string" => Ok(StructuralType::string()),
            "array" => match &node.items {
                Some(items) => Ok(StructuralType::sequence(
                    self.derive_schema(items, active, depth + 1)?,
                )),
                None => Ok(StructuralType::sequence(StructuralType::Dynamic)),
            },
            "object" => self.derive_object(node, active, depth),
            "" => self.derive_untyped(node, active, depth),
            other => Err(SchemaError::UnsupportedType(other.to_string())),
        }
    }

    fn derive_object(
        &self,
        node: &SchemaNode,
        active: &mut Vec<String>,
        depth: usize,
    ) -> Result<StructuralType, SchemaError> {
        if let Some(properties) = &node.properties {
            let mut fields = Fields::with_capacity(properties.len());
            for (name, schema) in properties {
                fields.insert(name.clone(), self.derive_schema(schema, active, depth + 1)?);
            }
            return Ok(StructuralType::Structured(fields));
        }

        if let Some(AdditionalProperties::Schema(values)) = &node.additional_properties {
            return Ok(StructuralType::mapping(
                self.derive_schema(values, active, depth + 1)?,
            ));
        }

        Ok(StructuralType::unshaped())
    }

    fn derive_untyped(
        &self,
        node: &SchemaNode,
        active: &mut Vec<String>,
        depth: usize,
    ) -> Result<StructuralType, SchemaError> {
        if node.is_int_or_string() || node.preserves_unknown_fields() {
            return Ok(StructuralType::Dynamic);
        }

        if node.one_of.len() > 1 || node.any_of.len() > 1 {
            return Ok(StructuralType::Dynamic);
        }

        if let [single] = node.all_of.as_slice() {
            return self.derive_schema(single, active, depth + 1);
        }

        Err(SchemaError::Untyped)
    }
}
