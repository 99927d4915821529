//! OpenAPI schema parser
//!
//! Parses OpenAPI v3 documents (JSON or YAML) into [`SchemaDocument`] and
//! single schema objects into [`SchemaNode`].

use serde_json::Value;

use crate::error::{Result, SchemaError};
use crate::schema::{AdditionalProperties, SchemaDocument, SchemaNode, SchemaRef};

/// Parser for OpenAPI schema documents
pub struct SchemaParser;

impl SchemaParser {
    /// Parse a JSON OpenAPI document
    pub fn document_from_json(json: &str) -> Result<SchemaDocument> {
        let value: Value = serde_json::from_str(json)?;
        Ok(Self::parse_document(&value)?)
    }

    /// Parse a YAML OpenAPI document
    pub fn document_from_yaml(yaml: &str) -> Result<SchemaDocument> {
        let value: Value = serde_yaml::from_str(yaml)?;
        Ok(Self::parse_document(&value)?)
    }

    /// Parse a single JSON schema object
    pub fn node_from_json(json: &str) -> Result<SchemaNode> {
        let value: Value = serde_json::from_str(json)?;
        Ok(Self::parse_node(&value)?)
    }

    /// Parse a single YAML schema object
    pub fn node_from_yaml(yaml: &str) -> Result<SchemaNode> {
        let value: Value = serde_yaml::from_str(yaml)?;
        Ok(Self::parse_node(&value)?)
    }

    /// Parse the component schemas of a document
    ///
    /// Reads `components.schemas` (OpenAPI v3), falling back to
    /// `definitions` (Swagger 2).
    pub fn parse_document(value: &Value) -> std::result::Result<SchemaDocument, SchemaError> {
        let (schemas, base) = match value.pointer("/components/schemas") {
            Some(schemas) => (schemas, "#/components/schemas"),
            None => match value.get("definitions") {
                Some(schemas) => (schemas, "#/definitions"),
                None => {
                    return Err(SchemaError::InvalidNode {
                        location: "#".to_string(),
                        message: "missing 'components.schemas'".to_string(),
                    });
                }
            },
        };

        let schemas = schemas.as_object().ok_or_else(|| SchemaError::InvalidNode {
            location: base.to_string(),
            message: "expected an object".to_string(),
        })?;

        let mut document = SchemaDocument::new();
        for (name, schema) in schemas {
            let location = format!("{}/{}", base, name);
            document.insert(name.clone(), Self::parse_at(schema, &location)?);
        }

        tracing::debug!(schemas = document.len(), "parsed schema document");
        Ok(document)
    }

    /// Parse a schema object (recursive)
    pub fn parse_node(value: &Value) -> std::result::Result<SchemaNode, SchemaError> {
        Self::parse_at(value, "#")
    }

    fn parse_at(value: &Value, location: &str) -> std::result::Result<SchemaNode, SchemaError> {
        let obj = value
            .as_object()
            .ok_or_else(|| invalid(location, "expected a schema object"))?;

        let types = match obj.get("type") {
            None | Some(Value::Null) => Vec::new(),
            Some(Value::String(tag)) => vec![tag.clone()],
            Some(Value::Array(tags)) => tags
                .iter()
                .map(|t| {
                    t.as_str()
                        .map(String::from)
                        .ok_or_else(|| invalid(location, "type list must hold strings"))
                })
                .collect::<std::result::Result<_, _>>()?,
            Some(_) => return Err(invalid(location, "type must be a string or a list")),
        };

        let format = obj.get("format").and_then(Value::as_str).map(String::from);

        let description = obj
            .get("description")
            .and_then(Value::as_str)
            .map(String::from);

        let nullable = obj
            .get("nullable")
            .and_then(Value::as_bool)
            .unwrap_or(false);

        let properties = match obj.get("properties") {
            None => None,
            Some(Value::Object(props)) => Some(
                props
                    .iter()
                    .map(|(k, v)| {
                        let at = format!("{}/properties/{}", location, k);
                        Self::parse_ref(v, &at).map(|r| (k.clone(), r))
                    })
                    .collect::<std::result::Result<_, _>>()?,
            ),
            Some(_) => return Err(invalid(location, "properties must be an object")),
        };

        // Only a schema object describes items; booleans and tuple forms
        // leave the element type open.
        let items = match obj.get("items") {
            Some(items @ Value::Object(_)) => Some(Box::new(Self::parse_ref(
                items,
                &format!("{}/items", location),
            )?)),
            _ => None,
        };

        let additional_properties = match obj.get("additionalProperties") {
            None => None,
            Some(Value::Bool(true)) => Some(AdditionalProperties::Allowed),
            Some(Value::Bool(false)) => Some(AdditionalProperties::Denied),
            Some(schema @ Value::Object(_)) => Some(AdditionalProperties::Schema(Box::new(
                Self::parse_ref(schema, &format!("{}/additionalProperties", location))?,
            ))),
            Some(_) => {
                return Err(invalid(
                    location,
                    "additionalProperties must be a boolean or a schema",
                ));
            }
        };

        let one_of = Self::parse_composition(obj.get("oneOf"), location, "oneOf")?;
        let any_of = Self::parse_composition(obj.get("anyOf"), location, "anyOf")?;
        let all_of = Self::parse_composition(obj.get("allOf"), location, "allOf")?;

        let extensions = obj
            .iter()
            .filter(|(k, _)| k.starts_with("x-"))
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect();

        Ok(SchemaNode {
            types,
            format,
            description,
            nullable,
            properties,
            items,
            additional_properties,
            one_of,
            any_of,
            all_of,
            extensions,
        })
    }

    /// Parse a schema position that may hold a `$ref`
    fn parse_ref(value: &Value, location: &str) -> std::result::Result<SchemaRef, SchemaError> {
        match value.get("$ref") {
            Some(Value::String(reference)) => Ok(SchemaRef::Reference(reference.clone())),
            Some(_) => Err(invalid(location, "$ref must be a string")),
            None => Self::parse_at(value, location).map(SchemaRef::Inline),
        }
    }

    fn parse_composition(
        value: Option<&Value>,
        location: &str,
        keyword: &str,
    ) -> std::result::Result<Vec<SchemaRef>, SchemaError> {
        match value {
            None => Ok(Vec::new()),
            Some(Value::Array(alternatives)) => alternatives
                .iter()
                .enumerate()
                .map(|(i, alt)| Self::parse_ref(alt, &format!("{}/{}/{}", location, keyword, i)))
                .collect(),
            Some(_) => Err(invalid(location, &format!("{} must be a list", keyword))),
        }
    }
}

fn invalid(location: &str, message: &str) -> SchemaError {
    SchemaError::InvalidNode {
        location: location.to_string(),
        message: message.to_string(),
    }
}
