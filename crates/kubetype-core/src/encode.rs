//! Encoding typed value trees back into untyped data
//!
//! Encoding never consults a schema: the typed tree carries everything
//! needed. Unknown nodes cannot be encoded, so callers check
//! [`is_fully_known`](crate::known::is_fully_known) first.

use serde_json::{Map, Value};

use crate::error::EncodeError;
use crate::path::{Path, PathStep};
use crate::types::StructuralType;
use crate::value::{KnownValue, TypedValue, ValueKind, ValueState};

/// Encode a typed tree into untyped data
pub fn encode(value: &TypedValue) -> Result<Value, EncodeError> {
    let mut path = Path::root();
    encode_at(value, &mut path)
}

/// Encode a typed tree that must be a mapping at the root
pub fn encode_object(value: &TypedValue) -> Result<Map<String, Value>, EncodeError> {
    match encode(value)? {
        Value::Object(entries) => Ok(entries),
        other => Err(EncodeError::NotAnObject {
            actual: ValueKind::of(&other).to_string(),
        }),
    }
}

fn encode_at(value: &TypedValue, path: &mut Path) -> Result<Value, EncodeError> {
    let known = match value.state() {
        ValueState::Null => return Ok(Value::Null),
        ValueState::Unknown => {
            return Err(EncodeError::UnknownValue { path: path.clone() });
        }
        ValueState::Known(known) => known,
    };

    match known {
        KnownValue::Number(n) => Ok(Value::Number(n.clone())),
        KnownValue::Bool(b) => Ok(Value::Bool(*b)),
        KnownValue::String(s) => Ok(Value::String(s.clone())),
        KnownValue::Sequence(items) => {
            let mut encoded = Vec::with_capacity(items.len());
            for (index, item) in items.iter().enumerate() {
                path.push(PathStep::Index(index));
                let item = encode_at(item, path);
                path.pop();
                encoded.push(item?);
            }
            Ok(Value::Array(encoded))
        }
        KnownValue::Mapping(entries) => {
            let keyed = matches!(value.ty(), StructuralType::Mapping(_));
            let mut encoded = Map::with_capacity(entries.len());
            for (name, child) in entries {
                path.push(if keyed {
                    PathStep::Key(name.clone())
                } else {
                    PathStep::Name(name.clone())
                });
                let child = encode_at(child, path);
                path.pop();
                encoded.insert(name.clone(), child?);
            }
            Ok(Value::Object(encoded))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_encode_scalars() {
        assert_eq!(encode(&TypedValue::string("x")), Ok(json!("x")));
        assert_eq!(encode(&TypedValue::bool(false)), Ok(json!(false)));
        assert_eq!(encode(&TypedValue::number(-4)), Ok(json!(-4)));
        assert_eq!(
            encode(&TypedValue::null(StructuralType::string())),
            Ok(Value::Null)
        );
    }

    #[test]
    fn test_encode_nested() {
        let value = TypedValue::object([
            ("name", TypedValue::string("web")),
            (
                "ports",
                TypedValue::list(
                    StructuralType::number(),
                    vec![TypedValue::number(80), TypedValue::number(443)],
                ),
            ),
            (
                "labels",
                TypedValue::map(StructuralType::string(), [("app", TypedValue::string("web"))]),
            ),
            ("owner", TypedValue::null(StructuralType::Dynamic)),
        ]);

        assert_eq!(
            encode(&value),
            Ok(json!({
                "name": "web",
                "ports": [80, 443],
                "labels": {"app": "web"},
                "owner": null
            }))
        );
    }

    #[test]
    fn test_unknown_names_its_path() {
        let value = TypedValue::object([(
            "spec",
            TypedValue::object([(
                "containers",
                TypedValue::tuple(vec![TypedValue::object([
                    ("name", TypedValue::string("app")),
                    ("image", TypedValue::unknown(StructuralType::string())),
                ])]),
            )]),
        )]);

        let err = encode(&value).unwrap_err();
        assert_eq!(
            err,
            EncodeError::UnknownValue {
                path: Path::root()
                    .at_name("spec")
                    .at_name("containers")
                    .at_index(0)
                    .at_name("image"),
            }
        );
        insta::assert_snapshot!(
            err.to_string(),
            @"spec.containers[0].image: cannot encode an unknown value"
        );
    }

    #[test]
    fn test_unknown_map_entry_uses_key_step() {
        let value = TypedValue::map(
            StructuralType::string(),
            [("example.com/hash", TypedValue::unknown(StructuralType::string()))],
        );

        assert_eq!(
            encode(&value),
            Err(EncodeError::UnknownValue {
                path: Path::root().at_key("example.com/hash"),
            })
        );
    }

    #[test]
    fn test_unknown_root() {
        assert_eq!(
            encode(&TypedValue::unknown(StructuralType::Dynamic)),
            Err(EncodeError::UnknownValue { path: Path::root() })
        );
    }

    #[test]
    fn test_encode_object() {
        let value = TypedValue::object([("kind", TypedValue::string("Pod"))]);
        let entries = encode_object(&value).unwrap();
        assert_eq!(entries.get("kind"), Some(&json!("Pod")));

        assert_eq!(
            encode_object(&TypedValue::string("Pod")),
            Err(EncodeError::NotAnObject {
                actual: "string".to_string()
            })
        );
        assert!(encode_object(&TypedValue::null(StructuralType::unshaped())).is_err());
    }
}
