//! Kubetype Core - schema-driven codec for Kubernetes objects
//!
//! This crate converts between untyped objects as returned by the API server
//! (`serde_json::Value`) and typed value trees whose shape comes from an
//! OpenAPI schema:
//! - `derive`: Schema node to structural type
//! - `path`: Paths and wildcard path expressions
//! - `decode`: Untyped data to typed tree, dropping ignored paths and forcing
//!   unknown ones
//! - `encode`: Typed tree back to untyped data
//! - `known`: Whether a typed tree is fully resolved
//! - `narrow`: Re-typing a typed tree under a stricter type
//!
//! ```
//! use kubetype_core::{PathSet, Path, SchemaParser, derive, decode, encode};
//! use serde_json::json;
//!
//! let schema = SchemaParser::parse_node(&json!({
//!     "type": "object",
//!     "properties": { "name": { "type": "string" } }
//! })).unwrap();
//! let ty = derive(&schema).unwrap();
//!
//! let ignore = PathSet::parse_all(["status"]).unwrap();
//! let value = json!({ "name": "x", "status": "Y" });
//! let typed = decode(&ignore, &PathSet::new(), &ty, &value, &Path::root())
//!     .unwrap()
//!     .unwrap();
//!
//! assert_eq!(encode(&typed).unwrap(), json!({ "name": "x" }));
//! ```

pub mod decode;
pub mod derive;
pub mod encode;
pub mod error;
pub mod known;
pub mod narrow;
pub mod parser;
pub mod path;
pub mod schema;
pub mod types;
pub mod value;

pub use decode::{DEFAULT_MAX_DEPTH, DecodeMode, Decoder, decode, decode_dynamic};
pub use derive::{TypeDeriver, derive};
pub use encode::{encode, encode_object};
pub use error::{
    CodecError, DecodeError, EncodeError, NarrowError, PathError, Result, SchemaError,
};
pub use known::{is_fully_known, unknown_paths};
pub use narrow::{Narrower, narrow};
pub use parser::SchemaParser;
pub use path::{ExpressionStep, Path, PathExpression, PathSet, PathStep};
pub use schema::{AdditionalProperties, SchemaDocument, SchemaNode, SchemaRef};
pub use types::{Fields, ScalarKind, StructuralType};
pub use value::{KnownValue, TypedValue, ValueKind, ValueState};
