//! Kubetype Kube - Kubernetes integration for kubetype
//!
//! This crate provides:
//! - **GVK parsing**: `apiVersion` and `kind` to `GroupVersionKind`
//! - **Schema lookup**: Find a resource's schema in an OpenAPI document
//! - **Field policies**: Server-managed and planned-object path sets, plus an
//!   opt-in pass stripping server-side fields from untyped objects
//! - **Configuration**: Policy file in `~/.config/kubetype/policy.yaml`
//! - **Resource codec**: Decode, plan and encode objects for one document

pub mod codec;
pub mod config;
pub mod error;
pub mod fields;
pub mod gvk;
pub mod openapi;

pub use codec::{ResourceCodec, list_items, parse_list};
pub use config::PolicyConfig;
pub use error::{KubeError, Result};
pub use fields::{FieldPolicy, StripOptions, strip_server_side_fields};
pub use gvk::{display_gvk, gvk_from_type_meta, gvk_of, parse_gvk};
pub use openapi::{find_schema, load_document};
