//! Error types for kubetype-kube

use kubetype_core::{CodecError, DecodeError, EncodeError, NarrowError, PathError, SchemaError};
use thiserror::Error;

/// Result type for kubetype-kube operations
pub type Result<T> = std::result::Result<T, KubeError>;

/// Errors raised while typing Kubernetes objects
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum KubeError {
    /// Codec failure (schema, decode, encode, path or narrowing)
    #[error(transparent)]
    Codec(#[from] CodecError),

    /// Malformed apiVersion
    #[error("invalid apiVersion '{api_version}': {message}")]
    InvalidGvk {
        api_version: String,
        message: String,
    },

    /// No schema in the document describes the resource kind
    #[error("schema for {gvk} not found\nHint: Check that the OpenAPI document covers the resource's group and version")]
    SchemaNotFound { gvk: String },

    /// The object is not a usable manifest
    #[error("invalid manifest: {0}")]
    InvalidManifest(String),

    /// The manifest still holds unresolved values
    #[error("manifest has unknown values at: {}", .paths.join(", "))]
    UnknownValues { paths: Vec<String> },

    /// Invalid configuration
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization error
    #[error("serialization error: {0}")]
    Serialization(String),
}

impl From<serde_json::Error> for KubeError {
    fn from(e: serde_json::Error) -> Self {
        KubeError::Serialization(e.to_string())
    }
}

impl From<serde_yaml::Error> for KubeError {
    fn from(e: serde_yaml::Error) -> Self {
        KubeError::Serialization(e.to_string())
    }
}

impl From<SchemaError> for KubeError {
    fn from(e: SchemaError) -> Self {
        KubeError::Codec(e.into())
    }
}

impl From<DecodeError> for KubeError {
    fn from(e: DecodeError) -> Self {
        KubeError::Codec(e.into())
    }
}

impl From<EncodeError> for KubeError {
    fn from(e: EncodeError) -> Self {
        KubeError::Codec(e.into())
    }
}

impl From<PathError> for KubeError {
    fn from(e: PathError) -> Self {
        KubeError::Codec(e.into())
    }
}

impl From<NarrowError> for KubeError {
    fn from(e: NarrowError) -> Self {
        KubeError::Codec(e.into())
    }
}

impl KubeError {
    /// Check if the error comes from data not fitting its schema
    pub fn is_type_mismatch(&self) -> bool {
        matches!(
            self,
            KubeError::Codec(CodecError::Decode(DecodeError::TypeMismatch { .. }))
        )
    }
}
