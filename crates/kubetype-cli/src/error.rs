//! CLI error types with exit code handling
//!
//! Every command returns [`CliError`], which carries the exit code the
//! process terminates with.

use kubetype_core::CodecError;
use kubetype_kube::KubeError;
use miette::Diagnostic;
use thiserror::Error;

use crate::exit_codes;

/// CLI-specific error type that includes exit code information
#[derive(Error, Debug, Diagnostic, Clone)]
pub enum CliError {
    /// Schema could not be turned into a type
    #[error("Schema error: {message}")]
    #[diagnostic(code(kubetype::cli::schema))]
    Schema {
        message: String,
        #[help]
        help: Option<String>,
    },

    /// Data does not fit its type
    #[error("Decode error: {message}")]
    #[diagnostic(code(kubetype::cli::decode))]
    Decode {
        message: String,
        #[help]
        help: Option<String>,
    },

    /// The value still holds unresolved nodes
    #[error("{} unknown value(s) at: {}", .paths.len(), .paths.join(", "))]
    #[diagnostic(
        code(kubetype::cli::unknown),
        help("Resolve these fields before encoding, or inspect them with `kubetype check`")
    )]
    UnknownValues { paths: Vec<String> },

    /// Invalid arguments, path expressions or configuration
    #[error("Invalid input: {message}")]
    #[diagnostic(code(kubetype::cli::input))]
    Input {
        message: String,
        #[help]
        help: Option<String>,
    },

    /// IO error (file not found, permissions, etc.)
    #[error("IO error: {message}")]
    #[diagnostic(code(kubetype::cli::io))]
    Io { message: String },

    /// Internal error (runtime, unexpected failure)
    #[error("Internal error: {message}")]
    #[diagnostic(code(kubetype::cli::internal))]
    Internal { message: String },
}

impl CliError {
    /// Get the exit code for this error
    pub fn exit_code(&self) -> i32 {
        match self {
            CliError::Schema { .. } => exit_codes::SCHEMA_ERROR,
            CliError::Decode { .. } => exit_codes::DECODE_ERROR,
            CliError::UnknownValues { .. } => exit_codes::UNKNOWN_VALUES,
            CliError::Input { .. } => exit_codes::USAGE_ERROR,
            CliError::Io { .. } => exit_codes::IO_ERROR,
            CliError::Internal { .. } => exit_codes::ERROR,
        }
    }

    /// Create an internal error
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }

    /// Create an input error (user provided invalid input)
    pub fn input(message: impl Into<String>) -> Self {
        Self::Input {
            message: message.into(),
            help: None,
        }
    }

    /// Create an input error with help text
    pub fn input_with_help(message: impl Into<String>, help: impl Into<String>) -> Self {
        Self::Input {
            message: message.into(),
            help: Some(help.into()),
        }
    }

    /// Create a schema error
    pub fn schema(message: impl Into<String>) -> Self {
        Self::Schema {
            message: message.into(),
            help: None,
        }
    }

    /// Create a decode error
    pub fn decode(message: impl Into<String>) -> Self {
        Self::Decode {
            message: message.into(),
            help: None,
        }
    }

    /// Create an IO error from std::io::Error
    pub fn io(err: std::io::Error) -> Self {
        Self::Io {
            message: err.to_string(),
        }
    }
}

impl From<std::io::Error> for CliError {
    fn from(err: std::io::Error) -> Self {
        CliError::io(err)
    }
}

impl From<CodecError> for CliError {
    fn from(err: CodecError) -> Self {
        let message = err.to_string();
        match err {
            CodecError::Schema(_) => CliError::schema(message),
            CodecError::Path(_) => CliError::input(message),
            CodecError::JsonParse(_) | CodecError::YamlParse(_) => CliError::input(message),
            _ => CliError::decode(message),
        }
    }
}

impl From<KubeError> for CliError {
    fn from(err: KubeError) -> Self {
        match err {
            KubeError::Codec(err) => err.into(),
            KubeError::SchemaNotFound { gvk } => CliError::Schema {
                message: format!("schema for {} not found", gvk),
                help: Some(
                    "Check that the OpenAPI document covers the resource's group and version"
                        .to_string(),
                ),
            },
            KubeError::UnknownValues { paths } => CliError::UnknownValues { paths },
            KubeError::Io(err) => CliError::io(err),
            err @ (KubeError::InvalidGvk { .. } | KubeError::InvalidConfig(_)) => {
                CliError::input(err.to_string())
            }
            err @ (KubeError::InvalidManifest(_) | KubeError::Serialization(_)) => {
                CliError::decode(err.to_string())
            }
            err => CliError::internal(err.to_string()),
        }
    }
}

/// Result type for CLI operations
pub type Result<T> = std::result::Result<T, CliError>;
