//! Shared utility functions for CLI commands

use clap::ValueEnum;
use kubetype_core::{PathExpression, TypedValue};
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::path::Path;

use crate::error::{CliError, Result};

/// Output format for values printed to stdout
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    #[default]
    Json,
    Yaml,
}

/// Whether a file holds JSON, judged by its extension
fn is_json(path: &Path) -> bool {
    path.extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("json"))
}

/// Read a JSON or YAML file into any deserializable type
///
/// YAML goes through an untyped JSON value first so enums are always read
/// in their single-key map form, the same form [`render`] writes.
pub fn read_file<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let content = std::fs::read_to_string(path).map_err(|e| CliError::Io {
        message: format!("{}: {}", path.display(), e),
    })?;

    let parsed = if is_json(path) {
        serde_json::from_str(&content).map_err(|e| e.to_string())
    } else {
        serde_yaml::from_str::<Value>(&content)
            .map_err(|e| e.to_string())
            .and_then(|value| serde_json::from_value(value).map_err(|e| e.to_string()))
    };

    parsed.map_err(|e| CliError::input(format!("{}: {}", path.display(), e)))
}

/// Read a typed value written by `kubetype decode`
pub fn read_typed(path: &Path) -> Result<TypedValue> {
    read_file(path).map_err(|e| match e {
        CliError::Input { message, .. } => CliError::input_with_help(
            message,
            "Typed files are produced by `kubetype decode`",
        ),
        other => other,
    })
}

/// Parse path expressions given on the command line
pub fn parse_expressions(expressions: &[String]) -> Result<Vec<PathExpression>> {
    expressions
        .iter()
        .map(|expression| {
            PathExpression::parse(expression).map_err(|e| {
                CliError::input_with_help(
                    e.to_string(),
                    "Path expressions look like spec.containers[*].image or metadata.labels[\"app\"]",
                )
            })
        })
        .collect()
}

/// Render a value in the requested format
pub fn render<T: Serialize>(value: &T, format: OutputFormat) -> Result<String> {
    let rendered = match format {
        OutputFormat::Json => serde_json::to_string_pretty(value)
            .map(|mut s| {
                s.push('\n');
                s
            })
            .map_err(|e| e.to_string()),
        OutputFormat::Yaml => serde_json::to_value(value)
            .map_err(|e| e.to_string())
            .and_then(|value| serde_yaml::to_string(&value).map_err(|e| e.to_string())),
    };

    rendered.map_err(|e| CliError::internal(format!("Failed to serialize output: {}", e)))
}

/// Print a value to stdout in the requested format
pub fn print_value<T: Serialize>(value: &T, format: OutputFormat) -> Result<()> {
    print!("{}", render(value, format)?);
    Ok(())
}
