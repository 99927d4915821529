//! CLI command implementations

pub mod check;
pub mod decode;
pub mod derive;
pub mod encode;
pub mod narrow;

use kubetype_core::{StructuralType, TypeDeriver};
use kubetype_kube::{find_schema, load_document, parse_gvk};
use std::path::Path;

use crate::error::{CliError, Result};

/// Which schema of an OpenAPI document a command types against
#[derive(Debug, Clone, Copy, Default)]
pub struct SchemaSelector<'a> {
    pub api_version: Option<&'a str>,
    pub kind: Option<&'a str>,
    pub component: Option<&'a str>,
}

/// Derive the structural type selected from an OpenAPI document
///
/// Returns the component name alongside the type.
pub fn resolve_type(
    schema_file: &Path,
    selector: SchemaSelector<'_>,
) -> Result<(String, StructuralType)> {
    let document = load_document(schema_file)?;
    let deriver = TypeDeriver::with_document(&document);

    let (name, node) = match selector {
        SchemaSelector {
            component: Some(component),
            ..
        } => {
            let node = document.get(component).ok_or_else(|| CliError::Schema {
                message: format!("component '{}' not found", component),
                help: Some(format!(
                    "{} defines {} schema(s)",
                    schema_file.display(),
                    document.len()
                )),
            })?;
            (component, node)
        }
        SchemaSelector {
            api_version: Some(api_version),
            kind: Some(kind),
            ..
        } => find_schema(&document, &parse_gvk(api_version, kind)?)?,
        _ => {
            return Err(CliError::input_with_help(
                "no schema selected",
                "Pass --api-version and --kind, or --component",
            ));
        }
    };

    let ty = deriver
        .derive(node)
        .map_err(|e| CliError::schema(format!("{}: {}", name, e)))?;

    Ok((name.to_string(), ty))
}
