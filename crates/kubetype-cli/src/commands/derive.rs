//! Derive command - print the structural type of a schema

use console::style;
use std::path::Path;

use super::{SchemaSelector, resolve_type};
use crate::error::Result;
use crate::util::{OutputFormat, print_value};

pub fn run(
    schema_file: &Path,
    selector: SchemaSelector<'_>,
    output: OutputFormat,
    summary: bool,
) -> Result<()> {
    let (name, ty) = resolve_type(schema_file, selector)?;

    eprintln!("{} Derived type of {}", style("✓").green(), style(&name).cyan());

    if summary {
        println!("{}", ty);
        return Ok(());
    }

    print_value(&ty, output)
}
