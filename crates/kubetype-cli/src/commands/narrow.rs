//! Narrow command - re-type a typed value under a schema's type

use console::style;
use kubetype_core::{CodecError, Path as ValuePath, PathSet, narrow};
use std::path::Path;

use super::{SchemaSelector, resolve_type};
use crate::error::Result;
use crate::util::{OutputFormat, parse_expressions, print_value, read_typed};

pub fn run(
    schema_file: &Path,
    typed_file: &Path,
    selector: SchemaSelector<'_>,
    unknown: &[String],
    output: OutputFormat,
) -> Result<()> {
    let (name, ty) = resolve_type(schema_file, selector)?;
    let force_unknown: PathSet = parse_expressions(unknown)?.into_iter().collect();
    let typed = read_typed(typed_file)?;

    let narrowed =
        narrow(&ty, &force_unknown, &typed, &ValuePath::root()).map_err(CodecError::from)?;

    eprintln!("{} Narrowed to {}", style("✓").green(), style(&name).cyan());
    print_value(&narrowed, output)
}
