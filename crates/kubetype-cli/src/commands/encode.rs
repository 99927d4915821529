//! Encode command - turn a typed value back into a plain object

use kubetype_core::{CodecError, encode, unknown_paths};
use std::path::Path;

use crate::error::{CliError, Result};
use crate::util::{OutputFormat, print_value, read_typed};

pub fn run(typed_file: &Path, output: OutputFormat) -> Result<()> {
    let typed = read_typed(typed_file)?;

    let unknown = unknown_paths(&typed);
    if !unknown.is_empty() {
        return Err(CliError::UnknownValues {
            paths: unknown.iter().map(ToString::to_string).collect(),
        });
    }

    let value = encode(&typed).map_err(CodecError::from)?;
    print_value(&value, output)
}
