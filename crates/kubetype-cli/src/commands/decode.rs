//! Decode command - type an object read from the API server

use clap::ValueEnum;
use console::style;
use kubetype_core::{DecodeMode, TypedValue, is_fully_known};
use kubetype_kube::{PolicyConfig, ResourceCodec, load_document, parse_list};
use serde_json::Value;
use std::path::Path;

use crate::error::{CliError, Result};
use crate::util::{OutputFormat, parse_expressions, print_value, read_file};

/// How declared fields missing from the object are treated
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ModeArg {
    /// Only fields present in the object appear in the result
    PresentOnly,
    /// Every declared field appears, missing ones as null
    DeclaredComplete,
}

impl From<ModeArg> for DecodeMode {
    fn from(mode: ModeArg) -> Self {
        match mode {
            ModeArg::PresentOnly => DecodeMode::PresentOnly,
            ModeArg::DeclaredComplete => DecodeMode::DeclaredComplete,
        }
    }
}

/// Options of the decode command
#[derive(Debug, Default)]
pub struct DecodeOptions<'a> {
    pub policy_file: Option<&'a Path>,
    pub ignore: &'a [String],
    pub unknown: &'a [String],
    pub mode: Option<ModeArg>,
    pub keep_server_fields: bool,
    pub plan: bool,
    pub creating: bool,
    pub output: OutputFormat,
}

pub fn run(schema_file: &Path, object_file: &Path, options: &DecodeOptions<'_>) -> Result<()> {
    let config = policy(options)?;
    let codec = ResourceCodec::from_config(load_document(schema_file)?, &config);
    let object: Value = read_file(object_file)?;

    if let Some(list) = parse_list(&object)? {
        if options.plan {
            return Err(CliError::input("--plan expects a single object, not a list"));
        }

        let items = codec.decode_list(&list)?;
        eprintln!(
            "{} Decoded {} item(s) from {}",
            style("✓").green(),
            items.len(),
            object_file.display()
        );
        return print_value(&items, options.output);
    }

    let typed = if options.plan {
        codec.plan_object(&object, options.creating)?
    } else {
        codec.decode_object(&object)?
    };

    report(object_file, &typed);
    print_value(&typed, options.output)
}

/// Policy from the configuration file plus command-line overrides
fn policy(options: &DecodeOptions<'_>) -> Result<PolicyConfig> {
    let mut config = match options.policy_file {
        Some(path) => PolicyConfig::load_from(path)?,
        None => PolicyConfig::load()?,
    };

    if options.keep_server_fields {
        config.server_managed = false;
    }
    config.ignore_fields.extend(parse_expressions(options.ignore)?);
    config.unknown_fields.extend(parse_expressions(options.unknown)?);
    if let Some(mode) = options.mode {
        config.mode = mode.into();
    }

    Ok(config)
}

fn report(object_file: &Path, typed: &TypedValue) {
    if is_fully_known(typed) {
        eprintln!("{} Decoded {}", style("✓").green(), object_file.display());
    } else {
        eprintln!(
            "{} Decoded {} with unknown values (see `kubetype check`)",
            style("⚠").yellow(),
            object_file.display()
        );
    }
}
