//! Check command - report the unknown values of a typed value

use console::style;
use kubetype_core::{is_fully_known, unknown_paths};
use std::path::Path;

use crate::error::Result;
use crate::exit_codes;
use crate::util::read_typed;

pub fn run(typed_file: &Path, json: bool) -> Result<()> {
    let typed = read_typed(typed_file)?;

    let unknown: Vec<String> = if is_fully_known(&typed) {
        Vec::new()
    } else {
        unknown_paths(&typed).iter().map(ToString::to_string).collect()
    };

    if json {
        let report = serde_json::json!({
            "fullyKnown": unknown.is_empty(),
            "unknownPaths": unknown,
        });
        println!(
            "{}",
            serde_json::to_string_pretty(&report).unwrap_or_else(|_| report.to_string())
        );
    } else if unknown.is_empty() {
        println!("{} {} is fully known", style("✓").green(), typed_file.display());
    } else {
        println!(
            "{} {} has {} unknown value(s):",
            style("⚠").yellow(),
            typed_file.display(),
            unknown.len()
        );
        for path in &unknown {
            println!("  {} {}", style("-").dim(), path);
        }
    }

    if !unknown.is_empty() {
        std::process::exit(exit_codes::UNKNOWN_VALUES);
    }

    Ok(())
}
