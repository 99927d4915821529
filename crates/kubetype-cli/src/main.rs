//! kubetype CLI - type Kubernetes objects against their OpenAPI schema

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

mod commands;
mod error;
mod exit_codes;
mod util;

use commands::SchemaSelector;
use commands::decode::{DecodeOptions, ModeArg};
use util::OutputFormat;

#[derive(Parser)]
#[command(name = "kubetype")]
#[command(author = "kubetype Contributors")]
#[command(version)]
#[command(about = "Type Kubernetes objects against their OpenAPI schema", long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable debug output
    #[arg(long, global = true)]
    debug: bool,
}

/// Schema selection shared by the commands that derive a type
#[derive(Args)]
struct SchemaArgs {
    /// API version of the resource (e.g. apps/v1)
    #[arg(long, requires = "kind")]
    api_version: Option<String>,

    /// Kind of the resource (e.g. Deployment)
    #[arg(long, requires = "api_version")]
    kind: Option<String>,

    /// Name of a component schema, instead of --api-version/--kind
    #[arg(long, conflicts_with_all = ["api_version", "kind"])]
    component: Option<String>,
}

impl SchemaArgs {
    fn selector(&self) -> SchemaSelector<'_> {
        SchemaSelector {
            api_version: self.api_version.as_deref(),
            kind: self.kind.as_deref(),
            component: self.component.as_deref(),
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Print the structural type of a schema
    Derive {
        /// OpenAPI document (JSON or YAML)
        schema: PathBuf,

        #[command(flatten)]
        select: SchemaArgs,

        /// Print the compact type notation instead of the serialized type
        #[arg(long)]
        summary: bool,

        /// Output format
        #[arg(short, long, value_enum, default_value_t = OutputFormat::Json)]
        output: OutputFormat,
    },

    /// Type an object read from the API server
    Decode {
        /// OpenAPI document (JSON or YAML)
        schema: PathBuf,

        /// Object or list response (JSON or YAML)
        object: PathBuf,

        /// Policy file (defaults to ~/.config/kubetype/policy.yaml)
        #[arg(long)]
        policy: Option<PathBuf>,

        /// Additional path expression to drop (repeatable)
        #[arg(long = "ignore")]
        ignore: Vec<String>,

        /// Additional path expression to force unknown (repeatable)
        #[arg(long = "unknown")]
        unknown: Vec<String>,

        /// How declared fields missing from the object are treated
        #[arg(long, value_enum)]
        mode: Option<ModeArg>,

        /// Keep status and server-managed metadata
        #[arg(long)]
        keep_server_fields: bool,

        /// Decode as the planned result of a write
        #[arg(long)]
        plan: bool,

        /// The planned write creates the object
        #[arg(long, requires = "plan")]
        creating: bool,

        /// Output format
        #[arg(short, long, value_enum, default_value_t = OutputFormat::Json)]
        output: OutputFormat,
    },

    /// Turn a typed value back into a plain object
    Encode {
        /// Typed value written by `kubetype decode`
        typed: PathBuf,

        /// Output format
        #[arg(short, long, value_enum, default_value_t = OutputFormat::Json)]
        output: OutputFormat,
    },

    /// Report the unknown values of a typed value
    Check {
        /// Typed value written by `kubetype decode`
        typed: PathBuf,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Re-type a typed value under a schema's type
    Narrow {
        /// OpenAPI document (JSON or YAML)
        schema: PathBuf,

        /// Typed value written by `kubetype decode`
        typed: PathBuf,

        #[command(flatten)]
        select: SchemaArgs,

        /// Path expression to force unknown (repeatable)
        #[arg(long = "unknown")]
        unknown: Vec<String>,

        /// Output format
        #[arg(short, long, value_enum, default_value_t = OutputFormat::Json)]
        output: OutputFormat,
    },
}

fn main() {
    // Setup miette for nice error display
    miette::set_panic_hook();

    let cli = Cli::parse();

    // Set debug level
    if cli.debug {
        // SAFETY: We're the only thread at this point (start of main)
        unsafe { std::env::set_var("RUST_BACKTRACE", "1") };
    }

    let result = match &cli.command {
        Commands::Derive {
            schema,
            select,
            summary,
            output,
        } => commands::derive::run(schema, select.selector(), *output, *summary),

        Commands::Decode {
            schema,
            object,
            policy,
            ignore,
            unknown,
            mode,
            keep_server_fields,
            plan,
            creating,
            output,
        } => commands::decode::run(
            schema,
            object,
            &DecodeOptions {
                policy_file: policy.as_deref(),
                ignore,
                unknown,
                mode: *mode,
                keep_server_fields: *keep_server_fields,
                plan: *plan,
                creating: *creating,
                output: *output,
            },
        ),

        Commands::Encode { typed, output } => commands::encode::run(typed, *output),

        Commands::Check { typed, json } => commands::check::run(typed, *json),

        Commands::Narrow {
            schema,
            typed,
            select,
            unknown,
            output,
        } => commands::narrow::run(schema, typed, select.selector(), unknown, *output),
    };

    if let Err(err) = result {
        let code = err.exit_code();
        eprintln!("{:?}", miette::Report::new(err));
        std::process::exit(code);
    }
}
