mod commands;
mod config;
mod runner;
mod tap;

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};

use commands::{cmd_keys, cmd_parse, cmd_rewrite, cmd_test, RewriteArgs};

/// Output format for CLI responses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub(crate) enum OutputFormat {
    Text,
    Json,
}

/// What `rewrite` prints.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub(crate) enum EmitFormat {
    /// Surface syntax
    Source,
    /// Interchange JSON tree
    Json,
}

/// A `-D NAME[=VALUE]` argument.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Define {
    pub name: String,
    pub value: String,
}

/// `NAME=VALUE` defines `NAME` to `VALUE`; a bare `NAME` defines it to `1`,
/// since an empty value would leave it undefined.
fn parse_define(arg: &str) -> Result<Define, String> {
    let (name, value) = match arg.split_once('=') {
        Some((name, value)) => (name, value),
        None => (arg, "1"),
    };
    if name.is_empty() {
        return Err(format!("'{}': missing variable name before '='", arg));
    }
    Ok(Define {
        name: name.to_owned(),
        value: value.to_owned(),
    })
}

/// Environment-driven conditional rewriter.
#[derive(Parser)]
#[command(
    name = "envcond",
    version,
    about = "Environment-driven conditional rewriter"
)]
struct Cli {
    /// Output format for diagnostics and listings (text or json)
    #[arg(long, global = true, default_value = "text", value_enum)]
    output: OutputFormat,

    /// Suppress non-essential output
    #[arg(long, global = true)]
    quiet: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Rewrite a source file against the environment
    Rewrite {
        /// Path to the source file (.json is read as an interchange tree)
        file: PathBuf,
        /// Define a variable, `NAME=VALUE` or `NAME` (set to 1)
        #[arg(short = 'D', long = "define", value_parser = parse_define)]
        define: Vec<Define>,
        /// Undefine a variable
        #[arg(short = 'U', long = "undefine")]
        undefine: Vec<String>,
        /// Configuration file (default: envcond.toml if present)
        #[arg(long)]
        config: Option<PathBuf>,
        /// Accept [%%IFDEF] blocks left open at the end of a structure
        #[arg(long)]
        allow_unterminated: bool,
        /// Drop the placeholders left by directives and suppressed items
        #[arg(long)]
        compact: bool,
        /// What to print (source or json)
        #[arg(long, default_value = "source", value_enum)]
        emit: EmitFormat,
    },

    /// Parse a source file and print its tree as interchange JSON
    Parse {
        /// Path to the source file
        file: PathBuf,
    },

    /// List the environment variables a file consults
    Keys {
        /// Path to the source file (.json is read as an interchange tree)
        file: PathBuf,
    },

    /// Run the conformance suite
    Test {
        /// Path to the conformance suite directory
        #[arg(default_value = "conformance")]
        suite_dir: PathBuf,
    },
}

fn main() {
    env_logger::init();
    let cli = Cli::parse();

    match cli.command {
        Commands::Rewrite {
            file,
            define,
            undefine,
            config,
            allow_unterminated,
            compact,
            emit,
        } => {
            let args = RewriteArgs {
                file,
                define,
                undefine,
                config,
                allow_unterminated,
                compact,
                emit,
            };
            cmd_rewrite(&args, cli.output, cli.quiet);
        }
        Commands::Parse { file } => {
            cmd_parse(&file, cli.output, cli.quiet);
        }
        Commands::Keys { file } => {
            cmd_keys(&file, cli.output, cli.quiet);
        }
        Commands::Test { suite_dir } => {
            cmd_test(&suite_dir, cli.output, cli.quiet);
        }
    }
}

/// Print a plain diagnostic to stderr in the selected output format.
pub(crate) fn report_error(msg: &str, output: OutputFormat, quiet: bool) {
    if quiet {
        return;
    }
    match output {
        OutputFormat::Text => eprintln!("error: {}", msg),
        OutputFormat::Json => {
            eprintln!("{}", serde_json::json!({ "error": msg }));
        }
    }
}

/// Print a library error to stderr. JSON diagnostics are always written;
/// `--quiet` only silences the text form.
pub(crate) fn report_core_error(e: &envcond_core::Error, output: OutputFormat, quiet: bool) {
    match output {
        OutputFormat::Json => {
            let err_json = serde_json::to_string_pretty(&e.to_json_value())
                .unwrap_or_else(|_| format!("{{\"error\": \"{:?}\"}}", e));
            eprintln!("{}", err_json);
        }
        OutputFormat::Text => {
            if !quiet {
                eprintln!("error: {}", e);
            }
        }
    }
}
