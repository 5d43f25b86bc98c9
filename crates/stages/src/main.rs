//! Tabpipe pipeline stages.
//!
//! Each subcommand reads one table record from stdin (or `--input`), applies
//! one operation and writes the resulting record to stdout, so stages compose
//! with shell pipes.
//!
//! # Usage
//!
//! ```bash
//! tabpipe import --file people.csv \
//!   | tabpipe where --cond 'age > "30"' \
//!   | tabpipe project --cols name,age \
//!   | tabpipe dump > /dev/null
//! ```

use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use tracing_subscriber::EnvFilter;

mod commands;
mod formatter;

use commands::{Command, Context};

/// Composable table pipeline stages
#[derive(Parser, Debug)]
#[command(
    name = "tabpipe",
    version,
    about = "Composable table pipeline stages",
    long_about = "Each stage reads a table record, applies one operation and writes a record.\n\n\
                  Chain stages with pipes; start with `import` and inspect with `dump`."
)]
struct Args {
    /// Read the input record from FILE instead of stdin
    #[arg(short = 'i', long, global = true, value_name = "FILE", env = "TABPIPE_INPUT")]
    input: Option<PathBuf>,

    /// Also render the output table to stderr
    #[arg(long, global = true)]
    debug: bool,

    /// Enable debug logging
    #[arg(short = 'v', long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

fn main() -> ExitCode {
    let args = Args::parse();
    init_logging(args.verbose);

    let ctx = Context {
        input: args.input,
        debug: args.debug,
    };
    match commands::run(args.command, &ctx) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e:#}");
            ExitCode::FAILURE
        }
    }
}

/// Logs go to stderr; stdout carries the table record.
fn init_logging(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_env("TABPIPE_LOG").unwrap_or_else(|_| EnvFilter::new("warn"))
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .without_time()
        .init();
}
