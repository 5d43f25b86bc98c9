//! Stage implementations.

use std::fs;
use std::io::{self, Read, Write};
use std::path::{Path, PathBuf};

use anyhow::{bail, Context as _, Result};
use clap::{Subcommand, ValueEnum};
use tabpipe_frame::{Table, Value};
use tabpipe_ingest::{read_csv, read_csv_path, read_parquet_bytes, read_parquet_path, CsvOptions};
use tabpipe_wire::{decode_table, encode_table};
use tracing::{debug, info};

use crate::formatter::{format_stats, format_table, DUMP_ROW_LIMIT};

/// Settings shared by every stage.
#[derive(Debug, Clone, Default)]
pub struct Context {
    /// Input record path; stdin when absent.
    pub input: Option<PathBuf>,
    /// Render the output table to stderr.
    pub debug: bool,
}

/// Input file formats accepted by `import`.
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Format {
    /// Delimited text; every field is read as a string
    #[default]
    Csv,
    /// Parquet; field types follow the column types
    Parquet,
}

/// Pipeline stages
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Read a CSV or Parquet file and emit it as a table
    Import {
        /// File to read (defaults to --input, then stdin)
        #[arg(short, long, value_name = "FILE")]
        file: Option<PathBuf>,
        /// Input format
        #[arg(long, value_enum, default_value_t = Format::Csv)]
        format: Format,
        /// Field delimiter (csv only)
        #[arg(short, long, default_value_t = ',')]
        delimiter: char,
        /// Read at most N data rows
        #[arg(long, value_name = "N")]
        first: Option<usize>,
        /// Trim whitespace around names and cells (csv only)
        #[arg(long)]
        trim: bool,
    },
    /// Keep the listed fields, in the listed order
    Project {
        /// Comma separated field names
        #[arg(short, long, value_delimiter = ',', required = true)]
        cols: Vec<String>,
    },
    /// Keep rows for which a boolean expression holds
    Where {
        /// Row expression, e.g. `price > 10 && name != "x"`
        #[arg(short, long)]
        cond: String,
    },
    /// Evaluate a whole-column expression and store the result
    Transform {
        /// Column expression, e.g. `map(price, # * 2)`
        #[arg(short, long)]
        statement: String,
        /// Field to write; defaults to the last field the statement names
        #[arg(short, long)]
        target: Option<String>,
    },
    /// Append the rows of another record with the same schema
    Union {
        /// Record file to append
        #[arg(short, long, value_name = "FILE")]
        other: PathBuf,
    },
    /// Inner equi-join with another record
    Join {
        /// Record file on the right side
        #[arg(short, long, value_name = "FILE")]
        other: PathBuf,
        /// Comma separated key fields
        #[arg(short, long, value_delimiter = ',', required = true)]
        keys: Vec<String>,
    },
    /// Rename a field
    Rename {
        #[arg(long)]
        from: String,
        #[arg(long)]
        to: String,
    },
    /// Remove a field
    Drop {
        #[arg(short, long)]
        col: String,
    },
    /// Print the distinct values of a field, one per line
    Distinct {
        #[arg(short, long)]
        col: String,
    },
    /// Print per-field statistics
    Describe,
    /// Copy the input to stdout and render it to stderr
    Dump,
}

/// Runs one stage.
pub fn run(command: Command, ctx: &Context) -> Result<()> {
    match command {
        Command::Import {
            file,
            format,
            delimiter,
            first,
            trim,
        } => {
            let path = file.as_ref().or(ctx.input.as_ref());
            let table = match format {
                Format::Csv => {
                    let options = CsvOptions {
                        first_n: first,
                        trim,
                        ..CsvOptions::default()
                    }
                    .with_delimiter(delimiter)?;
                    match path {
                        Some(path) => read_csv_path(path, &options)?,
                        None => read_csv(io::stdin().lock(), &options)
                            .context("reading csv from stdin")?,
                    }
                }
                Format::Parquet => match path {
                    Some(path) => read_parquet_path(path, first)?,
                    None => {
                        let mut bytes = Vec::new();
                        io::stdin()
                            .lock()
                            .read_to_end(&mut bytes)
                            .context("reading parquet from stdin")?;
                        read_parquet_bytes(bytes, first)?
                    }
                },
            };
            info!(rows = table.row_count(), fields = table.column_count(), "imported");
            emit(ctx, &table)
        }
        Command::Project { cols } => {
            let table = read_input(ctx)?;
            emit(ctx, &table.project(cols.as_slice())?)
        }
        Command::Where { cond } => {
            let table = read_input(ctx)?;
            let kept = table
                .filter(&cond)
                .with_context(|| format!("evaluating condition `{}`", cond))?;
            debug!(kept = kept.row_count(), of = table.row_count(), "where");
            emit(ctx, &kept)
        }
        Command::Transform { statement, target } => {
            let mut table = read_input(ctx)?;
            let result = match &target {
                Some(target) => table.transform_into(target, &statement),
                None => table.transform(&statement),
            };
            result.with_context(|| format!("applying `{}`", statement))?;
            emit(ctx, &table)
        }
        Command::Union { other } => {
            let table = read_input(ctx)?;
            let other = read_record_file(&other)?;
            emit(ctx, &table.union_all(&other)?)
        }
        Command::Join { other, keys } => {
            let table = read_input(ctx)?;
            let other = read_record_file(&other)?;
            emit(ctx, &table.join(&other, keys.as_slice())?)
        }
        Command::Rename { from, to } => {
            let mut table = read_input(ctx)?;
            table.rename_column(&from, to)?;
            emit(ctx, &table)
        }
        Command::Drop { col } => {
            let mut table = read_input(ctx)?;
            table.drop_column(&col)?;
            emit(ctx, &table)
        }
        Command::Distinct { col } => {
            let table = read_input(ctx)?;
            if table.field_number(&col).is_none() {
                bail!("field not found: {}", col);
            }
            let mut values: Vec<Value> = table
                .distinct(&col)
                .map(|set| set.into_iter().collect())
                .unwrap_or_default();
            values.sort();
            let mut out = io::stdout().lock();
            for value in values {
                writeln!(out, "{}", value)?;
            }
            Ok(())
        }
        Command::Describe => {
            let mut table = read_input(ctx)?;
            table.generate_stats();
            let mut out = io::stdout().lock();
            writeln!(out, "{}", format_stats(table.metadata()))?;
            Ok(())
        }
        Command::Dump => {
            let bytes = read_input_bytes(ctx)?;
            io::stdout().lock().write_all(&bytes)?;
            let table = decode(&bytes)?;
            if table.row_count() == 0 {
                bail!("no data");
            }
            eprintln!("{}", format_table(&table, DUMP_ROW_LIMIT));
            Ok(())
        }
    }
}

fn read_input_bytes(ctx: &Context) -> Result<Vec<u8>> {
    match &ctx.input {
        Some(path) => fs::read(path).with_context(|| format!("reading {}", path.display())),
        None => {
            let mut bytes = Vec::new();
            io::stdin()
                .lock()
                .read_to_end(&mut bytes)
                .context("reading stdin")?;
            Ok(bytes)
        }
    }
}

fn decode(bytes: &[u8]) -> Result<Table> {
    let (table, used) = decode_table(bytes)?;
    if used != bytes.len() {
        debug!(ignored = bytes.len() - used, "bytes after first record");
    }
    Ok(table)
}

fn read_input(ctx: &Context) -> Result<Table> {
    let bytes = read_input_bytes(ctx)?;
    decode(&bytes).context("decoding input record")
}

fn read_record_file(path: &Path) -> Result<Table> {
    let bytes = fs::read(path).with_context(|| format!("reading {}", path.display()))?;
    decode(&bytes).with_context(|| format!("decoding {}", path.display()))
}

/// Writes the record to stdout, and renders it to stderr under `--debug`.
fn emit(ctx: &Context, table: &Table) -> Result<()> {
    let bytes = encode_table(table)?;
    let mut out = io::stdout().lock();
    out.write_all(&bytes)?;
    out.flush()?;
    if ctx.debug {
        eprintln!("{}", format_table(table, DUMP_ROW_LIMIT));
    }
    Ok(())
}
