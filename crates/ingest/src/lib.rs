//! Tabpipe Ingest - reads delimited text and Parquet files into tables.
//!
//! CSV: the first record names the fields. Every field is declared `string`
//! and every cell is read as `Value::String`; later stages convert as needed.
//!
//! Parquet: each leaf column of the file schema becomes a field named by its
//! column path, with a declared type taken from the physical type. INT96
//! timestamps are converted to `timestamp` cells.

mod columnar;
mod error;
mod reader;

pub use columnar::{read_parquet, read_parquet_bytes, read_parquet_path};
pub use error::{IngestError, IngestResult};
pub use reader::{read_csv, read_csv_path, CsvOptions};
