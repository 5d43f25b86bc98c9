//! CSV reader.

use std::fs::File;
use std::io::Read;
use std::path::Path;

use tabpipe_core::schema::Field;
use tabpipe_core::{DataType, Value};
use tabpipe_frame::Table;
use tracing::debug;

use crate::error::{IngestError, IngestResult};

/// Options for reading delimited input.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CsvOptions {
    /// Field delimiter.
    pub delimiter: u8,
    /// Read at most this many data records.
    pub first_n: Option<usize>,
    /// Strip surrounding whitespace from names and cells.
    pub trim: bool,
}

impl Default for CsvOptions {
    fn default() -> Self {
        Self {
            delimiter: b',',
            first_n: None,
            trim: false,
        }
    }
}

impl CsvOptions {
    /// Sets the delimiter from a character. Only single-byte characters are
    /// accepted.
    pub fn with_delimiter(mut self, delimiter: char) -> IngestResult<Self> {
        self.delimiter = u8::try_from(delimiter)
            .ok()
            .filter(u8::is_ascii)
            .ok_or(IngestError::Delimiter(delimiter))?;
        Ok(self)
    }
}

/// Reads delimited input into a table of `string` fields.
///
/// Records after the header are transposed into one column per field.
pub fn read_csv<R: Read>(input: R, options: &CsvOptions) -> IngestResult<Table> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .delimiter(options.delimiter)
        .trim(if options.trim {
            csv::Trim::All
        } else {
            csv::Trim::None
        })
        .from_reader(input);

    let mut records = reader.records();
    let header = records.next().ok_or(IngestError::Empty)??;
    let fields: Vec<Field> = header
        .iter()
        .map(|name| Field::typed(name, DataType::String))
        .collect();

    let mut columns: Vec<Vec<Value>> = vec![Vec::new(); fields.len()];
    let limit = options.first_n.unwrap_or(usize::MAX);
    for record in records.take(limit) {
        let record = record?;
        for (column, cell) in columns.iter_mut().zip(record.iter()) {
            column.push(Value::String(cell.to_string()));
        }
    }

    let table: Table = Table::from_columns(fields, columns)?;
    debug!(
        rows = table.row_count(),
        fields = table.column_count(),
        "read csv"
    );
    Ok(table)
}

/// Reads a delimited file and records its path as the table source.
pub fn read_csv_path(path: impl AsRef<Path>, options: &CsvOptions) -> IngestResult<Table> {
    let path = path.as_ref();
    let file = File::open(path).map_err(|source| IngestError::Open {
        path: path.to_path_buf(),
        source,
    })?;
    let mut table = read_csv(file, options)?;
    table.set_source(path.display().to_string());
    Ok(table)
}
