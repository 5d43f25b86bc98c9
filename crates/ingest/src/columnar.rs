//! Parquet reader.
//!
//! Fields are the leaf columns of the file schema, named by their column
//! path, so the root group never appears in a field name. Each column is read
//! by its path across every row group.

use std::fs::File;
use std::path::Path;

use bytes::Bytes;
use parquet::basic::{ConvertedType, Type as PhysicalType};
use parquet::column::reader::{ColumnReader, ColumnReaderImpl};
use parquet::data_type::{DataType as ParquetType, Int96};
use parquet::errors::ParquetError;
use parquet::file::reader::{ChunkReader, FileReader, RowGroupReader, SerializedFileReader};
use parquet::schema::types::ColumnDescriptor;
use tabpipe_core::schema::Field;
use tabpipe_core::{DataType, Value};
use tabpipe_frame::Table;
use tracing::debug;

use crate::error::{IngestError, IngestResult};

const BATCH_SIZE: usize = 1024;

/// Julian day number of 1970-01-01.
const JULIAN_UNIX_EPOCH: i64 = 2_440_588;
const MILLIS_PER_DAY: i64 = 86_400_000;
const NANOS_PER_MILLI: i64 = 1_000_000;

/// Reads a Parquet file into a table, keeping at most `first_n` rows.
pub fn read_parquet<R: ChunkReader + 'static>(
    input: R,
    first_n: Option<usize>,
) -> IngestResult<Table> {
    let reader = SerializedFileReader::new(input)?;
    let metadata = reader.metadata();
    let schema = metadata.file_metadata().schema_descr();
    let total = usize::try_from(metadata.file_metadata().num_rows()).unwrap_or(0);
    let limit = first_n.map_or(total, |n| n.min(total));

    let mut fields = Vec::with_capacity(schema.num_columns());
    let mut columns = Vec::with_capacity(schema.num_columns());
    for (index, descr) in schema.columns().iter().enumerate() {
        let name = descr.path().string();
        if descr.max_rep_level() > 0 {
            return Err(IngestError::Repeated(name));
        }
        let mut column = Vec::with_capacity(limit);
        for group in 0..metadata.num_row_groups() {
            if column.len() >= limit {
                break;
            }
            let want = limit - column.len();
            let column_reader = reader.get_row_group(group)?.get_column_reader(index)?;
            read_column(column_reader, descr, want, &mut column)?;
        }
        debug!(column = %name, physical = %descr.physical_type(), "read parquet column");
        fields.push(Field::typed(name, declared_type(descr)));
        columns.push(column);
    }

    let table: Table = Table::from_columns(fields, columns)?;
    debug!(
        rows = table.row_count(),
        fields = table.column_count(),
        "read parquet"
    );
    Ok(table)
}

/// Reads a Parquet file held in memory, as when it arrives on stdin.
pub fn read_parquet_bytes(input: Vec<u8>, first_n: Option<usize>) -> IngestResult<Table> {
    read_parquet(Bytes::from(input), first_n)
}

/// Reads a Parquet file and records its path as the table source.
pub fn read_parquet_path(path: impl AsRef<Path>, first_n: Option<usize>) -> IngestResult<Table> {
    let path = path.as_ref();
    let file = File::open(path).map_err(|source| IngestError::Open {
        path: path.to_path_buf(),
        source,
    })?;
    let mut table = read_parquet(file, first_n)?;
    table.set_source(path.display().to_string());
    Ok(table)
}

/// Declared type of a column. INT96 and timestamp-annotated INT64 columns
/// are declared `timestamp`.
fn declared_type(descr: &ColumnDescriptor) -> DataType {
    match descr.physical_type() {
        PhysicalType::BOOLEAN => DataType::Bool,
        PhysicalType::INT32 => DataType::Int,
        PhysicalType::INT64 if timestamp_divisor(descr).is_some() => DataType::Timestamp,
        PhysicalType::INT64 => DataType::Int,
        PhysicalType::INT96 => DataType::Timestamp,
        PhysicalType::FLOAT | PhysicalType::DOUBLE => DataType::Float,
        PhysicalType::BYTE_ARRAY | PhysicalType::FIXED_LEN_BYTE_ARRAY => DataType::String,
    }
}

/// Divisor from an INT64 timestamp's unit to milliseconds.
fn timestamp_divisor(descr: &ColumnDescriptor) -> Option<i64> {
    match descr.converted_type() {
        ConvertedType::TIMESTAMP_MILLIS => Some(1),
        ConvertedType::TIMESTAMP_MICROS => Some(1_000),
        _ => None,
    }
}

fn read_column(
    reader: ColumnReader,
    descr: &ColumnDescriptor,
    want: usize,
    out: &mut Vec<Value>,
) -> IngestResult<()> {
    let max_def = descr.max_def_level();
    match reader {
        ColumnReader::BoolColumnReader(r) => drain(r, max_def, want, out, Value::Boolean),
        ColumnReader::Int32ColumnReader(r) => {
            drain(r, max_def, want, out, |v| Value::Int64(v.into()))
        }
        ColumnReader::Int64ColumnReader(r) => match timestamp_divisor(descr) {
            Some(divisor) => drain(r, max_def, want, out, |v| {
                Value::DateTime(v.div_euclid(divisor))
            }),
            None => drain(r, max_def, want, out, Value::Int64),
        },
        ColumnReader::Int96ColumnReader(r) => {
            drain(r, max_def, want, out, |v| int96_to_datetime(&v))
        }
        ColumnReader::FloatColumnReader(r) => {
            drain(r, max_def, want, out, |v| Value::Float64(v.into()))
        }
        ColumnReader::DoubleColumnReader(r) => drain(r, max_def, want, out, Value::Float64),
        ColumnReader::ByteArrayColumnReader(r) => drain(r, max_def, want, out, |v| {
            Value::String(String::from_utf8_lossy(v.data()).into_owned())
        }),
        ColumnReader::FixedLenByteArrayColumnReader(r) => drain(r, max_def, want, out, |v| {
            Value::String(String::from_utf8_lossy(v.data()).into_owned())
        }),
    }
}

/// Reads up to `want` records, placing `Null` where the definition level
/// marks a missing value.
fn drain<T: ParquetType>(
    mut reader: ColumnReaderImpl<T>,
    max_def: i16,
    want: usize,
    out: &mut Vec<Value>,
    convert: impl Fn(T::T) -> Value,
) -> IngestResult<()> {
    let mut remaining = want;
    let mut levels = Vec::new();
    let mut values = Vec::new();
    while remaining > 0 {
        levels.clear();
        values.clear();
        let (records, _, _) = reader.read_records(
            remaining.min(BATCH_SIZE),
            Some(&mut levels),
            None,
            &mut values,
        )?;
        if records == 0 {
            break;
        }
        let mut present = values.drain(..);
        if max_def == 0 {
            out.extend(present.map(&convert));
        } else {
            for level in &levels {
                if *level < max_def {
                    out.push(Value::Null);
                    continue;
                }
                let value = present.next().ok_or_else(|| {
                    ParquetError::General("fewer values than definition levels".into())
                })?;
                out.push(convert(value));
            }
        }
        remaining = remaining.saturating_sub(records);
    }
    Ok(())
}

/// INT96 holds nanoseconds within the day in its low 64 bits and the Julian
/// day number in its high 32 bits.
fn int96_to_datetime(value: &Int96) -> Value {
    match value.data() {
        [lo, hi, day] => {
            let nanos = (i64::from(*hi) << 32) | i64::from(*lo);
            let days = i64::from(*day) - JULIAN_UNIX_EPOCH;
            Value::DateTime(days * MILLIS_PER_DAY + nanos / NANOS_PER_MILLI)
        }
        _ => Value::Null,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use parquet::data_type::{
        ByteArray, ByteArrayType, DoubleType, Int32Type, Int64Type, Int96Type,
    };
    use parquet::file::properties::WriterProperties;
    use parquet::file::writer::SerializedFileWriter;
    use parquet::schema::parser::parse_message_type;

    fn int96(nanos: u64, julian_day: u32) -> Int96 {
        let mut value = Int96::new();
        value.set_data(nanos as u32, (nanos >> 32) as u32, julian_day);
        value
    }

    /// Three rows: `id` required, `name` and `score` optional, `seen` INT96.
    fn sample() -> Vec<u8> {
        let schema = parse_message_type(
            "message sample {
                required int64 id;
                optional binary name (UTF8);
                required int96 seen;
                optional double score;
            }",
        )
        .unwrap();
        let props = WriterProperties::builder().build();
        let mut buffer = Vec::new();
        let mut writer =
            SerializedFileWriter::new(&mut buffer, Arc::new(schema), Arc::new(props)).unwrap();
        let mut group = writer.next_row_group().unwrap();

        let mut column = group.next_column().unwrap().unwrap();
        column
            .typed::<Int64Type>()
            .write_batch(&[1, 2, 3], None, None)
            .unwrap();
        column.close().unwrap();

        let mut column = group.next_column().unwrap().unwrap();
        let names = [ByteArray::from("ada"), ByteArray::from("lin")];
        column
            .typed::<ByteArrayType>()
            .write_batch(&names, Some(&[1, 0, 1][..]), None)
            .unwrap();
        column.close().unwrap();

        let mut column = group.next_column().unwrap().unwrap();
        let seen = [
            int96(0, 2_440_588),
            int96(1_000_000, 2_440_589),
            int96(0, 2_440_587),
        ];
        column
            .typed::<Int96Type>()
            .write_batch(&seen, None, None)
            .unwrap();
        column.close().unwrap();

        let mut column = group.next_column().unwrap().unwrap();
        column
            .typed::<DoubleType>()
            .write_batch(&[0.5], Some(&[0, 1, 0][..]), None)
            .unwrap();
        column.close().unwrap();

        group.close().unwrap();
        writer.close().unwrap();
        buffer
    }

    #[test]
    fn test_fields_from_schema() {
        let table = read_parquet_bytes(sample(), None).unwrap();
        assert_eq!(table.field_names(), vec!["id", "name", "seen", "score"]);
        assert_eq!(
            table.field_types(),
            vec!["int", "string", "timestamp", "float"]
        );
        assert_eq!(table.row_count(), 3);
    }

    #[test]
    fn test_optional_columns_hold_nulls() {
        let table = read_parquet_bytes(sample(), None).unwrap();
        assert_eq!(
            table.column("name").unwrap().as_slice(),
            &[Value::from("ada"), Value::Null, Value::from("lin")]
        );
        assert_eq!(
            table.column("score").unwrap().as_slice(),
            &[Value::Null, Value::Float64(0.5), Value::Null]
        );
        assert_eq!(
            table.column("id").unwrap().as_slice(),
            &[Value::Int64(1), Value::Int64(2), Value::Int64(3)]
        );
    }

    #[test]
    fn test_int96_becomes_timestamp() {
        let table = read_parquet_bytes(sample(), None).unwrap();
        assert_eq!(
            table.column("seen").unwrap().as_slice(),
            &[
                Value::DateTime(0),
                Value::DateTime(86_400_001),
                Value::DateTime(-86_400_000),
            ]
        );
    }

    #[test]
    fn test_first_n() {
        let table = read_parquet_bytes(sample(), Some(2)).unwrap();
        assert_eq!(table.row_count(), 2);
        assert_eq!(table.cell(1, 1).unwrap(), &Value::Null);
        let table = read_parquet_bytes(sample(), Some(10)).unwrap();
        assert_eq!(table.row_count(), 3);
    }

    #[test]
    fn test_timestamp_annotated_int64() {
        let schema = parse_message_type(
            "message stamps {
                required int64 at (TIMESTAMP_MICROS);
                required int32 n;
            }",
        )
        .unwrap();
        let mut buffer = Vec::new();
        let mut writer = SerializedFileWriter::new(
            &mut buffer,
            Arc::new(schema),
            Arc::new(WriterProperties::builder().build()),
        )
        .unwrap();
        let mut group = writer.next_row_group().unwrap();
        let mut column = group.next_column().unwrap().unwrap();
        column
            .typed::<Int64Type>()
            .write_batch(&[1_500, -1], None, None)
            .unwrap();
        column.close().unwrap();
        let mut column = group.next_column().unwrap().unwrap();
        column
            .typed::<Int32Type>()
            .write_batch(&[7, 8], None, None)
            .unwrap();
        column.close().unwrap();
        group.close().unwrap();
        writer.close().unwrap();

        let table = read_parquet_bytes(buffer, None).unwrap();
        assert_eq!(table.field_types(), vec!["timestamp", "int"]);
        assert_eq!(
            table.column("at").unwrap().as_slice(),
            &[Value::DateTime(1), Value::DateTime(-1)]
        );
        assert_eq!(table.cell(1, 0).unwrap(), &Value::Int64(7));
    }

    #[test]
    fn test_repeated_column_rejected() {
        let schema = parse_message_type("message m { repeated int32 xs; }").unwrap();
        let mut buffer = Vec::new();
        let mut writer = SerializedFileWriter::new(
            &mut buffer,
            Arc::new(schema),
            Arc::new(WriterProperties::builder().build()),
        )
        .unwrap();
        let mut group = writer.next_row_group().unwrap();
        let mut column = group.next_column().unwrap().unwrap();
        column
            .typed::<Int32Type>()
            .write_batch(&[1, 2], Some(&[1, 1][..]), Some(&[0, 1][..]))
            .unwrap();
        column.close().unwrap();
        group.close().unwrap();
        writer.close().unwrap();

        let err = read_parquet_bytes(buffer, None).unwrap_err();
        assert!(matches!(err, IngestError::Repeated(name) if name == "xs"));
    }

    #[test]
    fn test_not_parquet() {
        let err = read_parquet_bytes(b"id,name\n1,a\n".to_vec(), None).unwrap_err();
        assert!(matches!(err, IngestError::Parquet(_)));
    }

    #[test]
    fn test_path_sets_source() {
        let path =
            std::env::temp_dir().join(format!("tabpipe-ingest-{}.parquet", std::process::id()));
        std::fs::write(&path, sample()).unwrap();
        let table = read_parquet_path(&path, None).unwrap();
        std::fs::remove_file(&path).unwrap();
        assert_eq!(
            table.metadata().source.as_deref(),
            Some(path.display().to_string().as_str())
        );
        assert_eq!(table.row_count(), 3);
    }

    #[test]
    fn test_missing_file() {
        let err = read_parquet_path("/definitely/not/here.parquet", None).unwrap_err();
        assert!(matches!(err, IngestError::Open { .. }));
    }
}
