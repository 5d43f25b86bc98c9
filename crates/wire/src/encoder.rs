//! Wire encoder.

use crate::format::{
    flags, CellTag, HEADER_SIZE, MAGIC, MAX_LIST_DEPTH, OFF_BODY_LEN, OFF_FIELD_COUNT, OFF_FLAGS, OFF_KIND,
    OFF_ROW_COUNT, OFF_VERSION, VERSION,
};
use alloc::format;
use alloc::vec;
use alloc::vec::Vec;
use tabpipe_core::schema::Schema;
use tabpipe_core::{Error, Result, Value};
use tabpipe_frame::Table;
use tabpipe_storage::{ColumnStore, StoreKind};

/// Builds one wire record.
///
/// Fields are written first, then columns in field order. The header is
/// filled in by `finish` once the body length is known.
pub struct WireEncoder {
    kind: StoreKind,
    buffer: Vec<u8>,
    field_count: u32,
    row_count: u64,
    columns_written: u32,
    has_nulls: bool,
}

impl WireEncoder {
    /// Creates an encoder for a record of `row_count` rows written by a
    /// `kind` backend.
    pub fn new(kind: StoreKind, row_count: usize) -> Self {
        Self {
            kind,
            buffer: vec![0u8; HEADER_SIZE],
            field_count: 0,
            row_count: row_count as u64,
            columns_written: 0,
            has_nulls: false,
        }
    }

    /// Writes the field section.
    pub fn encode_fields(&mut self, schema: &Schema) -> Result<()> {
        if self.field_count != 0 || self.columns_written != 0 {
            return Err(Error::encode("fields already written"));
        }
        for field in schema.fields() {
            self.put_str(field.name())?;
            self.put_u32(len_u32(field.position(), "field position")?);
            self.put_str(field.declared_type())?;
        }
        self.field_count = len_u32(schema.len(), "field count")?;
        Ok(())
    }

    /// Writes the next column.
    pub fn encode_column(&mut self, column: &[Value]) -> Result<()> {
        if self.columns_written >= self.field_count {
            return Err(Error::encode("more columns than fields"));
        }
        if column.len() as u64 != self.row_count {
            return Err(Error::length_mismatch(self.row_count as usize, column.len()));
        }
        for value in column {
            self.put_cell(value, 0)?;
        }
        self.columns_written += 1;
        Ok(())
    }

    /// Writes the header and returns the record.
    pub fn finish(mut self) -> Result<Vec<u8>> {
        if self.columns_written != self.field_count {
            return Err(Error::encode(format!(
                "{} fields but {} columns written",
                self.field_count, self.columns_written
            )));
        }
        let body_len = len_u32(self.buffer.len() - HEADER_SIZE, "body length")?;
        let flags = if self.has_nulls { flags::HAS_NULLS } else { 0 };

        let header = &mut self.buffer[..HEADER_SIZE];
        header[..OFF_VERSION].copy_from_slice(&MAGIC);
        header[OFF_VERSION..OFF_KIND].copy_from_slice(&VERSION.to_le_bytes());
        header[OFF_KIND] = self.kind.tag();
        header[OFF_FLAGS] = flags;
        header[OFF_FIELD_COUNT..OFF_ROW_COUNT].copy_from_slice(&self.field_count.to_le_bytes());
        header[OFF_ROW_COUNT..OFF_BODY_LEN].copy_from_slice(&self.row_count.to_le_bytes());
        header[OFF_BODY_LEN..HEADER_SIZE].copy_from_slice(&body_len.to_le_bytes());
        Ok(self.buffer)
    }

    /// Lists nest at most `MAX_LIST_DEPTH` deep, the same bound the decoder
    /// enforces.
    fn put_cell(&mut self, value: &Value, depth: usize) -> Result<()> {
        match value {
            Value::Null => {
                self.has_nulls = true;
                self.buffer.push(CellTag::Null as u8);
            }
            Value::Boolean(b) => {
                self.buffer.push(CellTag::Boolean as u8);
                self.buffer.push(*b as u8);
            }
            Value::Int64(i) => {
                self.buffer.push(CellTag::Int64 as u8);
                self.buffer.extend_from_slice(&i.to_le_bytes());
            }
            Value::Float64(f) => {
                self.buffer.push(CellTag::Float64 as u8);
                self.buffer.extend_from_slice(&f.to_bits().to_le_bytes());
            }
            Value::String(s) => {
                self.buffer.push(CellTag::String as u8);
                self.put_str(s)?;
            }
            Value::DateTime(ms) => {
                self.buffer.push(CellTag::DateTime as u8);
                self.buffer.extend_from_slice(&ms.to_le_bytes());
            }
            Value::List(items) => {
                if depth >= MAX_LIST_DEPTH {
                    return Err(Error::encode("list nesting too deep"));
                }
                self.buffer.push(CellTag::List as u8);
                self.put_u32(len_u32(items.len(), "list length")?);
                for item in items {
                    self.put_cell(item, depth + 1)?;
                }
            }
        }
        Ok(())
    }

    #[inline]
    fn put_u32(&mut self, v: u32) {
        self.buffer.extend_from_slice(&v.to_le_bytes());
    }

    fn put_str(&mut self, s: &str) -> Result<()> {
        self.put_u32(len_u32(s.len(), "string length")?);
        self.buffer.extend_from_slice(s.as_bytes());
        Ok(())
    }
}

fn len_u32(len: usize, what: &str) -> Result<u32> {
    u32::try_from(len).map_err(|_| Error::encode(format!("{} {} exceeds u32", what, len)))
}

/// Encodes a table as one wire record.
pub fn encode_table<S: ColumnStore>(table: &Table<S>) -> Result<Vec<u8>> {
    let mut encoder = WireEncoder::new(S::KIND, table.row_count());
    encoder.encode_fields(table.schema())?;
    for position in 0..table.column_count() {
        let column = table
            .column_by_index(position)
            .ok_or_else(|| Error::out_of_range("column", position, table.column_count()))?;
        encoder.encode_column(column)?;
    }
    encoder.finish()
}

#[cfg(test)]
mod tests {
    use super::*;
    use tabpipe_core::schema::Field;

    #[test]
    fn test_header_layout() {
        let table: Table = Table::from_columns(
            vec![Field::new("id", "int")],
            vec![vec![Value::Int64(7), Value::Null]],
        )
        .unwrap();
        let bytes = encode_table(&table).unwrap();

        assert_eq!(&bytes[..4], b"TPW1");
        assert_eq!(u16::from_le_bytes([bytes[4], bytes[5]]), 1);
        assert_eq!(bytes[OFF_KIND], StoreKind::Memory.tag());
        assert_eq!(bytes[OFF_FLAGS], flags::HAS_NULLS);
        assert_eq!(u32::from_le_bytes(bytes[8..12].try_into().unwrap()), 1);
        assert_eq!(u64::from_le_bytes(bytes[12..20].try_into().unwrap()), 2);
        let body_len = u32::from_le_bytes(bytes[20..24].try_into().unwrap()) as usize;
        assert_eq!(bytes.len(), HEADER_SIZE + body_len);

        // "id", position 0, "int", then Int64(7) and Null.
        let body = &bytes[HEADER_SIZE..];
        assert_eq!(&body[..6], &[2, 0, 0, 0, b'i', b'd']);
        assert_eq!(&body[6..10], &[0, 0, 0, 0]);
        assert_eq!(&body[10..17], &[3, 0, 0, 0, b'i', b'n', b't']);
        assert_eq!(body[17], CellTag::Int64 as u8);
        assert_eq!(&body[18..26], &7i64.to_le_bytes());
        assert_eq!(body[26], CellTag::Null as u8);
        assert_eq!(body.len(), 27);
    }

    #[test]
    fn test_no_nulls_flag_clear() {
        let table: Table =
            Table::from_columns(vec![Field::new("b", "bool")], vec![vec![Value::Boolean(true)]])
                .unwrap();
        let bytes = encode_table(&table).unwrap();
        assert_eq!(bytes[OFF_FLAGS], 0);
    }

    #[test]
    fn test_empty_table() {
        let table: Table = Table::new().unwrap();
        let bytes = encode_table(&table).unwrap();
        assert_eq!(bytes.len(), HEADER_SIZE);
        assert_eq!(&bytes[20..24], &[0, 0, 0, 0]);
    }

    #[test]
    fn test_column_checks() {
        let schema = Schema::new(vec![Field::new("a", "int")]);
        let mut encoder = WireEncoder::new(StoreKind::Memory, 2);
        encoder.encode_fields(&schema).unwrap();
        assert!(matches!(
            encoder.encode_column(&[Value::Int64(1)]),
            Err(Error::LengthMismatch { expected: 2, got: 1 })
        ));
        encoder
            .encode_column(&[Value::Int64(1), Value::Int64(2)])
            .unwrap();
        assert!(encoder.encode_column(&[Value::Null, Value::Null]).is_err());

        let mut short = WireEncoder::new(StoreKind::Memory, 0);
        short.encode_fields(&schema).unwrap();
        assert!(matches!(short.finish(), Err(Error::Encode { .. })));
    }

    fn nested(levels: usize) -> Value {
        (0..levels).fold(Value::Int64(1), |inner, _| Value::List(vec![inner]))
    }

    #[test]
    fn test_list_depth_limit() {
        let schema = Schema::new(vec![Field::new("deep", "list")]);

        let mut ok = WireEncoder::new(StoreKind::Memory, 1);
        ok.encode_fields(&schema).unwrap();
        ok.encode_column(&[nested(MAX_LIST_DEPTH)]).unwrap();

        let mut too_deep = WireEncoder::new(StoreKind::Memory, 1);
        too_deep.encode_fields(&schema).unwrap();
        match too_deep.encode_column(&[nested(MAX_LIST_DEPTH + 1)]) {
            Err(Error::Encode { message }) => assert!(message.contains("too deep")),
            other => panic!("expected encode error, got {:?}", other),
        }
    }
}
