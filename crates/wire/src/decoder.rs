//! Wire decoder.

use crate::format::{
    flags, CellTag, HEADER_SIZE, MAGIC, MAX_LIST_DEPTH, OFF_FIELD_COUNT, OFF_FLAGS,
    OFF_KIND, OFF_VERSION, VERSION,
};
use alloc::format;
use alloc::rc::Rc;
use alloc::string::String;
use alloc::vec::Vec;
use tabpipe_core::schema::{Field, Schema};
use tabpipe_core::{Error, Result, Value};
use tabpipe_frame::Table;
use tabpipe_storage::{ColumnStore, StoreKind};

/// A parsed record header.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Header {
    /// Backend that wrote the record.
    pub kind: StoreKind,
    pub flags: u8,
    pub field_count: usize,
    pub row_count: usize,
    /// Bytes following the header.
    pub body_len: usize,
}

impl Header {
    #[inline]
    pub fn has_nulls(&self) -> bool {
        self.flags & flags::HAS_NULLS != 0
    }

    /// Total record size.
    #[inline]
    pub fn record_len(&self) -> usize {
        HEADER_SIZE + self.body_len
    }
}

/// Parses and validates the header at the start of `buf`.
pub fn read_header(buf: &[u8]) -> Result<Header> {
    if buf.len() < HEADER_SIZE {
        return Err(Error::decode(format!(
            "truncated header: {} of {} bytes",
            buf.len(),
            HEADER_SIZE
        )));
    }
    if buf[..OFF_VERSION] != MAGIC {
        return Err(Error::decode("bad magic"));
    }
    let version = u16::from_le_bytes([buf[OFF_VERSION], buf[OFF_VERSION + 1]]);
    if version != VERSION {
        return Err(Error::decode(format!("unsupported version {}", version)));
    }
    let kind = StoreKind::from_tag(buf[OFF_KIND])
        .ok_or_else(|| Error::decode(format!("unknown store kind {}", buf[OFF_KIND])))?;

    let mut reader = Reader::new(&buf[OFF_FIELD_COUNT..HEADER_SIZE]);
    let field_count = reader.u32()? as usize;
    let row_count = usize::try_from(reader.u64()?)
        .map_err(|_| Error::decode("row count does not fit in memory"))?;
    let body_len = reader.u32()? as usize;

    if field_count == 0 && row_count != 0 {
        return Err(Error::decode("rows without fields"));
    }
    Ok(Header {
        kind,
        flags: buf[OFF_FLAGS],
        field_count,
        row_count,
        body_len,
    })
}

/// Decodes one record from the start of `buf` into a table backed by `S`.
///
/// Returns the table and the number of bytes consumed. Bytes after the
/// record are left alone.
pub fn decode_table<S: ColumnStore>(buf: &[u8]) -> Result<(Table<S>, usize)> {
    let header = read_header(buf)?;
    let end = header.record_len();
    if buf.len() < end {
        return Err(Error::decode(format!(
            "truncated record: {} of {} bytes",
            buf.len(),
            end
        )));
    }
    let mut reader = Reader::new(&buf[HEADER_SIZE..end]);

    let mut fields = Vec::with_capacity(header.field_count.min(reader.remaining()));
    for index in 0..header.field_count {
        let name = reader.string()?;
        let position = reader.u32()? as usize;
        if position != index {
            return Err(Error::decode(format!(
                "field {} has position {}",
                index, position
            )));
        }
        let declared_type = reader.string()?;
        fields.push(Field::new(name, declared_type));
    }

    let mut columns = Vec::with_capacity(fields.len());
    for _ in 0..header.field_count {
        let mut column = Vec::with_capacity(header.row_count.min(reader.remaining()));
        for _ in 0..header.row_count {
            column.push(reader.cell(0)?);
        }
        columns.push(Rc::new(column));
    }

    if reader.remaining() != 0 {
        return Err(Error::decode(format!(
            "{} trailing bytes in body",
            reader.remaining()
        )));
    }

    let table = Table::from_parts(Schema::new(fields), S::from_columns(columns)?)?;
    Ok((table, end))
}

/// Bounds-checked cursor over a byte slice.
struct Reader<'a> {
    buf: &'a [u8],
    pos: usize,
}

impl<'a> Reader<'a> {
    fn new(buf: &'a [u8]) -> Self {
        Self { buf, pos: 0 }
    }

    #[inline]
    fn remaining(&self) -> usize {
        self.buf.len() - self.pos
    }

    fn take(&mut self, n: usize) -> Result<&'a [u8]> {
        if n > self.remaining() {
            return Err(Error::decode(format!(
                "truncated body: need {} bytes at offset {}, have {}",
                n,
                self.pos,
                self.remaining()
            )));
        }
        let bytes = &self.buf[self.pos..self.pos + n];
        self.pos += n;
        Ok(bytes)
    }

    fn array<const N: usize>(&mut self) -> Result<[u8; N]> {
        let mut out = [0u8; N];
        out.copy_from_slice(self.take(N)?);
        Ok(out)
    }

    fn u8(&mut self) -> Result<u8> {
        Ok(self.take(1)?[0])
    }

    fn u32(&mut self) -> Result<u32> {
        self.array().map(u32::from_le_bytes)
    }

    fn u64(&mut self) -> Result<u64> {
        self.array().map(u64::from_le_bytes)
    }

    fn i64(&mut self) -> Result<i64> {
        self.array().map(i64::from_le_bytes)
    }

    fn string(&mut self) -> Result<String> {
        let len = self.u32()? as usize;
        let bytes = self.take(len)?;
        core::str::from_utf8(bytes)
            .map(String::from)
            .map_err(|e| Error::decode(format!("invalid UTF-8: {}", e)))
    }

    fn cell(&mut self, depth: usize) -> Result<Value> {
        let tag = self.u8()?;
        let tag = CellTag::from_u8(tag)
            .ok_or_else(|| Error::decode(format!("unknown cell tag {}", tag)))?;
        Ok(match tag {
            CellTag::Null => Value::Null,
            CellTag::Boolean => match self.u8()? {
                0 => Value::Boolean(false),
                1 => Value::Boolean(true),
                b => return Err(Error::decode(format!("invalid boolean byte {}", b))),
            },
            CellTag::Int64 => Value::Int64(self.i64()?),
            CellTag::Float64 => Value::Float64(f64::from_bits(self.u64()?)),
            CellTag::String => Value::String(self.string()?),
            CellTag::DateTime => Value::DateTime(self.i64()?),
            CellTag::List => {
                if depth >= MAX_LIST_DEPTH {
                    return Err(Error::decode("list nesting too deep"));
                }
                let count = self.u32()? as usize;
                let mut items = Vec::with_capacity(count.min(self.remaining()));
                for _ in 0..count {
                    items.push(self.cell(depth + 1)?);
                }
                Value::List(items)
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::encoder::encode_table;
    use alloc::vec;
    use crate::format::{OFF_BODY_LEN, OFF_ROW_COUNT};
    use tabpipe_storage::MemoryStore;

    fn sample() -> Table {
        Table::from_columns(
            vec![
                Field::new("id", "int"),
                Field::new("name", "string"),
                Field::new("tags", "list"),
            ],
            vec![
                vec![Value::Int64(1), Value::Int64(-2)],
                vec![Value::from("ä"), Value::Null],
                vec![
                    Value::List(vec![Value::Float64(1.5), Value::DateTime(86_400_000)]),
                    Value::List(vec![]),
                ],
            ],
        )
        .unwrap()
    }

    fn decode(buf: &[u8]) -> Result<(Table, usize)> {
        decode_table::<MemoryStore>(buf)
    }

    fn expect_decode_error(buf: &[u8], needle: &str) {
        match decode(buf) {
            Err(Error::Decode { message }) => {
                assert!(message.contains(needle), "{:?} lacks {:?}", message, needle)
            }
            other => panic!("expected decode error, got {:?}", other),
        }
    }

    #[test]
    fn test_decode_rebuilds_table() {
        let table = sample();
        let bytes = encode_table(&table).unwrap();
        let (decoded, used) = decode(&bytes).unwrap();
        assert_eq!(used, bytes.len());
        assert_eq!(decoded, table);
        assert_eq!(decoded.field_types(), vec!["int", "string", "list"]);
        assert_eq!(decoded.schema().field("tags").unwrap().position(), 2);
    }

    #[test]
    fn test_read_header() {
        let bytes = encode_table(&sample()).unwrap();
        let header = read_header(&bytes).unwrap();
        assert_eq!(header.kind, StoreKind::Memory);
        assert_eq!(header.field_count, 3);
        assert_eq!(header.row_count, 2);
        assert!(header.has_nulls());
        assert_eq!(header.record_len(), bytes.len());
    }

    #[test]
    fn test_concatenated_records() {
        let first = sample();
        let second: Table = Table::from_columns(
            vec![Field::new("x", "bool")],
            vec![vec![Value::Boolean(true)]],
        )
        .unwrap();
        let mut stream = encode_table(&first).unwrap();
        let split = stream.len();
        stream.extend(encode_table(&second).unwrap());

        let (a, used) = decode(&stream).unwrap();
        assert_eq!(used, split);
        assert_eq!(a, first);
        let (b, rest) = decode(&stream[used..]).unwrap();
        assert_eq!(b, second);
        assert_eq!(used + rest, stream.len());
    }

    #[test]
    fn test_bad_magic() {
        let mut bytes = encode_table(&sample()).unwrap();
        bytes[0] = b'X';
        expect_decode_error(&bytes, "magic");
    }

    #[test]
    fn test_unsupported_version() {
        let mut bytes = encode_table(&sample()).unwrap();
        bytes[OFF_VERSION] = 9;
        expect_decode_error(&bytes, "version 9");
    }

    #[test]
    fn test_unknown_store_kind() {
        let mut bytes = encode_table(&sample()).unwrap();
        bytes[OFF_KIND] = 200;
        expect_decode_error(&bytes, "store kind");
    }

    #[test]
    fn test_truncated_input() {
        let bytes = encode_table(&sample()).unwrap();
        expect_decode_error(&bytes[..10], "truncated header");
        expect_decode_error(&bytes[..bytes.len() - 1], "truncated record");
    }

    #[test]
    fn test_body_shorter_than_declared() {
        let mut bytes = encode_table(&sample()).unwrap();
        // Claim one more row than the body carries.
        bytes[OFF_ROW_COUNT] = 3;
        expect_decode_error(&bytes, "truncated body");
    }

    #[test]
    fn test_trailing_body_bytes() {
        let mut bytes = encode_table(&sample()).unwrap();
        let body_len = (bytes.len() - HEADER_SIZE + 1) as u32;
        bytes[OFF_BODY_LEN..HEADER_SIZE].copy_from_slice(&body_len.to_le_bytes());
        bytes.push(0);
        expect_decode_error(&bytes, "trailing");
    }

    #[test]
    fn test_unknown_cell_tag() {
        let table: Table =
            Table::from_columns(vec![Field::new("a", "int")], vec![vec![Value::Null]]).unwrap();
        let mut bytes = encode_table(&table).unwrap();
        let last = bytes.len() - 1;
        bytes[last] = 42;
        expect_decode_error(&bytes, "cell tag 42");
    }

    #[test]
    fn test_invalid_utf8() {
        let table: Table =
            Table::from_columns(vec![Field::new("a", "string")], vec![vec![Value::from("ok")]])
                .unwrap();
        let mut bytes = encode_table(&table).unwrap();
        let last = bytes.len() - 1;
        bytes[last] = 0xff;
        expect_decode_error(&bytes, "UTF-8");
    }

    #[test]
    fn test_inconsistent_position() {
        let mut bytes = encode_table(&sample()).unwrap();
        // First field: u32 len + "id", then its position.
        let at = HEADER_SIZE + 4 + 2;
        bytes[at] = 5;
        expect_decode_error(&bytes, "position 5");
    }

    #[test]
    fn test_rows_without_fields() {
        let mut bytes = encode_table(&Table::<MemoryStore>::new().unwrap()).unwrap();
        bytes[OFF_ROW_COUNT] = 1;
        expect_decode_error(&bytes, "rows without fields");
    }

    fn nested(levels: usize) -> Value {
        (0..levels).fold(Value::Null, |inner, _| Value::List(vec![inner]))
    }

    #[test]
    fn test_list_at_depth_limit_round_trips() {
        let table: Table = Table::from_columns(
            vec![Field::new("deep", "list")],
            vec![vec![nested(MAX_LIST_DEPTH)]],
        )
        .unwrap();
        let bytes = encode_table(&table).unwrap();
        assert_eq!(decode(&bytes).unwrap().0, table);
    }

    #[test]
    fn test_list_beyond_depth_limit() {
        // One list cell wrapping a null, then spliced one level deeper than
        // the encoder would write.
        let table: Table = Table::from_columns(
            vec![Field::new("deep", "list")],
            vec![vec![nested(1)]],
        )
        .unwrap();
        let mut bytes = encode_table(&table).unwrap();
        let cell_at = bytes.len() - 6;
        assert_eq!(bytes[cell_at], CellTag::List as u8);
        let mut spliced = bytes.split_off(cell_at);
        for _ in 0..MAX_LIST_DEPTH {
            bytes.extend_from_slice(&[CellTag::List as u8, 1, 0, 0, 0]);
        }
        bytes.append(&mut spliced);
        let body_len = (bytes.len() - HEADER_SIZE) as u32;
        bytes[OFF_BODY_LEN..HEADER_SIZE].copy_from_slice(&body_len.to_le_bytes());
        expect_decode_error(&bytes, "too deep");
    }
}
