//! Wire format for passing tables between pipeline stages.
//!
//! One record carries one table. Records are self-describing and may be
//! concatenated on a stream; `decode_table` reports how many bytes it used.
//!
//! ## Record Layout (little-endian)
//!
//! ```text
//! Header: 24 bytes
//! +-------+---------+------+-------+-------------+-----------+----------+
//! | magic | version | kind | flags | field_count | row_count | body_len |
//! | 4B    | u16     | u8   | u8    | u32         | u64       | u32      |
//! +-------+---------+------+-------+-------------+-----------+----------+
//!
//! Fields:  [name: str][position: u32][declared_type: str] * field_count
//! Columns: column-major, row_count tagged cells per column
//!
//! str  = u32 byte length + UTF-8
//! cell = tag u8 + payload
//! ```
//!
//! # Example
//!
//! ```rust
//! use tabpipe_core::schema::Field;
//! use tabpipe_core::Value;
//! use tabpipe_frame::Table;
//! use tabpipe_wire::{decode_table, encode_table};
//!
//! let table: Table = Table::from_columns(
//!     vec![Field::new("id", "int")],
//!     vec![vec![Value::Int64(1), Value::Int64(2)]],
//! )
//! .unwrap();
//!
//! let bytes = encode_table(&table).unwrap();
//! let (decoded, used): (Table, usize) = decode_table(&bytes).unwrap();
//! assert_eq!(decoded, table);
//! assert_eq!(used, bytes.len());
//! ```

#![no_std]

extern crate alloc;

mod decoder;
mod encoder;
mod format;

pub use decoder::{decode_table, read_header, Header};
pub use encoder::{encode_table, WireEncoder};
pub use format::{flags, CellTag, HEADER_SIZE, MAGIC, MAX_LIST_DEPTH, VERSION};
