//! Tabpipe Frame - the columnar table and its operations.
//!
//! This crate provides:
//!
//! - `Table`: a schema over a column store, generic over the store backend
//! - relational operations: `project`, `union_all`, `join`, `filter`
//! - expression operations: `filter` (row mode) and `transform` (column mode)
//! - `RowBindings` / `ColumnBindings`: the expression environments over a table
//! - `Metadata` / `FieldStats`: source and best-effort statistics
//!
//! # Example
//!
//! ```rust
//! use tabpipe_core::schema::Field;
//! use tabpipe_core::Value;
//! use tabpipe_frame::Table;
//!
//! let table: Table = Table::from_columns(
//!     vec![Field::new("id", "int"), Field::new("name", "string")],
//!     vec![
//!         vec![Value::Int64(1), Value::Int64(2), Value::Int64(3)],
//!         vec![Value::from("a"), Value::from("b"), Value::from("c")],
//!     ],
//! )
//! .unwrap();
//!
//! let odd = table.filter("id % 2 == 1").unwrap();
//! assert_eq!(odd.row_count(), 2);
//!
//! let names = odd.project(&["name"]).unwrap();
//! assert_eq!(names.cell(0, 1).unwrap(), &Value::from("c"));
//! ```

#![no_std]

extern crate alloc;

mod bindings;
mod metadata;
mod ops;
mod table;

pub use bindings::{ColumnBindings, RowBindings};
pub use metadata::{FieldStats, Metadata};
pub use ops::transform_target;
pub use table::Table;

pub use tabpipe_core::{DataType, Error, Result, Value};
pub use tabpipe_storage::{Column, ColumnStore, MemoryStore, RowView};
