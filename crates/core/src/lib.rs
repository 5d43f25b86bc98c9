//! Tabpipe Core - value, schema and error types shared by every tabpipe crate.
//!
//! This crate provides the foundational types of the table engine:
//!
//! - `Value`: a dynamically-typed cell (Null, Boolean, Int64, Float64, String, DateTime, List)
//! - `DataType`: the known declared-type names of a field
//! - `schema`: `Field` and `Schema`, the ordered field catalog of a table
//! - `Error`: the error taxonomy of every engine operation
//!
//! # Example
//!
//! ```rust
//! use tabpipe_core::schema::{Field, Schema};
//! use tabpipe_core::Value;
//!
//! let schema = Schema::new(vec![
//!     Field::new("id", "int"),
//!     Field::new("name", "string"),
//! ]);
//!
//! assert_eq!(schema.field_index("name"), Some(1));
//! assert_eq!(schema.field_type("id"), Some("int"));
//! assert_eq!(Value::from(42i64).to_string(), "42");
//! ```

#![no_std]

extern crate alloc;

mod error;
pub mod schema;
mod types;
mod value;

pub use error::{Error, Result};
pub use types::DataType;
pub use value::Value;
