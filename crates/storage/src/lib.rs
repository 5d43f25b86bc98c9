//! Tabpipe Storage - column storage for the tabpipe table engine.
//!
//! This crate provides the storage layer including:
//!
//! - `ColumnStore`: the capability set every storage backend implements
//! - `MemoryStore`: the default in-memory backend
//! - `RowView`: a borrowed, index-based view of one row across all columns
//!
//! # Example
//!
//! ```rust
//! use std::rc::Rc;
//! use tabpipe_core::Value;
//! use tabpipe_storage::{ColumnStore, MemoryStore};
//!
//! let mut store = MemoryStore::new();
//! store.add_column(Rc::new(vec![Value::Int64(1), Value::Int64(2)])).unwrap();
//! store.add_column(Rc::new(vec![Value::from("a"), Value::from("b")])).unwrap();
//!
//! let row = store.row_view(1).unwrap();
//! assert_eq!(row.get(1), Some(&Value::from("b")));
//! assert_eq!(store.row_count(), 2);
//! ```

#![no_std]

extern crate alloc;

mod column_store;
mod memory;
mod row_view;

pub use column_store::{Column, ColumnStore, StoreKind};
pub use memory::MemoryStore;
pub use row_view::RowView;
