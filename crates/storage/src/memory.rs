//! In-memory column store.

use crate::column_store::{Column, ColumnStore, StoreKind};
use alloc::rc::Rc;
use alloc::vec::Vec;
use tabpipe_core::{Error, Result, Value};

/// Default column store: a vector of shared columns.
#[derive(Clone, Debug, Default)]
pub struct MemoryStore {
    columns: Vec<Column>,
    generation: u64,
}

impl MemoryStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns every column in order.
    #[inline]
    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    #[inline]
    fn bump(&mut self) {
        self.generation = self.generation.wrapping_add(1);
    }

    fn check_column(&self, col: usize) -> Result<()> {
        if col >= self.columns.len() {
            return Err(Error::out_of_range("column", col, self.columns.len()));
        }
        Ok(())
    }

    fn check_row(&self, row: usize) -> Result<()> {
        let rows = self.row_count();
        if row >= rows {
            return Err(Error::out_of_range("row", row, rows));
        }
        Ok(())
    }
}

impl ColumnStore for MemoryStore {
    const KIND: StoreKind = StoreKind::Memory;

    fn from_columns(columns: Vec<Column>) -> Result<Self> {
        if let Some(first) = columns.first() {
            let rows = first.len();
            if let Some(bad) = columns.iter().find(|c| c.len() != rows) {
                return Err(Error::length_mismatch(rows, bad.len()));
            }
        }
        Ok(Self {
            columns,
            generation: 0,
        })
    }

    #[inline]
    fn column_count(&self) -> usize {
        self.columns.len()
    }

    #[inline]
    fn row_count(&self) -> usize {
        self.columns.first().map(|c| c.len()).unwrap_or(0)
    }

    #[inline]
    fn generation(&self) -> u64 {
        self.generation
    }

    fn column(&self, position: usize) -> Option<&Column> {
        self.columns.get(position)
    }

    fn get_cell(&self, col: usize, row: usize) -> Result<&Value> {
        self.check_column(col)?;
        self.check_row(row)?;
        Ok(&self.columns[col][row])
    }

    fn set_cell(&mut self, col: usize, row: usize, value: Value) -> Result<()> {
        self.check_column(col)?;
        self.check_row(row)?;
        Rc::make_mut(&mut self.columns[col])[row] = value;
        Ok(())
    }

    fn add_column(&mut self, values: Column) -> Result<()> {
        if !self.columns.is_empty() && values.len() != self.row_count() {
            return Err(Error::length_mismatch(self.row_count(), values.len()));
        }
        self.columns.push(values);
        self.bump();
        Ok(())
    }

    fn drop_column(&mut self, position: usize) -> Result<Column> {
        self.check_column(position)?;
        let removed = self.columns.remove(position);
        self.bump();
        Ok(removed)
    }

    fn replace_column(&mut self, position: usize, values: Column) -> Result<Column> {
        self.check_column(position)?;
        if values.len() != self.row_count() {
            return Err(Error::length_mismatch(self.row_count(), values.len()));
        }
        let previous = core::mem::replace(&mut self.columns[position], values);
        self.bump();
        Ok(previous)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::vec;

    fn ints(values: &[i64]) -> Column {
        Rc::new(values.iter().map(|&v| Value::Int64(v)).collect())
    }

    fn sample() -> MemoryStore {
        MemoryStore::from_columns(vec![ints(&[1, 2, 3]), ints(&[10, 20, 30])]).unwrap()
    }

    #[test]
    fn test_counts() {
        let store = sample();
        assert_eq!(store.column_count(), 2);
        assert_eq!(store.row_count(), 3);
        assert_eq!(MemoryStore::new().row_count(), 0);
    }

    #[test]
    fn test_from_columns_rejects_ragged() {
        let result = MemoryStore::from_columns(vec![ints(&[1, 2]), ints(&[1])]);
        assert_eq!(result.unwrap_err(), Error::length_mismatch(2, 1));
    }

    #[test]
    fn test_cell_access_is_range_checked() {
        let mut store = sample();
        assert_eq!(store.get_cell(1, 2).unwrap(), &Value::Int64(30));
        assert!(matches!(store.get_cell(2, 0), Err(Error::OutOfRange { what: "column", .. })));
        assert!(matches!(store.get_cell(0, 3), Err(Error::OutOfRange { what: "row", .. })));

        store.set_cell(0, 0, Value::Int64(99)).unwrap();
        assert_eq!(store.get_cell(0, 0).unwrap(), &Value::Int64(99));
        assert!(store.set_cell(0, 5, Value::Null).is_err());
    }

    #[test]
    fn test_get_column_out_of_range_is_none() {
        let store = sample();
        assert_eq!(store.column(0).map(|c| c.len()), Some(3));
        assert!(store.column(2).is_none());
    }

    #[test]
    fn test_add_column_checks_length() {
        let mut store = sample();
        assert_eq!(
            store.add_column(ints(&[1])).unwrap_err(),
            Error::length_mismatch(3, 1)
        );
        store.add_column(ints(&[7, 8, 9])).unwrap();
        assert_eq!(store.column_count(), 3);

        let mut empty = MemoryStore::new();
        empty.add_column(ints(&[1, 2, 3, 4])).unwrap();
        assert_eq!(empty.row_count(), 4);
    }

    #[test]
    fn test_drop_column_shifts_left() {
        let mut store = sample();
        let removed = store.drop_column(0).unwrap();
        assert_eq!(removed[0], Value::Int64(1));
        assert_eq!(store.column_count(), 1);
        assert_eq!(store.get_cell(0, 0).unwrap(), &Value::Int64(10));
        assert!(store.drop_column(4).is_err());
    }

    #[test]
    fn test_replace_column() {
        let mut store = sample();
        let old = store.replace_column(1, ints(&[4, 5, 6])).unwrap();
        assert_eq!(old[2], Value::Int64(30));
        assert_eq!(store.get_cell(1, 2).unwrap(), &Value::Int64(6));
        assert!(matches!(
            store.replace_column(1, ints(&[1])),
            Err(Error::LengthMismatch { .. })
        ));
        assert!(matches!(
            store.replace_column(9, ints(&[1, 2, 3])),
            Err(Error::OutOfRange { .. })
        ));
    }

    #[test]
    fn test_generation_tracks_structure_only() {
        let mut store = sample();
        let g0 = store.generation();
        store.set_cell(0, 0, Value::Null).unwrap();
        assert_eq!(store.generation(), g0);
        store.add_column(ints(&[0, 0, 0])).unwrap();
        assert_ne!(store.generation(), g0);
    }

    #[test]
    fn test_set_cell_does_not_leak_into_aliases() {
        let shared = ints(&[1, 2, 3]);
        let mut a = MemoryStore::from_columns(vec![Rc::clone(&shared)]).unwrap();
        let b = MemoryStore::from_columns(vec![Rc::clone(&shared)]).unwrap();

        a.set_cell(0, 1, Value::Int64(42)).unwrap();
        assert_eq!(a.get_cell(0, 1).unwrap(), &Value::Int64(42));
        assert_eq!(b.get_cell(0, 1).unwrap(), &Value::Int64(2));
        assert_eq!(shared[1], Value::Int64(2));
    }
}
