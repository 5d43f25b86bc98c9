//! Borrowed row views.
//!
//! A `RowView` is a store reference plus a row index. Cells are resolved
//! through the store's bounds-checked accessor on every read, so a view never
//! holds addresses into column buffers. It borrows the store, which rules out
//! structural mutation for as long as the view is alive.

use crate::column_store::ColumnStore;
use alloc::vec::Vec;
use core::fmt;
use tabpipe_core::Value;

/// A non-owning view of one row across all columns.
pub struct RowView<'a, S: ColumnStore + ?Sized> {
    store: &'a S,
    row: usize,
}

impl<'a, S: ColumnStore + ?Sized> RowView<'a, S> {
    pub(crate) fn new(store: &'a S, row: usize) -> Self {
        Self { store, row }
    }

    /// Returns the row index this view addresses.
    #[inline]
    pub fn row(&self) -> usize {
        self.row
    }

    /// Returns the number of cells (the store's column count).
    #[inline]
    pub fn len(&self) -> usize {
        self.store.column_count()
    }

    /// Returns true if the row has no cells.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Gets the cell in a column.
    pub fn get(&self, col: usize) -> Option<&'a Value> {
        self.store.get_cell(col, self.row).ok()
    }

    /// Iterates the cells in column order.
    pub fn iter(&self) -> impl Iterator<Item = &'a Value> + 'a {
        let store = self.store;
        let row = self.row;
        (0..store.column_count()).filter_map(move |col| store.get_cell(col, row).ok())
    }

    /// Copies the cells into an owned vector.
    pub fn to_vec(&self) -> Vec<Value> {
        self.iter().cloned().collect()
    }
}

impl<'a, S: ColumnStore + ?Sized> Clone for RowView<'a, S> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<'a, S: ColumnStore + ?Sized> Copy for RowView<'a, S> {}

impl<'a, S: ColumnStore + ?Sized> fmt::Debug for RowView<'a, S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RowView")
            .field("row", &self.row)
            .field("cells", &self.to_vec())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use crate::{ColumnStore, MemoryStore};
    use alloc::rc::Rc;
    use alloc::vec;
    use tabpipe_core::{Error, Value};

    fn sample() -> MemoryStore {
        MemoryStore::from_columns(vec![
            Rc::new(vec![Value::Int64(1), Value::Int64(2)]),
            Rc::new(vec![Value::from("x"), Value::from("y")]),
        ])
        .unwrap()
    }

    #[test]
    fn test_row_view_reads_across_columns() {
        let store = sample();
        let view = store.row_view(1).unwrap();
        assert_eq!(view.row(), 1);
        assert_eq!(view.len(), 2);
        assert_eq!(view.get(0), Some(&Value::Int64(2)));
        assert_eq!(view.get(1), Some(&Value::from("y")));
        assert_eq!(view.get(2), None);
        assert_eq!(view.to_vec(), vec![Value::Int64(2), Value::from("y")]);
    }

    #[test]
    fn test_row_view_bounds() {
        let store = sample();
        assert!(matches!(store.row_view(2), Err(Error::OutOfRange { what: "row", .. })));
        assert!(matches!(
            MemoryStore::new().row_view(0),
            Err(Error::OutOfRange { what: "column", .. })
        ));
    }

    #[test]
    fn test_row_view_survives_replacement_in_a_clone() {
        let store = sample();
        let view = store.row_view(0).unwrap();

        let mut next = store.clone();
        let column = Rc::new(vec![Value::Int64(7), Value::Int64(8)]);
        next.replace_column(0, column).unwrap();

        // The view still reads the store it borrowed.
        assert_eq!(view.get(0), Some(&Value::Int64(1)));
        assert_eq!(next.row_view(0).unwrap().get(0), Some(&Value::Int64(7)));
    }
}
