//! The column store capability set.
//!
//! The table layer is written against this trait rather than one concrete
//! layout so that alternate backends can satisfy the same contract.

use crate::row_view::RowView;
use alloc::rc::Rc;
use alloc::vec::Vec;
use core::fmt;
use tabpipe_core::{Error, Result, Value};

/// A column: a shared, ordered sequence of cells.
///
/// Columns are reference counted so that projections can alias them without
/// copying. Writes go through `Rc::make_mut`, so a shared column is cloned
/// before it is modified and aliases never observe the write.
pub type Column = Rc<Vec<Value>>;

/// Identifies a column store backend in the wire header.
#[repr(u8)]
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum StoreKind {
    /// `MemoryStore`
    Memory = 0,
}

impl StoreKind {
    /// Returns the wire tag.
    #[inline]
    pub fn tag(self) -> u8 {
        self as u8
    }

    /// Resolves a wire tag. Unknown tags return `None`.
    pub fn from_tag(tag: u8) -> Option<Self> {
        match tag {
            0 => Some(StoreKind::Memory),
            _ => None,
        }
    }
}

/// Storage capability set: cell access, column access, structural mutation
/// and row views. All indices are 0-based and range-checked.
pub trait ColumnStore: Clone + fmt::Debug {
    /// Backend tag written into the wire header.
    const KIND: StoreKind;

    /// Builds a store from whole columns.
    ///
    /// Fails with `LengthMismatch` if the columns differ in length.
    fn from_columns(columns: Vec<Column>) -> Result<Self>;

    /// Returns the number of columns.
    fn column_count(&self) -> usize;

    /// Returns the number of rows: the length of the first column, or 0 for
    /// a store without columns.
    fn row_count(&self) -> usize;

    /// Structural generation. Changes whenever a column is added, dropped or
    /// replaced; cell writes leave it unchanged.
    fn generation(&self) -> u64;

    /// Returns the column at a position, or `None` if out of range.
    fn column(&self, position: usize) -> Option<&Column>;

    /// Reads one cell.
    fn get_cell(&self, col: usize, row: usize) -> Result<&Value>;

    /// Writes one cell.
    fn set_cell(&mut self, col: usize, row: usize, value: Value) -> Result<()>;

    /// Appends a column. Its length must equal the current row count unless
    /// the store has no columns yet, in which case it sets the row count.
    fn add_column(&mut self, values: Column) -> Result<()>;

    /// Removes a column, shifting later columns left. Returns the removed
    /// column.
    fn drop_column(&mut self, position: usize) -> Result<Column>;

    /// Swaps in a new column at a position. Returns the previous column.
    fn replace_column(&mut self, position: usize, values: Column) -> Result<Column>;

    /// Builds a view of one row across every column.
    ///
    /// Fails with `OutOfRange` when the store has no columns or `row` is not
    /// below the row count.
    fn row_view(&self, row: usize) -> Result<RowView<'_, Self>> {
        if self.column_count() == 0 {
            return Err(Error::out_of_range("column", 0, 0));
        }
        let rows = self.row_count();
        if row >= rows {
            return Err(Error::out_of_range("row", row, rows));
        }
        Ok(RowView::new(self, row))
    }
}
