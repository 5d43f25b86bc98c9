//! Union of two tables with the same shape.

use crate::table::Table;
use alloc::format;
use alloc::rc::Rc;
use alloc::vec::Vec;
use tabpipe_core::{Error, Result};
use tabpipe_storage::ColumnStore;
use tracing::debug;

impl<S: ColumnStore> Table<S> {
    /// Appends the rows of `other` after the rows of `self`.
    ///
    /// Both tables must have the same field count with identical names and
    /// declared types in order, otherwise `SchemaMismatch`. Duplicates are
    /// kept. The result owns fresh columns.
    pub fn union_all(&self, other: &Table<S>) -> Result<Table<S>> {
        if self.schema.len() != other.schema.len() {
            return Err(Error::schema_mismatch(format!(
                "field count {} vs {}",
                self.schema.len(),
                other.schema.len()
            )));
        }
        for (a, b) in self.schema.fields().iter().zip(other.schema.fields()) {
            if !a.same_shape(b) {
                return Err(Error::schema_mismatch(format!(
                    "field {} is {} {} vs {} {}",
                    a.position(),
                    a.name(),
                    a.declared_type(),
                    b.name(),
                    b.declared_type()
                )));
            }
        }

        let rows = self.row_count() + other.row_count();
        let columns = self
            .columns()?
            .into_iter()
            .zip(other.columns()?)
            .map(|(top, bottom)| {
                let mut values = Vec::with_capacity(rows);
                values.extend(top.iter().cloned());
                values.extend(bottom.iter().cloned());
                Rc::new(values)
            })
            .collect();

        debug!(rows, "union_all");
        self.derive(self.schema.clone(), columns)
    }
}
