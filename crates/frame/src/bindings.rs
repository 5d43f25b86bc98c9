//! Expression bindings over a table.
//!
//! Two binding modes exist. Row mode binds each field name to one cell and is
//! used by filters. Column mode binds each field name to the whole column as
//! a list and is used by transforms.

use alloc::vec::Vec;
use tabpipe_core::schema::Schema;
use tabpipe_core::Value;
use tabpipe_expr::{Environment, FunctionRegistry};
use tabpipe_storage::{ColumnStore, RowView};

/// Binds field names to the cells of one row.
pub struct RowBindings<'a, S: ColumnStore> {
    schema: &'a Schema,
    row: RowView<'a, S>,
    functions: &'a FunctionRegistry,
}

impl<'a, S: ColumnStore> RowBindings<'a, S> {
    pub fn new(schema: &'a Schema, row: RowView<'a, S>, functions: &'a FunctionRegistry) -> Self {
        Self {
            schema,
            row,
            functions,
        }
    }

    /// Returns the bound row index.
    pub fn row(&self) -> usize {
        self.row.row()
    }
}

impl<'a, S: ColumnStore> Environment for RowBindings<'a, S> {
    fn resolve(&self, name: &str) -> Option<Value> {
        let col = self.schema.field_index(name)?;
        self.row.get(col).cloned()
    }

    fn contains(&self, name: &str) -> bool {
        self.schema.field_index(name).is_some()
    }

    fn functions(&self) -> &FunctionRegistry {
        self.functions
    }
}

/// Binds field names to whole columns, each as a `Value::List`.
pub struct ColumnBindings<'a, S: ColumnStore> {
    schema: &'a Schema,
    store: &'a S,
    functions: &'a FunctionRegistry,
}

impl<'a, S: ColumnStore> ColumnBindings<'a, S> {
    pub fn new(schema: &'a Schema, store: &'a S, functions: &'a FunctionRegistry) -> Self {
        Self {
            schema,
            store,
            functions,
        }
    }
}

impl<'a, S: ColumnStore> Environment for ColumnBindings<'a, S> {
    fn resolve(&self, name: &str) -> Option<Value> {
        let col = self.schema.field_index(name)?;
        let column = self.store.column(col)?;
        Some(Value::List(Vec::clone(column)))
    }

    fn contains(&self, name: &str) -> bool {
        self.schema.field_index(name).is_some()
    }

    fn functions(&self) -> &FunctionRegistry {
        self.functions
    }
}
