//! The table: a schema over a column store.

use crate::bindings::{ColumnBindings, RowBindings};
use crate::metadata::Metadata;
use alloc::rc::Rc;
use alloc::string::String;
use alloc::vec::Vec;
use tabpipe_core::schema::{Field, Schema};
use tabpipe_core::{DataType, Error, Result, Value};
use tabpipe_expr::{Callable, FunctionRegistry};
use tabpipe_storage::{Column, ColumnStore, MemoryStore, RowView};
use tracing::debug;

/// Freshness marker for row access by index.
///
/// Records the store's structural generation and row count at indexing
/// time. Any add, drop or replace of a column moves the generation on, which
/// makes the marker stale.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
struct RowIndex {
    generation: u64,
    rows: usize,
}

/// A table: an ordered schema, one column per field, a function registry
/// for expressions, and descriptive metadata.
///
/// Relational operations return new tables. Structural operations
/// (`add_column`, `drop_column`, `rename_column`, `transform`) mutate in
/// place and keep `schema.len() == column_count()`.
#[derive(Clone, Debug)]
pub struct Table<S: ColumnStore = MemoryStore> {
    pub(crate) schema: Schema,
    pub(crate) store: S,
    row_index: Option<RowIndex>,
    pub(crate) functions: FunctionRegistry,
    pub(crate) metadata: Metadata,
}

impl<S: ColumnStore> Table<S> {
    /// Creates a table without fields or rows.
    pub fn new() -> Result<Self> {
        Self::from_parts(Schema::default(), S::from_columns(Vec::new())?)
    }

    /// Assembles a table from a schema and a store with one column per field.
    pub fn from_parts(schema: Schema, store: S) -> Result<Self> {
        if schema.len() != store.column_count() {
            return Err(Error::schema_mismatch(alloc::format!(
                "{} fields but {} columns",
                schema.len(),
                store.column_count()
            )));
        }
        Ok(Self {
            schema,
            store,
            row_index: None,
            functions: FunctionRegistry::new(),
            metadata: Metadata::default(),
        })
    }

    /// Builds a table from fields and their column values.
    pub fn from_columns(fields: Vec<Field>, columns: Vec<Vec<Value>>) -> Result<Self> {
        let store = S::from_columns(columns.into_iter().map(Rc::new).collect())?;
        Self::from_parts(Schema::new(fields), store)
    }

    /// Builds a table sharing this table's registry and source.
    pub(crate) fn derive(&self, schema: Schema, columns: Vec<Column>) -> Result<Self> {
        let mut table = Self::from_parts(schema, S::from_columns(columns)?)?;
        table.functions = self.functions.clone();
        table.metadata = self.metadata.derived();
        Ok(table)
    }

    /// Returns every column in field order.
    pub(crate) fn columns(&self) -> Result<Vec<&Column>> {
        let n = self.store.column_count();
        (0..n)
            .map(|c| {
                self.store
                    .column(c)
                    .ok_or_else(|| Error::out_of_range("column", c, n))
            })
            .collect()
    }

    pub(crate) fn row_bindings(&self, row: usize) -> Result<RowBindings<'_, S>> {
        Ok(RowBindings::new(
            &self.schema,
            self.store.row_view(row)?,
            &self.functions,
        ))
    }

    pub(crate) fn column_bindings(&self) -> ColumnBindings<'_, S> {
        ColumnBindings::new(&self.schema, &self.store, &self.functions)
    }

    // ---- accessors ----

    #[inline]
    pub fn schema(&self) -> &Schema {
        &self.schema
    }

    #[inline]
    pub fn store(&self) -> &S {
        &self.store
    }

    /// Returns the number of rows.
    #[inline]
    pub fn row_count(&self) -> usize {
        self.store.row_count()
    }

    /// Alias of `row_count`.
    #[inline]
    pub fn count(&self) -> usize {
        self.row_count()
    }

    #[inline]
    pub fn column_count(&self) -> usize {
        self.store.column_count()
    }

    pub fn field_names(&self) -> Vec<String> {
        self.schema.field_names()
    }

    pub fn field_types(&self) -> Vec<String> {
        self.schema.field_types()
    }

    /// Returns the position of a field, first match wins.
    pub fn field_number(&self, name: &str) -> Option<usize> {
        self.schema.field_index(name)
    }

    pub fn field_type(&self, name: &str) -> Option<&str> {
        self.schema.field_type(name)
    }

    pub fn field_name_by_index(&self, index: usize) -> Option<&str> {
        self.schema.field(index).map(|f| f.name())
    }

    /// Returns the column of a field.
    pub fn column(&self, name: &str) -> Option<&Column> {
        self.store.column(self.field_number(name)?)
    }

    pub fn column_by_index(&self, index: usize) -> Option<&Column> {
        self.store.column(index)
    }

    /// Reads one cell.
    pub fn cell(&self, col: usize, row: usize) -> Result<&Value> {
        self.store.get_cell(col, row)
    }

    /// Writes one cell. Tables sharing the column are not affected.
    pub fn set_cell(&mut self, col: usize, row: usize, value: Value) -> Result<()> {
        self.store.set_cell(col, row, value)
    }

    /// Returns a view of one row.
    pub fn row(&self, row: usize) -> Result<RowView<'_, S>> {
        self.store.row_view(row)
    }

    /// Iterates all rows in order.
    pub fn rows(&self) -> impl Iterator<Item = RowView<'_, S>> + '_ {
        (0..self.row_count()).filter_map(move |r| self.store.row_view(r).ok())
    }

    #[inline]
    pub fn metadata(&self) -> &Metadata {
        &self.metadata
    }

    /// Records where the data came from.
    pub fn set_source(&mut self, source: impl Into<String>) {
        self.metadata.source = Some(source.into());
    }

    // ---- structural operations ----

    /// Appends a column, declaring the type inferred from its values.
    pub fn add_column(&mut self, name: impl Into<String>, values: Vec<Value>) -> Result<()> {
        let data_type = DataType::infer(&values);
        self.add_column_typed(name, data_type.as_str(), values)
    }

    /// Appends a column with an explicit declared type.
    ///
    /// Fails with `LengthMismatch` unless the column length equals the row
    /// count; the first column of an empty table sets the row count.
    pub fn add_column_typed(
        &mut self,
        name: impl Into<String>,
        declared_type: impl Into<String>,
        values: Vec<Value>,
    ) -> Result<()> {
        let field = Field::new(name, declared_type);
        self.store.add_column(Rc::new(values))?;
        let position = self.schema.push(field);
        debug!(position, rows = self.row_count(), "added column");
        Ok(())
    }

    /// Removes a field and its column. Later fields shift left.
    pub fn drop_column(&mut self, name: &str) -> Result<()> {
        let position = self
            .field_number(name)
            .ok_or_else(|| Error::field_not_found(name))?;
        self.store.drop_column(position)?;
        self.schema.remove(position)?;
        debug!(name, position, "dropped column");
        Ok(())
    }

    /// Renames a field. Column data is untouched.
    pub fn rename_column(&mut self, old: &str, new: impl Into<String>) -> Result<()> {
        let position = self
            .field_number(old)
            .ok_or_else(|| Error::field_not_found(old))?;
        self.schema.rename(position, new)
    }

    /// Installs a new column for an existing field, or appends a new field
    /// when `name` is absent. The declared type follows the new values.
    pub(crate) fn put_column(&mut self, name: &str, values: Vec<Value>) -> Result<()> {
        let rows = self.row_count();
        if self.column_count() > 0 && values.len() != rows {
            return Err(Error::length_mismatch(rows, values.len()));
        }
        let data_type = DataType::infer(&values);
        match self.field_number(name) {
            Some(position) => {
                self.store.replace_column(position, Rc::new(values))?;
                self.schema.retype(position, data_type.as_str())
            }
            None => self.add_column_typed(name, data_type.as_str(), values),
        }
    }

    // ---- row index ----

    /// Enables row access by index for the current layout.
    ///
    /// Fails with `NoData` when the table has no columns or no rows.
    pub fn index_rows(&mut self) -> Result<()> {
        let rows = self.row_count();
        if self.column_count() == 0 || rows == 0 {
            return Err(Error::NoData);
        }
        self.row_index = Some(RowIndex {
            generation: self.store.generation(),
            rows,
        });
        Ok(())
    }

    /// Returns true if the row index matches the current layout.
    pub fn is_indexed(&self) -> bool {
        match self.row_index {
            Some(index) => {
                index.generation == self.store.generation() && index.rows == self.row_count()
            }
            None => false,
        }
    }

    /// Returns a row through the index. `None` if the index is missing or
    /// stale, or `row` is out of range.
    pub fn row_by_index(&self, row: usize) -> Option<RowView<'_, S>> {
        if !self.is_indexed() {
            return None;
        }
        self.store.row_view(row).ok()
    }

    // ---- function registry ----

    /// Registers a function callable from expressions.
    pub fn add_function<F>(&mut self, name: impl Into<String>, f: F) -> Option<Callable>
    where
        F: Fn(&[Value]) -> Result<Value> + 'static,
    {
        self.functions.register(name, f)
    }

    pub fn remove_function(&mut self, name: &str) -> Option<Callable> {
        self.functions.remove(name)
    }

    #[inline]
    pub fn functions(&self) -> &FunctionRegistry {
        &self.functions
    }
}

/// Tables compare by schema and cell values. Registry and metadata are not
/// part of equality.
impl<S: ColumnStore> PartialEq for Table<S> {
    fn eq(&self, other: &Self) -> bool {
        if self.schema != other.schema || self.row_count() != other.row_count() {
            return false;
        }
        (0..self.column_count()).all(|c| {
            match (self.store.column(c), other.store.column(c)) {
                (Some(a), Some(b)) => Rc::ptr_eq(a, b) || a == b,
                _ => false,
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::vec;

    fn sample() -> Table {
        Table::from_columns(
            vec![Field::new("id", "int"), Field::new("name", "string")],
            vec![
                vec![Value::Int64(1), Value::Int64(2), Value::Int64(3)],
                vec![Value::from("a"), Value::from("b"), Value::from("c")],
            ],
        )
        .unwrap()
    }

    #[test]
    fn test_accessors() {
        let table = sample();
        assert_eq!(table.row_count(), 3);
        assert_eq!(table.count(), 3);
        assert_eq!(table.column_count(), 2);
        assert_eq!(table.field_names(), vec!["id", "name"]);
        assert_eq!(table.field_types(), vec!["int", "string"]);
        assert_eq!(table.field_number("name"), Some(1));
        assert_eq!(table.field_type("id"), Some("int"));
        assert_eq!(table.field_name_by_index(1), Some("name"));
        assert_eq!(table.field_name_by_index(2), None);
        assert_eq!(table.cell(1, 2).unwrap(), &Value::from("c"));
        assert_eq!(table.column("id").map(|c| c.len()), Some(3));
        assert!(table.column("nope").is_none());
        assert_eq!(table.rows().count(), 3);
    }

    #[test]
    fn test_from_parts_checks_arity() {
        let store = MemoryStore::from_columns(vec![Rc::new(vec![Value::Null])]).unwrap();
        assert!(matches!(
            Table::from_parts(Schema::default(), store),
            Err(Error::SchemaMismatch { .. })
        ));
    }

    #[test]
    fn test_empty_table() {
        let table: Table = Table::new().unwrap();
        assert_eq!(table.row_count(), 0);
        assert_eq!(table.column_count(), 0);
        assert!(table.row(0).is_err());
    }

    #[test]
    fn test_add_column_infers_type() {
        let mut table = sample();
        table
            .add_column("score", vec![Value::Null, Value::Float64(1.5), Value::Float64(2.0)])
            .unwrap();
        assert_eq!(table.field_type("score"), Some("float"));
        assert_eq!(table.schema().field(2).unwrap().position(), 2);
    }

    #[test]
    fn test_add_column_length_mismatch() {
        let mut table = sample();
        let err = table.add_column("x", vec![Value::Int64(1)]).unwrap_err();
        assert_eq!(err, Error::length_mismatch(3, 1));
        assert_eq!(table.column_count(), 2);
        assert_eq!(table.schema().len(), 2);
    }

    #[test]
    fn test_first_column_sets_row_count() {
        let mut table: Table = Table::new().unwrap();
        table.add_column("x", vec![Value::Int64(1), Value::Int64(2)]).unwrap();
        assert_eq!(table.row_count(), 2);
        assert_eq!(table.field_type("x"), Some("int"));
    }

    #[test]
    fn test_drop_then_add_restores_counts() {
        let mut table = sample();
        let values = table.column("name").unwrap().to_vec();
        table.drop_column("name").unwrap();
        assert_eq!(table.column_count(), 1);
        assert_eq!(table.schema().len(), 1);
        table.add_column("name", values).unwrap();
        assert_eq!(table.column_count(), 2);
        assert_eq!(table.row_count(), 3);
        assert_eq!(table.field_number("name"), Some(1));
    }

    #[test]
    fn test_drop_missing_column() {
        let mut table = sample();
        assert_eq!(
            table.drop_column("nope").unwrap_err(),
            Error::field_not_found("nope")
        );
    }

    #[test]
    fn test_drop_renumbers_positions() {
        let mut table = sample();
        table.drop_column("id").unwrap();
        let field = table.schema().field(0).unwrap();
        assert_eq!(field.name(), "name");
        assert_eq!(field.position(), 0);
        assert_eq!(table.cell(0, 0).unwrap(), &Value::from("a"));
    }

    #[test]
    fn test_rename_column() {
        let mut table = sample();
        table.rename_column("name", "label").unwrap();
        assert_eq!(table.field_number("label"), Some(1));
        assert_eq!(table.field_type("label"), Some("string"));
        assert_eq!(table.cell(1, 0).unwrap(), &Value::from("a"));
    }

    #[test]
    fn test_rename_missing_leaves_table_unchanged() {
        let mut table = sample();
        let before = table.clone();
        assert_eq!(
            table.rename_column("nope", "x").unwrap_err(),
            Error::field_not_found("nope")
        );
        assert_eq!(table, before);
    }

    #[test]
    fn test_row_index_freshness() {
        let mut table = sample();
        assert!(!table.is_indexed());
        assert!(table.row_by_index(0).is_none());

        table.index_rows().unwrap();
        assert!(table.is_indexed());
        assert_eq!(table.row_by_index(1).unwrap().get(0), Some(&Value::Int64(2)));
        assert!(table.row_by_index(3).is_none());

        // Cell writes keep the layout, structural changes do not.
        table.set_cell(0, 0, Value::Int64(9)).unwrap();
        assert!(table.is_indexed());
        table.add_column("x", vec![Value::Null; 3]).unwrap();
        assert!(!table.is_indexed());
        assert!(table.row_by_index(0).is_none());
    }

    #[test]
    fn test_index_rows_requires_data() {
        let mut empty: Table = Table::new().unwrap();
        assert_eq!(empty.index_rows().unwrap_err(), Error::NoData);

        let mut no_rows: Table =
            Table::from_columns(vec![Field::new("a", "int")], vec![vec![]]).unwrap();
        assert_eq!(no_rows.index_rows().unwrap_err(), Error::NoData);
    }

    #[test]
    fn test_set_cell_is_copy_on_write() {
        let mut a = sample();
        let b = a.clone();
        a.set_cell(1, 0, Value::from("z")).unwrap();
        assert_eq!(a.cell(1, 0).unwrap(), &Value::from("z"));
        assert_eq!(b.cell(1, 0).unwrap(), &Value::from("a"));
    }

    #[test]
    fn test_function_registry() {
        let mut table = sample();
        assert!(table.functions().is_empty());
        table.add_function("one", |_: &[Value]| Ok(Value::Int64(1)));
        assert!(table.functions().contains("one"));
        assert!(table.remove_function("one").is_some());
        assert!(table.functions().is_empty());
    }
}
