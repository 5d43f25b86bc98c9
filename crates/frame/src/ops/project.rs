//! Projection.

use crate::table::Table;
use alloc::rc::Rc;
use alloc::vec::Vec;
use tabpipe_core::{Error, Result};
use tabpipe_storage::ColumnStore;
use tracing::debug;

impl<S: ColumnStore> Table<S> {
    /// Returns a table with the named fields, in request order.
    ///
    /// Columns are shared with the source rather than copied. Fails with
    /// `FieldNotFound` on the first unknown name.
    pub fn project<N: AsRef<str>>(&self, names: &[N]) -> Result<Table<S>> {
        let mut positions = Vec::with_capacity(names.len());
        for name in names {
            let name = name.as_ref();
            let position = self
                .field_number(name)
                .ok_or_else(|| Error::field_not_found(name))?;
            positions.push(position);
        }

        let schema = self.schema.select(&positions)?;
        let columns = self.columns()?;
        let picked = positions.iter().map(|&p| Rc::clone(columns[p])).collect();

        debug!(fields = positions.len(), rows = self.row_count(), "project");
        self.derive(schema, picked)
    }
}

#[cfg(test)]
mod tests {
    use crate::Table;
    use alloc::rc::Rc;
    use alloc::vec;
    use alloc::vec::Vec;
    use tabpipe_core::schema::Field;
    use tabpipe_core::{Error, Value};

    fn sample() -> Table {
        Table::from_columns(
            vec![
                Field::new("id", "int"),
                Field::new("name", "string"),
                Field::new("score", "float"),
            ],
            vec![
                vec![Value::Int64(1), Value::Int64(2)],
                vec![Value::from("a"), Value::from("b")],
                vec![Value::Float64(0.5), Value::Float64(1.5)],
            ],
        )
        .unwrap()
    }

    #[test]
    fn test_project_reorders_and_renumbers() {
        let table = sample();
        let projected = table.project(&["score", "id"]).unwrap();
        assert_eq!(projected.field_names(), vec!["score", "id"]);
        let positions: Vec<usize> = projected.schema().fields().iter().map(|f| f.position()).collect();
        assert_eq!(positions, vec![0, 1]);
        assert_eq!(projected.cell(0, 1).unwrap(), &Value::Float64(1.5));
        assert_eq!(projected.row_count(), 2);
    }

    #[test]
    fn test_project_all_names_equals_source() {
        let table = sample();
        let names = table.field_names();
        assert_eq!(table.project(names.as_slice()).unwrap(), table);
    }

    #[test]
    fn test_project_shares_columns() {
        let table = sample();
        let projected = table.project(&["name"]).unwrap();
        assert!(Rc::ptr_eq(
            projected.column_by_index(0).unwrap(),
            table.column("name").unwrap()
        ));
    }

    #[test]
    fn test_project_write_does_not_leak() {
        let table = sample();
        let mut projected = table.project(&["name"]).unwrap();
        projected.set_cell(0, 0, Value::from("z")).unwrap();
        assert_eq!(table.cell(1, 0).unwrap(), &Value::from("a"));
    }

    #[test]
    fn test_project_unknown_field() {
        let table = sample();
        assert_eq!(
            table.project(&["id", "nope"]).unwrap_err(),
            Error::field_not_found("nope")
        );
    }

    #[test]
    fn test_project_inherits_functions() {
        let mut table = sample();
        table.add_function("f", |_: &[Value]| Ok(Value::Null));
        let projected = table.project(&["id"]).unwrap();
        assert!(projected.functions().contains("f"));
    }
}
