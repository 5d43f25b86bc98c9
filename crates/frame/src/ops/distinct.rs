//! Distinct values of a column.

use crate::table::Table;
use hashbrown::HashSet;
use tabpipe_core::Value;
use tabpipe_storage::ColumnStore;

impl<S: ColumnStore> Table<S> {
    /// Returns the set of values in a column.
    ///
    /// `None` if the field does not exist or the column is empty.
    pub fn distinct(&self, name: &str) -> Option<HashSet<Value>> {
        let column = self.column(name)?;
        if column.is_empty() {
            return None;
        }
        Some(column.iter().cloned().collect())
    }
}

#[cfg(test)]
mod tests {
    use crate::Table;
    use alloc::vec;
    use hashbrown::HashSet;
    use tabpipe_core::schema::Field;
    use tabpipe_core::Value;

    #[test]
    fn test_distinct_values() {
        let table: Table = Table::from_columns(
            vec![Field::new("n", "int")],
            vec![[1, 2, 2, 3, 1].iter().map(|&v| Value::Int64(v)).collect()],
        )
        .unwrap();
        let expected: HashSet<Value> = [1, 2, 3].iter().map(|&v| Value::Int64(v)).collect();
        assert_eq!(table.distinct("n"), Some(expected));
    }

    #[test]
    fn test_distinct_missing_or_empty() {
        let table: Table =
            Table::from_columns(vec![Field::new("n", "int")], vec![vec![]]).unwrap();
        assert_eq!(table.distinct("n"), None);
        assert_eq!(table.distinct("other"), None);
    }

    #[test]
    fn test_distinct_keeps_null_and_mixed_types() {
        let table: Table = Table::from_columns(
            vec![Field::new("v", "string")],
            vec![vec![Value::Null, Value::Int64(1), Value::Float64(1.0), Value::Null]],
        )
        .unwrap();
        assert_eq!(table.distinct("v").map(|s| s.len()), Some(3));
    }

    #[test]
    fn test_distinct_signed_zero_is_one_value() {
        let table: Table = Table::from_columns(
            vec![Field::new("f", "float")],
            vec![vec![Value::Float64(0.0), Value::Float64(-0.0)]],
        )
        .unwrap();
        assert_eq!(table.distinct("f").map(|s| s.len()), Some(1));
        assert_eq!(table.describe()["f"].distinct, 1);
    }
}
