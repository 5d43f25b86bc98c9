//! Row filtering by predicate.

use crate::table::Table;
use alloc::rc::Rc;
use alloc::vec::Vec;
use tabpipe_core::{Error, Result, Value};
use tabpipe_expr::Program;
use tabpipe_storage::ColumnStore;
use tracing::{debug, trace};

impl<S: ColumnStore> Table<S> {
    /// Keeps the rows for which `predicate` evaluates to `true`.
    ///
    /// The predicate is compiled once, then run against each row with field
    /// names bound to that row's cells. A result other than a boolean fails
    /// with `ConditionNotBoolean`. Kept rows stay in their original order
    /// and are copied into fresh columns; no match yields a zero-row table
    /// with the same schema.
    pub fn filter(&self, predicate: &str) -> Result<Table<S>> {
        let rows = self.row_count();
        let program = if rows == 0 {
            Program::compile(predicate, &self.column_bindings())?
        } else {
            Program::compile(predicate, &self.row_bindings(0)?)?
        };

        let mut matches = Vec::new();
        for row in 0..rows {
            let result = program.run(&self.row_bindings(row)?)?;
            match result {
                Value::Boolean(true) => matches.push(row),
                Value::Boolean(false) => {}
                other => {
                    return Err(Error::ConditionNotBoolean {
                        got: other.type_name(),
                    })
                }
            }
        }
        trace!(?matches, "filter matches");

        let columns = self
            .columns()?
            .into_iter()
            .map(|column| Rc::new(matches.iter().map(|&r| column[r].clone()).collect()))
            .collect();

        debug!(rows, kept = matches.len(), "filter");
        self.derive(self.schema.clone(), columns)
    }
}
