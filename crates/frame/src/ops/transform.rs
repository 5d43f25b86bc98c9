//! Whole-column transforms.

use crate::table::Table;
use alloc::string::String;
use alloc::vec;
use alloc::vec::Vec;
use tabpipe_core::{Error, Result, Value};
use tabpipe_expr::Program;
use tabpipe_storage::ColumnStore;
use tracing::debug;

impl<S: ColumnStore> Table<S> {
    /// Evaluates `expr` once over whole columns and stores the result.
    ///
    /// Field names bind to their entire column as a list. The target column
    /// is the last identifier the expression references. A list result must
    /// have one element per row and becomes the column; any other result is
    /// broadcast to every row. An existing target is replaced, a new one is
    /// appended.
    pub fn transform(&mut self, expr: &str) -> Result<()> {
        let program = Program::compile(expr, &self.column_bindings())?;
        let target = program
            .identifiers()
            .pop()
            .ok_or_else(|| Error::compile("transform has no target column", 0))?;
        self.apply_transform(&target, &program)
    }

    /// Like `transform` with an explicit target column.
    pub fn transform_into(&mut self, target: &str, expr: &str) -> Result<()> {
        let program = Program::compile(expr, &self.column_bindings())?;
        self.apply_transform(target, &program)
    }

    fn apply_transform(&mut self, target: &str, program: &Program) -> Result<()> {
        let rows = self.row_count();
        let values: Vec<Value> = match program.run(&self.column_bindings())? {
            Value::List(items) if items.len() == rows => items,
            Value::List(items) => return Err(Error::length_mismatch(rows, items.len())),
            scalar => vec![scalar; rows],
        };
        debug!(column = target, rows, "transform");
        self.put_column(target, values)
    }
}

/// Returns the column a transform expression would write to.
pub fn transform_target(expr: &str) -> Result<Option<String>> {
    Ok(Program::parse(expr)?.identifiers().pop())
}
