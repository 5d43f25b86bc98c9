//! Inner equi-join on compound keys.

use crate::table::Table;
use alloc::rc::Rc;
use alloc::string::String;
use alloc::vec::Vec;
use core::fmt::Write;
use hashbrown::HashMap;
use tabpipe_core::schema::Schema;
use tabpipe_core::{Error, Result};
use tabpipe_storage::{Column, ColumnStore};
use tracing::debug;

/// Renders the compound key of one row: the canonical text of each key
/// cell, joined with `|`.
fn compound_key(columns: &[&Column], keys: &[usize], row: usize, buf: &mut String) {
    buf.clear();
    for (i, &k) in keys.iter().enumerate() {
        if i > 0 {
            buf.push('|');
        }
        // Writing into a String cannot fail.
        let _ = write!(buf, "{}", columns[k][row]);
    }
}

fn key_positions<S: ColumnStore, N: AsRef<str>>(table: &Table<S>, keys: &[N]) -> Result<Vec<usize>> {
    keys.iter()
        .map(|k| {
            let k = k.as_ref();
            table.field_number(k).ok_or_else(|| Error::field_not_found(k))
        })
        .collect()
}

impl<S: ColumnStore> Table<S> {
    /// Inner join with `other` on equal compound keys.
    ///
    /// A hash index is built over `other`. Each row of `self` emits one
    /// output row per matching row of `other`: the cells of `self` followed
    /// by the cells of `other`. Output rows follow the row order of `self`,
    /// then the row order of `other` within one key. Unmatched rows are
    /// dropped.
    ///
    /// Fails with `NoKeys` for an empty key list and `FieldNotFound` when a
    /// key is missing on either side.
    pub fn join<N: AsRef<str>>(&self, other: &Table<S>, keys: &[N]) -> Result<Table<S>> {
        if keys.is_empty() {
            return Err(Error::NoKeys);
        }
        let left_keys = key_positions(self, keys)?;
        let right_keys = key_positions(other, keys)?;

        let left = self.columns()?;
        let right = other.columns()?;

        // Build
        let mut index: HashMap<String, Vec<usize>> = HashMap::with_capacity(other.row_count());
        let mut key = String::new();
        for row in 0..other.row_count() {
            compound_key(&right, &right_keys, row, &mut key);
            index.entry(key.clone()).or_default().push(row);
        }

        // Probe
        let mut pairs: Vec<(usize, usize)> = Vec::new();
        for row in 0..self.row_count() {
            compound_key(&left, &left_keys, row, &mut key);
            if let Some(matches) = index.get(key.as_str()) {
                pairs.extend(matches.iter().map(|&m| (row, m)));
            }
        }

        let mut columns: Vec<Column> = Vec::with_capacity(left.len() + right.len());
        for column in &left {
            columns.push(Rc::new(pairs.iter().map(|&(l, _)| column[l].clone()).collect()));
        }
        for column in &right {
            columns.push(Rc::new(pairs.iter().map(|&(_, r)| column[r].clone()).collect()));
        }

        debug!(
            keys = keys.len(),
            build_rows = other.row_count(),
            rows = pairs.len(),
            "join"
        );
        self.derive(Schema::concat(&self.schema, &other.schema), columns)
    }
}
