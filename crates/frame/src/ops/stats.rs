//! Descriptive statistics.

use crate::metadata::FieldStats;
use crate::table::Table;
use alloc::collections::BTreeMap;
use alloc::string::String;
use hashbrown::HashSet;
use tabpipe_core::Value;
use tabpipe_storage::ColumnStore;
use tracing::debug;

fn field_stats(declared_type: &str, values: &[Value]) -> FieldStats {
    let mut stats = FieldStats {
        declared_type: String::from(declared_type),
        ..FieldStats::default()
    };
    let mut seen: HashSet<&Value> = HashSet::new();
    let mut total = 0.0;
    let mut numeric = 0usize;

    for value in values {
        if value.is_null() {
            stats.nulls += 1;
            continue;
        }
        stats.count += 1;
        seen.insert(value);
        if stats.min.as_ref().map_or(true, |m| value < m) {
            stats.min = Some(value.clone());
        }
        if stats.max.as_ref().map_or(true, |m| value > m) {
            stats.max = Some(value.clone());
        }
        if let Some(n) = value.as_number() {
            total += n;
            numeric += 1;
        }
    }

    stats.distinct = seen.len();
    if numeric > 0 {
        stats.mean = Some(total / numeric as f64);
    }
    stats
}

impl<S: ColumnStore> Table<S> {
    /// Computes statistics for every field, keyed by field name. When names
    /// repeat, the first field wins.
    pub fn describe(&self) -> BTreeMap<String, FieldStats> {
        let mut out = BTreeMap::new();
        for field in self.schema.fields() {
            if out.contains_key(field.name()) {
                continue;
            }
            if let Some(column) = self.store.column(field.position()) {
                out.insert(
                    String::from(field.name()),
                    field_stats(field.declared_type(), column),
                );
            }
        }
        out
    }

    /// Computes statistics and stores them in the table metadata.
    pub fn generate_stats(&mut self) {
        let stats = self.describe();
        self.metadata.rows = self.row_count();
        self.metadata.columns = self.column_count();
        self.metadata.field_stats = stats;
        debug!(
            rows = self.metadata.rows,
            columns = self.metadata.columns,
            "generated stats"
        );
    }
}
