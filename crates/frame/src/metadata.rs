//! Table metadata and field statistics.

use alloc::collections::BTreeMap;
use alloc::string::String;
use tabpipe_core::Value;

/// Best-effort statistics of one field.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct FieldStats {
    /// Declared type of the field.
    pub declared_type: String,
    /// Number of non-null cells.
    pub count: usize,
    /// Number of null cells.
    pub nulls: usize,
    /// Number of distinct non-null cells.
    pub distinct: usize,
    /// Smallest non-null cell by `Value` order.
    pub min: Option<Value>,
    /// Largest non-null cell by `Value` order.
    pub max: Option<Value>,
    /// Mean of the numeric cells; `None` if there are none.
    pub mean: Option<f64>,
}

/// Descriptive information attached to a table.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Metadata {
    /// Where the data was read from, if known.
    pub source: Option<String>,
    /// Row count at the time stats were generated.
    pub rows: usize,
    /// Column count at the time stats were generated.
    pub columns: usize,
    /// Per-field statistics keyed by field name.
    pub field_stats: BTreeMap<String, FieldStats>,
}

impl Metadata {
    /// Metadata for a table derived from this one: same source, no stats.
    pub(crate) fn derived(&self) -> Self {
        Self {
            source: self.source.clone(),
            ..Self::default()
        }
    }
}
