//! Human-readable rendering for `--debug`, `dump` and `describe`.

use comfy_table::{Cell, CellAlignment, ContentArrangement, Table as TextTable};
use tabpipe_frame::{Metadata, Table};

/// Rows rendered before the dump is cut short.
pub const DUMP_ROW_LIMIT: usize = 1000;

const DUMP_START: &str = "------- DUMP START --------";
const DUMP_END: &str = "------- DUMP END --------";

fn text_table() -> TextTable {
    let mut out = TextTable::new();
    out.set_content_arrangement(ContentArrangement::Dynamic)
        .load_preset(comfy_table::presets::UTF8_FULL)
        .apply_modifier(comfy_table::modifiers::UTF8_ROUND_CORNERS);
    out
}

/// Renders at most `limit` rows of a table between dump markers.
pub fn format_table(table: &Table, limit: usize) -> String {
    let mut out = text_table();
    if table.column_count() > 0 {
        out.set_header(table.field_names().into_iter().map(Cell::new));
    }
    for row in table.rows().take(limit) {
        out.add_row(row.iter().map(|v| Cell::new(v.to_string())));
    }

    let mut text = format!("{}\n{}\n", DUMP_START, out);
    let rows = table.row_count();
    if rows > limit {
        text.push_str(&format!("... {} more rows\n", rows - limit));
    }
    text.push_str(DUMP_END);
    text
}

fn show<T: ToString>(value: &Option<T>) -> String {
    value.as_ref().map(ToString::to_string).unwrap_or_default()
}

/// Renders generated field statistics, one line per field.
pub fn format_stats(metadata: &Metadata) -> String {
    let mut out = text_table();
    out.set_header(["field", "type", "count", "nulls", "distinct", "min", "max", "mean"]);
    for (name, stats) in &metadata.field_stats {
        out.add_row(vec![
            Cell::new(name),
            Cell::new(&stats.declared_type),
            Cell::new(stats.count).set_alignment(CellAlignment::Right),
            Cell::new(stats.nulls).set_alignment(CellAlignment::Right),
            Cell::new(stats.distinct).set_alignment(CellAlignment::Right),
            Cell::new(show(&stats.min)),
            Cell::new(show(&stats.max)),
            Cell::new(show(&stats.mean)),
        ]);
    }
    let source = metadata.source.as_deref().unwrap_or("-");
    format!(
        "source: {}  rows: {}  columns: {}\n{}",
        source, metadata.rows, metadata.columns, out
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use tabpipe_core::schema::Field;
    use tabpipe_frame::Value;

    fn sample(rows: i64) -> Table {
        Table::from_columns(
            vec![Field::new("id", "int"), Field::new("name", "string")],
            vec![
                (0..rows).map(Value::Int64).collect(),
                (0..rows).map(|i| Value::String(format!("n{}", i))).collect(),
            ],
        )
        .unwrap()
    }

    #[test]
    fn test_format_table() {
        let text = format_table(&sample(2), DUMP_ROW_LIMIT);
        assert!(text.starts_with(DUMP_START));
        assert!(text.ends_with(DUMP_END));
        assert!(text.contains("name"));
        assert!(text.contains("n1"));
        assert!(!text.contains("more rows"));
    }

    #[test]
    fn test_format_table_limit() {
        let text = format_table(&sample(5), 2);
        assert!(text.contains("n1"));
        assert!(!text.contains("n2"));
        assert!(text.contains("... 3 more rows"));
    }

    #[test]
    fn test_format_stats() {
        let mut table = sample(3);
        table.set_source("people.csv");
        table.generate_stats();
        let text = format_stats(table.metadata());
        assert!(text.starts_with("source: people.csv  rows: 3  columns: 2"));
        assert!(text.contains("distinct"));
        assert!(text.contains("n2"));
    }
}
