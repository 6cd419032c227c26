//! Terminal table rendering for result sets.

use comfy_table::{presets::UTF8_FULL, Cell, ContentArrangement, Table};
use shared::models::{field, text, Record};

/// Placeholder for a missing or null field.
const NULL: &str = "NULL";

/// Renders records as a bordered table.
///
/// Columns come from the first record; later records print `NULL` for any
/// column they lack, and their extra fields are not shown.
pub fn render(records: &[Record]) -> String {
    let Some(first) = records.first() else {
        return "(no results)\n".to_string();
    };
    let columns: Vec<&str> = first.keys().map(String::as_str).collect();

    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(columns.iter().map(Cell::new));

    for record in records {
        table.add_row(
            columns
                .iter()
                .map(|column| Cell::new(field(record, column).map_or_else(|| NULL.to_string(), text))),
        );
    }
    format!("{table}\n")
}
