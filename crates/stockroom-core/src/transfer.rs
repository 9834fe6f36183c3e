//! Export encoders
//!
//! Pure functions that turn a slice of records into an export document.
//! Imports go through [`RecordStore::import_json`](crate::store::RecordStore::import_json).

use serde_json::Value;

use crate::entity::Entity;
use crate::storage::StoreResult;

/// Form feed between table pages
const PAGE_BREAK: char = '\u{0C}';

/// Pretty-printed JSON array, two-space indent
pub fn to_json<T: Entity>(records: &[T]) -> StoreResult<String> {
    Ok(serde_json::to_string_pretty(records)?)
}

/// Comma-separated values
///
/// The header is the first record's keys. Each row holds that record's
/// own values in its own key order. Cells are not quoted, so a value
/// containing a comma or newline shifts the columns of its row.
pub fn to_csv<T: Entity>(records: &[T]) -> StoreResult<String> {
    let mut lines = Vec::with_capacity(records.len() + 1);

    for record in records {
        let Value::Object(fields) = serde_json::to_value(record)? else {
            continue;
        };
        if lines.is_empty() {
            lines.push(fields.keys().cloned().collect::<Vec<_>>().join(","));
        }
        let row: Vec<String> = fields.values().map(csv_cell).collect();
        lines.push(row.join(","));
    }

    Ok(lines.join("\n"))
}

fn csv_cell(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        Value::Number(n) => match n.as_f64() {
            Some(f) if n.is_f64() && f.fract() == 0.0 && f.abs() < 1e15 => {
                format!("{}", f as i64)
            }
            _ => n.to_string(),
        },
        other => other.to_string(),
    }
}

/// Plain-text table split into pages of `rows_per_page` rows
///
/// Every page repeats the title and column headings and ends with a
/// `Page n of m` footer. Pages are separated by a form feed. An empty
/// collection still produces one page.
pub fn to_table_document<T: Entity>(title: &str, records: &[T], rows_per_page: usize) -> String {
    let columns = T::KIND.table_columns();
    let rows: Vec<Vec<String>> = records.iter().map(|r| r.table_row()).collect();

    let mut widths: Vec<usize> = columns.iter().map(|c| c.chars().count()).collect();
    for row in &rows {
        for (width, cell) in widths.iter_mut().zip(row) {
            *width = (*width).max(cell.chars().count());
        }
    }

    let rows_per_page = rows_per_page.max(1);
    let pages: Vec<&[Vec<String>]> = if rows.is_empty() {
        vec![&rows[..]]
    } else {
        rows.chunks(rows_per_page).collect()
    };
    let page_count = pages.len();

    let header = format_row(columns.iter().map(|c| c.to_string()), &widths);
    let rule = "-".repeat(header.chars().count());

    let mut out = String::new();
    for (index, page) in pages.iter().enumerate() {
        if index > 0 {
            out.push(PAGE_BREAK);
            out.push('\n');
        }
        out.push_str(title);
        out.push_str("\n\n");
        out.push_str(&header);
        out.push('\n');
        out.push_str(&rule);
        out.push('\n');
        if page.is_empty() {
            out.push_str("No records\n");
        }
        for row in page.iter() {
            out.push_str(&format_row(row.iter().cloned(), &widths));
            out.push('\n');
        }
        out.push('\n');
        out.push_str(&format!("Page {} of {}\n", index + 1, page_count));
    }
    out
}

fn format_row(cells: impl Iterator<Item = String>, widths: &[usize]) -> String {
    cells
        .zip(widths)
        .map(|(cell, width)| format!("{:<width$}", cell, width = *width))
        .collect::<Vec<_>>()
        .join("  ")
        .trim_end()
        .to_string()
}
