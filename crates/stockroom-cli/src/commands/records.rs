//! Handlers shared by every record kind

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::ValueEnum;

use stockroom_core::transfer;
use stockroom_core::{Entity, ImportMode, KvProvider, Query, RecordStore, StoreError};

use super::{confirm, resolve_id};
use crate::output::Output;

/// Rows per page of the table document
const TABLE_ROWS_PER_PAGE: usize = 40;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ExportFormat {
    Json,
    Csv,
    /// Paginated plain-text table
    Table,
}

/// Print field errors and hints, then hand the error back for `?`
pub fn store_error(err: StoreError, output: &Output) -> anyhow::Error {
    match err.validation_errors() {
        Some(errors) => output.field_errors(errors),
        None => {
            if let Some(hint) = err.recovery_suggestion() {
                output.warning(hint);
            }
        }
    }
    anyhow::Error::new(err)
}

/// List one page of records
pub fn list<T: Entity, P: KvProvider>(
    store: &RecordStore<T, P>,
    query: &Query,
    output: &Output,
) -> Result<()> {
    let view = store.query(query);
    output.print_view(&view)
}

/// Show a single record
pub fn show<T: Entity, P: KvProvider>(
    store: &RecordStore<T, P>,
    id: &str,
    output: &Output,
) -> Result<()> {
    let id = resolve_id(store, id)?;
    let record = store
        .get(&id)
        .ok_or_else(|| anyhow::anyhow!("{} not found: {}", T::KIND, id))?;
    output.print_record(record)
}

/// Delete one or more records
pub fn delete<T: Entity, P: KvProvider>(
    store: &mut RecordStore<T, P>,
    ids: &[String],
    yes: bool,
    output: &Output,
) -> Result<()> {
    let ids = ids
        .iter()
        .map(|id| resolve_id(store, id))
        .collect::<Result<Vec<_>>>()?;

    if output.should_prompt() && !yes {
        for id in &ids {
            println!("Delete {}: {}", T::KIND, id);
        }
        if !confirm("Are you sure?")? {
            println!("Cancelled.");
            return Ok(());
        }
    }

    let removed = match ids.as_slice() {
        [id] => store.delete(id).map(|_| 1),
        many => store.bulk_delete(many),
    }
    .map_err(|e| store_error(e, output))?;

    output.success(&format!("Deleted {} {}(s)", removed, T::KIND));
    Ok(())
}

/// Import records from a JSON file
pub fn import<T: Entity, P: KvProvider>(
    store: &mut RecordStore<T, P>,
    file: &Path,
    replace: bool,
    output: &Output,
) -> Result<()> {
    let bytes = fs::read(file).with_context(|| format!("Failed to read import file: {:?}", file))?;
    let mode = if replace {
        ImportMode::Replace
    } else {
        ImportMode::Append
    };

    let report = store
        .import_json(&bytes, mode)
        .map_err(|e| store_error(e, output))?;
    output.print_import(T::KIND.label(), &report)
}

/// Export every record
///
/// Writes to `path`, or to the kind's default file name in the current
/// directory. A path of `-` prints the document instead.
pub fn export<T: Entity, P: KvProvider>(
    store: &RecordStore<T, P>,
    format: ExportFormat,
    path: Option<PathBuf>,
    output: &Output,
) -> Result<()> {
    let kind = T::KIND;
    let (document, default_name) = match format {
        ExportFormat::Json => (transfer::to_json(store.records())?, kind.json_export_name()),
        ExportFormat::Csv => (transfer::to_csv(store.records())?, kind.csv_export_name()),
        ExportFormat::Table => {
            let title = format!("{} report", capitalize(kind.export_prefix()));
            (
                transfer::to_table_document(&title, store.records(), TABLE_ROWS_PER_PAGE),
                kind.table_export_name(),
            )
        }
    };

    let path = path.unwrap_or_else(|| PathBuf::from(default_name));
    if path.as_os_str() == "-" {
        println!("{}", document);
        return Ok(());
    }

    fs::write(&path, document).with_context(|| format!("Failed to write export: {:?}", path))?;
    output.success(&format!(
        "Exported {} {}(s) to {}",
        store.len(),
        kind,
        path.display()
    ));
    Ok(())
}

fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_capitalize() {
        assert_eq!(capitalize("inventory"), "Inventory");
        assert_eq!(capitalize(""), "");
    }
}
