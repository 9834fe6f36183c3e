//! Command handlers

pub mod config;
pub mod data;
pub mod product;
pub mod records;
pub mod report;
pub mod sale;

use std::io::{self, Write};

use anyhow::{bail, Result};
use chrono::NaiveDate;

use stockroom_core::{parse_date, Entity, KvProvider, RecordId, RecordStore};

/// Resolve a record id (supports full id or unique prefix)
pub fn resolve_id<T: Entity, P: KvProvider>(store: &RecordStore<T, P>, input: &str) -> Result<RecordId> {
    let input = input.trim();
    let exact = RecordId::from(input);
    if store.get(&exact).is_some() {
        return Ok(exact);
    }

    let matches: Vec<&T> = store
        .records()
        .iter()
        .filter(|r| !input.is_empty() && r.id().as_str().starts_with(input))
        .collect();

    match matches.len() {
        0 => bail!("No {} found matching: {}", T::KIND, input),
        1 => Ok(matches[0].id().clone()),
        _ => {
            eprintln!("Multiple {}s match '{}':", T::KIND, input);
            for record in &matches {
                eprintln!("  {}", record.id());
            }
            bail!("Ambiguous ID. Please provide more characters.");
        }
    }
}

/// Prompt for confirmation
///
/// Returns true if user confirms, false otherwise.
/// In non-interactive mode (no TTY), returns false.
pub fn confirm(prompt: &str) -> Result<bool> {
    if !atty::is(atty::Stream::Stdin) {
        return Ok(false);
    }

    print!("{} [y/N] ", prompt);
    io::stdout().flush()?;

    let mut input = String::new();
    io::stdin().read_line(&mut input)?;

    let input = input.trim().to_lowercase();
    Ok(input == "y" || input == "yes")
}

/// clap value parser for date arguments
pub fn parse_date_arg(value: &str) -> Result<NaiveDate, String> {
    parse_date(value).ok_or_else(|| format!("'{}' is not a date (expected YYYY-MM-DD)", value))
}

#[cfg(test)]
mod tests {
    use super::*;
    use stockroom_core::{MemoryProvider, SaleDraft};

    fn store_with(ids: &[&str]) -> RecordStore<stockroom_core::Sale, MemoryProvider> {
        let mut store = RecordStore::new(MemoryProvider::new());
        let drafts = ids
            .iter()
            .map(|id| {
                let mut draft = SaleDraft::new("Aspirin");
                draft.id = Some(RecordId::from(*id));
                draft
            })
            .collect();
        store
            .replace_all(drafts, stockroom_core::ImportMode::Replace)
            .unwrap();
        store
    }

    #[test]
    fn test_resolve_exact_and_prefix() {
        let store = store_with(&["abc123", "abd456", "abc"]);

        assert_eq!(resolve_id(&store, "abc").unwrap().as_str(), "abc");
        assert_eq!(resolve_id(&store, "abd").unwrap().as_str(), "abd456");
        assert!(resolve_id(&store, "ab").is_err());
        assert!(resolve_id(&store, "zzz").is_err());
        assert!(resolve_id(&store, "").is_err());
    }

    #[test]
    fn test_parse_date_arg() {
        assert!(parse_date_arg("2024-05-01").is_ok());
        assert!(parse_date_arg("May 1st").is_err());
    }
}
