//! Data management: reset, backup and restore

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use stockroom_core::inventory::BACKUP_FILE_NAME;
use stockroom_core::Inventory;

use super::confirm;
use crate::output::Output;

/// Delete every product and sale
pub fn reset(inventory: &mut Inventory, yes: bool, output: &Output) -> Result<()> {
    if output.should_prompt() && !yes {
        println!(
            "This deletes {} product(s) and {} sale(s).",
            inventory.products().len(),
            inventory.sales().len()
        );
        if !confirm("Are you sure?")? {
            println!("Cancelled.");
            return Ok(());
        }
    }

    inventory.reset()?;
    output.success("Data reset");
    Ok(())
}

/// Write both collections to one backup file
///
/// A path of `-` prints the backup instead.
pub fn backup(inventory: &Inventory, path: Option<PathBuf>, output: &Output) -> Result<()> {
    let document = inventory.backup()?;
    let path = path.unwrap_or_else(|| PathBuf::from(BACKUP_FILE_NAME));
    if path.as_os_str() == "-" {
        println!("{}", document);
        return Ok(());
    }

    fs::write(&path, document).with_context(|| format!("Failed to write backup: {:?}", path))?;
    output.success(&format!(
        "Backed up {} product(s) and {} sale(s) to {}",
        inventory.products().len(),
        inventory.sales().len(),
        path.display()
    ));
    Ok(())
}

/// Replace the collections found in a backup file
pub fn restore(inventory: &mut Inventory, file: &Path, output: &Output) -> Result<()> {
    let bytes = fs::read(file).with_context(|| format!("Failed to read backup: {:?}", file))?;
    let report = inventory.restore(&bytes)?;
    output.print_restore(&report)
}
