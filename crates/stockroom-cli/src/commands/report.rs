//! Report command handler

use anyhow::Result;
use chrono::Local;

use stockroom_core::{DateRange, Inventory};

use crate::output::Output;

/// Show inventory and sales summaries
///
/// `search` and `range` narrow the sales figures only.
pub fn show(inventory: &Inventory, search: &str, range: DateRange, output: &Output) -> Result<()> {
    let today = Local::now().date_naive();
    let stock = inventory.inventory_summary(today);
    let sales = inventory.sales_summary(search, &range);
    output.print_report(&stock, &sales)
}
