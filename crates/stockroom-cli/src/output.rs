//! Output formatting for CLI
//!
//! Provides consistent output formatting across all commands:
//! - Human-readable default output
//! - JSON output (--json flag)
//! - Quiet mode for scripting (--quiet flag)

use anyhow::Result;
use serde::Serialize;
use serde_json::Value;

use stockroom_core::report::{InventorySummary, SalesSummary};
use stockroom_core::{Entity, ImportReport, QueryView, RestoreReport, ValidationErrors};

/// Output format options
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    /// Human-readable output (default)
    Human,
    /// JSON output
    Json,
    /// Quiet mode - minimal output
    Quiet,
}

impl OutputFormat {
    /// Create format from CLI flags
    pub fn from_flags(json: bool, quiet: bool) -> Self {
        if quiet {
            OutputFormat::Quiet
        } else if json {
            OutputFormat::Json
        } else {
            OutputFormat::Human
        }
    }
}

/// Output helper for consistent formatting
pub struct Output {
    /// The output format
    pub format: OutputFormat,
}

impl Output {
    pub fn new(format: OutputFormat) -> Self {
        Self { format }
    }

    /// Check if output is in quiet mode
    pub fn is_quiet(&self) -> bool {
        matches!(self.format, OutputFormat::Quiet)
    }

    pub fn is_json(&self) -> bool {
        matches!(self.format, OutputFormat::Json)
    }

    /// Print a single record, one field per line
    pub fn print_record<T: Entity>(&self, record: &T) -> Result<()> {
        match self.format {
            OutputFormat::Human => {
                if let Value::Object(fields) = serde_json::to_value(record)? {
                    let width = fields.keys().map(|k| k.len()).max().unwrap_or(0) + 1;
                    for (key, value) in &fields {
                        println!("{:<width$} {}", format!("{}:", key), display_value(value));
                    }
                }
            }
            OutputFormat::Json => print_json(record)?,
            OutputFormat::Quiet => println!("{}", record.id()),
        }
        Ok(())
    }

    /// Print one page of a query
    pub fn print_view<T: Entity>(&self, view: &QueryView<T>) -> Result<()> {
        match self.format {
            OutputFormat::Human => {
                if view.is_empty() {
                    println!("No {}s found.", T::KIND);
                    return Ok(());
                }
                let columns = T::KIND.table_columns();
                println!("{:<8} | {}", "ID", columns.join(" | "));
                for record in &view.items {
                    let cells: Vec<String> =
                        record.table_row().iter().map(|c| truncate(c, 30)).collect();
                    println!("{} | {}", record.id().short(), cells.join(" | "));
                }
                println!(
                    "\nPage {} of {} ({} {}(s))",
                    view.page,
                    view.total_pages,
                    view.total_matches,
                    T::KIND
                );
            }
            OutputFormat::Json => print_json(view)?,
            OutputFormat::Quiet => {
                for record in &view.items {
                    println!("{}", record.id());
                }
            }
        }
        Ok(())
    }

    /// Print the outcome of an import
    pub fn print_import(&self, label: &str, report: &ImportReport) -> Result<()> {
        match self.format {
            OutputFormat::Human => {
                println!("✓ Imported {} {}(s)", report.imported, label);
                if report.generated_ids > 0 {
                    println!("  {} record(s) were given a new id", report.generated_ids);
                }
                for id in &report.reassigned_ids {
                    println!("  id '{}' was already taken and was replaced", id);
                }
                for skipped in &report.skipped {
                    self.warning(&format!(
                        "Skipped element {}: {}",
                        skipped.index, skipped.reason
                    ));
                }
            }
            OutputFormat::Json => print_json(report)?,
            OutputFormat::Quiet => {}
        }
        Ok(())
    }

    /// Print what a backup restore brought back
    pub fn print_restore(&self, report: &RestoreReport) -> Result<()> {
        match self.format {
            OutputFormat::Human => {
                if report.products.is_none() && report.sales.is_none() {
                    self.warning("Backup held no products or sales; nothing changed");
                }
                if let Some(products) = &report.products {
                    self.print_import("product", products)?;
                }
                if let Some(sales) = &report.sales {
                    self.print_import("sale", sales)?;
                }
            }
            OutputFormat::Json => print_json(report)?,
            OutputFormat::Quiet => {}
        }
        Ok(())
    }

    /// Print the inventory and sales summaries
    pub fn print_report(&self, inventory: &InventorySummary, sales: &SalesSummary) -> Result<()> {
        match self.format {
            OutputFormat::Human => {
                println!("── Inventory ──");
                println!("Total products:   {}", inventory.total_products);
                println!("Inventory value:  {:.2}", inventory.inventory_value);
                if inventory.low_stock.is_empty() {
                    println!("Low stock:        All good");
                } else {
                    println!("Low stock:        {}", inventory.low_stock.len());
                }
                println!("Out of stock:     {}", inventory.out_of_stock.len());
                println!("Expiring soon:    {}", inventory.expiring_soon.len());
                for product in &inventory.expiring_soon {
                    if let Some(date) = product.expiration_date {
                        println!("  {} expires on {}", product.name, date);
                    }
                }
                if !inventory.categories.is_empty() {
                    println!();
                    println!("Stock by category:");
                    for total in &inventory.categories {
                        println!("  {} ({})", total.category, total.quantity);
                    }
                }

                println!();
                println!("── Sales ──");
                println!("Total revenue:    {:.2}", sales.total_revenue);
                println!("Number of sales:  {}", sales.sale_count);
                println!(
                    "Top product:      {}",
                    sales.top_product.as_deref().unwrap_or("N/A")
                );
                for entry in &sales.by_product {
                    println!("  {} ({:.2})", entry.product, entry.revenue);
                }
            }
            OutputFormat::Json => print_json(&serde_json::json!({
                "inventory": inventory,
                "sales": sales,
            }))?,
            OutputFormat::Quiet => {
                println!("{}", inventory.total_products);
                println!("{:.2}", sales.total_revenue);
            }
        }
        Ok(())
    }

    /// Print the fields that failed validation, to stderr
    pub fn field_errors(&self, errors: &ValidationErrors) {
        match self.format {
            OutputFormat::Json => {
                eprintln!("{}", serde_json::json!({"status": "invalid", "errors": errors}));
            }
            _ => {
                for error in errors.errors() {
                    eprintln!("  {}: {}", error.field, error.message);
                }
            }
        }
    }

    /// Print a success message
    pub fn success(&self, message: &str) {
        match self.format {
            OutputFormat::Human => println!("✓ {}", message),
            OutputFormat::Json => {
                println!(
                    "{}",
                    serde_json::json!({"status": "success", "message": message})
                );
            }
            OutputFormat::Quiet => {}
        }
    }

    /// Print a warning to stderr, unless quiet
    pub fn warning(&self, message: &str) {
        if !self.is_quiet() {
            eprintln!("⚠ {}", message);
        }
    }

    /// Check if we should prompt for confirmation
    pub fn should_prompt(&self) -> bool {
        self.format == OutputFormat::Human
    }
}

fn print_json<S: Serialize + ?Sized>(value: &S) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn display_value(value: &Value) -> String {
    match value {
        Value::Null => "(not set)".to_string(),
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// Truncate a string to max length, adding "..." if truncated
fn truncate(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max_len - 3).collect();
        format!("{}...", kept)
    }
}
