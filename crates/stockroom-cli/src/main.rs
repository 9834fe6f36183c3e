//! Stockroom CLI
//!
//! Command-line interface for Stockroom - product and sales records.

use std::path::PathBuf;

use anyhow::{Context, Result};
use chrono::NaiveDate;
use clap::{ArgAction, Args, Parser, Subcommand};
use tracing::debug;

use stockroom_core::{Config, DateRange, EntityKind, Inventory, Query, SortConfig, SortDirection};

mod commands;
mod logging;
mod output;

use commands::parse_date_arg;
use commands::product::ProductFields;
use commands::records::{self, ExportFormat};
use commands::sale::SaleFields;
use output::{Output, OutputFormat};

#[derive(Parser)]
#[command(name = "stockroom")]
#[command(about = "Stockroom - local-first product and sales records")]
#[command(version)]
#[command(propagate_version = true)]
struct Cli {
    /// Output as JSON
    #[arg(long, global = true)]
    json: bool,

    /// Quiet mode - minimal output
    #[arg(short, long, global = true)]
    quiet: bool,

    /// More log output (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    /// Config file to use instead of the default
    #[arg(long = "config", value_name = "PATH", global = true)]
    config_file: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Manage products
    Product {
        #[command(subcommand)]
        command: ProductCommands,
    },
    /// Manage sales
    Sale {
        #[command(subcommand)]
        command: SaleCommands,
    },
    /// Show inventory and sales summaries
    Report {
        /// Only count sales of products matching this term
        #[arg(short, long, default_value = "")]
        search: String,
        /// Only count sales on or after this date
        #[arg(long, value_parser = parse_date_arg)]
        from: Option<NaiveDate>,
        /// Only count sales on or before this date
        #[arg(long, value_parser = parse_date_arg)]
        to: Option<NaiveDate>,
    },
    /// Reset, back up or restore all data
    Data {
        #[command(subcommand)]
        command: DataCommands,
    },
    /// Show or set configuration
    Config {
        #[command(subcommand)]
        command: Option<ConfigCommands>,
    },
}

/// Search, sort and paging options
#[derive(Args)]
struct ListArgs {
    /// Case-insensitive search term
    #[arg(short, long, default_value = "")]
    search: String,
    /// Field to sort by
    #[arg(long)]
    sort: Option<String>,
    /// Sort in descending order
    #[arg(long)]
    desc: bool,
    /// Page number, starting at 1
    #[arg(long, default_value_t = 1)]
    page: usize,
    /// Rows per page (defaults to the configured page size)
    #[arg(long)]
    page_size: Option<usize>,
}

impl ListArgs {
    fn into_query(self, kind: EntityKind, default_page_size: usize, output: &Output) -> Query {
        let mut query = Query::new()
            .search(self.search)
            .page(self.page)
            .page_size(self.page_size.unwrap_or(default_page_size));

        if let Some(key) = self.sort {
            if !kind.sort_keys().contains(&key.as_str()) {
                output.warning(&format!(
                    "Cannot sort {}s by '{}'. Valid fields: {}",
                    kind,
                    key,
                    kind.sort_keys().join(", ")
                ));
            }
            let direction = if self.desc {
                SortDirection::Descending
            } else {
                SortDirection::Ascending
            };
            query = query.sort(SortConfig::by(key, direction));
        }
        query
    }
}

#[derive(Subcommand)]
enum ProductCommands {
    /// Add a new product
    #[command(alias = "create")]
    Add {
        /// Product name
        name: String,
        #[command(flatten)]
        fields: ProductFields,
    },
    /// List products
    #[command(alias = "ls")]
    List {
        #[command(flatten)]
        list: ListArgs,
    },
    /// Show product details
    Show {
        /// Product ID (full ID or prefix)
        id: String,
    },
    /// Edit a product
    Edit {
        /// Product ID (full ID or prefix)
        id: String,
        /// New name
        #[arg(short, long)]
        name: Option<String>,
        #[command(flatten)]
        fields: ProductFields,
    },
    /// Delete products
    #[command(alias = "rm")]
    Delete {
        /// Product IDs (full ID or prefix)
        #[arg(required = true)]
        ids: Vec<String>,
        /// Skip the confirmation prompt
        #[arg(short, long)]
        yes: bool,
    },
    /// Import products from a JSON file
    Import {
        /// File holding a JSON array of products
        file: PathBuf,
        /// Replace all existing products instead of appending
        #[arg(long)]
        replace: bool,
    },
    /// Export all products
    Export {
        #[arg(short, long, value_enum, default_value_t = ExportFormat::Json)]
        format: ExportFormat,
        /// Output file, or - for stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

#[derive(Subcommand)]
enum SaleCommands {
    /// Record a new sale
    #[command(alias = "create")]
    Add {
        /// Name of the product sold
        product: String,
        #[command(flatten)]
        fields: SaleFields,
    },
    /// List sales
    #[command(alias = "ls")]
    List {
        #[command(flatten)]
        list: ListArgs,
        /// Only sales on or after this date
        #[arg(long, value_parser = parse_date_arg)]
        from: Option<NaiveDate>,
        /// Only sales on or before this date
        #[arg(long, value_parser = parse_date_arg)]
        to: Option<NaiveDate>,
    },
    /// Show sale details
    Show {
        /// Sale ID (full ID or prefix)
        id: String,
    },
    /// Edit a sale
    Edit {
        /// Sale ID (full ID or prefix)
        id: String,
        /// New product name
        #[arg(long)]
        product: Option<String>,
        #[command(flatten)]
        fields: SaleFields,
    },
    /// Delete sales
    #[command(alias = "rm")]
    Delete {
        /// Sale IDs (full ID or prefix)
        #[arg(required = true)]
        ids: Vec<String>,
        /// Skip the confirmation prompt
        #[arg(short, long)]
        yes: bool,
    },
    /// Import sales from a JSON file
    Import {
        /// File holding a JSON array of sales
        file: PathBuf,
        /// Replace all existing sales instead of appending
        #[arg(long)]
        replace: bool,
    },
    /// Export all sales
    Export {
        #[arg(short, long, value_enum, default_value_t = ExportFormat::Json)]
        format: ExportFormat,
        /// Output file, or - for stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

#[derive(Subcommand)]
enum DataCommands {
    /// Delete every product and sale
    Reset {
        /// Skip the confirmation prompt
        #[arg(short, long)]
        yes: bool,
    },
    /// Write products and sales to one backup file
    Backup {
        /// Output file (default backup.json), or - for stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Replace products and sales from a backup file
    Restore {
        /// Backup file to read
        file: PathBuf,
    },
}

#[derive(Subcommand, Clone)]
enum ConfigCommands {
    /// Show current configuration
    Show,
    /// Set a configuration value
    Set {
        /// Configuration key (data_dir, page_size, low_stock_threshold, expiry_warning_days, log_file)
        key: String,
        /// Configuration value
        value: String,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let output = Output::new(OutputFormat::from_flags(cli.json, cli.quiet));
    let config_path = cli.config_file.as_ref();

    // Config commands don't need the stores
    let command = match cli.command {
        Commands::Config { command } => {
            return handle_config_command(command, config_path, &output);
        }
        other => other,
    };

    let config =
        Config::load_with_cli_override(config_path).context("Failed to load configuration")?;
    logging::init(cli.verbose, &config)?;
    debug!(data_dir = ?config.data_dir, "loaded configuration");

    let mut inventory = Inventory::open_with_config(config)?;
    for kind in inventory.recovered_slots() {
        output.warning(&format!(
            "Stored {} data could not be read. A backup was kept and the list starts empty.",
            kind
        ));
    }

    match command {
        Commands::Product { command } => handle_product_command(command, &mut inventory, &output),
        Commands::Sale { command } => handle_sale_command(command, &mut inventory, &output),
        Commands::Report { search, from, to } => {
            commands::report::show(&inventory, &search, DateRange::new(from, to), &output)
        }
        Commands::Data { command } => handle_data_command(command, &mut inventory, &output),
        Commands::Config { command } => handle_config_command(command, config_path, &output),
    }
}

fn handle_product_command(
    command: ProductCommands,
    inventory: &mut Inventory,
    output: &Output,
) -> Result<()> {
    let page_size = inventory.config().page_size;
    let store = inventory.products_mut();

    match command {
        ProductCommands::Add { name, fields } => commands::product::add(store, name, fields, output),
        ProductCommands::List { list } => {
            let query = list.into_query(EntityKind::Product, page_size, output);
            records::list(store, &query, output)
        }
        ProductCommands::Show { id } => records::show(store, &id, output),
        ProductCommands::Edit { id, name, fields } => {
            commands::product::edit(store, id, name, fields, output)
        }
        ProductCommands::Delete { ids, yes } => records::delete(store, &ids, yes, output),
        ProductCommands::Import { file, replace } => records::import(store, &file, replace, output),
        ProductCommands::Export {
            format,
            output: path,
        } => records::export(store, format, path, output),
    }
}

fn handle_sale_command(
    command: SaleCommands,
    inventory: &mut Inventory,
    output: &Output,
) -> Result<()> {
    let page_size = inventory.config().page_size;
    let store = inventory.sales_mut();

    match command {
        SaleCommands::Add { product, fields } => commands::sale::add(store, product, fields, output),
        SaleCommands::List { list, from, to } => {
            let query = list
                .into_query(EntityKind::Sale, page_size, output)
                .date_range(DateRange::new(from, to));
            records::list(store, &query, output)
        }
        SaleCommands::Show { id } => records::show(store, &id, output),
        SaleCommands::Edit {
            id,
            product,
            fields,
        } => commands::sale::edit(store, id, product, fields, output),
        SaleCommands::Delete { ids, yes } => records::delete(store, &ids, yes, output),
        SaleCommands::Import { file, replace } => records::import(store, &file, replace, output),
        SaleCommands::Export {
            format,
            output: path,
        } => records::export(store, format, path, output),
    }
}

fn handle_data_command(
    command: DataCommands,
    inventory: &mut Inventory,
    output: &Output,
) -> Result<()> {
    match command {
        DataCommands::Reset { yes } => commands::data::reset(inventory, yes, output),
        DataCommands::Backup { output: path } => commands::data::backup(inventory, path, output),
        DataCommands::Restore { file } => commands::data::restore(inventory, &file, output),
    }
}

fn handle_config_command(
    command: Option<ConfigCommands>,
    config_path: Option<&PathBuf>,
    output: &Output,
) -> Result<()> {
    match command {
        Some(ConfigCommands::Show) | None => commands::config::show(config_path, output),
        Some(ConfigCommands::Set { key, value }) => {
            commands::config::set(key, value, config_path, output)
        }
    }
}
