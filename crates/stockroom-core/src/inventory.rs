//! The Inventory facade
//!
//! Owns the product store and the sales store over one provider, plus the
//! configuration they were opened with. This is what the CLI talks to.
//!
//! A backup holds both collections in one document:
//!
//! ```text
//! { "products": [ ... ], "sales": [ ... ] }
//! ```
//!
//! Backups written by the dashboard used `inventory` for the product list;
//! [`Inventory::restore`] reads either name.

use anyhow::{Context, Result};
use chrono::NaiveDate;
use serde::Serialize;
use serde_json::{Map, Value};
use tracing::{info, warn};

use crate::config::Config;
use crate::models::{EntityKind, Product, Sale};
use crate::query::DateRange;
use crate::report::{InventorySummary, SalesSummary};
use crate::storage::{FileProvider, KvProvider, StoreError};
use crate::store::{ImportMode, ImportReport, RecordStore};

/// Default file name for a backup
pub const BACKUP_FILE_NAME: &str = "backup.json";

#[derive(Serialize)]
struct Backup<'a> {
    products: &'a [Product],
    sales: &'a [Sale],
}

/// What a restore brought back; `None` when the backup lacked that list
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RestoreReport {
    pub products: Option<ImportReport>,
    pub sales: Option<ImportReport>,
}

/// Pull the array stored under the first of `names` present in `doc`
fn backup_list(doc: &mut Map<String, Value>, names: &[&str]) -> Result<Option<Vec<Value>>, StoreError> {
    let Some(value) = names.iter().find_map(|name| doc.remove(*name)) else {
        return Ok(None);
    };
    match value {
        Value::Array(elements) => Ok(Some(elements)),
        Value::Null => Ok(None),
        _ => Err(StoreError::ImportFormat {
            details: format!("'{}' in the backup must be an array", names[0]),
        }),
    }
}

pub struct Inventory<P: KvProvider + Clone = FileProvider> {
    config: Config,
    products: RecordStore<Product, P>,
    sales: RecordStore<Sale, P>,
}

impl Inventory<FileProvider> {
    /// Open using the default configuration
    pub fn open() -> Result<Self> {
        let config = Config::load().context("Failed to load configuration")?;
        Self::open_with_config(config)
    }

    /// Open the slots under `config.data_dir`
    pub fn open_with_config(config: Config) -> Result<Self> {
        let provider = FileProvider::new(&config.data_dir);
        Self::with_provider(config, provider)
    }
}

impl<P: KvProvider + Clone> Inventory<P> {
    /// Open both stores over `provider`
    pub fn with_provider(config: Config, provider: P) -> Result<Self> {
        let products =
            RecordStore::open(provider.clone()).context("Failed to open product store")?;
        let sales = RecordStore::open(provider).context("Failed to open sales store")?;

        let inventory = Self {
            config,
            products,
            sales,
        };
        for kind in inventory.recovered_slots() {
            warn!(kind = %kind, "store was reset after its data could not be read");
        }
        Ok(inventory)
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn products(&self) -> &RecordStore<Product, P> {
        &self.products
    }

    pub fn products_mut(&mut self) -> &mut RecordStore<Product, P> {
        &mut self.products
    }

    pub fn sales(&self) -> &RecordStore<Sale, P> {
        &self.sales
    }

    pub fn sales_mut(&mut self) -> &mut RecordStore<Sale, P> {
        &mut self.sales
    }

    /// Kinds whose slot was unreadable on open
    pub fn recovered_slots(&self) -> Vec<EntityKind> {
        let mut kinds = Vec::new();
        if self.products.recovered_from_corruption() {
            kinds.push(EntityKind::Product);
        }
        if self.sales.recovered_from_corruption() {
            kinds.push(EntityKind::Sale);
        }
        kinds
    }

    /// Inventory metrics using the configured thresholds
    pub fn inventory_summary(&self, today: NaiveDate) -> InventorySummary {
        InventorySummary::compute(
            self.products.records(),
            today,
            self.config.low_stock_threshold,
            self.config.expiry_warning_days,
        )
    }

    pub fn sales_summary(&self, search: &str, range: &DateRange) -> SalesSummary {
        SalesSummary::compute(self.sales.records(), search, range)
    }

    /// Delete both collections and their slots
    pub fn reset(&mut self) -> Result<()> {
        let products = self.products.clear().context("Failed to reset products")?;
        let sales = self.sales.clear().context("Failed to reset sales")?;
        info!(products, sales, "reset inventory data");
        Ok(())
    }

    /// Both collections as one pretty-printed JSON document
    pub fn backup(&self) -> Result<String> {
        let backup = Backup {
            products: self.products.records(),
            sales: self.sales.records(),
        };
        serde_json::to_string_pretty(&backup).context("Failed to encode backup")
    }

    /// Replace the collections present in a backup document
    ///
    /// The document is checked before either store changes, so a malformed
    /// backup leaves both untouched. A list missing from the backup keeps
    /// its current records.
    pub fn restore(&mut self, bytes: &[u8]) -> Result<RestoreReport> {
        let value: Value = serde_json::from_slice(bytes).map_err(|e| StoreError::ImportFormat {
            details: format!("not valid JSON: {}", e),
        })?;
        let Value::Object(mut doc) = value else {
            return Err(StoreError::ImportFormat {
                details: "expected a backup object with products and sales".to_string(),
            }
            .into());
        };

        let products = backup_list(&mut doc, &["products", "inventory"])?;
        let sales = backup_list(&mut doc, &["sales"])?;

        let mut report = RestoreReport::default();
        if let Some(elements) = products {
            report.products = Some(
                self.products
                    .import_values(elements, ImportMode::Replace)
                    .context("Failed to restore products")?,
            );
        }
        if let Some(elements) = sales {
            report.sales = Some(
                self.sales
                    .import_values(elements, ImportMode::Replace)
                    .context("Failed to restore sales")?,
            );
        }
        info!(
            products = report.products.as_ref().map(|r| r.imported),
            sales = report.sales.as_ref().map(|r| r.imported),
            "restored backup"
        );
        Ok(report)
    }

    /// Retry any write that failed earlier
    pub fn flush(&mut self) -> Result<()> {
        if self.products.is_dirty() {
            self.products.flush().context("Failed to save products")?;
        }
        if self.sales.is_dirty() {
            self.sales.flush().context("Failed to save sales")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{ProductDraft, SaleDraft};
    use crate::storage::MemoryProvider;
    use serde_json::json;
    use tempfile::TempDir;

    fn stocked(temp_dir: &TempDir) -> Inventory<MemoryProvider> {
        let mut inventory =
            Inventory::with_provider(config_in(temp_dir), MemoryProvider::new()).unwrap();
        inventory
            .products_mut()
            .add(
                ProductDraft::new("Aspirin")
                    .quantity(4.0)
                    .price(2.0)
                    .expiration_date(today()),
            )
            .unwrap();
        inventory
            .sales_mut()
            .add(SaleDraft::new("Aspirin").quantity(1.0).price(2.0))
            .unwrap();
        inventory
    }

    fn config_in(dir: &TempDir) -> Config {
        Config {
            data_dir: dir.path().to_path_buf(),
            low_stock_threshold: 3,
            ..Config::default()
        }
    }

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 4, 15).unwrap()
    }

    #[test]
    fn test_open_with_config_persists_both_kinds() {
        let temp_dir = TempDir::new().unwrap();

        {
            let mut inventory = Inventory::open_with_config(config_in(&temp_dir)).unwrap();
            inventory
                .products_mut()
                .add(
                    ProductDraft::new("Aspirin")
                        .quantity(2.0)
                        .price(3.0)
                        .expiration_date(today()),
                )
                .unwrap();
            inventory
                .sales_mut()
                .add(SaleDraft::new("Aspirin").quantity(1.0).price(3.0))
                .unwrap();
        }

        let inventory = Inventory::open_with_config(config_in(&temp_dir)).unwrap();
        assert_eq!(inventory.products().len(), 1);
        assert_eq!(inventory.sales().len(), 1);
        assert!(inventory.recovered_slots().is_empty());
    }

    #[test]
    fn test_summaries_use_config() {
        let temp_dir = TempDir::new().unwrap();
        let mut inventory =
            Inventory::with_provider(config_in(&temp_dir), MemoryProvider::new()).unwrap();

        for (name, quantity) in [("Gauze", 2.0), ("Zinc", 5.0)] {
            inventory
                .products_mut()
                .add(
                    ProductDraft::new(name)
                        .quantity(quantity)
                        .price(1.0)
                        .expiration_date(today()),
                )
                .unwrap();
        }

        let summary = inventory.inventory_summary(today());
        assert_eq!(summary.low_stock.len(), 1);
        assert_eq!(summary.low_stock[0].name, "Gauze");

        let sales = inventory.sales_summary("", &DateRange::default());
        assert_eq!(sales.sale_count, 0);
    }

    #[test]
    fn test_recovered_slots_and_flush() {
        let temp_dir = TempDir::new().unwrap();
        let provider = MemoryProvider::new();
        provider.insert_raw("sales", "][");

        let mut inventory = Inventory::with_provider(config_in(&temp_dir), provider.clone()).unwrap();
        assert_eq!(inventory.recovered_slots(), vec![EntityKind::Sale]);

        provider.set_simulate_write_error(true);
        assert!(inventory
            .sales_mut()
            .add(SaleDraft::new("Gauze").quantity(1.0).price(1.0))
            .is_err());
        assert!(inventory.flush().is_err());

        provider.set_simulate_write_error(false);
        inventory.flush().unwrap();
        assert!(!inventory.sales().is_dirty());
    }

    #[test]
    fn test_reset_removes_both_slots() {
        let temp_dir = TempDir::new().unwrap();
        let provider = MemoryProvider::new();
        let mut inventory = Inventory::with_provider(config_in(&temp_dir), provider.clone()).unwrap();
        inventory
            .sales_mut()
            .add(SaleDraft::new("Gauze").quantity(1.0).price(1.0))
            .unwrap();
        assert!(provider.get("sales").unwrap().is_some());

        inventory.reset().unwrap();
        assert!(inventory.products().is_empty());
        assert!(inventory.sales().is_empty());
        assert!(provider.keys().is_empty());
    }

    #[test]
    fn test_backup_then_restore() {
        let temp_dir = TempDir::new().unwrap();
        let mut inventory = stocked(&temp_dir);
        let backup = inventory.backup().unwrap();
        let products = inventory.products().records().to_vec();
        let sales = inventory.sales().records().to_vec();

        let doc: Value = serde_json::from_str(&backup).unwrap();
        assert!(doc["products"].is_array());
        assert!(doc["sales"].is_array());

        inventory.reset().unwrap();
        let report = inventory.restore(backup.as_bytes()).unwrap();

        assert_eq!(report.products.map(|r| r.imported), Some(1));
        assert_eq!(report.sales.map(|r| r.imported), Some(1));
        assert_eq!(inventory.products().records(), products.as_slice());
        assert_eq!(inventory.sales().records(), sales.as_slice());
    }

    #[test]
    fn test_restore_dashboard_backup() {
        let temp_dir = TempDir::new().unwrap();
        let mut inventory = stocked(&temp_dir);

        let doc = json!({
            "inventory": [{"name": "Saline", "category": null, "quantity": "3", "price": "1.5"}]
        });
        let report = inventory.restore(doc.to_string().as_bytes()).unwrap();

        assert!(report.sales.is_none());
        assert_eq!(inventory.products().len(), 1);
        assert_eq!(inventory.products().records()[0].name, "Saline");
        assert_eq!(inventory.products().records()[0].quantity, 3.0);
        // Sales were not in the backup and are kept
        assert_eq!(inventory.sales().len(), 1);
    }

    #[test]
    fn test_restore_rejects_malformed_backup() {
        let temp_dir = TempDir::new().unwrap();
        let mut inventory = stocked(&temp_dir);

        for doc in [r#"[1, 2]"#, r#"{"products": [], "sales": "none"}"#, "nope"] {
            let err = inventory.restore(doc.as_bytes()).unwrap_err();
            assert!(matches!(
                err.downcast_ref::<StoreError>(),
                Some(StoreError::ImportFormat { .. })
            ));
        }
        assert_eq!(inventory.products().len(), 1);
        assert_eq!(inventory.sales().len(), 1);
    }
}
