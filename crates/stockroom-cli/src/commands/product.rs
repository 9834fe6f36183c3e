//! Product command handlers

use anyhow::Result;
use chrono::NaiveDate;
use clap::Args;

use stockroom_core::{FileProvider, Product, ProductDraft, RecordStore};

use super::records::store_error;
use super::{parse_date_arg, resolve_id};
use crate::output::Output;

type ProductStore = RecordStore<Product, FileProvider>;

/// Product fields settable from the command line
#[derive(Args, Debug, Default)]
pub struct ProductFields {
    /// Category (empty for none)
    #[arg(short, long)]
    pub category: Option<String>,
    /// Units in stock
    #[arg(long)]
    pub quantity: Option<f64>,
    /// Unit price
    #[arg(short, long)]
    pub price: Option<f64>,
    /// Expiration date (YYYY-MM-DD)
    #[arg(short, long, value_parser = parse_date_arg)]
    pub expires: Option<NaiveDate>,
    /// Date added (YYYY-MM-DD, defaults to today)
    #[arg(long, value_parser = parse_date_arg)]
    pub date_added: Option<NaiveDate>,
}

impl ProductFields {
    /// Overlay the given fields onto `draft`
    fn apply(self, mut draft: ProductDraft) -> ProductDraft {
        if let Some(category) = self.category {
            draft.category = Some(category);
        }
        if let Some(quantity) = self.quantity {
            draft.quantity = Some(quantity);
        }
        if let Some(price) = self.price {
            draft.price = Some(price);
        }
        if let Some(expires) = self.expires {
            draft.expiration_date = Some(expires);
        }
        if let Some(date_added) = self.date_added {
            draft.date_added = Some(date_added);
        }
        draft
    }
}

/// Add a new product
pub fn add(store: &mut ProductStore, name: String, fields: ProductFields, output: &Output) -> Result<()> {
    let draft = fields.apply(ProductDraft::new(name));
    let product = store.add(draft).map_err(|e| store_error(e, output))?;

    output.success(&format!("Added product: {}", product.id));
    if !output.is_json() {
        output.print_record(&product)?;
    }
    Ok(())
}

/// Edit an existing product
pub fn edit(
    store: &mut ProductStore,
    id: String,
    name: Option<String>,
    fields: ProductFields,
    output: &Output,
) -> Result<()> {
    let id = resolve_id(store, &id)?;
    let current = store
        .get(&id)
        .ok_or_else(|| anyhow::anyhow!("Product not found: {}", id))?;

    let mut draft = ProductDraft::from(current);
    if let Some(name) = name {
        draft.name = Some(name);
    }
    let draft = fields.apply(draft);

    let product = store.update(&id, draft).map_err(|e| store_error(e, output))?;
    output.success(&format!("Updated product: {}", product.id));
    Ok(())
}
