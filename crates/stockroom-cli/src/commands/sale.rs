//! Sale command handlers

use anyhow::Result;
use chrono::NaiveDate;
use clap::Args;

use stockroom_core::{FileProvider, RecordStore, Sale, SaleDraft};

use super::records::store_error;
use super::{parse_date_arg, resolve_id};
use crate::output::Output;

type SaleStore = RecordStore<Sale, FileProvider>;

/// Sale fields settable from the command line
#[derive(Args, Debug, Default)]
pub struct SaleFields {
    /// Units sold
    #[arg(long)]
    pub quantity: Option<f64>,
    /// Sale price
    #[arg(short, long)]
    pub price: Option<f64>,
    /// Date of the sale (YYYY-MM-DD, defaults to today)
    #[arg(short, long, value_parser = parse_date_arg)]
    pub date: Option<NaiveDate>,
}

impl SaleFields {
    fn apply(self, mut draft: SaleDraft) -> SaleDraft {
        if let Some(quantity) = self.quantity {
            draft.quantity = Some(quantity);
        }
        if let Some(price) = self.price {
            draft.price = Some(price);
        }
        if let Some(date) = self.date {
            draft.date = Some(date);
        }
        draft
    }
}

/// Record a new sale
pub fn add(store: &mut SaleStore, product: String, fields: SaleFields, output: &Output) -> Result<()> {
    let sale = store
        .add(fields.apply(SaleDraft::new(product)))
        .map_err(|e| store_error(e, output))?;

    output.success(&format!("Recorded sale: {}", sale.id));
    if !output.is_json() {
        output.print_record(&sale)?;
    }
    Ok(())
}

/// Edit an existing sale
pub fn edit(
    store: &mut SaleStore,
    id: String,
    product: Option<String>,
    fields: SaleFields,
    output: &Output,
) -> Result<()> {
    let id = resolve_id(store, &id)?;
    let current = store
        .get(&id)
        .ok_or_else(|| anyhow::anyhow!("Sale not found: {}", id))?;

    let mut draft = SaleDraft::from(current);
    if let Some(product) = product {
        draft.product = Some(product);
    }

    let sale = store
        .update(&id, fields.apply(draft))
        .map_err(|e| store_error(e, output))?;
    output.success(&format!("Updated sale: {}", sale.id));
    Ok(())
}
