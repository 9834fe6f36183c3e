//! The `Entity` trait
//!
//! [`RecordStore`](crate::store::RecordStore) is generic over the record
//! kind. Everything kind-specific (rule table, search fields, sort values,
//! table columns) is dispatched through this trait.

use std::cmp::Ordering;

use chrono::NaiveDate;
use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::models::{EntityKind, Product, ProductDraft, RecordId, Sale, SaleDraft};
use crate::validation::{FieldRule, PRODUCT_RULES, SALE_RULES};

/// A field value as seen by the sort comparator
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SortValue<'a> {
    Text(&'a str),
    Number(f64),
    Date(NaiveDate),
}

impl SortValue<'_> {
    /// Three-way comparison of raw values; mismatched kinds compare equal
    pub fn compare(&self, other: &Self) -> Ordering {
        match (self, other) {
            (SortValue::Text(a), SortValue::Text(b)) => a.cmp(b),
            (SortValue::Number(a), SortValue::Number(b)) => {
                a.partial_cmp(b).unwrap_or(Ordering::Equal)
            }
            (SortValue::Date(a), SortValue::Date(b)) => a.cmp(b),
            _ => Ordering::Equal,
        }
    }
}

/// A persisted record kind
pub trait Entity: Clone + Serialize + DeserializeOwned {
    /// The form-submission shape of this kind
    type Draft: Clone + Default + Serialize + DeserializeOwned + 'static;

    const KIND: EntityKind;

    fn id(&self) -> &RecordId;

    fn rules() -> &'static [FieldRule<Self::Draft>];

    /// Id carried by an imported draft, if any
    fn draft_id(draft: &Self::Draft) -> Option<&RecordId>;

    /// Build a record; `default_date` fills an absent date
    fn from_draft(id: RecordId, draft: Self::Draft, default_date: NaiveDate) -> Self;

    /// Reassign the id (used when an imported id collides)
    fn set_id(&mut self, id: RecordId);

    /// Values matched by the search term, in `KIND.search_fields()` order
    fn search_values(&self) -> Vec<&str>;

    /// Value of sort key `key`; `None` when the record has no value
    fn sort_value(&self, key: &str) -> Option<SortValue<'_>>;

    /// The date range filters and defaults apply to
    fn record_date(&self) -> NaiveDate;

    /// Cells of the table document, matching `KIND.table_columns()`
    fn table_row(&self) -> Vec<String>;
}

impl Entity for Product {
    type Draft = ProductDraft;

    const KIND: EntityKind = EntityKind::Product;

    fn id(&self) -> &RecordId {
        &self.id
    }

    fn rules() -> &'static [FieldRule<ProductDraft>] {
        &PRODUCT_RULES
    }

    fn draft_id(draft: &ProductDraft) -> Option<&RecordId> {
        draft.id.as_ref()
    }

    fn from_draft(id: RecordId, draft: ProductDraft, default_date: NaiveDate) -> Self {
        Product::from_draft(id, draft, default_date)
    }

    fn set_id(&mut self, id: RecordId) {
        self.id = id;
    }

    fn search_values(&self) -> Vec<&str> {
        vec![self.name.as_str(), self.category.as_str()]
    }

    fn sort_value(&self, key: &str) -> Option<SortValue<'_>> {
        match key {
            "id" => Some(SortValue::Text(self.id.as_str())),
            "name" => Some(SortValue::Text(&self.name)),
            "category" => Some(SortValue::Text(&self.category)),
            "quantity" => Some(SortValue::Number(self.quantity)),
            "price" => Some(SortValue::Number(self.price)),
            "dateAdded" => Some(SortValue::Date(self.date_added)),
            "expirationDate" => self.expiration_date.map(SortValue::Date),
            _ => None,
        }
    }

    fn record_date(&self) -> NaiveDate {
        self.date_added
    }

    fn table_row(&self) -> Vec<String> {
        vec![
            self.name.clone(),
            self.category.clone(),
            format_number(self.quantity),
            format!("{:.2}", self.price),
            self.expiration_date
                .map(|d| d.format("%Y-%m-%d").to_string())
                .unwrap_or_default(),
        ]
    }
}

impl Entity for Sale {
    type Draft = SaleDraft;

    const KIND: EntityKind = EntityKind::Sale;

    fn id(&self) -> &RecordId {
        &self.id
    }

    fn rules() -> &'static [FieldRule<SaleDraft>] {
        &SALE_RULES
    }

    fn draft_id(draft: &SaleDraft) -> Option<&RecordId> {
        draft.id.as_ref()
    }

    fn from_draft(id: RecordId, draft: SaleDraft, default_date: NaiveDate) -> Self {
        Sale::from_draft(id, draft, default_date)
    }

    fn set_id(&mut self, id: RecordId) {
        self.id = id;
    }

    fn search_values(&self) -> Vec<&str> {
        vec![self.product.as_str()]
    }

    fn sort_value(&self, key: &str) -> Option<SortValue<'_>> {
        match key {
            "id" => Some(SortValue::Text(self.id.as_str())),
            "product" => Some(SortValue::Text(&self.product)),
            "quantity" => Some(SortValue::Number(self.quantity)),
            "price" => Some(SortValue::Number(self.price)),
            "date" => Some(SortValue::Date(self.date)),
            _ => None,
        }
    }

    fn record_date(&self) -> NaiveDate {
        self.date
    }

    fn table_row(&self) -> Vec<String> {
        vec![
            self.product.clone(),
            self.date.format("%Y-%m-%d").to_string(),
            format_number(self.quantity),
            format!("{:.2}", self.price),
        ]
    }
}

/// Whole numbers without a trailing `.0`
fn format_number(value: f64) -> String {
    if value.fract() == 0.0 && value.abs() < 1e15 {
        format!("{}", value as i64)
    } else {
        value.to_string()
    }
}
