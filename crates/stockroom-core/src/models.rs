//! Data models for Stockroom
//!
//! Defines the two record kinds, Product and Sale, their draft (form
//! submission) counterparts, and the `RecordId` they are addressed by.
//!
//! Field names serialize in camelCase (`dateAdded`, `expirationDate`) so
//! slots and export files stay compatible with files written by earlier
//! versions of the dashboard. Fields a record does not know about are kept
//! in `extra` and written back unchanged.

use std::fmt;

use chrono::NaiveDate;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};
use uuid::Uuid;

/// Opaque record identifier
///
/// Generated ids are UUID v4 strings. Imported files may carry numeric
/// ids; those are kept as their decimal text.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct RecordId(String);

impl RecordId {
    /// Generate a new random id
    pub fn generate() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Empty ids count as missing on import
    pub fn is_blank(&self) -> bool {
        self.0.trim().is_empty()
    }

    /// First eight characters, for compact listings
    pub fn short(&self) -> &str {
        match self.0.char_indices().nth(8) {
            Some((idx, _)) => &self.0[..idx],
            None => &self.0,
        }
    }
}

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<String> for RecordId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for RecordId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl<'de> Deserialize<'de> for RecordId {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Raw {
            Text(String),
            Number(serde_json::Number),
        }

        match Raw::deserialize(deserializer)? {
            Raw::Text(s) => Ok(RecordId(s)),
            Raw::Number(n) => Ok(RecordId(n.to_string())),
        }
    }
}

/// The closed set of record kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntityKind {
    Product,
    Sale,
}

impl EntityKind {
    /// Key of the persistence slot holding this kind's records
    pub fn storage_key(self) -> &'static str {
        match self {
            EntityKind::Product => "products",
            EntityKind::Sale => "sales",
        }
    }

    /// Prefix used in export file names
    pub fn export_prefix(self) -> &'static str {
        match self {
            EntityKind::Product => "inventory",
            EntityKind::Sale => "sales",
        }
    }

    pub fn json_export_name(self) -> String {
        format!("{}_export.json", self.export_prefix())
    }

    pub fn csv_export_name(self) -> String {
        format!("{}_report.csv", self.export_prefix())
    }

    pub fn table_export_name(self) -> String {
        format!("{}_report.txt", self.export_prefix())
    }

    /// Singular label for messages
    pub fn label(self) -> &'static str {
        match self {
            EntityKind::Product => "product",
            EntityKind::Sale => "sale",
        }
    }

    /// Fields matched by the search term
    pub fn search_fields(self) -> &'static [&'static str] {
        match self {
            EntityKind::Product => &["name", "category"],
            EntityKind::Sale => &["product"],
        }
    }

    /// Fields a query may sort by
    pub fn sort_keys(self) -> &'static [&'static str] {
        match self {
            EntityKind::Product => &[
                "id",
                "name",
                "category",
                "quantity",
                "price",
                "dateAdded",
                "expirationDate",
            ],
            EntityKind::Sale => &["id", "product", "quantity", "price", "date"],
        }
    }

    /// Column headings of the table document
    pub fn table_columns(self) -> &'static [&'static str] {
        match self {
            EntityKind::Product => &["Name", "Category", "Quantity", "Price", "Expires"],
            EntityKind::Sale => &["Product", "Date", "Quantity", "Price"],
        }
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}

/// A stocked product
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    pub id: RecordId,
    #[serde(default, deserialize_with = "lenient::text")]
    pub name: String,
    #[serde(default, deserialize_with = "lenient::text")]
    pub category: String,
    #[serde(default, deserialize_with = "lenient::number")]
    pub quantity: f64,
    #[serde(default, deserialize_with = "lenient::number")]
    pub price: f64,
    #[serde(with = "date_format")]
    pub date_added: NaiveDate,
    #[serde(default, with = "date_format::optional")]
    pub expiration_date: Option<NaiveDate>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Product {
    /// Build a product from a draft, filling defaults for absent fields
    pub fn from_draft(id: RecordId, draft: ProductDraft, default_date: NaiveDate) -> Self {
        Self {
            id,
            name: draft.name.unwrap_or_default(),
            category: draft.category.unwrap_or_default(),
            quantity: draft.quantity.unwrap_or_default(),
            price: draft.price.unwrap_or_default(),
            date_added: draft.date_added.unwrap_or(default_date),
            expiration_date: draft.expiration_date,
            extra: draft.extra,
        }
    }

    /// Stock value of this line (price × quantity)
    pub fn stock_value(&self) -> f64 {
        self.price * self.quantity
    }
}

/// Product form submission; every field optional until validated
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ProductDraft {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<RecordId>,
    #[serde(default, deserialize_with = "lenient::optional_text")]
    pub name: Option<String>,
    #[serde(default, deserialize_with = "lenient::optional_text")]
    pub category: Option<String>,
    #[serde(default, deserialize_with = "lenient::optional_number")]
    pub quantity: Option<f64>,
    #[serde(default, deserialize_with = "lenient::optional_number")]
    pub price: Option<f64>,
    #[serde(default, with = "date_format::optional")]
    pub date_added: Option<NaiveDate>,
    #[serde(default, with = "date_format::optional")]
    pub expiration_date: Option<NaiveDate>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl ProductDraft {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            ..Self::default()
        }
    }

    pub fn category(mut self, category: impl Into<String>) -> Self {
        self.category = Some(category.into());
        self
    }

    pub fn quantity(mut self, quantity: f64) -> Self {
        self.quantity = Some(quantity);
        self
    }

    pub fn price(mut self, price: f64) -> Self {
        self.price = Some(price);
        self
    }

    pub fn date_added(mut self, date: NaiveDate) -> Self {
        self.date_added = Some(date);
        self
    }

    pub fn expiration_date(mut self, date: NaiveDate) -> Self {
        self.expiration_date = Some(date);
        self
    }
}

impl From<&Product> for ProductDraft {
    fn from(product: &Product) -> Self {
        Self {
            id: Some(product.id.clone()),
            name: Some(product.name.clone()),
            category: Some(product.category.clone()),
            quantity: Some(product.quantity),
            price: Some(product.price),
            date_added: Some(product.date_added),
            expiration_date: product.expiration_date,
            extra: product.extra.clone(),
        }
    }
}

/// A recorded sale
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Sale {
    pub id: RecordId,
    #[serde(
        default,
        alias = "productName",
        alias = "name",
        deserialize_with = "lenient::text"
    )]
    pub product: String,
    #[serde(default, deserialize_with = "lenient::number")]
    pub quantity: f64,
    #[serde(default, deserialize_with = "lenient::number")]
    pub price: f64,
    #[serde(with = "date_format")]
    pub date: NaiveDate,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Sale {
    /// Build a sale from a draft, filling defaults for absent fields
    pub fn from_draft(id: RecordId, draft: SaleDraft, default_date: NaiveDate) -> Self {
        Self {
            id,
            product: draft.product.unwrap_or_default(),
            quantity: draft.quantity.unwrap_or_default(),
            price: draft.price.unwrap_or_default(),
            date: draft.date.unwrap_or(default_date),
            extra: draft.extra,
        }
    }
}

/// Sale form submission; every field optional until validated
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SaleDraft {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<RecordId>,
    #[serde(
        default,
        alias = "productName",
        alias = "name",
        deserialize_with = "lenient::optional_text"
    )]
    pub product: Option<String>,
    #[serde(default, deserialize_with = "lenient::optional_number")]
    pub quantity: Option<f64>,
    #[serde(default, deserialize_with = "lenient::optional_number")]
    pub price: Option<f64>,
    #[serde(default, with = "date_format::optional")]
    pub date: Option<NaiveDate>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl SaleDraft {
    pub fn new(product: impl Into<String>) -> Self {
        Self {
            product: Some(product.into()),
            ..Self::default()
        }
    }

    pub fn quantity(mut self, quantity: f64) -> Self {
        self.quantity = Some(quantity);
        self
    }

    pub fn price(mut self, price: f64) -> Self {
        self.price = Some(price);
        self
    }

    pub fn date(mut self, date: NaiveDate) -> Self {
        self.date = Some(date);
        self
    }
}

impl From<&Sale> for SaleDraft {
    fn from(sale: &Sale) -> Self {
        Self {
            id: Some(sale.id.clone()),
            product: Some(sale.product.clone()),
            quantity: Some(sale.quantity),
            price: Some(sale.price),
            date: Some(sale.date),
            extra: sale.extra.clone(),
        }
    }
}

/// Parse a calendar date from `YYYY-MM-DD` or an RFC 3339 timestamp
pub fn parse_date(input: &str) -> Option<NaiveDate> {
    let input = input.trim();
    if let Ok(date) = NaiveDate::parse_from_str(input, "%Y-%m-%d") {
        return Some(date);
    }
    chrono::DateTime::parse_from_rfc3339(input)
        .ok()
        .map(|dt| dt.date_naive())
}

/// Dates as `YYYY-MM-DD`, read leniently
pub(crate) mod date_format {
    use chrono::NaiveDate;
    use serde::{de, Deserialize, Deserializer, Serializer};

    const FORMAT: &str = "%Y-%m-%d";

    pub fn serialize<S>(date: &NaiveDate, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&date.format(FORMAT).to_string())
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<NaiveDate, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        super::parse_date(&raw)
            .ok_or_else(|| de::Error::custom(format!("invalid date '{}'", raw)))
    }

    /// Optional dates; `null` and `""` both read as absent
    pub mod optional {
        use super::*;

        pub fn serialize<S>(date: &Option<NaiveDate>, serializer: S) -> Result<S::Ok, S::Error>
        where
            S: Serializer,
        {
            match date {
                Some(date) => super::serialize(date, serializer),
                None => serializer.serialize_none(),
            }
        }

        pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<NaiveDate>, D::Error>
        where
            D: Deserializer<'de>,
        {
            match Option::<String>::deserialize(deserializer)? {
                None => Ok(None),
                Some(raw) if raw.trim().is_empty() => Ok(None),
                Some(raw) => super::super::parse_date(&raw)
                    .map(Some)
                    .ok_or_else(|| de::Error::custom(format!("invalid date '{}'", raw))),
            }
        }
    }
}

/// Field readers for data entered through the dashboard's forms
///
/// Form inputs were stored as typed, so numbers may arrive as numeric
/// strings (`"2"`, `"4.50"`) and text fields as `null`.
pub(crate) mod lenient {
    use serde::{de, Deserialize, Deserializer};
    use serde_json::Value;

    fn read_number<E: de::Error>(value: Value) -> Result<Option<f64>, E> {
        let number = match value {
            Value::Null => return Ok(None),
            Value::Number(n) => n.as_f64(),
            Value::String(s) if s.trim().is_empty() => return Ok(None),
            Value::String(s) => s.trim().parse::<f64>().ok(),
            other => return Err(E::custom(format!("expected a number, found {}", other))),
        };
        match number {
            Some(n) if n.is_finite() => Ok(Some(n)),
            _ => Err(E::custom("expected a finite number")),
        }
    }

    fn read_text<E: de::Error>(value: Value) -> Result<Option<String>, E> {
        match value {
            Value::Null => Ok(None),
            Value::String(s) => Ok(Some(s)),
            Value::Number(n) => Ok(Some(n.to_string())),
            other => Err(E::custom(format!("expected text, found {}", other))),
        }
    }

    /// A number or numeric string; `null` and `""` read as zero
    pub fn number<'de, D>(deserializer: D) -> Result<f64, D::Error>
    where
        D: Deserializer<'de>,
    {
        Ok(read_number(Value::deserialize(deserializer)?)?.unwrap_or_default())
    }

    /// A number or numeric string; `null` and `""` read as absent
    pub fn optional_number<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
    where
        D: Deserializer<'de>,
    {
        read_number(Value::deserialize(deserializer)?)
    }

    /// Text, with `null` read as empty
    pub fn text<'de, D>(deserializer: D) -> Result<String, D::Error>
    where
        D: Deserializer<'de>,
    {
        Ok(read_text(Value::deserialize(deserializer)?)?.unwrap_or_default())
    }

    pub fn optional_text<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
    where
        D: Deserializer<'de>,
    {
        read_text(Value::deserialize(deserializer)?)
    }
}
