//! Field validation for drafts
//!
//! Each record kind has a static table of [`FieldRule`]s. [`validate`]
//! runs every rule and reports all failures at once, so a form can be
//! fixed in a single pass.

use std::fmt;

use serde::Serialize;

use crate::models::{ProductDraft, SaleDraft};

/// A single rule: `check` must hold for `field`, else `message` is reported
pub struct FieldRule<D> {
    pub field: &'static str,
    pub message: &'static str,
    pub check: fn(&D) -> bool,
}

/// One failing field
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldError {
    pub field: String,
    pub message: String,
}

impl FieldError {
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

/// Every field that failed validation, in rule order
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ValidationErrors {
    errors: Vec<FieldError>,
}

impl ValidationErrors {
    pub fn new(errors: Vec<FieldError>) -> Self {
        Self { errors }
    }

    pub fn errors(&self) -> &[FieldError] {
        &self.errors
    }

    /// Names of the failing fields
    pub fn fields(&self) -> Vec<&str> {
        self.errors.iter().map(|e| e.field.as_str()).collect()
    }

    /// Message for `field`, if it failed
    pub fn message_for(&self, field: &str) -> Option<&str> {
        self.errors
            .iter()
            .find(|e| e.field == field)
            .map(|e| e.message.as_str())
    }

    pub fn len(&self) -> usize {
        self.errors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Validation failed: ")?;
        for (i, error) in self.errors.iter().enumerate() {
            if i > 0 {
                write!(f, "; ")?;
            }
            write!(f, "{}: {}", error.field, error.message)?;
        }
        Ok(())
    }
}

impl std::error::Error for ValidationErrors {}

/// Run every rule against `draft`
pub fn validate<D>(draft: &D, rules: &[FieldRule<D>]) -> Result<(), ValidationErrors> {
    let errors: Vec<FieldError> = rules
        .iter()
        .filter(|rule| !(rule.check)(draft))
        .map(|rule| FieldError::new(rule.field, rule.message))
        .collect();

    if errors.is_empty() {
        Ok(())
    } else {
        Err(ValidationErrors::new(errors))
    }
}

fn non_empty(value: &Option<String>) -> bool {
    value.as_deref().is_some_and(|s| !s.trim().is_empty())
}

pub static PRODUCT_RULES: [FieldRule<ProductDraft>; 4] = [
    FieldRule {
        field: "name",
        message: "Product name is required.",
        check: |d| non_empty(&d.name),
    },
    FieldRule {
        field: "quantity",
        message: "Quantity must be positive.",
        check: |d| d.quantity.is_some_and(|q| q > 0.0),
    },
    FieldRule {
        field: "price",
        message: "Price must be positive.",
        check: |d| d.price.is_some_and(|p| p.is_finite() && p > 0.0),
    },
    FieldRule {
        field: "expirationDate",
        message: "Expiration date is required.",
        check: |d| d.expiration_date.is_some(),
    },
];

pub static SALE_RULES: [FieldRule<SaleDraft>; 3] = [
    FieldRule {
        field: "product",
        message: "Product is required.",
        check: |d| non_empty(&d.product),
    },
    FieldRule {
        field: "quantity",
        message: "Quantity must be a number.",
        check: |d| d.quantity.is_some_and(f64::is_finite),
    },
    FieldRule {
        field: "price",
        message: "Price must be a number.",
        check: |d| d.price.is_some_and(f64::is_finite),
    },
];

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn expiry() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 12, 1).unwrap()
    }

    #[test]
    fn test_valid_product_passes() {
        let draft = ProductDraft::new("Vitamin C")
            .quantity(5.0)
            .price(9.99)
            .expiration_date(expiry());
        assert!(validate(&draft, &PRODUCT_RULES).is_ok());
    }

    #[test]
    fn test_empty_product_reports_every_field() {
        let errors = validate(&ProductDraft::default(), &PRODUCT_RULES).unwrap_err();
        assert_eq!(
            errors.fields(),
            vec!["name", "quantity", "price", "expirationDate"]
        );
        assert_eq!(errors.message_for("name"), Some("Product name is required."));
    }

    #[test]
    fn test_blank_name_rejected() {
        let draft = ProductDraft::new("   ")
            .quantity(5.0)
            .price(9.99)
            .expiration_date(expiry());
        let errors = validate(&draft, &PRODUCT_RULES).unwrap_err();
        assert_eq!(errors.fields(), vec!["name"]);
    }

    #[test]
    fn test_non_positive_numbers_rejected() {
        let draft = ProductDraft::new("Gauze")
            .quantity(0.0)
            .price(-1.0)
            .expiration_date(expiry());
        let errors = validate(&draft, &PRODUCT_RULES).unwrap_err();
        assert_eq!(errors.fields(), vec!["quantity", "price"]);
        assert_eq!(errors.len(), 2);
    }

    #[test]
    fn test_sale_rules() {
        assert!(validate(&SaleDraft::new("Aspirin").quantity(1.0).price(2.5), &SALE_RULES).is_ok());

        let errors = validate(&SaleDraft::new("").price(f64::NAN), &SALE_RULES).unwrap_err();
        assert_eq!(errors.fields(), vec!["product", "quantity", "price"]);
    }

    #[test]
    fn test_display_lists_fields() {
        let errors = validate(&SaleDraft::default(), &SALE_RULES).unwrap_err();
        let msg = errors.to_string();
        assert!(msg.starts_with("Validation failed"));
        assert!(msg.contains("product: Product is required."));
        assert!(msg.contains("price: Price must be a number."));
    }
}
