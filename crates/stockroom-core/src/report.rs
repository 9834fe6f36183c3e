//! Summary metrics for the inventory and sales screens

use std::collections::HashMap;

use chrono::NaiveDate;
use serde::Serialize;

use crate::models::{Product, Sale};
use crate::query::{self, DateRange};

/// Label for products with an empty category
pub const UNCATEGORIZED: &str = "Uncategorized";

/// How many recently added products the summary lists
const RECENT_COUNT: usize = 5;

/// Quantity held in one category
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CategoryTotal {
    pub category: String,
    pub quantity: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InventorySummary {
    pub total_products: usize,
    /// Sum of price × quantity
    pub inventory_value: f64,
    pub low_stock: Vec<Product>,
    pub out_of_stock: Vec<Product>,
    pub expiring_soon: Vec<Product>,
    /// In order of first appearance
    pub categories: Vec<CategoryTotal>,
    /// Last records in collection order, oldest first
    pub recent: Vec<Product>,
}

impl InventorySummary {
    /// Summarise `products` as of `today`
    ///
    /// Low stock is a quantity below `low_stock_threshold`. A product is
    /// expiring soon when its expiration date is strictly after `today`
    /// and less than `expiry_days` away.
    pub fn compute(
        products: &[Product],
        today: NaiveDate,
        low_stock_threshold: i64,
        expiry_days: i64,
    ) -> Self {
        let mut categories: Vec<CategoryTotal> = Vec::new();
        let mut category_index: HashMap<&str, usize> = HashMap::new();
        for product in products {
            let name = if product.category.trim().is_empty() {
                UNCATEGORIZED
            } else {
                product.category.as_str()
            };
            match category_index.get(name) {
                Some(&i) => categories[i].quantity += product.quantity,
                None => {
                    category_index.insert(name, categories.len());
                    categories.push(CategoryTotal {
                        category: name.to_string(),
                        quantity: product.quantity,
                    });
                }
            }
        }

        let expiring_soon = products
            .iter()
            .filter(|p| {
                p.expiration_date.is_some_and(|d| {
                    let days = (d - today).num_days();
                    days > 0 && days < expiry_days
                })
            })
            .cloned()
            .collect();

        Self {
            total_products: products.len(),
            inventory_value: products.iter().map(Product::stock_value).sum(),
            low_stock: products
                .iter()
                .filter(|p| p.quantity < low_stock_threshold as f64)
                .cloned()
                .collect(),
            out_of_stock: products.iter().filter(|p| p.quantity == 0.0).cloned().collect(),
            expiring_soon,
            categories,
            recent: products[products.len().saturating_sub(RECENT_COUNT)..].to_vec(),
        }
    }
}

/// Revenue earned by one product
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProductRevenue {
    pub product: String,
    pub revenue: f64,
    pub sales: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SalesSummary {
    /// Sum of the `price` of each matching sale
    pub total_revenue: f64,
    pub sale_count: usize,
    /// Product with the most sales; the first to reach the count wins ties
    pub top_product: Option<String>,
    /// In order of first appearance
    pub by_product: Vec<ProductRevenue>,
}

impl SalesSummary {
    /// Summarise the sales matching `search` within `range`
    pub fn compute(sales: &[Sale], search: &str, range: &DateRange) -> Self {
        let matching = query::filter(sales, search, range);

        let mut by_product: Vec<ProductRevenue> = Vec::new();
        let mut index: HashMap<&str, usize> = HashMap::new();
        let mut top: Option<(usize, usize)> = None;

        for sale in matching.iter().copied() {
            let i = *index.entry(sale.product.as_str()).or_insert_with(|| {
                by_product.push(ProductRevenue {
                    product: sale.product.clone(),
                    revenue: 0.0,
                    sales: 0,
                });
                by_product.len() - 1
            });
            let entry = &mut by_product[i];
            entry.revenue += sale.price;
            entry.sales += 1;

            if top.map_or(true, |(_, count)| entry.sales > count) {
                top = Some((i, entry.sales));
            }
        }

        Self {
            total_revenue: matching.iter().map(|s| s.price).sum(),
            sale_count: matching.len(),
            top_product: top.map(|(i, _)| by_product[i].product.clone()),
            by_product,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{ProductDraft, RecordId, SaleDraft};

    fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    fn product(name: &str, category: &str, quantity: i64, price: f64, expires: &str) -> Product {
        Product::from_draft(
            RecordId::from(name),
            ProductDraft::new(name)
                .category(category)
                .quantity(quantity as f64)
                .price(price)
                .expiration_date(date(expires)),
            date("2024-01-01"),
        )
    }

    fn sale(product: &str, price: f64, on: &str) -> Sale {
        Sale::from_draft(
            RecordId::generate(),
            SaleDraft::new(product).quantity(1.0).price(price).date(date(on)),
            date("2024-01-01"),
        )
    }

    #[test]
    fn test_inventory_summary() {
        let products = vec![
            product("Vitamin C", "Supplements", 5, 10.0, "2024-04-20"),
            product("Aspirin", "Pain relief", 20, 2.5, "2025-01-01"),
            product("Gauze", "", 0, 1.0, "2024-04-15"),
            product("Zinc", "Supplements", 12, 4.0, "2024-05-14"),
        ];
        let summary = InventorySummary::compute(&products, date("2024-04-15"), 10, 30);

        assert_eq!(summary.total_products, 4);
        assert_eq!(summary.inventory_value, 50.0 + 50.0 + 0.0 + 48.0);

        let low: Vec<&str> = summary.low_stock.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(low, vec!["Vitamin C", "Gauze"]);
        assert_eq!(summary.out_of_stock.len(), 1);

        // Expiring today is excluded, 29 days out is included
        let expiring: Vec<&str> = summary.expiring_soon.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(expiring, vec!["Vitamin C", "Zinc"]);

        assert_eq!(
            summary.categories,
            vec![
                CategoryTotal { category: "Supplements".to_string(), quantity: 17.0 },
                CategoryTotal { category: "Pain relief".to_string(), quantity: 20.0 },
                CategoryTotal { category: UNCATEGORIZED.to_string(), quantity: 0.0 },
            ]
        );
        assert_eq!(summary.recent.len(), 4);
    }

    #[test]
    fn test_recent_keeps_last_five() {
        let products: Vec<Product> = (0..8)
            .map(|i| product(&format!("P{}", i), "", 1, 1.0, "2030-01-01"))
            .collect();
        let summary = InventorySummary::compute(&products, date("2024-01-01"), 10, 30);

        let recent: Vec<&str> = summary.recent.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(recent, vec!["P3", "P4", "P5", "P6", "P7"]);
    }

    #[test]
    fn test_sales_summary() {
        let sales = vec![
            sale("Aspirin", 4.0, "2024-03-01"),
            sale("Gauze", 2.0, "2024-03-02"),
            sale("Gauze", 2.0, "2024-03-03"),
            sale("Aspirin", 4.0, "2024-03-04"),
            sale("Zinc", 9.0, "2024-05-01"),
        ];

        let all = SalesSummary::compute(&sales, "", &DateRange::default());
        assert_eq!(all.total_revenue, 21.0);
        assert_eq!(all.sale_count, 5);
        // Gauze reaches two sales before Aspirin does
        assert_eq!(all.top_product.as_deref(), Some("Gauze"));
        assert_eq!(all.by_product[0].product, "Aspirin");
        assert_eq!(all.by_product[0].revenue, 8.0);

        let march = DateRange::new(Some(date("2024-03-01")), Some(date("2024-03-31")));
        let filtered = SalesSummary::compute(&sales, "zinc", &march);
        assert_eq!(filtered.sale_count, 0);
        assert_eq!(filtered.total_revenue, 0.0);
        assert!(filtered.top_product.is_none());
    }
}
