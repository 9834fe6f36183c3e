//! Stockroom Core Library
//!
//! This crate provides the core functionality for Stockroom, a local-first
//! record keeper for a small shop's products and sales.
//!
//! # Architecture
//!
//! - **RecordStore**: one ordered, validated collection per record kind,
//!   written through to a key-value slot on every change
//! - **KvProvider**: where slots live (files on disk, or memory in tests)
//!
//! Queries (search, sort, paginate) run over the in-memory collection and
//! never touch storage.
//!
//! # Quick Start
//!
//! ```text
//! let mut inventory = Inventory::open()?;
//!
//! // Add a product
//! let draft = ProductDraft::new("Vitamin C").quantity(5.0).price(9.99);
//! inventory.products_mut().add(draft)?;
//!
//! // Query products
//! let page = inventory.products().query(&Query::new().search("vit"));
//! ```
//!
//! # Modules
//!
//! - `inventory`: Facade owning both stores (main entry point)
//! - `store`: Generic record store
//! - `models`: Products, sales, drafts and ids
//! - `entity`: Per-kind behaviour the store dispatches through
//! - `validation`: Field rules
//! - `query`: Filter, sort and paginate
//! - `transfer`: JSON, CSV and table exports
//! - `report`: Inventory and sales summaries
//! - `storage`: Slot persistence
//! - `config`: Application configuration

pub mod config;
pub mod entity;
pub mod inventory;
pub mod models;
pub mod query;
pub mod report;
pub mod storage;
pub mod store;
pub mod transfer;
pub mod validation;

pub use config::Config;
pub use entity::Entity;
pub use inventory::{Inventory, RestoreReport};
pub use models::{parse_date, EntityKind, Product, ProductDraft, RecordId, Sale, SaleDraft};
pub use query::{DateRange, Query, QueryView, SortConfig, SortDirection};
pub use report::{InventorySummary, SalesSummary};
pub use storage::{FileProvider, KvProvider, MemoryProvider, ProviderError, StoreError, StoreResult};
pub use store::{ImportMode, ImportReport, RecordStore};
pub use validation::{FieldError, ValidationErrors};
