//! Storage layer
//!
//! Each record store persists its whole collection as one JSON array in a
//! key-value slot. The [`KvProvider`] trait abstracts where slots live.
//!
//! ## Implementations
//!
//! - [`FileProvider`]: one file per slot under the data directory, written
//!   atomically (temp file, fsync, rename)
//! - [`MemoryProvider`]: shared in-memory slots for tests, with write
//!   failure simulation
//!
//! ## Layout
//!
//! ```text
//! ~/.local/share/stockroom/
//! ├── products.json          # JSON array of products
//! ├── sales.json             # JSON array of sales
//! └── products.corrupt.json  # only after an unreadable slot was recovered
//! ```

pub mod error;
pub mod file;
pub mod memory;

pub use error::{ProviderError, ProviderResult, StoreError, StoreResult};
pub use file::FileProvider;
pub use memory::MemoryProvider;

/// Synchronous key-value slot storage
///
/// All methods are total apart from unrecoverable platform errors.
/// Reading a missing key is `Ok(None)`, removing a missing key is a no-op.
pub trait KvProvider {
    /// Read the bytes stored under `key`
    fn get(&self, key: &str) -> ProviderResult<Option<Vec<u8>>>;

    /// Overwrite the slot `key` with `bytes`
    fn set(&self, key: &str, bytes: &[u8]) -> ProviderResult<()>;

    /// Delete the slot `key`
    fn remove(&self, key: &str) -> ProviderResult<()>;
}
