use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::rc::Rc;

use super::error::{ProviderError, ProviderResult};
use super::KvProvider;

/// In-memory slot storage for testing.
///
/// Clones share the same slots, so two stores built from clones of one
/// provider see each other's writes, like two stores over one directory.
/// Uses `Rc<RefCell<..>>` since stores are single-threaded.
#[derive(Debug, Clone, Default)]
pub struct MemoryProvider {
    slots: Rc<RefCell<HashMap<String, Vec<u8>>>>,
    simulate_write_error: Rc<Cell<bool>>,
}

impl MemoryProvider {
    pub fn new() -> Self {
        Self::default()
    }

    /// Enable write error simulation for testing error handling.
    pub fn set_simulate_write_error(&self, simulate: bool) {
        self.simulate_write_error.set(simulate);
    }

    /// Raw access for tests that plant slot contents directly.
    pub fn insert_raw(&self, key: &str, bytes: impl Into<Vec<u8>>) {
        self.slots.borrow_mut().insert(key.to_string(), bytes.into());
    }

    /// Keys currently holding data, sorted.
    pub fn keys(&self) -> Vec<String> {
        let mut keys: Vec<String> = self.slots.borrow().keys().cloned().collect();
        keys.sort();
        keys
    }
}

impl KvProvider for MemoryProvider {
    fn get(&self, key: &str) -> ProviderResult<Option<Vec<u8>>> {
        Ok(self.slots.borrow().get(key).cloned())
    }

    fn set(&self, key: &str, bytes: &[u8]) -> ProviderResult<()> {
        if self.simulate_write_error.get() {
            return Err(ProviderError::Unavailable("Simulated write error".to_string()));
        }
        self.slots
            .borrow_mut()
            .insert(key.to_string(), bytes.to_vec());
        Ok(())
    }

    fn remove(&self, key: &str) -> ProviderResult<()> {
        if self.simulate_write_error.get() {
            return Err(ProviderError::Unavailable("Simulated write error".to_string()));
        }
        self.slots.borrow_mut().remove(key);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clones_share_slots() {
        let provider = MemoryProvider::new();
        let other = provider.clone();

        provider.set("products", b"[]").unwrap();
        assert_eq!(other.get("products").unwrap().unwrap(), b"[]");
        assert_eq!(other.keys(), vec!["products".to_string()]);
    }

    #[test]
    fn test_simulated_write_error() {
        let provider = MemoryProvider::new();
        provider.set_simulate_write_error(true);

        assert!(provider.set("sales", b"[]").is_err());
        assert!(provider.get("sales").unwrap().is_none());

        provider.set_simulate_write_error(false);
        provider.set("sales", b"[]").unwrap();
        assert!(provider.get("sales").unwrap().is_some());
    }
}
