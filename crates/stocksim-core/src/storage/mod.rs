//! Key-value persistence port and typed collection repositories.

mod repository;

use std::collections::HashMap;
use std::sync::Mutex;

use stocksim_warehouse::{Warehouse, WarehouseError};

pub use repository::{CollectionName, Repositories, Repository, Snapshot, SCHEMA_VERSION};

/// Opaque string store keyed by collection name.
pub trait KeyValueStore: Send + Sync {
    fn get(&self, key: &str) -> Result<Option<String>, WarehouseError>;
    fn set(&self, key: &str, value: &str) -> Result<(), WarehouseError>;
    /// Remove every key.
    fn clear(&self) -> Result<(), WarehouseError>;
}

/// Process-local store; contents vanish on drop.
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: Mutex<HashMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.lock().expect("store lock is not poisoned").len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>, WarehouseError> {
        Ok(self
            .entries
            .lock()
            .expect("store lock is not poisoned")
            .get(key)
            .cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<(), WarehouseError> {
        self.entries
            .lock()
            .expect("store lock is not poisoned")
            .insert(key.to_owned(), value.to_owned());
        Ok(())
    }

    fn clear(&self) -> Result<(), WarehouseError> {
        self.entries
            .lock()
            .expect("store lock is not poisoned")
            .clear();
        Ok(())
    }
}

impl KeyValueStore for Warehouse {
    fn get(&self, key: &str) -> Result<Option<String>, WarehouseError> {
        self.read(key)
    }

    fn set(&self, key: &str, value: &str) -> Result<(), WarehouseError> {
        self.write(key, value)
    }

    fn clear(&self) -> Result<(), WarehouseError> {
        Warehouse::clear(self).map(|_| ())
    }
}
