//! In-memory store backend.

use super::{validate_key, KeyValueStore};
use crate::error::StoreError;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::RwLock;

/// In-memory store
///
/// Useful for tests and for hosts that persist elsewhere.
pub struct InMemoryStore {
    records: RwLock<HashMap<String, Value>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self {
            records: RwLock::new(HashMap::new()),
        }
    }
}

impl Default for InMemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl KeyValueStore for InMemoryStore {
    fn save(&self, key: &str, value: Value) -> Result<(), StoreError> {
        validate_key(key)?;
        let mut records = self.records.write().map_err(|_| StoreError::Poisoned)?;
        records.insert(key.to_string(), value);
        Ok(())
    }

    fn load(&self, key: &str) -> Result<Value, StoreError> {
        validate_key(key)?;
        let records = self.records.read().map_err(|_| StoreError::Poisoned)?;
        records.get(key).cloned().ok_or_else(|| StoreError::NotFound {
            key: key.to_string(),
        })
    }
}
