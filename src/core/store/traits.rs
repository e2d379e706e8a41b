//! Store backend trait definition.

use crate::error::StoreError;
use serde_json::Value;

/// Trait for key-value record stores
pub trait KeyValueStore: Send + Sync {
    /// Save `value` under `key`, replacing any previous record
    fn save(&self, key: &str, value: Value) -> Result<(), StoreError>;

    /// Load the record under `key`
    ///
    /// Fails with [`StoreError::NotFound`] when nothing was saved there.
    fn load(&self, key: &str) -> Result<Value, StoreError>;

    /// Whether a record exists under `key`
    fn contains(&self, key: &str) -> Result<bool, StoreError> {
        match self.load(key) {
            Ok(_) => Ok(true),
            Err(StoreError::NotFound { .. }) => Ok(false),
            Err(e) => Err(e),
        }
    }
}
