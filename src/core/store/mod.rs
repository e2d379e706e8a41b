//! # Store Module
//!
//! Flat key-value persistence for JSON records.
//!
//! Records are addressed by a plain file name (`order.json`) under a fixed
//! storage root, `logs/` by default. There is no schema and no history: saving
//! a key replaces whatever was there.
//!
//! ## Backends
//! - `JsonFileStore` - one JSON file per key on disk
//! - `InMemoryStore` - for tests and embedding

mod file;
mod memory;
mod traits;

pub use file::JsonFileStore;
pub use memory::InMemoryStore;
pub use traits::KeyValueStore;

use crate::error::StoreError;
use serde::de::DeserializeOwned;
use serde::Serialize;

/// Default storage root, relative to the working directory
pub const DEFAULT_STORAGE_ROOT: &str = "logs";

/// Serialize `value` and save it under `key`
pub fn save_json<T: Serialize + ?Sized>(
    store: &dyn KeyValueStore,
    key: &str,
    value: &T,
) -> Result<(), StoreError> {
    let json = serde_json::to_value(value).map_err(|e| StoreError::Serialization {
        key: key.to_string(),
        reason: e.to_string(),
    })?;
    store.save(key, json)
}

/// Load the record under `key` and deserialize it
pub fn load_json<T: DeserializeOwned>(store: &dyn KeyValueStore, key: &str) -> Result<T, StoreError> {
    let json = store.load(key)?;
    serde_json::from_value(json).map_err(|e| StoreError::Serialization {
        key: key.to_string(),
        reason: e.to_string(),
    })
}

/// Keys are single path components: no separators, no `.`/`..`, not empty
pub(crate) fn validate_key(key: &str) -> Result<(), StoreError> {
    let invalid = key.is_empty()
        || key == "."
        || key == ".."
        || key.contains('/')
        || key.contains('\\')
        || key.contains('\0');
    if invalid {
        Err(StoreError::InvalidKey {
            key: key.to_string(),
        })
    } else {
        Ok(())
    }
}
