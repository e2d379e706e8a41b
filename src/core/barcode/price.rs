//! Guide values from a JSON export.

use super::PriceGuide;
use crate::error::PluginError;
use std::collections::HashMap;
use std::fs;
use std::path::Path;

/// `{"<identity>": <value>}` price table, shared by every item type
#[derive(Debug, Clone, Default)]
pub struct JsonPriceGuide {
    values: HashMap<String, f64>,
}

impl JsonPriceGuide {
    pub fn from_entries<I, K>(entries: I) -> Self
    where
        I: IntoIterator<Item = (K, f64)>,
        K: Into<String>,
    {
        Self {
            values: entries.into_iter().map(|(k, v)| (k.into(), v)).collect(),
        }
    }

    pub fn load(path: &Path) -> Result<Self, PluginError> {
        let content = fs::read_to_string(path).map_err(|e| PluginError::Collaborator {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;
        let values = serde_json::from_str(&content).map_err(|e| PluginError::Collaborator {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;
        Ok(Self { values })
    }
}

impl PriceGuide for JsonPriceGuide {
    fn value_for(&self, _item_type: &str, identity: &str) -> Option<f64> {
        self.values.get(identity).copied()
    }
}
