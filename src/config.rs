//! Configuration loading and defaults.
//!
//! Settings come from a JSON file, resolved in priority order:
//! 1. An explicit path (`--config`); it must exist
//! 2. `<config dir>/slab-intake/config.json`, when present
//! 3. Compiled defaults
//!
//! Command-line flags are applied on top by the CLI.

use crate::core::grouper::GroupingConfig;
use crate::core::similarity::DEFAULT_THRESHOLD;
use crate::core::store::DEFAULT_STORAGE_ROOT;
use crate::error::{IntakeError, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Intake settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct IntakeConfig {
    /// Directory holding persisted order summaries
    pub storage_root: PathBuf,
    pub similarity_threshold: f64,
    /// Photos per item
    pub group_size: usize,
    pub first_is_blank: bool,
    /// Plugin type used for identification
    pub item_type: String,
    /// Decoder manifest file name, looked up inside the capture directory
    pub barcode_manifest: String,
    /// Optional `{"<identity>": value}` price table
    pub price_guide: Option<PathBuf>,
    /// Storage key of the working order
    pub order_key: String,
}

impl Default for IntakeConfig {
    fn default() -> Self {
        Self {
            storage_root: PathBuf::from(DEFAULT_STORAGE_ROOT),
            similarity_threshold: DEFAULT_THRESHOLD,
            group_size: 3,
            first_is_blank: false,
            item_type: "coin".to_string(),
            barcode_manifest: "barcodes.json".to_string(),
            price_guide: None,
            order_key: "order.json".to_string(),
        }
    }
}

impl IntakeConfig {
    /// Load from `explicit`, else from the default location, else defaults
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        match explicit {
            Some(path) => Self::from_file(path),
            None => match default_config_path() {
                Some(path) if path.is_file() => Self::from_file(&path),
                _ => Ok(Self::default()),
            },
        }
    }

    /// Parse a config file; missing keys take their defaults
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .map_err(|e| IntakeError::Config(format!("cannot read {}: {e}", path.display())))?;
        let config: Self = serde_json::from_str(&content)
            .map_err(|e| IntakeError::Config(format!("invalid config {}: {e}", path.display())))?;
        tracing::debug!(path = %path.display(), "loaded config");
        Ok(config)
    }

    /// Reject settings no run could succeed with
    pub fn validate(&self) -> Result<()> {
        if self.group_size == 0 {
            return Err(IntakeError::Config("group_size must be at least 1".to_string()));
        }
        if !self.similarity_threshold.is_finite() || !(0.0..=1.0).contains(&self.similarity_threshold) {
            return Err(IntakeError::Config(format!(
                "similarity_threshold must be between 0 and 1, got {}",
                self.similarity_threshold
            )));
        }
        if self.item_type.trim().is_empty() {
            return Err(IntakeError::Config("item_type must not be empty".to_string()));
        }
        Ok(())
    }

    pub fn grouping(&self) -> GroupingConfig {
        GroupingConfig::new(self.group_size, self.first_is_blank)
    }
}

/// `<config dir>/slab-intake/config.json` for the platform
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("slab-intake").join("config.json"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn defaults_are_valid() {
        let config = IntakeConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.storage_root, PathBuf::from("logs"));
        assert_eq!(config.similarity_threshold, 0.65);
        assert_eq!(config.grouping(), GroupingConfig::new(3, false));
    }

    #[test]
    fn partial_file_keeps_other_defaults() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.json");
        fs::write(&path, r#"{"group_size": 2, "first_is_blank": true}"#).unwrap();

        let config = IntakeConfig::load(Some(&path)).unwrap();

        assert_eq!(config.group_size, 2);
        assert!(config.first_is_blank);
        assert_eq!(config.item_type, "coin");
        assert_eq!(config.order_key, "order.json");
    }

    #[test]
    fn missing_explicit_file_is_an_error() {
        let dir = TempDir::new().unwrap();
        let result = IntakeConfig::load(Some(&dir.path().join("nope.json")));
        assert!(matches!(result, Err(IntakeError::Config(_))));
    }

    #[test]
    fn unparsable_file_is_an_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.json");
        fs::write(&path, "{ group_size: ").unwrap();
        assert!(matches!(IntakeConfig::from_file(&path), Err(IntakeError::Config(_))));
    }

    #[test]
    fn validate_rejects_zero_group_size_and_bad_threshold() {
        let config = IntakeConfig {
            group_size: 0,
            ..IntakeConfig::default()
        };
        assert!(config.validate().is_err());

        let config = IntakeConfig {
            similarity_threshold: 1.2,
            ..IntakeConfig::default()
        };
        assert!(config.validate().is_err());

        let config = IntakeConfig {
            similarity_threshold: f64::NAN,
            ..IntakeConfig::default()
        };
        assert!(config.validate().is_err());
    }
}
