//! Barcode manifests written by the external decoder.

use super::BarcodeDecoder;
use crate::core::image::ImageRef;
use crate::error::{ImageError, PluginError};
use std::collections::HashMap;
use std::fs;
use std::path::Path;

/// Decoder backed by a `{"<file name>": "<barcode>" | null}` JSON object
#[derive(Debug, Clone, Default)]
pub struct ManifestDecoder {
    entries: HashMap<String, Option<String>>,
}

impl ManifestDecoder {
    pub fn from_entries<I, K, V>(entries: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            entries: entries
                .into_iter()
                .map(|(k, v)| (k.into(), Some(v.into())))
                .collect(),
        }
    }

    /// Read a manifest file
    pub fn load(path: &Path) -> Result<Self, PluginError> {
        let content = fs::read_to_string(path).map_err(|e| PluginError::Collaborator {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;
        let entries = serde_json::from_str(&content).map_err(|e| PluginError::Collaborator {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;
        Ok(Self { entries })
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl BarcodeDecoder for ManifestDecoder {
    fn decode(&self, image: &ImageRef) -> Result<Option<String>, ImageError> {
        Ok(self
            .entries
            .get(&image.label())
            .cloned()
            .flatten()
            .filter(|code| !code.trim().is_empty()))
    }
}
