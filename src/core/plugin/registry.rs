//! Type-name keyed plugin registry.

use super::{
    BarcodeItemScanner, BarcodeListingBuilder, CoinListingBuilder, CoinScanner, ItemScanner,
    ListingBuilder, PluginContext,
};
use crate::error::PluginError;
use serde::Serialize;
use std::collections::BTreeMap;

/// Creates a scanner for one run
pub type ScannerFactory = fn(&PluginContext) -> Box<dyn ItemScanner>;

/// Creates a listing builder for one run
pub type BuilderFactory = fn(&PluginContext) -> Box<dyn ListingBuilder>;

#[derive(Clone, Copy, Default)]
struct PluginEntry {
    scanner: Option<ScannerFactory>,
    builder: Option<BuilderFactory>,
}

/// What a registered type provides
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PluginInfo {
    pub type_name: String,
    pub has_scanner: bool,
    pub has_builder: bool,
}

/// Collects registrations before the registry is frozen
#[derive(Default)]
pub struct RegistryBuilder {
    entries: BTreeMap<String, PluginEntry>,
}

impl RegistryBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register (or replace) the scanner for `type_name`
    pub fn register_scanner(mut self, type_name: impl Into<String>, factory: ScannerFactory) -> Self {
        self.entries.entry(type_name.into()).or_default().scanner = Some(factory);
        self
    }

    /// Register (or replace) the listing builder for `type_name`
    pub fn register_builder(mut self, type_name: impl Into<String>, factory: BuilderFactory) -> Self {
        self.entries.entry(type_name.into()).or_default().builder = Some(factory);
        self
    }

    /// Register both halves of a type at once
    pub fn register(
        self,
        type_name: impl Into<String>,
        scanner: ScannerFactory,
        builder: BuilderFactory,
    ) -> Self {
        let type_name = type_name.into();
        self.register_scanner(type_name.clone(), scanner)
            .register_builder(type_name, builder)
    }

    /// Add the built-in `coin` and `barcode` types
    pub fn with_builtin(self) -> Self {
        self.register(CoinScanner::TYPE_NAME, coin_scanner, coin_builder)
            .register(BarcodeItemScanner::TYPE_NAME, barcode_scanner, barcode_builder)
    }

    pub fn build(self) -> PluginRegistry {
        PluginRegistry {
            entries: self.entries,
        }
    }
}

fn coin_scanner(ctx: &PluginContext) -> Box<dyn ItemScanner> {
    Box::new(CoinScanner::new(ctx.clone()))
}

fn coin_builder(_ctx: &PluginContext) -> Box<dyn ListingBuilder> {
    Box::new(CoinListingBuilder)
}

fn barcode_scanner(ctx: &PluginContext) -> Box<dyn ItemScanner> {
    Box::new(BarcodeItemScanner::new(ctx.clone()))
}

fn barcode_builder(_ctx: &PluginContext) -> Box<dyn ListingBuilder> {
    Box::new(BarcodeListingBuilder)
}

/// Read-only map from item type to scanner/builder factories
pub struct PluginRegistry {
    entries: BTreeMap<String, PluginEntry>,
}

impl PluginRegistry {
    pub fn builder() -> RegistryBuilder {
        RegistryBuilder::new()
    }

    /// Registry holding only the built-in types
    pub fn with_builtin() -> Self {
        RegistryBuilder::new().with_builtin().build()
    }

    /// Create the scanner registered for `type_name`
    pub fn scanner(&self, type_name: &str, ctx: &PluginContext) -> Result<Box<dyn ItemScanner>, PluginError> {
        self.entries
            .get(type_name)
            .and_then(|entry| entry.scanner)
            .map(|factory| factory(ctx))
            .ok_or_else(|| PluginError::UnknownScanner {
                type_name: type_name.to_string(),
            })
    }

    /// Create the listing builder registered for `type_name`
    pub fn listing_builder(
        &self,
        type_name: &str,
        ctx: &PluginContext,
    ) -> Result<Box<dyn ListingBuilder>, PluginError> {
        self.entries
            .get(type_name)
            .and_then(|entry| entry.builder)
            .map(|factory| factory(ctx))
            .ok_or_else(|| PluginError::UnknownBuilder {
                type_name: type_name.to_string(),
            })
    }

    pub fn contains(&self, type_name: &str) -> bool {
        self.entries.contains_key(type_name)
    }

    /// Every registered type, sorted by name
    pub fn available_types(&self) -> Vec<PluginInfo> {
        self.entries
            .iter()
            .map(|(name, entry)| PluginInfo {
                type_name: name.clone(),
                has_scanner: entry.scanner.is_some(),
                has_builder: entry.builder.is_some(),
            })
            .collect()
    }
}
