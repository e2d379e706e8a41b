//! # Plugin Module
//!
//! Per-item-type identification and listing logic.
//!
//! Each item type (graded coins, plain barcoded stock, ...) supplies two
//! capabilities:
//! - an [`ItemScanner`] that turns a group of photos into zero or one item
//! - a [`ListingBuilder`] that turns a listing into a marketplace payload
//!
//! Types are looked up by name in a [`PluginRegistry`], which is assembled
//! once at startup with [`RegistryBuilder`] and only read afterwards. The
//! registry stores factories, not instances; scanners are created per run
//! from a [`PluginContext`] carrying the shared collaborators.

mod barcode_item;
mod coin;
mod registry;

pub use barcode_item::{BarcodeItemScanner, BarcodeListingBuilder};
pub use coin::{CoinListingBuilder, CoinScanner, GradingService};
pub use registry::{BuilderFactory, PluginInfo, PluginRegistry, RegistryBuilder, ScannerFactory};

use crate::core::barcode::{BarcodeDecoder, NoBarcodes, PriceGuide};
use crate::core::image::ImageRef;
use crate::core::inventory::{Item, Listing};
use crate::error::PluginError;
use serde_json::Value;
use std::sync::Arc;

/// Identifies the item shown in a group of photos
pub trait ItemScanner: Send + Sync {
    /// The item, or `None` when none of the photos identify one
    fn scan(&self, images: &[ImageRef]) -> Result<Option<Item>, PluginError>;

    /// The item a barcode stands for, as if it had been read from a photo.
    ///
    /// Used for codes typed in by hand; the default keeps only the identity.
    fn item_from_code(&self, code: &str) -> Item {
        Item::new(code)
    }
}

/// Produces the marketplace payload for a listing
pub trait ListingBuilder: Send + Sync {
    fn build_listing(&self, listing: &Listing) -> Result<Value, PluginError>;
}

/// Collaborators shared by every plugin instance
#[derive(Clone)]
pub struct PluginContext {
    pub decoder: Arc<dyn BarcodeDecoder>,
    pub price_guide: Option<Arc<dyn PriceGuide>>,
}

impl PluginContext {
    pub fn new(decoder: Arc<dyn BarcodeDecoder>) -> Self {
        Self {
            decoder,
            price_guide: None,
        }
    }

    pub fn with_price_guide(mut self, guide: Arc<dyn PriceGuide>) -> Self {
        self.price_guide = Some(guide);
        self
    }

    pub(crate) fn value_for(&self, item_type: &str, identity: &str) -> Option<f64> {
        self.price_guide
            .as_ref()
            .and_then(|guide| guide.value_for(item_type, identity))
    }

    /// First barcode found across `images`, in order
    pub(crate) fn first_barcode(&self, images: &[ImageRef]) -> Result<Option<String>, PluginError> {
        for image in images {
            if let Some(code) = self.decoder.decode(image)? {
                return Ok(Some(code));
            }
        }
        Ok(None)
    }
}

impl Default for PluginContext {
    fn default() -> Self {
        Self::new(Arc::new(NoBarcodes))
    }
}

/// Labels of a listing's photos, for payloads
pub(crate) fn image_labels(listing: &Listing) -> Vec<String> {
    listing.images.iter().map(ImageRef::label).collect()
}
