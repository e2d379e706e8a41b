//! Generic barcoded stock: the code is the identity, nothing else is known.

use super::{image_labels, ItemScanner, ListingBuilder, PluginContext};
use crate::core::image::ImageRef;
use crate::core::inventory::{Item, Listing};
use crate::error::PluginError;
use serde_json::{json, Value};

pub struct BarcodeItemScanner {
    ctx: PluginContext,
}

impl BarcodeItemScanner {
    pub const TYPE_NAME: &'static str = "barcode";

    pub fn new(ctx: PluginContext) -> Self {
        Self { ctx }
    }
}

impl ItemScanner for BarcodeItemScanner {
    fn scan(&self, images: &[ImageRef]) -> Result<Option<Item>, PluginError> {
        Ok(self
            .ctx
            .first_barcode(images)?
            .map(|code| self.item_from_code(&code)))
    }

    fn item_from_code(&self, code: &str) -> Item {
        Item::new(code).with_type(Self::TYPE_NAME)
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct BarcodeListingBuilder;

impl ListingBuilder for BarcodeListingBuilder {
    fn build_listing(&self, listing: &Listing) -> Result<Value, PluginError> {
        let item = listing.item.as_ref().ok_or(PluginError::MissingItem)?;
        Ok(json!({
            "type": BarcodeItemScanner::TYPE_NAME,
            "sku": item.identity(),
            "title": item.identity(),
            "price": listing.asking_price(),
            "price_paid": listing.price_paid,
            "images": image_labels(listing),
        }))
    }
}
