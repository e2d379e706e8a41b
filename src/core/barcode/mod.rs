//! # Barcode Module
//!
//! Collaborators that turn photos into identities and identities into value.
//!
//! Reading barcode symbols is not done here. Capture stations run an
//! external decoder over each batch and leave its results next to the photos
//! as a manifest; [`ManifestDecoder`] reads that manifest. Anything else that
//! can answer "what barcode is in this image" can implement
//! [`BarcodeDecoder`].
//!
//! Guide values come from a [`PriceGuide`]; [`JsonPriceGuide`] reads a
//! barcode-to-value map exported from the grading service lookup.

mod manifest;
mod price;

pub use manifest::ManifestDecoder;
pub use price::JsonPriceGuide;

use crate::core::image::ImageRef;
use crate::error::ImageError;

/// Reads at most one barcode from an image
pub trait BarcodeDecoder: Send + Sync {
    /// The decoded string, or `None` when the image carries no readable code
    fn decode(&self, image: &ImageRef) -> Result<Option<String>, ImageError>;
}

/// Looks up an item's guide value
pub trait PriceGuide: Send + Sync {
    fn value_for(&self, item_type: &str, identity: &str) -> Option<f64>;
}

/// Decoder that never finds anything
#[derive(Debug, Clone, Copy, Default)]
pub struct NoBarcodes;

impl BarcodeDecoder for NoBarcodes {
    fn decode(&self, _image: &ImageRef) -> Result<Option<String>, ImageError> {
        Ok(None)
    }
}
