//! Graded coins identified by their certification barcode.

use super::{image_labels, ItemScanner, ListingBuilder, PluginContext};
use crate::core::image::ImageRef;
use crate::core::inventory::{Item, Listing};
use crate::error::PluginError;
use serde::Serialize;
use serde_json::{json, Value};
use std::fmt;

/// Service that graded and encapsulated a coin
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum GradingService {
    Pcgs,
    Ngc,
}

impl GradingService {
    /// PCGS certification barcodes are 16 characters long; anything else is NGC
    pub fn from_barcode(barcode: &str) -> Self {
        if barcode.chars().count() == 16 {
            GradingService::Pcgs
        } else {
            GradingService::Ngc
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            GradingService::Pcgs => "PCGS",
            GradingService::Ngc => "NGC",
        }
    }
}

impl fmt::Display for GradingService {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Identifies a coin from the first barcode found in its photos
pub struct CoinScanner {
    ctx: PluginContext,
}

impl CoinScanner {
    pub const TYPE_NAME: &'static str = "coin";

    pub fn new(ctx: PluginContext) -> Self {
        Self { ctx }
    }
}

impl ItemScanner for CoinScanner {
    fn scan(&self, images: &[ImageRef]) -> Result<Option<Item>, PluginError> {
        Ok(self
            .ctx
            .first_barcode(images)?
            .map(|barcode| self.item_from_code(&barcode)))
    }

    fn item_from_code(&self, code: &str) -> Item {
        let service = GradingService::from_barcode(code);
        let item = Item::new(code)
            .with_type(Self::TYPE_NAME)
            .with_attribute("grading_service", service.as_str())
            .with_attribute("barcode", code);

        match self.ctx.value_for(Self::TYPE_NAME, code) {
            Some(value) => item.with_value(value),
            None => item,
        }
    }
}

/// Marketplace payload for a graded coin
#[derive(Debug, Clone, Copy, Default)]
pub struct CoinListingBuilder;

impl ListingBuilder for CoinListingBuilder {
    fn build_listing(&self, listing: &Listing) -> Result<Value, PluginError> {
        let item = listing.item.as_ref().ok_or(PluginError::MissingItem)?;

        let title = match item.attribute("grading_service").and_then(Value::as_str) {
            Some(service) => format!("{service} graded coin {}", item.identity()),
            None => format!("Graded coin {}", item.identity()),
        };

        Ok(json!({
            "type": CoinScanner::TYPE_NAME,
            "sku": item.identity(),
            "title": title,
            "price": listing.asking_price(),
            "price_paid": listing.price_paid,
            "images": image_labels(listing),
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::barcode::{JsonPriceGuide, ManifestDecoder};
    use std::sync::Arc;

    fn context() -> PluginContext {
        let decoder = ManifestDecoder::from_entries([
            ("front.jpg", "1111222233334444"),
            ("ngc.jpg", "4455667-001"),
        ]);
        let guide = JsonPriceGuide::from_entries([("1111222233334444", 100.0)]);
        PluginContext::new(Arc::new(decoder)).with_price_guide(Arc::new(guide))
    }

    fn images(names: &[&str]) -> Vec<ImageRef> {
        names.iter().map(|n| ImageRef::from_path(*n)).collect()
    }

    #[test]
    fn grading_service_follows_barcode_length() {
        assert_eq!(GradingService::from_barcode("1111222233334444"), GradingService::Pcgs);
        assert_eq!(GradingService::from_barcode("4455667-001"), GradingService::Ngc);
        assert_eq!(GradingService::Pcgs.to_string(), "PCGS");
    }

    #[test]
    fn scanner_uses_first_readable_barcode() {
        let scanner = CoinScanner::new(context());
        let item = scanner.scan(&images(&["back.jpg", "front.jpg", "ngc.jpg"])).unwrap().unwrap();

        assert_eq!(item.identity(), "1111222233334444");
        assert_eq!(item.item_type(), "coin");
        assert_eq!(item.value(), Some(100.0));
        assert_eq!(item.attribute("grading_service").unwrap(), "PCGS");
    }

    #[test]
    fn unknown_price_leaves_value_empty() {
        let scanner = CoinScanner::new(context());
        let item = scanner.scan(&images(&["ngc.jpg"])).unwrap().unwrap();

        assert_eq!(item.value(), None);
        assert_eq!(item.attribute("grading_service").unwrap(), "NGC");
    }

    #[test]
    fn no_barcode_means_no_item() {
        let scanner = CoinScanner::new(context());
        assert!(scanner.scan(&images(&["back.jpg", "other.jpg"])).unwrap().is_none());
    }

    #[test]
    fn typed_code_is_priced_like_a_scanned_one() {
        let scanner = CoinScanner::new(context());
        let item = scanner.item_from_code("1111222233334444");

        assert_eq!(item.item_type(), "coin");
        assert_eq!(item.value(), Some(100.0));
        assert_eq!(item.attribute("barcode").unwrap(), "1111222233334444");
        assert_eq!(scanner.item_from_code("4455667-001").value(), None);
    }

    #[test]
    fn listing_payload_carries_sku_title_and_price() {
        let scanner = CoinScanner::new(context());
        let listing = Listing::from_images(images(&["front.jpg", "back.jpg"]), &scanner)
            .unwrap()
            .with_prices(Some(60.0), None);

        let payload = CoinListingBuilder.build_listing(&listing).unwrap();

        assert_eq!(payload["sku"], "1111222233334444");
        assert_eq!(payload["title"], "PCGS graded coin 1111222233334444");
        assert_eq!(payload["price"], 100.0);
        assert_eq!(payload["price_paid"], 60.0);
        assert_eq!(payload["images"], json!(["front.jpg", "back.jpg"]));
    }

    #[test]
    fn listing_without_item_is_rejected() {
        let listing = Listing {
            item: None,
            price_paid: None,
            listing_price: None,
            images: images(&["back.jpg"]),
        };
        assert!(matches!(
            CoinListingBuilder.build_listing(&listing),
            Err(PluginError::MissingItem)
        ));
    }
}
