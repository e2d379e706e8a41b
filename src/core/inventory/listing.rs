//! Listings: an identified item with its photos and prices.

use super::Item;
use crate::core::image::ImageRef;
use crate::core::plugin::ItemScanner;
use crate::error::PluginError;
use serde::Serialize;

/// One item as it will be offered for sale
#[derive(Debug, Clone, Serialize)]
pub struct Listing {
    /// The identified item; `None` when no scanner recognised the photos
    pub item: Option<Item>,
    pub price_paid: Option<f64>,
    pub listing_price: Option<f64>,
    pub images: Vec<ImageRef>,
}

impl Listing {
    /// Listing for a known item
    pub fn new(item: Item, images: Vec<ImageRef>) -> Self {
        Self {
            item: Some(item),
            price_paid: None,
            listing_price: None,
            images,
        }
    }

    /// Identify the item in `images` with `scanner`
    pub fn from_images(images: Vec<ImageRef>, scanner: &dyn ItemScanner) -> Result<Self, PluginError> {
        let item = if images.is_empty() {
            None
        } else {
            scanner.scan(&images)?
        };
        Ok(Self {
            item,
            price_paid: None,
            listing_price: None,
            images,
        })
    }

    pub fn with_prices(mut self, price_paid: Option<f64>, listing_price: Option<f64>) -> Self {
        self.price_paid = price_paid;
        self.listing_price = listing_price;
        self
    }

    pub fn is_identified(&self) -> bool {
        self.item.is_some()
    }

    /// Asking price: the explicit listing price, else the item's guide value
    pub fn asking_price(&self) -> Option<f64> {
        self.listing_price
            .or_else(|| self.item.as_ref().and_then(Item::value))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{DynamicImage, ImageBuffer, Rgb};
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Recognises the image labelled "barcode" and counts calls
    struct LabelScanner {
        calls: AtomicUsize,
    }

    impl ItemScanner for LabelScanner {
        fn scan(&self, images: &[ImageRef]) -> Result<Option<Item>, PluginError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(images
                .iter()
                .find(|image| image.label() == "barcode")
                .map(|_| Item::new("123456").with_attribute("name", "Test Coin")))
        }
    }

    fn image(label: &str) -> ImageRef {
        ImageRef::decoded(label, DynamicImage::ImageRgb8(ImageBuffer::from_pixel(2, 2, Rgb([1, 2, 3]))))
    }

    #[test]
    fn identifies_item_from_group() {
        let scanner = LabelScanner {
            calls: AtomicUsize::new(0),
        };
        let listing = Listing::from_images(vec![image("front"), image("barcode"), image("back")], &scanner)
            .unwrap()
            .with_prices(Some(50.0), Some(100.0));

        assert!(listing.is_identified());
        assert_eq!(listing.item.as_ref().unwrap().identity(), "123456");
        assert_eq!(listing.price_paid, Some(50.0));
        assert_eq!(listing.asking_price(), Some(100.0));
        assert_eq!(listing.images.len(), 3);
    }

    #[test]
    fn unrecognised_group_has_no_item() {
        let scanner = LabelScanner {
            calls: AtomicUsize::new(0),
        };
        let listing = Listing::from_images(vec![image("front")], &scanner).unwrap();
        assert!(!listing.is_identified());
        assert_eq!(listing.asking_price(), None);
    }

    #[test]
    fn empty_group_skips_the_scanner() {
        let scanner = LabelScanner {
            calls: AtomicUsize::new(0),
        };
        let listing = Listing::from_images(Vec::new(), &scanner).unwrap();
        assert!(!listing.is_identified());
        assert_eq!(scanner.calls.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn asking_price_falls_back_to_guide_value() {
        let listing = Listing::new(Item::new("1").with_value(42.0), Vec::new());
        assert_eq!(listing.asking_price(), Some(42.0));
    }
}
