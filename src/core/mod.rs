//! # Core Module
//!
//! The front-end-agnostic intake engine.
//!
//! ## Modules
//! - `scanner` - Lists a capture directory's photos in file-name order
//! - `image` - Image handles and fast decoding
//! - `similarity` - Decides whether a photo matches the blank tray
//! - `grouper` - Partitions photos into per-item groups
//! - `inventory` - Items, boxes, listings and value orders
//! - `barcode` - Barcode and price collaborators
//! - `plugin` - Per-item-type identification and listing payloads
//! - `store` - Key-value JSON persistence
//! - `pipeline` - Orchestrates the full workflow

pub mod barcode;
pub mod grouper;
pub mod image;
pub mod inventory;
pub mod pipeline;
pub mod plugin;
pub mod scanner;
pub mod similarity;
pub mod store;

// Re-export commonly used types
pub use grouper::{group_images, GroupingConfig, ImageGroup, ImageGrouper};
pub use image::ImageRef;
pub use inventory::{Item, ItemContainer, Listing, ValueOrder};
pub use similarity::{are_similar, SimilarityComparator};
