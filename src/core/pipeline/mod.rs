//! # Pipeline Module
//!
//! Orchestrates one intake run over a capture directory.
//!
//! ## Pipeline Stages
//! 1. **List** - Collect the batch's photos in file-name order
//! 2. **Group** - Drop blank frames and cut the rest into per-item groups
//! 3. **Identify** - Ask the item type's scanner what each group shows
//! 4. **Account** - Box the new items and charge the box against the order
//!
//! ## Parallelism
//! Grouping decodes and compares frames on the rayon pool; identification
//! and accounting run sequentially so box contents follow capture order.
//!
//! [`box_barcodes`] runs only the accounting stage, for codes typed in by hand.

mod executor;
mod manual;

pub use executor::{
    IntakePipeline, IntakePipelineBuilder, IntakeResult, ListedItem, PipelineConfig, UnidentifiedGroup,
};
pub use manual::{box_barcodes, BarcodeBoxResult};
