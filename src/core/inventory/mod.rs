//! # Inventory Module
//!
//! The value-accounting side of intake.
//!
//! - `Item` - one scanned physical object, identified by a string
//! - `ItemContainer` - a box: ordered items, no duplicates, derived total
//! - `ValueOrder` - boxes aggregated against a target value
//! - `Listing` - an item together with its photos and prices
//!
//! Two items are duplicates when their identity strings are equal. Rejecting
//! a duplicate is a normal outcome reported through a `bool`, never an error.

mod container;
mod item;
mod listing;
mod order;

pub use container::{ContainerReport, ItemContainer};
pub use item::Item;
pub use listing::Listing;
pub use order::{OrderSummary, ValueOrder};
