//! # Slab Intake
//!
//! Inventory intake for graded collectibles.
//!
//! ## Workflow
//! - Photos of each item are shot in sequence, optionally after an empty-tray
//!   reference frame
//! - Frames that look like the empty tray are dropped, the rest are cut into
//!   fixed-size groups, one group per item
//! - An item-type plugin identifies each group and builds its listing
//! - Items go into a box, duplicates rejected; boxes are charged against an
//!   order's target value
//!
//! ## Architecture
//! - `core` - The intake engine
//! - `config` - File-backed settings
//! - `events` - Event-driven progress reporting
//! - `error` - Error types

pub mod config;
pub mod core;
pub mod error;
pub mod events;

// Re-export commonly used types at the crate root
pub use config::IntakeConfig;
pub use error::{ErrorKind, IntakeError, Result};

/// Initialize tracing for the library
///
/// This should be called by the application entry point. Later calls are
/// ignored.
pub fn init_tracing() {
    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .finish();
    let _ = tracing::subscriber::set_global_default(subscriber);
}
