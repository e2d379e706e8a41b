//! Boxing items from barcodes entered by hand, with no photos involved.

use crate::core::inventory::{ContainerReport, ItemContainer, ValueOrder};
use crate::core::plugin::ItemScanner;
use crate::error::IntakeError;
use serde::Serialize;

/// Outcome of boxing a list of barcodes
#[derive(Debug, Clone, Serialize)]
pub struct BarcodeBoxResult {
    /// The box as it was handed to the order
    pub container: ContainerReport,
    /// Codes rejected because the box or the order already held them
    pub duplicates: Vec<String>,
    pub target_value: f64,
    pub remaining_value: f64,
}

/// Turn `barcodes` into items with `scanner`, box them and add the box to `order`.
///
/// Blank codes are ignored; a list with nothing else fails with
/// `InvalidArgument` and leaves `order` untouched. Codes already in the order
/// or repeated within the list are reported as duplicates, not errors.
pub fn box_barcodes(
    order: &mut ValueOrder,
    mut container: ItemContainer,
    barcodes: &[String],
    scanner: &dyn ItemScanner,
) -> Result<BarcodeBoxResult, IntakeError> {
    let codes: Vec<&str> = barcodes
        .iter()
        .map(|code| code.trim())
        .filter(|code| !code.is_empty())
        .collect();
    if codes.is_empty() {
        return Err(IntakeError::InvalidArgument("no barcodes provided".to_string()));
    }

    let mut duplicates = Vec::new();
    for code in codes {
        let item = scanner.item_from_code(code);
        if order.is_duplicate(&item) || !container.add_item(item) {
            tracing::info!(code, box_id = container.id(), "duplicate barcode rejected");
            duplicates.push(code.to_string());
        }
    }

    let report = container.report();
    order.add_box(container);
    tracing::info!(
        box_id = %report.id,
        items = report.items.len(),
        box_value = report.total_value,
        remaining = order.remaining_value(),
        "barcode box added"
    );

    Ok(BarcodeBoxResult {
        container: report,
        duplicates,
        target_value: order.target_value(),
        remaining_value: order.remaining_value(),
    })
}
