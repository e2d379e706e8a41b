//! Integration tests for a full intake run.
//!
//! These tests drive the pipeline over real files:
//! - Blank-frame skipping and grouping in file-name order
//! - Identification through the barcode manifest and price guide
//! - Duplicate rejection across runs
//! - Order persistence between runs
//! - Boxing hand-entered barcodes into a stored order

use assert_fs::prelude::*;
use image::{ImageBuffer, Rgb};
use predicates::prelude::*;
use slab_intake::core::barcode::{JsonPriceGuide, ManifestDecoder};
use slab_intake::core::inventory::{ItemContainer, OrderSummary, ValueOrder};
use slab_intake::core::pipeline::{box_barcodes, IntakePipeline};
use slab_intake::core::plugin::{PluginContext, PluginRegistry};
use slab_intake::core::store::{load_json, JsonFileStore};
use slab_intake::error::{ErrorKind, IntakeError, StoreError};
use std::sync::Arc;

/// Empty tray, or tray with a slab filling most of the frame
fn write_frame(dir: &assert_fs::TempDir, name: &str, with_slab: bool) {
    let img = ImageBuffer::from_fn(48, 48, |x, y| {
        if with_slab && (2..46).contains(&x) && (2..46).contains(&y) {
            Rgb([30u8, 30, 60])
        } else {
            Rgb([235u8, 235, 235])
        }
    });
    img.save(dir.child(name).path()).unwrap();
}

/// Blank reference, then two slabs of two photos each with a blank between
fn write_batch(dir: &assert_fs::TempDir) {
    write_frame(dir, "IMG_000.png", false);
    write_frame(dir, "IMG_001.png", true);
    write_frame(dir, "IMG_002.png", true);
    write_frame(dir, "IMG_003.png", false);
    write_frame(dir, "IMG_004.png", true);
    write_frame(dir, "IMG_005.png", true);
    dir.child("barcodes.json")
        .write_str(r#"{"IMG_001.png": "1111222233334444", "IMG_002.png": null, "IMG_004.png": "4455667-001"}"#)
        .unwrap();
}

fn context(dir: &assert_fs::TempDir) -> PluginContext {
    let decoder = ManifestDecoder::load(dir.child("barcodes.json").path()).unwrap();
    let guide = JsonPriceGuide::from_entries([("1111222233334444", 250.0), ("4455667-001", 75.5)]);
    PluginContext::new(Arc::new(decoder)).with_price_guide(Arc::new(guide))
}

fn pipeline(dir: &assert_fs::TempDir) -> IntakePipeline {
    IntakePipeline::builder()
        .directory(dir.path())
        .group_size(2)
        .first_is_blank(true)
        .item_type("coin")
        .context(context(dir))
        .build()
        .unwrap()
}

#[test]
fn intake_groups_identifies_and_boxes_a_batch() {
    let batch = assert_fs::TempDir::new().unwrap();
    write_batch(&batch);

    let mut order = ValueOrder::new(1000.0);
    let result = pipeline(&batch)
        .run(&mut order, ItemContainer::new("BOX-1"))
        .unwrap();

    assert_eq!(result.total_images, 6);
    assert_eq!(result.skipped.len(), 1);
    assert_eq!(result.skipped[0].label(), "IMG_003.png");

    let skus: Vec<&str> = result
        .listings
        .iter()
        .map(|l| l.payload["sku"].as_str().unwrap())
        .collect();
    assert_eq!(skus, vec!["1111222233334444", "4455667-001"]);
    assert_eq!(result.listings[0].payload["title"], "PCGS graded coin 1111222233334444");
    assert_eq!(result.listings[1].payload["title"], "NGC graded coin 4455667-001");

    assert_eq!(result.container.id, "BOX-1");
    assert_eq!(result.container.total_value, 325.5);
    assert_eq!(order.remaining_value(), 674.5);
}

#[test]
fn second_run_over_same_batch_rejects_everything() {
    let batch = assert_fs::TempDir::new().unwrap();
    write_batch(&batch);
    let pipeline = pipeline(&batch);

    let mut order = ValueOrder::new(1000.0);
    pipeline.run(&mut order, ItemContainer::new("BOX-1")).unwrap();
    let second = pipeline.run(&mut order, ItemContainer::new("BOX-2")).unwrap();

    assert!(second.listings.is_empty());
    assert_eq!(second.duplicates.len(), 2);
    assert_eq!(second.container.total_value, 0.0);
    assert_eq!(order.containers().len(), 2);
    assert_eq!(order.remaining_value(), 674.5);
}

#[test]
fn corrupt_photo_aborts_the_run() {
    let batch = assert_fs::TempDir::new().unwrap();
    write_batch(&batch);
    batch.child("IMG_006.png").write_binary(b"not a png").unwrap();

    let mut order = ValueOrder::new(1000.0);
    let result = pipeline(&batch).run(&mut order, ItemContainer::new("BOX-1"));

    assert!(matches!(result, Err(IntakeError::Group(_))));
    assert!(order.containers().is_empty());
}

#[test]
fn order_survives_between_runs_as_summary() {
    let batch = assert_fs::TempDir::new().unwrap();
    let storage = assert_fs::TempDir::new().unwrap();
    write_batch(&batch);
    let store = JsonFileStore::new(storage.child("logs").path());

    let missing = ValueOrder::load_summary(&store, "order.json");
    assert!(matches!(missing, Err(StoreError::NotFound { .. })));

    let mut order = ValueOrder::new(1000.0);
    pipeline(&batch)
        .run(&mut order, ItemContainer::new("BOX-1"))
        .unwrap();
    order.persist(&store, "order.json").unwrap();

    storage
        .child("logs/order.json")
        .assert(predicate::path::is_file())
        .assert(predicate::str::contains("BOX-1"))
        .assert(predicate::str::contains("674.5"));

    let mut reloaded = ValueOrder::load_summary(&store, "order.json").unwrap();
    assert_eq!(reloaded.remaining_value(), 674.5);
    assert!(reloaded.containers().is_empty());

    let mut next = ItemContainer::new("BOX-2");
    next.add_item(slab_intake::core::inventory::Item::new("9999").with_value(100.0));
    reloaded.add_box(next);
    reloaded.persist(&store, "order.json").unwrap();

    let summary: OrderSummary = load_json(&store, "order.json").unwrap();
    assert_eq!(summary.container_ids, vec!["BOX-1".to_string(), "BOX-2".to_string()]);
    assert_eq!(summary.remaining_value, 574.5);
    assert!(summary.saved_at.is_some());
}

#[test]
fn typed_barcodes_box_into_stored_order() {
    let storage = assert_fs::TempDir::new().unwrap();
    let store = JsonFileStore::new(storage.child("logs").path());

    let (mut order, _) = ValueOrder::create(&store, "order.json", 1000.0, false).unwrap();
    let again = ValueOrder::create(&store, "order.json", 10.0, false);
    assert!(matches!(again, Err(StoreError::AlreadyExists { .. })));

    let guide = JsonPriceGuide::from_entries([("1111222233334444", 250.0), ("4455667-001", 75.5)]);
    let context = PluginContext::default().with_price_guide(Arc::new(guide));
    let scanner = PluginRegistry::with_builtin().scanner("coin", &context).unwrap();
    let barcodes = vec!["1111222233334444".to_string(), "4455667-001".to_string()];

    let result = box_barcodes(&mut order, ItemContainer::new("testbox"), &barcodes, scanner.as_ref()).unwrap();
    assert_eq!(result.container.total_value, 325.5);
    assert_eq!(result.remaining_value, 674.5);
    order.persist(&store, "order.json").unwrap();

    let mut reloaded = ValueOrder::load_summary(&store, "order.json").unwrap();
    assert_eq!(
        reloaded.to_string(),
        "Order with 1 boxes, target value: $1000.00, remaining value: $674.50"
    );

    let empty = box_barcodes(&mut reloaded, ItemContainer::new("b2"), &[], scanner.as_ref()).unwrap_err();
    assert_eq!(empty.kind(), ErrorKind::InvalidArgument);
    assert_eq!(empty.kind().exit_code(), 2);
    assert_eq!(reloaded.box_count(), 1);
}
