//! Pipeline execution implementation.

use crate::core::grouper::{GroupingConfig, ImageGrouper};
use crate::core::image::ImageRef;
use crate::core::inventory::{ContainerReport, ItemContainer, Listing, ValueOrder};
use crate::core::plugin::{ItemScanner, ListingBuilder, PluginContext, PluginRegistry};
use crate::core::scanner::{list_images, ScanConfig};
use crate::core::similarity::{BoundingBoxComparator, DEFAULT_THRESHOLD};
use crate::error::IntakeError;
use crate::events::{
    null_sender, Event, EventSender, IntakeEvent, PipelineEvent, PipelinePhase, PipelineSummary,
};
use serde::Serialize;
use serde_json::Value;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;

/// A group that became a boxed item
#[derive(Debug, Clone, Serialize)]
pub struct ListedItem {
    pub group_index: usize,
    pub listing: Listing,
    /// Marketplace payload from the item type's listing builder
    pub payload: Value,
}

/// A group no scanner could identify
#[derive(Debug, Clone, Serialize)]
pub struct UnidentifiedGroup {
    pub group_index: usize,
    pub images: Vec<ImageRef>,
}

/// Result of pipeline execution
#[derive(Debug, Clone, Serialize)]
pub struct IntakeResult {
    /// Newly boxed items, in capture order
    pub listings: Vec<ListedItem>,
    pub unidentified: Vec<UnidentifiedGroup>,
    /// Identities rejected because the box or the order already held them
    pub duplicates: Vec<String>,
    /// Frames dropped as blank
    pub skipped: Vec<ImageRef>,
    /// The box as it was handed to the order
    pub container: ContainerReport,
    pub remaining_value: f64,
    pub total_images: usize,
    /// Duration in milliseconds
    pub duration_ms: u64,
}

/// Configuration for the pipeline
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    /// Capture directory
    pub directory: PathBuf,
    pub scan_config: ScanConfig,
    pub grouping: GroupingConfig,
    /// Blank-frame similarity threshold
    pub threshold: f64,
    /// Registered plugin type used to identify and list items
    pub item_type: String,
    /// Applied to every listing of the run
    pub price_paid: Option<f64>,
    pub listing_price: Option<f64>,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            directory: PathBuf::from("."),
            scan_config: ScanConfig::default(),
            grouping: GroupingConfig::default(),
            threshold: DEFAULT_THRESHOLD,
            item_type: "coin".to_string(),
            price_paid: None,
            listing_price: None,
        }
    }
}

/// Builder for pipeline configuration
pub struct IntakePipelineBuilder {
    config: PipelineConfig,
    registry: Option<Arc<PluginRegistry>>,
    context: PluginContext,
}

impl IntakePipelineBuilder {
    pub fn new() -> Self {
        Self {
            config: PipelineConfig::default(),
            registry: None,
            context: PluginContext::default(),
        }
    }

    /// Directory holding the batch's photos
    pub fn directory(mut self, directory: impl Into<PathBuf>) -> Self {
        self.config.directory = directory.into();
        self
    }

    pub fn scan_config(mut self, config: ScanConfig) -> Self {
        self.config.scan_config = config;
        self
    }

    pub fn grouping(mut self, grouping: GroupingConfig) -> Self {
        self.config.grouping = grouping;
        self
    }

    /// Photos per item
    pub fn group_size(mut self, group_size: usize) -> Self {
        self.config.grouping.group_size = group_size;
        self
    }

    /// Treat the first photo as the blank reference
    pub fn first_is_blank(mut self, first_is_blank: bool) -> Self {
        self.config.grouping.first_is_blank = first_is_blank;
        self
    }

    pub fn threshold(mut self, threshold: f64) -> Self {
        self.config.threshold = threshold;
        self
    }

    pub fn item_type(mut self, item_type: impl Into<String>) -> Self {
        self.config.item_type = item_type.into();
        self
    }

    pub fn prices(mut self, price_paid: Option<f64>, listing_price: Option<f64>) -> Self {
        self.config.price_paid = price_paid;
        self.config.listing_price = listing_price;
        self
    }

    /// Plugin registry; the built-in types are used when none is given
    pub fn registry(mut self, registry: Arc<PluginRegistry>) -> Self {
        self.registry = Some(registry);
        self
    }

    /// Barcode decoder and price guide handed to the plugins
    pub fn context(mut self, context: PluginContext) -> Self {
        self.context = context;
        self
    }

    /// Build the pipeline.
    ///
    /// Fails on an invalid threshold or an item type without a scanner or
    /// listing builder, before any photo is read.
    pub fn build(self) -> Result<IntakePipeline, IntakeError> {
        let registry = self
            .registry
            .unwrap_or_else(|| Arc::new(PluginRegistry::with_builtin()));
        let comparator = BoundingBoxComparator::new(self.config.threshold)?;
        let scanner = registry.scanner(&self.config.item_type, &self.context)?;
        let builder = registry.listing_builder(&self.config.item_type, &self.context)?;

        Ok(IntakePipeline {
            grouper: ImageGrouper::with_comparator(self.config.grouping, Box::new(comparator)),
            config: self.config,
            scanner,
            builder,
        })
    }
}

impl Default for IntakePipelineBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// The intake pipeline
pub struct IntakePipeline {
    config: PipelineConfig,
    grouper: ImageGrouper,
    scanner: Box<dyn ItemScanner>,
    builder: Box<dyn ListingBuilder>,
}

impl IntakePipeline {
    pub fn builder() -> IntakePipelineBuilder {
        IntakePipelineBuilder::new()
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Run the pipeline without events
    pub fn run(&self, order: &mut ValueOrder, container: ItemContainer) -> Result<IntakeResult, IntakeError> {
        self.run_with_events(order, container, &null_sender())
    }

    /// Run the pipeline with event reporting.
    ///
    /// Identified items go into `container` unless the container or `order`
    /// already holds the same identity; the container is then added to
    /// `order`, even when nothing new went in. A listing, grouping or decode
    /// failure aborts the run and leaves `order` untouched.
    pub fn run_with_events(
        &self,
        order: &mut ValueOrder,
        container: ItemContainer,
        events: &EventSender,
    ) -> Result<IntakeResult, IntakeError> {
        let result = self.execute(order, container, events);
        if let Err(e) = &result {
            events.send(Event::Pipeline(PipelineEvent::Error {
                message: e.to_string(),
            }));
        }
        result
    }

    fn execute(
        &self,
        order: &mut ValueOrder,
        mut container: ItemContainer,
        events: &EventSender,
    ) -> Result<IntakeResult, IntakeError> {
        let start_time = Instant::now();
        events.send(Event::Pipeline(PipelineEvent::Started));

        // Phase 1: Listing
        events.send(Event::Pipeline(PipelineEvent::PhaseChanged {
            phase: PipelinePhase::Listing,
        }));
        let images: Vec<ImageRef> = list_images(&self.config.directory, &self.config.scan_config)?
            .into_iter()
            .map(ImageRef::from)
            .collect();
        let total_images = images.len();
        tracing::info!(
            directory = %self.config.directory.display(),
            images = total_images,
            "starting intake"
        );

        // Phase 2: Grouping
        events.send(Event::Pipeline(PipelineEvent::PhaseChanged {
            phase: PipelinePhase::Grouping,
        }));
        let outcome = self.grouper.group_with_events(&images, events)?;

        // Phase 3: Identifying
        events.send(Event::Pipeline(PipelineEvent::PhaseChanged {
            phase: PipelinePhase::Identifying,
        }));
        let mut listings = Vec::new();
        let mut unidentified = Vec::new();
        let mut duplicates = Vec::new();

        for group in outcome.groups {
            let listing = Listing::from_images(group.images, self.scanner.as_ref())?
                .with_prices(self.config.price_paid, self.config.listing_price);

            let Some(item) = listing.item.clone() else {
                tracing::debug!(group = group.index, "no item identified");
                events.send(Event::Intake(IntakeEvent::Unidentified {
                    group_index: group.index,
                }));
                unidentified.push(UnidentifiedGroup {
                    group_index: group.index,
                    images: listing.images,
                });
                continue;
            };

            if order.is_duplicate(&item) || container.contains(&item) {
                tracing::info!(group = group.index, identity = %item, "duplicate item rejected");
                events.send(Event::Intake(IntakeEvent::DuplicateRejected {
                    group_index: group.index,
                    identity: item.identity().to_string(),
                }));
                duplicates.push(item.identity().to_string());
                continue;
            }

            let payload = self.builder.build_listing(&listing)?;
            events.send(Event::Intake(IntakeEvent::Identified {
                group_index: group.index,
                identity: item.identity().to_string(),
            }));
            container.add_item(item);
            listings.push(ListedItem {
                group_index: group.index,
                listing,
                payload,
            });
        }

        // Phase 4: Accounting
        events.send(Event::Pipeline(PipelineEvent::PhaseChanged {
            phase: PipelinePhase::Accounting,
        }));
        let report = container.report();
        order.add_box(container);
        let remaining_value = order.remaining_value();

        events.send(Event::Intake(IntakeEvent::BoxAdded {
            box_id: report.id.clone(),
            items: report.items.len(),
            total_value: report.total_value,
            remaining_value,
        }));

        let duration_ms = start_time.elapsed().as_millis() as u64;
        tracing::info!(
            box_id = %report.id,
            items = report.items.len(),
            box_value = report.total_value,
            remaining = remaining_value,
            duration_ms,
            "intake complete"
        );

        events.send(Event::Pipeline(PipelineEvent::Completed {
            summary: PipelineSummary {
                total_images,
                listings: listings.len() + unidentified.len() + duplicates.len(),
                identified: listings.len() + duplicates.len(),
                duplicates: duplicates.len(),
                box_value: report.total_value,
                remaining_value,
                duration_ms,
            },
        }));

        Ok(IntakeResult {
            listings,
            unidentified,
            duplicates,
            skipped: outcome.skipped,
            container: report,
            remaining_value,
            total_images,
            duration_ms,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::barcode::{JsonPriceGuide, ManifestDecoder};
    use crate::core::inventory::Item;
    use crate::error::PluginError;
    use crate::events::EventChannel;
    use image::{ImageBuffer, Rgb};
    use tempfile::TempDir;

    /// Solid frame with an optional dark square marking the item
    fn write_frame(dir: &TempDir, name: &str, with_item: bool) {
        let img = ImageBuffer::from_fn(40, 40, |x, y| {
            if with_item && (2..38).contains(&x) && (2..38).contains(&y) {
                Rgb([20u8, 20, 20])
            } else {
                Rgb([240u8, 240, 240])
            }
        });
        img.save(dir.path().join(name)).unwrap();
    }

    fn coin_context(codes: &[(&str, &str)], prices: &[(&str, f64)]) -> PluginContext {
        let decoder = ManifestDecoder::from_entries(codes.iter().copied());
        let guide = JsonPriceGuide::from_entries(prices.iter().copied());
        PluginContext::new(Arc::new(decoder)).with_price_guide(Arc::new(guide))
    }

    #[test]
    fn builder_rejects_unknown_item_type() {
        let result = IntakePipeline::builder().item_type("stamp").build();
        assert!(matches!(
            result,
            Err(IntakeError::Plugin(PluginError::UnknownScanner { .. }))
        ));
    }

    #[test]
    fn builder_rejects_bad_threshold() {
        let result = IntakePipeline::builder().threshold(1.5).build();
        assert!(matches!(result, Err(IntakeError::Compare(_))));
    }

    #[test]
    fn missing_directory_aborts_without_touching_order() {
        let pipeline = IntakePipeline::builder()
            .directory("/definitely/not/here")
            .build()
            .unwrap();
        let mut order = ValueOrder::new(100.0);

        let result = pipeline.run(&mut order, ItemContainer::new("B1"));

        assert!(result.is_err());
        assert!(order.containers().is_empty());
        assert_eq!(order.remaining_value(), 100.0);
    }

    #[test]
    fn empty_directory_adds_empty_box() {
        let dir = TempDir::new().unwrap();
        let pipeline = IntakePipeline::builder().directory(dir.path()).build().unwrap();
        let mut order = ValueOrder::new(50.0);

        let result = pipeline.run(&mut order, ItemContainer::new("B1")).unwrap();

        assert_eq!(result.total_images, 0);
        assert!(result.listings.is_empty());
        assert_eq!(result.container.total_value, 0.0);
        assert_eq!(order.containers().len(), 1);
        assert_eq!(order.remaining_value(), 50.0);
    }

    #[test]
    fn boxes_identified_coins_and_charges_order() {
        let dir = TempDir::new().unwrap();
        write_frame(&dir, "00_blank.png", false);
        write_frame(&dir, "01_front.png", true);
        write_frame(&dir, "02_back.png", true);
        write_frame(&dir, "03_blank.png", false);
        write_frame(&dir, "04_front.png", true);
        write_frame(&dir, "05_back.png", true);

        let ctx = coin_context(
            &[("01_front.png", "1111222233334444"), ("04_front.png", "4455667-001")],
            &[("1111222233334444", 100.0), ("4455667-001", 40.0)],
        );
        let pipeline = IntakePipeline::builder()
            .directory(dir.path())
            .group_size(2)
            .first_is_blank(true)
            .context(ctx)
            .prices(Some(10.0), None)
            .build()
            .unwrap();
        let mut order = ValueOrder::new(500.0);

        let result = pipeline.run(&mut order, ItemContainer::new("B1")).unwrap();

        assert_eq!(result.total_images, 6);
        assert_eq!(result.skipped.len(), 1);
        assert_eq!(result.listings.len(), 2);
        assert_eq!(result.listings[0].payload["sku"], "1111222233334444");
        assert_eq!(result.listings[1].payload["price_paid"], 10.0);
        assert_eq!(result.container.total_value, 140.0);
        assert_eq!(result.remaining_value, 360.0);
        assert_eq!(order.remaining_value(), 360.0);
    }

    #[test]
    fn rejects_items_already_in_order_or_box() {
        let dir = TempDir::new().unwrap();
        for name in ["a.png", "b.png", "c.png"] {
            write_frame(&dir, name, true);
        }

        let ctx = coin_context(
            &[("a.png", "AAA"), ("b.png", "AAA"), ("c.png", "CCC")],
            &[("AAA", 5.0), ("CCC", 7.0)],
        );
        let pipeline = IntakePipeline::builder()
            .directory(dir.path())
            .group_size(1)
            .context(ctx)
            .build()
            .unwrap();

        let mut order = ValueOrder::new(100.0);
        let mut earlier = ItemContainer::new("B0");
        earlier.add_item(Item::new("CCC").with_value(7.0));
        order.add_box(earlier);

        let result = pipeline.run(&mut order, ItemContainer::new("B1")).unwrap();

        assert_eq!(result.duplicates, vec!["AAA".to_string(), "CCC".to_string()]);
        assert_eq!(result.container.items.len(), 1);
        assert_eq!(order.remaining_value(), 88.0);
    }

    #[test]
    fn unidentified_groups_are_reported() {
        let dir = TempDir::new().unwrap();
        write_frame(&dir, "a.png", true);
        write_frame(&dir, "b.png", true);

        let pipeline = IntakePipeline::builder()
            .directory(dir.path())
            .group_size(1)
            .item_type("barcode")
            .build()
            .unwrap();
        let mut order = ValueOrder::new(10.0);

        let result = pipeline.run(&mut order, ItemContainer::new("B1")).unwrap();

        assert_eq!(result.unidentified.len(), 2);
        assert_eq!(result.unidentified[1].group_index, 1);
        assert!(result.container.items.is_empty());
    }

    #[test]
    fn emits_phase_and_box_events() {
        let dir = TempDir::new().unwrap();
        write_frame(&dir, "a.png", true);

        let ctx = coin_context(&[("a.png", "AAA")], &[]);
        let pipeline = IntakePipeline::builder()
            .directory(dir.path())
            .group_size(1)
            .context(ctx)
            .build()
            .unwrap();
        let (sender, receiver) = EventChannel::new();
        let mut order = ValueOrder::new(10.0);

        pipeline
            .run_with_events(&mut order, ItemContainer::new("B1"), &sender)
            .unwrap();
        drop(sender);

        let events = receiver.drain();
        assert!(matches!(events.first(), Some(Event::Pipeline(PipelineEvent::Started))));
        assert!(events.iter().any(|e| matches!(
            e,
            Event::Intake(IntakeEvent::BoxAdded { items: 1, .. })
        )));
        assert!(matches!(
            events.last(),
            Some(Event::Pipeline(PipelineEvent::Completed { .. }))
        ));
    }
}
