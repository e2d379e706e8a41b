//! # CLI Module
//!
//! Command-line interface for the intake engine.
//!
//! ## Usage
//! ```bash
//! # Preview how a batch would be grouped
//! slab-intake group ./batch-7 --group-size 2 --first-blank
//!
//! # Compare two frames
//! slab-intake compare ./batch-7/000.jpg ./batch-7/001.jpg
//!
//! # Box a batch into the working order
//! slab-intake intake ./batch-7 --target-value 2500 --box-id B7
//!
//! # Box slabs whose barcodes were typed in
//! slab-intake order add-box --box-id B8 --barcode 1111222233334444 --barcode 4455667-001
//!
//! # JSON output
//! slab-intake order show --output json
//! ```

use clap::{Parser, Subcommand, ValueEnum};
use console::{style, Term};
use indicatif::{ProgressBar, ProgressStyle};
use serde::Serialize;
use slab_intake::config::IntakeConfig;
use slab_intake::core::barcode::{BarcodeDecoder, JsonPriceGuide, ManifestDecoder, NoBarcodes};
use slab_intake::core::grouper::{GroupingOutcome, ImageGrouper};
use slab_intake::core::image::ImageRef;
use slab_intake::core::inventory::{ItemContainer, ValueOrder};
use slab_intake::core::pipeline::{box_barcodes, BarcodeBoxResult, IntakePipeline, IntakeResult};
use slab_intake::core::plugin::{PluginContext, PluginRegistry};
use slab_intake::core::scanner::{list_images, ScanConfig};
use slab_intake::core::similarity::{BoundingBoxComparator, SimilarityComparator, SimilarityReport};
use slab_intake::core::store::JsonFileStore;
use slab_intake::error::{IntakeError, Result, StoreError};
use slab_intake::events::{Event, EventChannel, EventReceiver, GroupEvent, IntakeEvent, PipelineEvent};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::thread;

/// Slab Intake - group item photos and box them against an order
#[derive(Parser, Debug)]
#[command(name = "slab-intake")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Config file (JSON)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Directory holding persisted orders
    #[arg(long, global = true)]
    storage_root: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Group a directory of photos into per-item listings
    Group {
        /// Capture directory
        dir: PathBuf,

        #[command(flatten)]
        grouping: GroupingArgs,

        /// Output format
        #[arg(short, long, default_value = "pretty")]
        output: OutputFormat,
    },

    /// Compare two images against the blank-frame threshold
    Compare {
        a: PathBuf,
        b: PathBuf,

        /// Maximum changed-area fraction still counted as similar (0-1)
        #[arg(short, long)]
        threshold: Option<f64>,

        /// Output format
        #[arg(short, long, default_value = "pretty")]
        output: OutputFormat,
    },

    /// Identify a batch, box it and charge the box against the order
    Intake {
        /// Capture directory
        dir: PathBuf,

        #[command(flatten)]
        grouping: GroupingArgs,

        /// Item type plugin
        #[arg(long = "type")]
        item_type: Option<String>,

        /// Target value for a new order, used when none is stored yet
        #[arg(long)]
        target_value: Option<f64>,

        /// Box id (generated when omitted)
        #[arg(long)]
        box_id: Option<String>,

        /// Storage key of the order
        #[arg(long)]
        order_key: Option<String>,

        /// Price paid, recorded on every listing
        #[arg(long)]
        price_paid: Option<f64>,

        /// Asking price, overriding the guide value on every listing
        #[arg(long)]
        listing_price: Option<f64>,

        /// Output format
        #[arg(short, long, default_value = "pretty")]
        output: OutputFormat,
    },

    /// Inspect, start or add to the working order
    Order {
        #[command(subcommand)]
        action: OrderCommand,
    },

    /// List registered item types
    Types {
        /// Output format
        #[arg(short, long, default_value = "pretty")]
        output: OutputFormat,
    },
}

#[derive(Subcommand, Debug)]
enum OrderCommand {
    /// Show the stored order summary
    Show {
        #[arg(long)]
        order_key: Option<String>,

        /// Output format
        #[arg(short, long, default_value = "pretty")]
        output: OutputFormat,
    },
    /// Start a new order
    New {
        #[arg(long)]
        target_value: f64,

        #[arg(long)]
        order_key: Option<String>,

        /// Replace an order already stored under the key
        #[arg(long)]
        force: bool,
    },
    /// Box items from barcodes entered by hand and add the box to the order
    AddBox {
        /// Item barcode (repeat for each item)
        #[arg(long = "barcode", required = true)]
        barcodes: Vec<String>,

        /// Box id (generated when omitted)
        #[arg(long)]
        box_id: Option<String>,

        /// Item type plugin
        #[arg(long = "type")]
        item_type: Option<String>,

        /// Target value for a new order, used when none is stored yet
        #[arg(long)]
        target_value: Option<f64>,

        #[arg(long)]
        order_key: Option<String>,

        /// Output format
        #[arg(short, long, default_value = "pretty")]
        output: OutputFormat,
    },
}

#[derive(clap::Args, Debug)]
struct GroupingArgs {
    /// Photos per item
    #[arg(short = 'n', long)]
    group_size: Option<usize>,

    /// The first photo is an empty-tray reference
    #[arg(long)]
    first_blank: bool,

    /// Maximum changed-area fraction still counted as blank (0-1)
    #[arg(short, long)]
    threshold: Option<f64>,
}

impl GroupingArgs {
    fn apply(&self, config: &mut IntakeConfig) {
        if let Some(size) = self.group_size {
            config.group_size = size;
        }
        if self.first_blank {
            config.first_is_blank = true;
        }
        if let Some(threshold) = self.threshold {
            config.similarity_threshold = threshold;
        }
    }
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum OutputFormat {
    /// Human-readable output with colors
    Pretty,
    /// JSON output for scripting
    Json,
}

/// Run the CLI
pub fn run() -> Result<()> {
    let cli = Cli::parse();

    let mut config = IntakeConfig::load(cli.config.as_deref())?;
    if let Some(root) = cli.storage_root {
        config.storage_root = root;
    }

    match cli.command {
        Commands::Group { dir, grouping, output } => {
            grouping.apply(&mut config);
            config.validate()?;
            run_group(&dir, &config, output)
        }
        Commands::Compare { a, b, threshold, output } => {
            if let Some(threshold) = threshold {
                config.similarity_threshold = threshold;
            }
            run_compare(&a, &b, config.similarity_threshold, output)
        }
        Commands::Intake {
            dir,
            grouping,
            item_type,
            target_value,
            box_id,
            order_key,
            price_paid,
            listing_price,
            output,
        } => {
            grouping.apply(&mut config);
            if let Some(item_type) = item_type {
                config.item_type = item_type;
            }
            if let Some(key) = order_key {
                config.order_key = key;
            }
            config.validate()?;
            run_intake(
                &dir,
                &config,
                IntakeOptions {
                    target_value,
                    box_id,
                    price_paid,
                    listing_price,
                },
                output,
            )
        }
        Commands::Order { action } => match action {
            OrderCommand::Show { order_key, output } => {
                let key = order_key.unwrap_or_else(|| config.order_key.clone());
                run_order_show(&config, &key, output)
            }
            OrderCommand::New {
                target_value,
                order_key,
                force,
            } => {
                let key = order_key.unwrap_or_else(|| config.order_key.clone());
                run_order_new(&config, &key, target_value, force)
            }
            OrderCommand::AddBox {
                barcodes,
                box_id,
                item_type,
                target_value,
                order_key,
                output,
            } => {
                if let Some(item_type) = item_type {
                    config.item_type = item_type;
                }
                if let Some(key) = order_key {
                    config.order_key = key;
                }
                config.validate()?;
                run_order_add_box(&config, &barcodes, box_id, target_value, output)
            }
        },
        Commands::Types { output } => run_types(output),
    }
}

fn run_group(dir: &Path, config: &IntakeConfig, output: OutputFormat) -> Result<()> {
    let term = Term::stderr();
    print_header(&term, output);

    let comparator = BoundingBoxComparator::new(config.similarity_threshold)?;
    let grouper = ImageGrouper::with_comparator(config.grouping(), Box::new(comparator));
    let images: Vec<ImageRef> = list_images(dir, &ScanConfig::default())?
        .into_iter()
        .map(ImageRef::from)
        .collect();

    let (sender, receiver) = EventChannel::new();
    let progress = progress_bar(output);
    let event_thread = spawn_progress(receiver, progress.clone());

    let outcome = grouper.group_with_events(&images, &sender);

    drop(sender);
    event_thread.join().ok();
    if let Some(pb) = progress {
        pb.finish_and_clear();
    }
    let outcome = outcome?;

    match output {
        OutputFormat::Pretty => print_pretty_groups(&term, &outcome),
        OutputFormat::Json => print_json(&outcome)?,
    }
    Ok(())
}

fn run_compare(a: &Path, b: &Path, threshold: f64, output: OutputFormat) -> Result<()> {
    let comparator = BoundingBoxComparator::new(threshold)?;
    let left = ImageRef::from_path(a);
    let right = ImageRef::from_path(b);
    let report = comparator.compare(&*left.load()?, &*right.load()?)?;

    match output {
        OutputFormat::Pretty => print_pretty_comparison(&Term::stdout(), &left, &right, &report),
        OutputFormat::Json => print_json(&report)?,
    }
    Ok(())
}

struct IntakeOptions {
    target_value: Option<f64>,
    box_id: Option<String>,
    price_paid: Option<f64>,
    listing_price: Option<f64>,
}

fn run_intake(dir: &Path, config: &IntakeConfig, options: IntakeOptions, output: OutputFormat) -> Result<()> {
    let term = Term::stderr();
    print_header(&term, output);

    let store = JsonFileStore::new(&config.storage_root);
    let mut order = load_or_start_order(&store, &config.order_key, options.target_value)?;

    let pipeline = IntakePipeline::builder()
        .directory(dir)
        .grouping(config.grouping())
        .threshold(config.similarity_threshold)
        .item_type(config.item_type.clone())
        .prices(options.price_paid, options.listing_price)
        .registry(Arc::new(PluginRegistry::with_builtin()))
        .context(plugin_context(dir, config)?)
        .build()?;

    let container = new_container(options.box_id);

    let (sender, receiver) = EventChannel::new();
    let progress = progress_bar(output);
    let event_thread = spawn_progress(receiver, progress.clone());

    let result = pipeline.run_with_events(&mut order, container, &sender);

    drop(sender);
    event_thread.join().ok();
    if let Some(pb) = progress {
        pb.finish_and_clear();
    }
    let result = result?;

    order.persist(&store, &config.order_key)?;

    match output {
        OutputFormat::Pretty => print_pretty_intake(&term, &result, &order),
        OutputFormat::Json => print_json(&result)?,
    }
    Ok(())
}

/// The stored order, or a new one at `target_value` when none is stored yet
fn load_or_start_order(store: &JsonFileStore, key: &str, target_value: Option<f64>) -> Result<ValueOrder> {
    match ValueOrder::load_summary(store, key).map_err(IntakeError::from) {
        Ok(order) => Ok(order),
        Err(e) if e.is_not_found() => match target_value {
            Some(target) if target.is_finite() => {
                tracing::info!(key, target, "starting new order");
                Ok(ValueOrder::new(target))
            }
            Some(target) => Err(IntakeError::InvalidArgument(format!("invalid target value {target}"))),
            None => Err(IntakeError::InvalidArgument(format!(
                "no order stored under '{key}'; pass --target-value to start one"
            ))),
        },
        Err(e) => Err(e),
    }
}

fn new_container(box_id: Option<String>) -> ItemContainer {
    match box_id {
        Some(id) => ItemContainer::new(id),
        None => ItemContainer::with_generated_id(),
    }
}

/// Decoder from the batch's manifest, price guide from config
fn plugin_context(dir: &Path, config: &IntakeConfig) -> Result<PluginContext> {
    let manifest_path = dir.join(&config.barcode_manifest);
    let decoder: Arc<dyn BarcodeDecoder> = if manifest_path.is_file() {
        Arc::new(ManifestDecoder::load(&manifest_path)?)
    } else {
        tracing::warn!(path = %manifest_path.display(), "no barcode manifest; nothing will be identified");
        Arc::new(NoBarcodes)
    };
    with_price_guide(PluginContext::new(decoder), config)
}

fn with_price_guide(context: PluginContext, config: &IntakeConfig) -> Result<PluginContext> {
    Ok(match &config.price_guide {
        Some(path) => context.with_price_guide(Arc::new(JsonPriceGuide::load(path)?)),
        None => context,
    })
}

fn run_order_show(config: &IntakeConfig, key: &str, output: OutputFormat) -> Result<()> {
    let store = JsonFileStore::new(&config.storage_root);
    let order = ValueOrder::load_summary(&store, key)?;
    let summary = order.save_summary();

    match output {
        OutputFormat::Pretty => {
            let term = Term::stdout();
            term.write_line(&format!("{}", style(&order).bold())).ok();
            if order.is_target_met() {
                term.write_line(&format!("  {} target reached", style("✓").green().bold()))
                    .ok();
            }
            for id in &summary.container_ids {
                term.write_line(&format!("  {} {}", style("□").dim(), id)).ok();
            }
        }
        OutputFormat::Json => print_json(&summary)?,
    }
    Ok(())
}

fn run_order_new(config: &IntakeConfig, key: &str, target_value: f64, force: bool) -> Result<()> {
    if !target_value.is_finite() {
        return Err(IntakeError::InvalidArgument(format!("invalid target value {target_value}")));
    }
    let store = JsonFileStore::new(&config.storage_root);
    let (order, _) = match ValueOrder::create(&store, key, target_value, force) {
        Err(StoreError::AlreadyExists { key }) => {
            return Err(IntakeError::InvalidArgument(format!(
                "an order is already stored under '{key}'; pass --force to replace it"
            )))
        }
        created => created?,
    };

    Term::stdout()
        .write_line(&format!(
            "{} {} saved as {}",
            style("✓").green().bold(),
            order,
            style(store.root().join(key).display()).cyan()
        ))
        .ok();
    Ok(())
}

fn run_order_add_box(
    config: &IntakeConfig,
    barcodes: &[String],
    box_id: Option<String>,
    target_value: Option<f64>,
    output: OutputFormat,
) -> Result<()> {
    let store = JsonFileStore::new(&config.storage_root);
    let mut order = load_or_start_order(&store, &config.order_key, target_value)?;

    let context = with_price_guide(PluginContext::default(), config)?;
    let scanner = PluginRegistry::with_builtin().scanner(&config.item_type, &context)?;
    let result = box_barcodes(&mut order, new_container(box_id), barcodes, scanner.as_ref())?;

    order.persist(&store, &config.order_key)?;

    match output {
        OutputFormat::Pretty => print_pretty_box(&Term::stdout(), &result, &order),
        OutputFormat::Json => print_json(&result)?,
    }
    Ok(())
}

fn run_types(output: OutputFormat) -> Result<()> {
    let registry = PluginRegistry::with_builtin();
    let types = registry.available_types();

    match output {
        OutputFormat::Pretty => {
            let term = Term::stdout();
            for info in &types {
                term.write_line(&format!(
                    "  {:<10} scanner: {}  builder: {}",
                    style(&info.type_name).bold(),
                    yes_no(info.has_scanner),
                    yes_no(info.has_builder)
                ))
                .ok();
            }
        }
        OutputFormat::Json => print_json(&types)?,
    }
    Ok(())
}

fn yes_no(flag: bool) -> String {
    if flag {
        style("yes").green().to_string()
    } else {
        style("no").red().to_string()
    }
}

fn print_header(term: &Term, output: OutputFormat) {
    if matches!(output, OutputFormat::Pretty) {
        term.write_line(&format!(
            "{} {}",
            style("Slab Intake").bold().cyan(),
            style(concat!("v", env!("CARGO_PKG_VERSION"))).dim()
        ))
        .ok();
        term.write_line("").ok();
    }
}

fn progress_bar(output: OutputFormat) -> Option<ProgressBar> {
    if !matches!(output, OutputFormat::Pretty) {
        return None;
    }
    let pb = ProgressBar::new(0);
    let style = ProgressStyle::default_bar()
        .template("{spinner:.green} [{bar:40.cyan/blue}] {pos}/{len} {msg}")
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("█▓░");
    pb.set_style(style);
    Some(pb)
}

/// Drive the progress bar from events until the sender is dropped
fn spawn_progress(receiver: EventReceiver, progress: Option<ProgressBar>) -> thread::JoinHandle<()> {
    thread::spawn(move || {
        for event in receiver.iter() {
            let Some(pb) = progress.as_ref() else {
                continue;
            };
            match event {
                Event::Pipeline(PipelineEvent::PhaseChanged { phase }) => {
                    pb.set_message(phase.to_string());
                }
                Event::Group(GroupEvent::Started { total_images }) => {
                    pb.set_length(total_images as u64);
                }
                Event::Group(GroupEvent::Progress(p)) => {
                    pb.set_position(p.checked as u64);
                }
                Event::Intake(IntakeEvent::DuplicateRejected { identity, .. }) => {
                    pb.println(format!("  {} duplicate {}", style("!").yellow(), identity));
                }
                _ => {}
            }
        }
    })
}

fn print_json<T: Serialize + ?Sized>(value: &T) -> Result<()> {
    let json = serde_json::to_string_pretty(value).map_err(|e| IntakeError::Output(e.to_string()))?;
    println!("{json}");
    Ok(())
}

fn print_pretty_groups(term: &Term, outcome: &GroupingOutcome) {
    term.write_line(&format!(
        "{} {} listings from {} photos",
        style("✓").green().bold(),
        style(outcome.groups.len()).cyan(),
        outcome.grouped_count() + outcome.skipped.len()
    ))
    .ok();

    if let Some(blank) = &outcome.blank_reference {
        term.write_line(&format!("  {} {}", style("blank reference:").dim(), blank)).ok();
    }
    term.write_line("").ok();

    for group in &outcome.groups {
        term.write_line(&format!("  {}", style(format!("Listing {}:", group.index + 1)).bold()))
            .ok();
        for image in &group.images {
            term.write_line(&format!("    {} {}", style("○").dim(), image.label())).ok();
        }
    }

    if !outcome.skipped.is_empty() {
        term.write_line("").ok();
        term.write_line(&format!("  {}", style("Skipped as blank:").dim())).ok();
        for image in &outcome.skipped {
            term.write_line(&format!("    {} {}", style("-").dim(), image.label())).ok();
        }
    }
}

fn print_pretty_comparison(term: &Term, left: &ImageRef, right: &ImageRef, report: &SimilarityReport) {
    let verdict = if report.similar {
        style("similar").green().bold()
    } else {
        style("different").yellow().bold()
    };
    term.write_line(&format!("{} vs {}: {}", left.label(), right.label(), verdict))
        .ok();
    match report.bounds {
        Some(bounds) => {
            term.write_line(&format!(
                "  changed region {}x{} at ({}, {}), {:.1}% of frame (threshold {:.1}%)",
                bounds.width(),
                bounds.height(),
                bounds.left,
                bounds.top,
                report.diff_fraction * 100.0,
                report.threshold * 100.0
            ))
            .ok();
        }
        None => {
            term.write_line("  images are identical").ok();
        }
    }
}

fn print_pretty_intake(term: &Term, result: &IntakeResult, order: &ValueOrder) {
    term.write_line(&format!("{} Intake Complete", style("✓").green().bold()))
        .ok();
    term.write_line("").ok();

    term.write_line(&format!(
        "  {} photos processed in {:.1}s",
        style(result.total_images).cyan(),
        result.duration_ms as f64 / 1000.0
    ))
    .ok();
    term.write_line(&format!(
        "  {} items boxed in {} worth {}",
        style(result.listings.len()).cyan(),
        style(&result.container.id).bold(),
        style(format!("${:.2}", result.container.total_value)).yellow()
    ))
    .ok();
    if !result.duplicates.is_empty() {
        term.write_line(&format!(
            "  {} duplicates rejected",
            style(result.duplicates.len()).yellow()
        ))
        .ok();
    }
    if !result.unidentified.is_empty() {
        term.write_line(&format!(
            "  {} groups could not be identified",
            style(result.unidentified.len()).red()
        ))
        .ok();
    }
    term.write_line("").ok();

    for listed in &result.listings {
        let title = listed.payload["title"].as_str().unwrap_or_default();
        let price = listed
            .listing
            .asking_price()
            .map(|p| format!("${p:.2}"))
            .unwrap_or_else(|| "-".to_string());
        term.write_line(&format!("    {} {} {}", style("★").green(), title, style(price).dim()))
            .ok();
    }
    for group in &result.unidentified {
        let labels: Vec<String> = group.images.iter().map(ImageRef::label).collect();
        term.write_line(&format!("    {} {}", style("?").red(), labels.join(", ")))
            .ok();
    }

    term.write_line("").ok();
    term.write_line(&format!("{}", style(order).dim())).ok();
}

fn print_pretty_box(term: &Term, result: &BarcodeBoxResult, order: &ValueOrder) {
    term.write_line(&format!(
        "{} {} items boxed in {} worth {}",
        style("✓").green().bold(),
        style(result.container.items.len()).cyan(),
        style(&result.container.id).bold(),
        style(format!("${:.2}", result.container.total_value)).yellow()
    ))
    .ok();
    for item in &result.container.items {
        let value = item
            .value()
            .map(|v| format!("${v:.2}"))
            .unwrap_or_else(|| "-".to_string());
        term.write_line(&format!("    {} {} {}", style("★").green(), item.identity(), style(value).dim()))
            .ok();
    }
    for code in &result.duplicates {
        term.write_line(&format!("    {} duplicate {}", style("!").yellow(), code)).ok();
    }
    term.write_line("").ok();
    term.write_line(&format!("{}", style(order).dim())).ok();
}
