//! # slab-intake CLI
//!
//! Command-line interface for the intake engine.
//!
//! ## Usage
//! ```bash
//! slab-intake group ./batch-7 --group-size 2 --first-blank
//! slab-intake intake ./batch-7 --target-value 2500 --box-id B7
//! slab-intake order add-box --barcode 1111222233334444 --barcode 4455667-001
//! slab-intake order show
//! ```
//!
//! Failures exit with the status of their [`slab_intake::ErrorKind`].

mod cli;

use console::style;

fn main() {
    slab_intake::init_tracing();
    if let Err(e) = cli::run() {
        eprintln!("{} {}", style("error:").red().bold(), e);
        std::process::exit(e.kind().exit_code());
    }
}
