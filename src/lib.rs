//! Webimize - Batch Image Optimizer for Web Projects
//!
//! Prepares image assets for the web: downscales anything wider than a
//! configurable cap and recompresses it to JPEG, either one file at a time
//! or across a whole directory tree. In-place batch runs are idempotent:
//! every optimized file leaves its original bytes in a `.backup` sibling,
//! and files that already have one are skipped on later runs.
//!
//! # Features
//!
//! - **In-Place Batch Runs**: Recursive walk with a backup guard, safe to
//!   re-run over the same tree
//! - **Responsive Variants**: One JPEG per named width (small/medium/large
//!   by default) next to the source
//! - **Never Upscales**: Images already within the width cap are only
//!   recompressed
//! - **Crash Safe**: Output is written through a temp sibling and renamed
//!   into place
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use webimize::{OptimizeOptions, Optimizer};
//! use std::path::Path;
//!
//! let optimizer = Optimizer::new();
//! let report = optimizer.optimize(
//!     Path::new("hero.png"),
//!     Path::new("hero.jpg"),
//!     &OptimizeOptions::new(800, 85),
//! )?;
//!
//! println!("{} -> {} bytes ({:.1}% saved)",
//!          report.bytes_in, report.bytes_out, report.size_reduction());
//! # Ok::<(), webimize::WebimizeError>(())
//! ```

#![warn(clippy::all, clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod config;
pub mod error;
pub mod processing;

// Re-export commonly used types
pub use config::{Config, OptimizeOptions, Settings, Variant, VariantSpec};
pub use error::{Result, WebimizeError};
pub use processing::{
    BatchSummary, BatchWalker, InPlaceOutcome, OptimizeReport, Optimizer, VariantGenerator,
    VariantOutcome,
};

use tracing::debug;

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Initialize logging at the given default level
///
/// `RUST_LOG` takes precedence when set. Logs go to stderr so stdout stays
/// clean for summaries and `--json` output. Safe to call more than once;
/// later calls are no-ops.
pub fn init(level: &str) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(level));

    let subscriber = tracing_subscriber::FmtSubscriber::builder()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .finish();

    if tracing::subscriber::set_global_default(subscriber).is_ok() {
        debug!("webimize v{} initialized", VERSION);
    }
}
