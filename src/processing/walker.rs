//! Recursive batch optimization with a backup guard
//!
//! The walker's contract makes batch runs idempotent: before a file is
//! optimized in place, the original is renamed to `<name>.backup`, and any
//! file that already has a backup sibling is skipped. Re-running the walker
//! over the same tree therefore never compresses an image twice, and the
//! pre-optimization bytes stay on disk next to each output.

use std::fs;
use std::path::{Path, PathBuf};

use console::style;
use serde::Serialize;
use tracing::{info, warn};
use walkdir::WalkDir;

use crate::config::{OptimizeOptions, BACKUP_SUFFIX};
use crate::error::{Result, WebimizeError};
use crate::processing::{formats, OptimizeReport, Optimizer};

/// Backup sibling for `path`: the full file name plus [`BACKUP_SUFFIX`]
///
/// The suffix is appended to the whole name (`photo.jpg` becomes
/// `photo.jpg.backup`), so the original extension stays recoverable.
pub fn backup_path(path: &Path) -> PathBuf {
    let mut backup = path.to_path_buf().into_os_string();
    backup.push(BACKUP_SUFFIX);
    PathBuf::from(backup)
}

/// Collect every supported image under `root`, recursively, in sorted order
///
/// Backup files are excluded by construction (their extension is `backup`).
/// A missing root is not an error: the walker logs a warning and returns an
/// empty list, so a project without an images directory is a clean no-op.
pub fn collect_images(root: &Path) -> Result<Vec<PathBuf>> {
    if !root.is_dir() {
        warn!(root = %root.display(), "images directory not found, nothing to do");
        return Ok(Vec::new());
    }

    let mut files = Vec::new();
    for entry in WalkDir::new(root) {
        let entry = entry?;
        if entry.file_type().is_file() && formats::is_supported_image(entry.path()) {
            files.push(entry.into_path());
        }
    }

    files.sort();
    Ok(files)
}

/// What happened to one file during an in-place pass
#[derive(Debug)]
pub enum InPlaceOutcome {
    /// File was optimized; the original bytes live at the backup path
    Optimized(OptimizeReport),

    /// A backup already existed, so the file was left untouched
    Skipped { backup: PathBuf },
}

/// A failed file in a batch run
#[derive(Debug, Clone, Serialize)]
pub struct FailedFile {
    pub path: PathBuf,
    pub error: String,
}

/// Aggregate counters for a batch run
#[derive(Debug, Default, Serialize)]
pub struct BatchSummary {
    pub optimized: usize,
    pub skipped: usize,
    pub bytes_in: u64,
    pub bytes_out: u64,
    pub failures: Vec<FailedFile>,
}

impl BatchSummary {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, outcome: &InPlaceOutcome) {
        match outcome {
            InPlaceOutcome::Optimized(report) => {
                self.optimized += 1;
                self.bytes_in += report.bytes_in;
                self.bytes_out += report.bytes_out;
            }
            InPlaceOutcome::Skipped { .. } => self.skipped += 1,
        }
    }

    pub fn record_failure(&mut self, path: &Path, error: &WebimizeError) {
        self.failures.push(FailedFile {
            path: path.to_path_buf(),
            error: error.to_string(),
        });
    }

    pub fn failed(&self) -> usize {
        self.failures.len()
    }

    pub fn total(&self) -> usize {
        self.optimized + self.skipped + self.failed()
    }

    /// Percentage saved across every optimized file; 0 when nothing ran
    pub fn size_reduction(&self) -> f64 {
        if self.bytes_in == 0 {
            return 0.0;
        }
        (1.0 - self.bytes_out as f64 / self.bytes_in as f64) * 100.0
    }

    /// Print the human-readable end-of-run summary to stdout
    pub fn print(&self) {
        println!();
        println!("{}", style("Batch summary").bold());
        println!("  Optimized: {}", style(self.optimized).green());
        println!("  Skipped:   {} (backup already present)", self.skipped);
        if self.failed() > 0 {
            println!("  Failed:    {}", style(self.failed()).red());
            for failure in &self.failures {
                println!(
                    "    {} {}: {}",
                    style("✗").red(),
                    failure.path.display(),
                    failure.error
                );
            }
        }
        if self.optimized > 0 {
            println!(
                "  Size:      {} -> {} ({:.1}% saved)",
                format_size(self.bytes_in),
                format_size(self.bytes_out),
                self.size_reduction()
            );
        }
    }
}

/// Render a byte count with a binary-ish unit suffix
pub fn format_size(bytes: u64) -> String {
    const UNITS: [&str; 4] = ["B", "KB", "MB", "GB"];
    let mut size = bytes as f64;
    let mut unit = 0;
    while size >= 1024.0 && unit < UNITS.len() - 1 {
        size /= 1024.0;
        unit += 1;
    }
    if unit == 0 {
        format!("{bytes} B")
    } else {
        format!("{size:.1} {}", UNITS[unit])
    }
}

/// Sequential in-place optimizer for whole directory trees
#[derive(Debug, Clone)]
pub struct BatchWalker {
    optimizer: Optimizer,
    options: OptimizeOptions,
}

impl BatchWalker {
    pub fn new(options: OptimizeOptions) -> Self {
        Self {
            optimizer: Optimizer::new(),
            options,
        }
    }

    /// Optimize one file in place behind the backup guard
    ///
    /// The original is renamed to its backup path first, then optimized from
    /// the backup back onto the original path. If the optimize step fails the
    /// backup is renamed back, so the tree is left exactly as found and a
    /// later run will re-attempt the file.
    pub fn optimize_in_place(&self, path: &Path) -> Result<InPlaceOutcome> {
        if !path.exists() {
            return Err(WebimizeError::not_found(path));
        }

        let backup = backup_path(path);
        if backup.exists() {
            info!(path = %path.display(), "backup exists, skipping");
            return Ok(InPlaceOutcome::Skipped { backup });
        }

        fs::rename(path, &backup).map_err(|e| WebimizeError::io(path, e))?;

        match self.optimizer.optimize(&backup, path, &self.options) {
            Ok(report) => Ok(InPlaceOutcome::Optimized(report)),
            Err(e) => {
                if let Err(restore) = fs::rename(&backup, path) {
                    // Original bytes are still intact at the backup path
                    warn!(
                        backup = %backup.display(),
                        error = %restore,
                        "could not restore original after failure"
                    );
                }
                Err(e)
            }
        }
    }

    /// Walk `root` and optimize every supported image in place
    ///
    /// Per-file failures are logged and counted but do not abort the run.
    /// Errors that would fail every remaining file the same way (invalid
    /// options) abort immediately.
    pub fn run(&self, root: &Path) -> Result<BatchSummary> {
        let files = collect_images(root)?;
        info!(root = %root.display(), count = files.len(), "starting batch run");

        let mut summary = BatchSummary::new();
        for file in &files {
            match self.optimize_in_place(file) {
                Ok(outcome) => summary.record(&outcome),
                Err(e) if e.is_recoverable() => {
                    warn!(path = %file.display(), error = %e, "failed, continuing");
                    summary.record_failure(file, &e);
                }
                Err(e) => return Err(e),
            }
        }

        info!(
            optimized = summary.optimized,
            skipped = summary.skipped,
            failed = summary.failed(),
            "batch run complete"
        );
        Ok(summary)
    }
}
