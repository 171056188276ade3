//! Webimize CLI - Batch Image Optimizer for Web Projects
//!
//! Downscales and recompresses image assets to web-friendly JPEGs, with
//! idempotent in-place batch runs and responsive variant generation.

use std::path::{Path, PathBuf};
use std::process;
use std::time::Instant;

use anyhow::Context;
use clap::{ArgGroup, CommandFactory, Parser};
use console::style;
use indicatif::{ProgressBar, ProgressStyle};
use tracing::warn;

use webimize::processing::walker::{backup_path, collect_images, format_size};
use webimize::{
    init, BatchSummary, BatchWalker, Config, InPlaceOutcome, Settings, VariantGenerator,
    WebimizeError,
};

/// Webimize - Batch Image Optimizer for Web Projects
#[derive(Parser)]
#[command(
    name = "webimize",
    version,
    about = "Optimize image assets for the web: downscale and recompress to JPEG",
    long_about = "Webimize prepares image assets for the web. It downscales anything wider \
                  than a configurable cap, recompresses it to JPEG, and keeps the original \
                  bytes in a .backup sibling so batch runs are idempotent: files that already \
                  carry a backup are skipped on later runs.",
    arg_required_else_help = false
)]
#[command(group = ArgGroup::new("mode").multiple(false))]
struct Cli {
    /// Optimize every image under the images directory, in place
    #[arg(long, group = "mode")]
    optimize_all: bool,

    /// Optimize a single image in place (a .backup sibling is created)
    #[arg(long, value_name = "PATH", group = "mode")]
    optimize: Option<PathBuf>,

    /// Generate responsive variants next to the given image
    #[arg(long, value_name = "PATH", group = "mode")]
    create_variants: Option<PathBuf>,

    /// JPEG quality (1-100)
    #[arg(
        short,
        long,
        value_name = "QUALITY",
        value_parser = clap::value_parser!(u8).range(1..=100)
    )]
    quality: Option<u8>,

    /// Maximum output width in pixels (--optimize only; other modes use
    /// their configured widths)
    #[arg(
        short = 'w',
        long,
        value_name = "PIXELS",
        value_parser = clap::value_parser!(u32).range(1..)
    )]
    max_width: Option<u32>,

    /// Configuration file path
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Exit non-zero if any file failed
    #[arg(long)]
    strict: bool,

    /// Show what a batch run would do without touching any file
    // `requires` alone is waived by clap when the required flag conflicts
    // with one that was given (any other member of the "mode" group), so the
    // other modes must also be excluded explicitly.
    #[arg(long, requires = "optimize_all", conflicts_with_all = ["optimize", "create_variants"])]
    dry_run: bool,

    /// Print results as JSON on stdout
    #[arg(long)]
    json: bool,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    /// Quiet mode (errors only)
    #[arg(short = 'Q', long, conflicts_with = "verbose")]
    quiet: bool,
}

fn main() {
    let cli = Cli::parse();

    let log_level = if cli.quiet {
        "error"
    } else if cli.verbose {
        "debug"
    } else {
        "info"
    };
    init(log_level);

    if let Err(e) = run(&cli) {
        eprintln!("{}: {:#}", style("Error").red().bold(), e);
        process::exit(1);
    }
}

fn run(cli: &Cli) -> anyhow::Result<()> {
    let config = match &cli.config {
        Some(path) => Some(
            Config::from_file(path)
                .with_context(|| format!("failed to load configuration {}", path.display()))?,
        ),
        None => None,
    };
    let settings = Settings::resolve(config.as_ref(), cli.quality);

    if cli.optimize_all {
        run_batch(cli, &settings)
    } else if let Some(path) = &cli.optimize {
        run_single(path, cli, &settings)
    } else if let Some(path) = &cli.create_variants {
        run_variants(path, cli, &settings)
    } else {
        // No mode selected: show usage and succeed
        Cli::command().print_long_help()?;
        Ok(())
    }
}

/// Optimize one file in place, through the same backup guard as a batch run
///
/// A failure on an existing file is reported but exits 0, same as a batch of
/// one; `--strict` makes it fatal. A missing path is always fatal.
fn run_single(path: &Path, cli: &Cli, settings: &Settings) -> anyhow::Result<()> {
    let mut options = settings.optimize_options();
    if let Some(width) = cli.max_width {
        options = options.max_width(width);
    }
    let walker = BatchWalker::new(options);

    let outcome = match walker.optimize_in_place(path) {
        Ok(outcome) => outcome,
        Err(e @ WebimizeError::NotFound(_)) => return Err(e.into()),
        Err(e) => {
            if cli.json {
                let payload = serde_json::json!({
                    "source": path,
                    "ok": false,
                    "error": e.to_string(),
                });
                println!("{}", serde_json::to_string_pretty(&payload)?);
            } else {
                println!("{} {}: {}", style("Failed").red().bold(), path.display(), e);
            }
            if cli.strict {
                anyhow::bail!("failed to optimize {}", path.display());
            }
            return Ok(());
        }
    };

    match outcome {
        InPlaceOutcome::Optimized(report) => {
            if cli.json {
                println!("{}", serde_json::to_string_pretty(&report)?);
            } else {
                println!(
                    "{} {} ({} -> {}, {:.1}% saved)",
                    style("Optimized").green().bold(),
                    path.display(),
                    format_size(report.bytes_in),
                    format_size(report.bytes_out),
                    report.size_reduction()
                );
            }
        }
        InPlaceOutcome::Skipped { backup } => {
            if cli.json {
                let payload = serde_json::json!({
                    "source": path,
                    "skipped": true,
                    "backup": backup,
                });
                println!("{}", serde_json::to_string_pretty(&payload)?);
            } else {
                println!(
                    "{} {} (backup already exists at {})",
                    style("Skipped").yellow().bold(),
                    path.display(),
                    backup.display()
                );
            }
        }
    }
    Ok(())
}

/// Generate responsive variants beside the source image
fn run_variants(path: &Path, cli: &Cli, settings: &Settings) -> anyhow::Result<()> {
    let out_dir = path.parent().map(Path::to_path_buf).unwrap_or_default();
    let generator =
        VariantGenerator::new(settings.variants.clone()).with_quality(settings.quality);

    let outcomes = generator.generate(path, &out_dir)?;
    let failed = outcomes.iter().filter(|o| !o.is_ok()).count();

    if cli.json {
        let payload: Vec<_> = outcomes
            .iter()
            .map(|o| match &o.result {
                Ok(report) => serde_json::json!({
                    "label": o.variant.label,
                    "width": o.variant.width,
                    "dest": o.dest,
                    "ok": true,
                    "dimensions": report.output_dimensions,
                    "bytes_out": report.bytes_out,
                }),
                Err(e) => serde_json::json!({
                    "label": o.variant.label,
                    "width": o.variant.width,
                    "dest": o.dest,
                    "ok": false,
                    "error": e.to_string(),
                }),
            })
            .collect();
        println!("{}", serde_json::to_string_pretty(&payload)?);
    } else {
        for outcome in &outcomes {
            match &outcome.result {
                Ok(report) => println!(
                    "{} {} ({}x{}, {})",
                    style("Created").green().bold(),
                    outcome.dest.display(),
                    report.output_dimensions.0,
                    report.output_dimensions.1,
                    format_size(report.bytes_out)
                ),
                Err(e) => println!(
                    "{} {}: {}",
                    style("Failed").red().bold(),
                    outcome.dest.display(),
                    e
                ),
            }
        }
    }

    if cli.strict && failed > 0 {
        anyhow::bail!("{failed} of {} variants failed", outcomes.len());
    }
    Ok(())
}

/// Walk the images directory and optimize every supported image in place
fn run_batch(cli: &Cli, settings: &Settings) -> anyhow::Result<()> {
    let root = &settings.images_dir;
    let files = collect_images(root)?;

    if cli.dry_run {
        println!(
            "{} file(s) under {}:",
            style(files.len()).bold(),
            root.display()
        );
        for file in &files {
            let action = if backup_path(file).exists() {
                style("skip (backup exists)").yellow()
            } else {
                style("optimize").green()
            };
            println!("  {} {}", action, file.display());
        }
        return Ok(());
    }

    let walker = BatchWalker::new(settings.optimize_options());
    let progress = if !cli.json && !cli.quiet {
        let pb = ProgressBar::new(files.len() as u64);
        pb.set_style(
            ProgressStyle::default_bar()
                .template("{spinner:.green} [{elapsed_precise}] [{wide_bar:.cyan/blue}] {pos}/{len} {msg}")?
                .progress_chars("#>-"),
        );
        Some(pb)
    } else {
        None
    };

    let start = Instant::now();
    let mut summary = BatchSummary::new();
    for file in &files {
        if let Some(pb) = &progress {
            pb.set_message(
                file.file_name()
                    .unwrap_or_default()
                    .to_string_lossy()
                    .into_owned(),
            );
        }

        match walker.optimize_in_place(file) {
            Ok(outcome) => summary.record(&outcome),
            Err(e) if e.is_recoverable() => {
                warn!(path = %file.display(), error = %e, "failed, continuing");
                summary.record_failure(file, &e);
            }
            Err(e) => return Err(e.into()),
        }

        if let Some(pb) = &progress {
            pb.inc(1);
        }
    }
    if let Some(pb) = &progress {
        pb.finish_with_message("done");
    }
    let duration = start.elapsed();

    if cli.json {
        let payload = serde_json::json!({
            "root": root,
            "duration_secs": duration.as_secs_f64(),
            "summary": summary,
        });
        println!("{}", serde_json::to_string_pretty(&payload)?);
    } else if !cli.quiet {
        summary.print();
        println!("  Duration:  {:.2}s", duration.as_secs_f64());
    }

    if cli.strict && summary.failed() > 0 {
        anyhow::bail!("{} file(s) failed", summary.failed());
    }
    Ok(())
}
