//! # CLI Module
//!
//! Command-line interface for the duplicate photo finder.
//!
//! ## Usage
//! ```bash
//! # Scan a directory for duplicates
//! photo-dedup scan ~/Photos
//!
//! # Smaller hashes, fewer workers
//! photo-dedup scan ~/Photos --hash-size 8 --workers 4
//!
//! # Rebuild the report from the cache only
//! photo-dedup report --report duplicates.json
//!
//! # Inspect the cache
//! photo-dedup cache-stats
//! ```

use clap::{Parser, Subcommand, ValueEnum};
use console::{style, Term};
use indicatif::{ProgressBar, ProgressStyle};
use photo_dedup::core::cache::{CacheStore, JsonCacheStore};
use photo_dedup::core::hasher::{HashAlgorithmKind, DEFAULT_HASH_SIZE};
use photo_dedup::core::pipeline::{Pipeline, PipelineResult, DEFAULT_WORKER_COUNT};
use photo_dedup::core::reporter::DEFAULT_REPORT_FILE;
use photo_dedup::error::Result;
use photo_dedup::events::{Event, EventChannel, HashEvent, PipelineEvent};
use std::path::{Path, PathBuf};
use std::thread;

/// Photo Dedup - Find duplicate photos by perceptual fingerprint
#[derive(Parser, Debug)]
#[command(name = "photo-dedup")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Scan a directory and report duplicate photos
    Scan {
        /// Directory to scan
        root: PathBuf,

        /// Hash grid edge length (at least 2)
        #[arg(long, default_value_t = DEFAULT_HASH_SIZE)]
        hash_size: u32,

        /// Number of fingerprint workers
        #[arg(short, long, default_value_t = DEFAULT_WORKER_COUNT)]
        workers: usize,

        /// Hash algorithm to use
        #[arg(short, long, default_value = "perceptual")]
        algorithm: Algorithm,

        /// Comma-separated image extensions to include
        #[arg(long, value_delimiter = ',')]
        extensions: Option<Vec<String>>,

        /// Skip hidden files and directories
        #[arg(long)]
        skip_hidden: bool,

        /// Fingerprint cache file
        #[arg(long)]
        cache: Option<PathBuf>,

        /// Duplicate report file
        #[arg(long, default_value = DEFAULT_REPORT_FILE)]
        report: PathBuf,

        /// Verbose output
        #[arg(short, long)]
        verbose: bool,
    },

    /// Rewrite the report from the cache without scanning
    Report {
        /// Fingerprint cache file
        #[arg(long)]
        cache: Option<PathBuf>,

        /// Duplicate report file
        #[arg(long, default_value = DEFAULT_REPORT_FILE)]
        report: PathBuf,
    },

    /// Show fingerprint cache statistics
    CacheStats {
        /// Fingerprint cache file
        #[arg(long)]
        cache: Option<PathBuf>,
    },
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum Algorithm {
    /// Average Hash - Fast, good for exact duplicates
    Average,
    /// Difference Hash - Good balance
    Difference,
    /// Double gradient - Slower, more bits per row
    Gradient,
    /// Perceptual Hash - Most robust to edits (default)
    Perceptual,
}

impl From<Algorithm> for HashAlgorithmKind {
    fn from(algo: Algorithm) -> Self {
        match algo {
            Algorithm::Average => HashAlgorithmKind::Average,
            Algorithm::Difference => HashAlgorithmKind::Difference,
            Algorithm::Gradient => HashAlgorithmKind::DoubleGradient,
            Algorithm::Perceptual => HashAlgorithmKind::Perceptual,
        }
    }
}

struct ScanArgs {
    root: PathBuf,
    hash_size: u32,
    workers: usize,
    algorithm: HashAlgorithmKind,
    extensions: Option<Vec<String>>,
    skip_hidden: bool,
    cache: PathBuf,
    report: PathBuf,
    verbose: bool,
}

/// Run the CLI
pub fn run() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Scan {
            root,
            hash_size,
            workers,
            algorithm,
            extensions,
            skip_hidden,
            cache,
            report,
            verbose,
        } => {
            photo_dedup::init_tracing(if verbose { "debug" } else { "warn" });
            run_scan(ScanArgs {
                root,
                hash_size,
                workers,
                algorithm: algorithm.into(),
                extensions,
                skip_hidden,
                cache: cache_path(cache),
                report,
                verbose,
            })
        }
        Commands::Report { cache, report } => {
            photo_dedup::init_tracing("warn");
            run_report(cache_path(cache), report)
        }
        Commands::CacheStats { cache } => {
            photo_dedup::init_tracing("warn");
            run_cache_stats(cache_path(cache))
        }
    }
}

fn cache_path(cache: Option<PathBuf>) -> PathBuf {
    cache.unwrap_or_else(JsonCacheStore::default_path)
}

fn run_scan(args: ScanArgs) -> Result<()> {
    let term = Term::stderr();

    term.write_line(&format!(
        "{} {}",
        style("Photo Dedup").bold().cyan(),
        style(concat!("v", env!("CARGO_PKG_VERSION"))).dim()
    ))
    .ok();
    term.write_line("").ok();

    let mut builder = Pipeline::builder()
        .root(&args.root)
        .hash_size(args.hash_size)
        .worker_count(args.workers)
        .algorithm(args.algorithm)
        .include_hidden(!args.skip_hidden)
        .cache_path(&args.cache)
        .report_path(&args.report);

    if let Some(extensions) = args.extensions {
        builder = builder.allowed_extensions(extensions);
    }

    let pipeline = builder.build();

    // Set up event handling
    let (sender, receiver) = EventChannel::new();

    let pb = ProgressBar::new(0);
    if let Ok(bar_style) =
        ProgressStyle::default_bar().template("{spinner:.green} [{bar:40.cyan/blue}] {pos}/{len} {msg}")
    {
        pb.set_style(bar_style.progress_chars("█▓░"));
    }

    let progress = pb.clone();
    let verbose = args.verbose;

    // Handle events in a separate thread
    let event_thread = thread::spawn(move || {
        for event in receiver.iter() {
            match event {
                Event::Pipeline(PipelineEvent::PhaseChanged { phase }) => {
                    progress.set_message(format!("{}", phase));
                }
                Event::Hash(HashEvent::Started { total_photos, .. }) => {
                    progress.set_length(total_photos as u64);
                    progress.set_position(0);
                }
                Event::Hash(HashEvent::Progress(p)) => {
                    progress.set_position(p.completed as u64);
                    if verbose {
                        progress.set_message(
                            p.current_path
                                .file_name()
                                .unwrap_or_default()
                                .to_string_lossy()
                                .into_owned(),
                        );
                    }
                }
                Event::Pipeline(PipelineEvent::Completed { .. })
                | Event::Pipeline(PipelineEvent::Error { .. }) => {
                    progress.finish_and_clear();
                }
                _ => {}
            }
        }
    });

    // Run the pipeline
    let result = pipeline.run_with_events(&sender);

    // Drop sender to signal event thread to finish
    drop(sender);
    event_thread.join().ok();

    let result = result?;
    print_summary(&term, &result, &args.report, args.verbose);

    Ok(())
}

fn print_summary(term: &Term, result: &PipelineResult, report: &Path, verbose: bool) {
    let summary = &result.summary;

    term.write_line(&format!("{} Scan Complete", style("✓").green().bold()))
        .ok();
    term.write_line("").ok();

    term.write_line(&format!(
        "  {} images scanned in {:.1}s",
        style(summary.scanned).cyan(),
        summary.duration_ms as f64 / 1000.0
    ))
    .ok();
    term.write_line(&format!(
        "  {} already cached",
        style(summary.already_cached).dim()
    ))
    .ok();
    term.write_line(&format!(
        "  {} newly hashed",
        style(summary.newly_hashed).cyan()
    ))
    .ok();
    if summary.unhashable > 0 {
        term.write_line(&format!(
            "  {} could not be hashed",
            style(summary.unhashable).yellow()
        ))
        .ok();
    }
    term.write_line(&format!(
        "  {} duplicate groups",
        style(summary.duplicate_groups).cyan()
    ))
    .ok();

    let duplicate_count: usize = result.groups.iter().map(|g| g.duplicate_count()).sum();
    if duplicate_count > 0 {
        term.write_line(&format!(
            "  {} redundant copies",
            style(duplicate_count).cyan()
        ))
        .ok();
    }

    if !result.errors.is_empty() {
        term.write_line(&format!(
            "  {} paths skipped during scan",
            style(result.errors.len()).yellow()
        ))
        .ok();
        if verbose {
            for error in &result.errors {
                term.write_line(&format!("    {}", style(error).dim())).ok();
            }
        }
    }

    if verbose {
        for (i, group) in result.groups.iter().enumerate() {
            term.write_line("").ok();
            term.write_line(&format!(
                "  {} {} ({} photos)",
                style(format!("Group {}:", i + 1)).bold(),
                style(&group.fingerprint).yellow(),
                group.photos.len()
            ))
            .ok();
            for photo in &group.photos {
                term.write_line(&format!("    {} {}", style("○").dim(), photo.display()))
                    .ok();
            }
        }
    }

    term.write_line("").ok();
    term.write_line(&format!(
        "Report written to {}",
        style(report.display()).bold()
    ))
    .ok();
    term.write_line(&format!(
        "{}",
        style("No files were deleted. Review the report before taking action.").dim()
    ))
    .ok();
}

fn run_report(cache: PathBuf, report: PathBuf) -> Result<()> {
    let term = Term::stderr();

    let pipeline = Pipeline::builder()
        .cache_path(&cache)
        .report_path(&report)
        .build();
    let groups = pipeline.rebuild_report()?;

    term.write_line(&format!(
        "{} {} duplicate groups written to {}",
        style("✓").green().bold(),
        style(groups.len()).cyan(),
        style(report.display()).bold()
    ))
    .ok();

    Ok(())
}

fn run_cache_stats(cache: PathBuf) -> Result<()> {
    let term = Term::stdout();
    let store = JsonCacheStore::new(&cache);
    let stats = store.load()?.stats();

    term.write_line(&format!("{}", style(store.describe()).bold()))
        .ok();
    term.write_line(&format!(
        "  {} entries",
        style(stats.total_entries).cyan()
    ))
    .ok();
    term.write_line(&format!(
        "  {} distinct fingerprints",
        style(stats.distinct_fingerprints).cyan()
    ))
    .ok();

    Ok(())
}
