//! # CLI Module
//!
//! Command-line interface for the photo importer.
//!
//! ## Usage
//! ```bash
//! # Import a memory card into a repository
//! pivot --target-directory ~/Pictures/pivot /Volumes/CARD/DCIM
//!
//! # Repository from the environment, glob roots, report only
//! PIVOTDIRECTORY=~/Pictures/pivot pivot --test 'scans/*/roll-*'
//!
//! # Move instead of copy
//! pivot -d ~/Pictures/pivot --remove ~/Downloads/tiffs
//!
//! # JSON output
//! pivot -d ~/Pictures/pivot ~/Photos --output json
//! ```

use clap::{Parser, ValueEnum};
use console::{style, Term};
use indicatif::{ProgressBar, ProgressStyle};
use pivot::core::import::{DuplicateOf, OperationMode, PlanEntry};
use pivot::core::pipeline::{Pipeline, PipelineResult};
use pivot::error::{ConfigError, ImportError, Result};
use pivot::events::{Event, EventChannel, ExtractEvent, ImportEvent, PipelineEvent, ScanEvent};
use std::path::{Path, PathBuf};
use std::thread;
use tracing::warn;

/// pivot - Import TIFF photos into a content-addressed repository
#[derive(Parser, Debug)]
#[command(name = "pivot")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Files, directories or glob patterns to import from
    #[arg(required = true)]
    paths: Vec<String>,

    /// Repository to import into
    #[arg(short = 'd', long = "target-directory", env = "PIVOTDIRECTORY")]
    target_directory: Option<PathBuf>,

    /// Report what would be imported without copying anything
    #[arg(long = "test", visible_alias = "dry-run")]
    test: bool,

    /// Remove each source after it has been copied and verified
    #[arg(long)]
    remove: bool,

    /// Follow symbolic links below the given paths
    #[arg(long)]
    follow_symlinks: bool,

    /// Abort on the first unreadable file or directory
    #[arg(long)]
    strict: bool,

    /// Output format
    #[arg(short, long, default_value = "pretty")]
    output: OutputFormat,

    /// Verbose output
    #[arg(short, long)]
    verbose: bool,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum OutputFormat {
    /// Human-readable output with colors
    Pretty,
    /// JSON output for scripting
    Json,
    /// Minimal output (imported paths only)
    Minimal,
}

/// Run the CLI
pub fn run() -> Result<()> {
    let cli = Cli::parse();

    pivot::init_tracing(if cli.verbose { "pivot=debug" } else { "pivot=warn" });

    let repository = cli
        .target_directory
        .clone()
        .ok_or(ConfigError::MissingRepository)?;
    let operation = if cli.remove {
        OperationMode::Move
    } else {
        OperationMode::Copy
    };

    let pipeline = Pipeline::builder()
        .roots(expand_paths(&cli.paths))
        .repository(repository)
        .dry_run(cli.test)
        .operation(operation)
        .follow_symlinks(cli.follow_symlinks)
        .strict(cli.strict)
        .build()?;

    let term = Term::stderr();
    if matches!(cli.output, OutputFormat::Pretty) {
        term.write_line(&format!(
            "{} {}",
            style("pivot").bold().cyan(),
            style(format!("v{}", env!("CARGO_PKG_VERSION"))).dim()
        ))
        .ok();
        if cli.test {
            term.write_line(&format!("{}", style("Dry run: nothing will be copied").yellow()))
                .ok();
        }
        term.write_line("").ok();
    }

    let (sender, receiver) = EventChannel::new();

    // Progress bar for pretty output
    let progress = if matches!(cli.output, OutputFormat::Pretty) {
        let pb = ProgressBar::new(0);
        pb.set_style(
            ProgressStyle::default_bar()
                .template("{spinner:.green} [{bar:40.cyan/blue}] {pos}/{len} {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_bar())
                .progress_chars("█▓░"),
        );
        Some(pb)
    } else {
        None
    };

    let progress_clone = progress.clone();
    let verbose = cli.verbose;

    // Handle events in a separate thread
    let event_thread = thread::spawn(move || {
        for event in receiver.iter() {
            let Some(ref pb) = progress_clone else {
                continue;
            };
            match event {
                Event::Pipeline(PipelineEvent::PhaseChanged { phase }) => {
                    pb.set_message(format!("{}", phase));
                }
                Event::Scan(ScanEvent::Progress(p)) => {
                    pb.set_message(format!(
                        "Scanning ({} directories, {} files)",
                        p.directories_scanned, p.files_found
                    ));
                    pb.tick();
                }
                Event::Scan(ScanEvent::Error { path, message }) => {
                    pb.suspend(|| {
                        eprintln!(
                            "{} {}: {}",
                            style("warning:").yellow(),
                            display_path(&path),
                            message
                        );
                    });
                }
                Event::Extract(ExtractEvent::Started { total_files }) => {
                    pb.set_length(total_files as u64);
                    pb.set_position(0);
                    pb.set_message("Reading metadata");
                }
                Event::Extract(ExtractEvent::Progress(p)) => {
                    pb.set_position(p.completed as u64);
                    if verbose {
                        pb.set_message(
                            p.current_path
                                .file_name()
                                .unwrap_or_default()
                                .to_string_lossy()
                                .into_owned(),
                        );
                    }
                }
                Event::Import(ImportEvent::Started { total }) => {
                    pb.set_length(total as u64);
                    pb.set_position(0);
                }
                Event::Import(ImportEvent::Progress { completed, .. }) => {
                    pb.set_position(completed as u64);
                }
                Event::Pipeline(PipelineEvent::Completed { .. })
                | Event::Pipeline(PipelineEvent::Error { .. }) => {
                    pb.finish_and_clear();
                }
                _ => {}
            }
        }
    });

    let outcome = pipeline.run_with_events(&sender);

    // Drop sender to signal event thread to finish
    drop(sender);
    event_thread.join().ok();
    if let Some(pb) = progress {
        pb.finish_and_clear();
    }

    let result = outcome?;

    match cli.output {
        OutputFormat::Pretty => print_pretty_results(&result, verbose),
        OutputFormat::Json => print_json_results(&result),
        OutputFormat::Minimal => print_minimal_results(&result),
    }

    let failed = result.failure_count();
    if failed > 0 {
        return Err(ImportError::Incomplete {
            failed,
            total: result.plan.import_count,
        }
        .into());
    }

    Ok(())
}

/// Expand glob patterns; a pattern with no matches is kept as a plain path
fn expand_paths(patterns: &[String]) -> Vec<PathBuf> {
    let mut roots = Vec::new();

    for pattern in patterns {
        let mut matches = Vec::new();
        if let Ok(paths) = glob::glob(pattern) {
            for entry in paths {
                match entry {
                    Ok(path) => matches.push(path),
                    Err(e) => warn!(pattern = %pattern, error = %e, "unreadable glob match"),
                }
            }
        }

        if matches.is_empty() {
            roots.push(PathBuf::from(pattern));
        } else {
            roots.extend(matches);
        }
    }

    roots
}

fn print_pretty_results(result: &PipelineResult, verbose: bool) {
    let out = Term::stdout();
    let err = Term::stderr();

    for entry in &result.plan.entries {
        match entry {
            PlanEntry::Import(action) => {
                out.write_line(&format!(
                    "{} {} {}",
                    display_path(&action.source),
                    style("->").green(),
                    display_path(&action.destination)
                ))
                .ok();
            }
            PlanEntry::AlreadyPresent(present) => {
                let line = match (&present.duplicate_of, verbose) {
                    (DuplicateOf::ThisRun { first }, true) => format!(
                        "{} {} (same content as {})",
                        display_path(&present.source),
                        style("already present").dim(),
                        display_path(first)
                    ),
                    _ => format!(
                        "{} {}",
                        display_path(&present.source),
                        style("already present").dim()
                    ),
                };
                out.write_line(&line).ok();
            }
        }
    }

    if verbose {
        for skipped in &result.skipped {
            err.write_line(&format!(
                "{} {}: {}",
                style("skipped").dim(),
                display_path(&skipped.path),
                skipped.reason
            ))
            .ok();
        }
    }

    if let Some(execution) = &result.execution {
        for failure in &execution.failures {
            err.write_line(&format!(
                "{} {}: {}",
                style("failed").red().bold(),
                display_path(&failure.source),
                failure.message
            ))
            .ok();
        }
    }

    out.write_line("").ok();
    out.write_line(&format!(
        "  {} files scanned in {:.1}s",
        style(result.files_scanned).cyan(),
        result.duration_ms as f64 / 1000.0
    ))
    .ok();
    out.write_line(&format!(
        "  {} photos found, {} skipped",
        style(result.plan.total_files).cyan(),
        style(result.skipped.len()).dim()
    ))
    .ok();

    match &result.execution {
        Some(execution) => {
            out.write_line(&format!(
                "  {} imported ({}), {} already present",
                style(execution.files_imported).green(),
                format_bytes(execution.total_size_bytes),
                style(result.plan.already_present_count + execution.already_present).cyan()
            ))
            .ok();
            if execution.sources_removed > 0 {
                out.write_line(&format!(
                    "  {} sources removed",
                    style(execution.sources_removed).cyan()
                ))
                .ok();
            }
        }
        None => {
            out.write_line(&format!(
                "  {} to import ({}), {} already present",
                style(result.plan.import_count).yellow(),
                format_bytes(result.plan.total_size_bytes),
                style(result.plan.already_present_count).cyan()
            ))
            .ok();
        }
    }

    if !result.errors.is_empty() {
        out.write_line(&format!(
            "  {} paths could not be read",
            style(result.errors.len()).red()
        ))
        .ok();
    }
}

fn print_json_results(result: &PipelineResult) {
    let output = serde_json::json!({
        "dry_run": result.execution.is_none(),
        "files_scanned": result.files_scanned,
        "duration_ms": result.duration_ms,
        "plan": result.plan,
        "execution": result.execution,
        "skipped": result.skipped,
        "errors": result.errors,
    });

    println!("{:#}", output);
}

fn print_minimal_results(result: &PipelineResult) {
    for action in result.plan.imports() {
        println!("{}", action.destination.display());
    }
}

/// Show paths under the home directory as `~/...`
fn display_path(path: &Path) -> String {
    if let Some(home) = dirs::home_dir() {
        if let Ok(rest) = path.strip_prefix(&home) {
            return format!("~/{}", rest.display());
        }
    }
    path.display().to_string()
}

fn format_bytes(bytes: u64) -> String {
    const KB: u64 = 1024;
    const MB: u64 = KB * 1024;
    const GB: u64 = MB * 1024;

    if bytes >= GB {
        format!("{:.1} GB", bytes as f64 / GB as f64)
    } else if bytes >= MB {
        format!("{:.1} MB", bytes as f64 / MB as f64)
    } else if bytes >= KB {
        format!("{:.1} KB", bytes as f64 / KB as f64)
    } else {
        format!("{} bytes", bytes)
    }
}
