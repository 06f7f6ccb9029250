//! Event type definitions for progress reporting.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// All events emitted by the import pipeline
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Event {
    /// Traversal events
    Scan(ScanEvent),
    /// Metadata extraction events
    Extract(ExtractEvent),
    /// Planning decisions
    Plan(PlanEvent),
    /// Copy/move execution events
    Import(ImportEvent),
    /// Pipeline-level events
    Pipeline(PipelineEvent),
}

/// Events during traversal
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum ScanEvent {
    /// Traversal has started
    Started { paths: Vec<PathBuf> },
    /// A directory was listed
    Progress(ScanProgress),
    /// A tolerated filesystem error
    Error { path: PathBuf, message: String },
    /// Traversal completed
    Completed { total_files: usize },
}

/// Progress information during traversal
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScanProgress {
    /// Number of directories listed so far
    pub directories_scanned: usize,
    /// Number of regular files found so far
    pub files_found: usize,
    /// Directory being listed
    pub current_path: PathBuf,
}

/// Events during metadata extraction
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum ExtractEvent {
    /// Extraction has started
    Started { total_files: usize },
    /// A file was processed
    Progress(ExtractProgress),
    /// A file is not an importable photo
    Skipped { path: PathBuf, reason: String },
    /// Extraction completed
    Completed { extracted: usize, skipped: usize },
}

/// Progress information during extraction
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExtractProgress {
    /// Files processed so far
    pub completed: usize,
    /// Files to process
    pub total: usize,
    /// File just processed
    pub current_path: PathBuf,
}

/// Planning decisions, one per extracted photo
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum PlanEvent {
    /// The photo will be imported
    Import { source: PathBuf, destination: PathBuf },
    /// The photo's content is already present
    AlreadyPresent { source: PathBuf },
}

/// Events while executing a plan
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum ImportEvent {
    /// Execution has started
    Started { total: usize },
    /// A file was handled
    Progress { completed: usize, total: usize },
    /// A file failed to import
    Failed { source: PathBuf, message: String },
    /// Execution completed
    Completed { imported: usize, failed: usize },
}

/// Pipeline-level events
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum PipelineEvent {
    /// Pipeline has started
    Started,
    /// Moving to a new phase
    PhaseChanged { phase: PipelinePhase },
    /// Pipeline completed successfully
    Completed { summary: PipelineSummary },
    /// Pipeline encountered a fatal error
    Error { message: String },
}

/// Phases of the pipeline
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PipelinePhase {
    Scanning,
    Planning,
    Importing,
}

/// Summary of pipeline results
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineSummary {
    /// Regular files visited
    pub files_scanned: usize,
    /// Photos with a usable capture date
    pub photos_found: usize,
    /// Photos planned for import
    pub to_import: usize,
    /// Photos whose content was already present
    pub already_present: usize,
    /// Whether copying was suppressed
    pub dry_run: bool,
    /// Duration in milliseconds
    pub duration_ms: u64,
}

impl std::fmt::Display for PipelinePhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PipelinePhase::Scanning => write!(f, "Scanning"),
            PipelinePhase::Planning => write!(f, "Checking repository"),
            PipelinePhase::Importing => write!(f, "Importing"),
        }
    }
}
