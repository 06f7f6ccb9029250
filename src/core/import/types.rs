//! Types for the import module.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Operation mode
#[derive(Debug, Clone, Copy, Serialize, Deserialize, Default, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum OperationMode {
    /// Copy files into the repository (keep originals)
    #[default]
    Copy,
    /// Copy, verify, then remove the original
    Move,
}

/// A photo that will be copied into the repository
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImportAction {
    pub source: PathBuf,
    pub destination: PathBuf,
    pub hash: String,
    pub date: String,
    pub size_bytes: u64,
}

/// Where an already-present photo's content was found
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DuplicateOf {
    /// Stored in the repository by an earlier import
    Repository,
    /// Claimed by an earlier file of the same run
    ThisRun { first: PathBuf },
}

/// A photo whose content does not need importing
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AlreadyPresent {
    pub source: PathBuf,
    pub hash: String,
    pub duplicate_of: DuplicateOf,
}

/// One planning decision
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "decision", rename_all = "snake_case")]
pub enum PlanEntry {
    Import(ImportAction),
    AlreadyPresent(AlreadyPresent),
}

impl PlanEntry {
    pub fn source(&self) -> &Path {
        match self {
            PlanEntry::Import(action) => &action.source,
            PlanEntry::AlreadyPresent(present) => &present.source,
        }
    }
}

/// The import plan, in discovery order
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImportPlan {
    pub id: String,
    pub entries: Vec<PlanEntry>,
    pub total_files: usize,
    pub import_count: usize,
    pub already_present_count: usize,
    pub total_size_bytes: u64,
}

impl ImportPlan {
    /// Actions to execute, in order
    pub fn imports(&self) -> impl Iterator<Item = &ImportAction> {
        self.entries.iter().filter_map(|entry| match entry {
            PlanEntry::Import(action) => Some(action),
            PlanEntry::AlreadyPresent(_) => None,
        })
    }
}

/// A single failed import
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImportFailure {
    pub source: PathBuf,
    pub destination: PathBuf,
    pub message: String,
}

/// Result of executing the plan
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ImportResult {
    pub files_imported: usize,
    pub folders_created: usize,
    /// Destinations that appeared between planning and copying
    pub already_present: usize,
    pub sources_removed: usize,
    pub total_size_bytes: u64,
    pub duration_ms: u64,
    pub failures: Vec<ImportFailure>,
}
