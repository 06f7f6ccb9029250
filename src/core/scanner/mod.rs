//! # Scanner Module
//!
//! Discovers importable photos below one or more source paths.
//!
//! Traversal is breadth-first over an explicit queue, so deep trees never
//! hit a recursion limit. Every regular file is offered to the metadata
//! extractor; files that are not dated TIFFs are skipped quietly.
//!
//! ## Example
//! ```rust,ignore
//! use pivot::core::scanner::{ScanConfig, TreeWalker};
//!
//! let walker = TreeWalker::new(ScanConfig::default());
//! let result = walker.walk(&["/Volumes/CARD/DCIM".into()])?;
//! ```

mod walker;

pub use walker::{ScanConfig, TreeWalker};

use crate::core::metadata::Metadata;
use crate::error::WalkError;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// A file that was visited but is not an importable photo
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SkippedFile {
    pub path: PathBuf,
    pub reason: String,
}

/// Result of a walk
#[derive(Debug)]
pub struct WalkResult {
    /// Records of importable photos, in discovery order
    pub metadata: Vec<Metadata>,
    /// Files that are not dated TIFFs
    pub skipped: Vec<SkippedFile>,
    /// Tolerated filesystem errors (always empty in strict mode)
    pub errors: Vec<WalkError>,
    /// Regular files visited
    pub files_visited: usize,
    /// Directories listed
    pub directories_visited: usize,
}
