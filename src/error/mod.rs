//! # Error Module
//!
//! Typed errors for every stage of an import.
//!
//! ## Error Classes
//! - **Configuration** - reported before any traversal starts
//! - **Skippable** - the file is not an importable photo (not a TIFF,
//!   no capture date, unparsable date); it is left out of the results
//! - **Filesystem** - open/read/stat/readdir/hash failures; fatal in strict
//!   mode, warnings otherwise
//! - **Repository** - the duplicate lookup itself failed, always fatal

use std::path::PathBuf;
use thiserror::Error;

/// Top-level application error
#[derive(Error, Debug)]
pub enum PivotError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Traversal error: {0}")]
    Walk(#[from] WalkError),

    #[error("Repository lookup error: {0}")]
    Dedup(#[from] DedupError),

    #[error("Import error: {0}")]
    Import(#[from] ImportError),
}

/// Problems with the run configuration
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("No repository given. Pass --target-directory or set PIVOTDIRECTORY.")]
    MissingRepository,

    #[error("Repository is not a directory: {path}")]
    RepositoryNotADirectory { path: PathBuf },

    #[error("No source paths given")]
    NoRoots,
}

/// Errors from decoding a TIFF tag directory
#[derive(Error, Debug)]
pub enum TagError {
    #[error("not a TIFF container: {reason}")]
    Format { reason: String },

    #[error("failed to read tag data: {0}")]
    Io(#[from] std::io::Error),
}

/// Errors from extracting metadata out of a single file
#[derive(Error, Debug)]
pub enum ExtractError {
    #[error("Failed to open {path}: {source}")]
    Open {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Not a TIFF file {path}: {reason}")]
    NotATiff { path: PathBuf, reason: String },

    #[error("No capture date tag in {path}")]
    TagNotFound { path: PathBuf },

    #[error("Unparsable capture date {value:?} in {path}")]
    BadTimestamp {
        path: PathBuf,
        value: String,
        #[source]
        source: chrono::ParseError,
    },

    #[error("Failed to hash {path}: {source}")]
    Hash {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl ExtractError {
    /// Whether the file should simply be left out of the results.
    ///
    /// These are the expected outcomes for files that are not importable
    /// photos. Everything else points at a filesystem problem.
    pub fn is_skippable(&self) -> bool {
        matches!(
            self,
            ExtractError::NotATiff { .. }
                | ExtractError::TagNotFound { .. }
                | ExtractError::BadTimestamp { .. }
        )
    }

    /// Path of the file the error refers to
    pub fn path(&self) -> &PathBuf {
        match self {
            ExtractError::Open { path, .. }
            | ExtractError::Read { path, .. }
            | ExtractError::NotATiff { path, .. }
            | ExtractError::TagNotFound { path }
            | ExtractError::BadTimestamp { path, .. }
            | ExtractError::Hash { path, .. } => path,
        }
    }
}

/// Errors that occur while walking the source trees
#[derive(Error, Debug)]
pub enum WalkError {
    #[error("Source path not found: {path}")]
    RootNotFound { path: PathBuf },

    #[error("Failed to stat {path}: {source}")]
    Stat {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to read directory {path}: {source}")]
    ReadDirectory {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error(transparent)]
    Extract(#[from] ExtractError),
}

/// Errors from looking up a file in the repository
#[derive(Error, Debug)]
pub enum DedupError {
    #[error("Repository path is not valid UTF-8: {path}")]
    NonUtf8Path { path: PathBuf },

    #[error("Invalid search pattern {pattern}: {source}")]
    Pattern {
        pattern: String,
        #[source]
        source: glob::PatternError,
    },

    #[error("Failed to search repository: {0}")]
    Glob(#[from] glob::GlobError),
}

/// Errors from executing an import plan
#[derive(Error, Debug)]
pub enum ImportError {
    #[error("{failed} of {total} imports failed")]
    Incomplete { failed: usize, total: usize },
}

/// Convenience Result type alias
pub type Result<T> = std::result::Result<T, PivotError>;
