//! # Repository Module
//!
//! The managed destination tree and the duplicate lookup against it.
//!
//! ## Layout
//! ```text
//! <root>/images/<YYYYMMDD>/<sha256-hex><ext>
//! ```
//! New photos are bucketed by capture date. Lookups match any bucket name
//! (`<root>/images/*/<name>`), so hand-made buckets are honored as well.

use crate::core::metadata::Metadata;
use crate::error::{ConfigError, DedupError};
use std::path::{Path, PathBuf};

/// Directory below the repository root holding the buckets
pub const IMAGES_DIR: &str = "images";

/// Answers whether a photo's content is already stored somewhere
pub trait DuplicateCheck {
    /// True when a file with the record's content name exists
    fn contains(&self, metadata: &Metadata) -> Result<bool, DedupError>;
}

/// A repository on disk
#[derive(Debug, Clone)]
pub struct Repository {
    root: PathBuf,
}

impl Repository {
    /// Open an existing repository root.
    ///
    /// The `images` directory does not need to exist yet.
    pub fn open(root: impl Into<PathBuf>) -> Result<Self, ConfigError> {
        let root = root.into();
        if !root.is_dir() {
            return Err(ConfigError::RepositoryNotADirectory { path: root });
        }
        Ok(Self { root })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn images_dir(&self) -> PathBuf {
        self.root.join(IMAGES_DIR)
    }

    /// Bucket a photo is imported into
    pub fn bucket_for(&self, metadata: &Metadata) -> PathBuf {
        self.images_dir().join(metadata.date())
    }

    /// Full destination path for a photo
    pub fn destination_for(&self, metadata: &Metadata) -> PathBuf {
        self.bucket_for(metadata).join(metadata.new_file_name())
    }

    /// Glob pattern matching the photo's content name in any bucket
    pub fn search_pattern(&self, metadata: &Metadata) -> Result<String, DedupError> {
        let images = self.images_dir();
        let images = images.to_str().ok_or_else(|| DedupError::NonUtf8Path {
            path: images.clone(),
        })?;
        let name = glob::Pattern::escape(&metadata.new_file_name());
        let pattern = Path::new(&glob::Pattern::escape(images))
            .join("*")
            .join(name);

        Ok(pattern.to_string_lossy().into_owned())
    }
}

impl DuplicateCheck for Repository {
    fn contains(&self, metadata: &Metadata) -> Result<bool, DedupError> {
        let pattern = self.search_pattern(metadata)?;
        let mut matches = glob::glob(&pattern).map_err(|source| DedupError::Pattern {
            pattern: pattern.clone(),
            source,
        })?;

        match matches.next() {
            Some(Ok(_)) => Ok(true),
            Some(Err(e)) => Err(DedupError::Glob(e)),
            None => Ok(false),
        }
    }
}
