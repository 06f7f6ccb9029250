//! Breadth-first traversal feeding the metadata extractor.

use super::{SkippedFile, WalkResult};
use crate::core::metadata::{extract_metadata, Metadata};
use crate::error::{ExtractError, WalkError};
use crate::events::{
    null_sender, Event, EventSender, ExtractEvent, ExtractProgress, ScanEvent, ScanProgress,
};
use rayon::prelude::*;
use std::collections::{HashSet, VecDeque};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use tracing::{debug, warn};

/// Configuration for the tree walker
#[derive(Debug, Clone, Default)]
pub struct ScanConfig {
    /// Whether to follow symbolic links below the roots
    pub follow_symlinks: bool,
    /// Abort on the first filesystem error instead of skipping the entry
    pub strict: bool,
}

/// Regular files found by traversal, in visit order
struct Discovery {
    files: Vec<PathBuf>,
    directories: usize,
}

/// Walks source trees and extracts import records
pub struct TreeWalker {
    config: ScanConfig,
}

impl TreeWalker {
    /// Create a new walker with the given configuration
    pub fn new(config: ScanConfig) -> Self {
        Self { config }
    }

    /// Walk `roots` without progress reporting
    pub fn walk(&self, roots: &[PathBuf]) -> Result<WalkResult, WalkError> {
        self.walk_with_events(roots, &null_sender())
    }

    /// Walk `roots`, returning the records of every importable photo in
    /// discovery order.
    pub fn walk_with_events(
        &self,
        roots: &[PathBuf],
        events: &EventSender,
    ) -> Result<WalkResult, WalkError> {
        let mut errors = Vec::new();

        events.send(Event::Scan(ScanEvent::Started {
            paths: roots.to_vec(),
        }));
        let discovery = self.discover(roots, &mut errors, events)?;
        events.send(Event::Scan(ScanEvent::Completed {
            total_files: discovery.files.len(),
        }));

        let (metadata, skipped) = self.extract_all(&discovery.files, &mut errors, events)?;

        Ok(WalkResult {
            metadata,
            skipped,
            errors,
            files_visited: discovery.files.len(),
            directories_visited: discovery.directories,
        })
    }

    fn discover(
        &self,
        roots: &[PathBuf],
        errors: &mut Vec<WalkError>,
        events: &EventSender,
    ) -> Result<Discovery, WalkError> {
        // (path, is_root): roots are always resolved, like a shell would
        let mut queue: VecDeque<(PathBuf, bool)> =
            roots.iter().map(|root| (root.clone(), true)).collect();
        let mut visited_dirs: HashSet<PathBuf> = HashSet::new();
        let mut files = Vec::new();
        let mut directories = 0;

        while let Some((path, is_root)) = queue.pop_front() {
            let metadata = match self.stat(&path, is_root) {
                Ok(Some(metadata)) => metadata,
                Ok(None) => continue,
                Err(source) if is_root && source.kind() == io::ErrorKind::NotFound => {
                    self.tolerate(WalkError::RootNotFound { path }, errors, events)?;
                    continue;
                }
                Err(source) => {
                    self.tolerate(WalkError::Stat { path, source }, errors, events)?;
                    continue;
                }
            };

            if metadata.is_file() {
                files.push(path);
                continue;
            }

            if !metadata.is_dir() {
                debug!(path = %path.display(), "skipping special file");
                continue;
            }

            if self.config.follow_symlinks {
                match fs::canonicalize(&path) {
                    Ok(canonical) => {
                        if !visited_dirs.insert(canonical) {
                            debug!(path = %path.display(), "directory already visited");
                            continue;
                        }
                    }
                    Err(source) => {
                        self.tolerate(WalkError::Stat { path, source }, errors, events)?;
                        continue;
                    }
                }
            }

            directories += 1;
            match fs::read_dir(&path) {
                Ok(entries) => {
                    let mut names = Vec::new();
                    for entry in entries {
                        match entry {
                            Ok(entry) => names.push(entry.file_name()),
                            Err(source) => {
                                let error = WalkError::ReadDirectory {
                                    path: path.clone(),
                                    source,
                                };
                                self.tolerate(error, errors, events)?;
                            }
                        }
                    }
                    // Listing order is filesystem-dependent
                    names.sort();
                    queue.extend(names.into_iter().map(|name| (path.join(name), false)));
                }
                Err(source) => {
                    let error = WalkError::ReadDirectory {
                        path: path.clone(),
                        source,
                    };
                    self.tolerate(error, errors, events)?;
                }
            }

            events.send(Event::Scan(ScanEvent::Progress(ScanProgress {
                directories_scanned: directories,
                files_found: files.len(),
                current_path: path,
            })));
        }

        Ok(Discovery { files, directories })
    }

    /// Stat `path`, returning `None` for symlinks that should not be followed
    fn stat(&self, path: &Path, is_root: bool) -> io::Result<Option<fs::Metadata>> {
        let metadata = fs::symlink_metadata(path)?;
        if !metadata.file_type().is_symlink() {
            return Ok(Some(metadata));
        }
        if !is_root && !self.config.follow_symlinks {
            debug!(path = %path.display(), "skipping symbolic link");
            return Ok(None);
        }
        fs::metadata(path).map(Some)
    }

    fn extract_all(
        &self,
        files: &[PathBuf],
        errors: &mut Vec<WalkError>,
        events: &EventSender,
    ) -> Result<(Vec<Metadata>, Vec<SkippedFile>), WalkError> {
        let total = files.len();
        events.send(Event::Extract(ExtractEvent::Started { total_files: total }));

        let completed = AtomicUsize::new(0);

        // Order-preserving, so results stay in discovery order
        let results: Vec<Result<Metadata, ExtractError>> = files
            .par_iter()
            .map(|path| {
                let result = extract_metadata(path);
                let done = completed.fetch_add(1, Ordering::SeqCst) + 1;
                events.send(Event::Extract(ExtractEvent::Progress(ExtractProgress {
                    completed: done,
                    total,
                    current_path: path.clone(),
                })));
                result
            })
            .collect();

        let mut metadata = Vec::new();
        let mut skipped = Vec::new();

        for result in results {
            match result {
                Ok(record) => metadata.push(record),
                Err(e) if e.is_skippable() => {
                    debug!(path = %e.path().display(), reason = %e, "skipping file");
                    events.send(Event::Extract(ExtractEvent::Skipped {
                        path: e.path().clone(),
                        reason: e.to_string(),
                    }));
                    skipped.push(SkippedFile {
                        path: e.path().clone(),
                        reason: e.to_string(),
                    });
                }
                Err(e) => self.tolerate(e.into(), errors, events)?,
            }
        }

        events.send(Event::Extract(ExtractEvent::Completed {
            extracted: metadata.len(),
            skipped: skipped.len(),
        }));

        Ok((metadata, skipped))
    }

    /// Abort in strict mode, otherwise record the error and carry on
    fn tolerate(
        &self,
        error: WalkError,
        errors: &mut Vec<WalkError>,
        events: &EventSender,
    ) -> Result<(), WalkError> {
        if self.config.strict {
            return Err(error);
        }

        warn!("{}", error);
        events.send(Event::Scan(ScanEvent::Error {
            path: error_path(&error),
            message: error.to_string(),
        }));
        errors.push(error);
        Ok(())
    }
}

fn error_path(error: &WalkError) -> PathBuf {
    match error {
        WalkError::RootNotFound { path }
        | WalkError::Stat { path, .. }
        | WalkError::ReadDirectory { path, .. } => path.clone(),
        WalkError::Extract(e) => e.path().clone(),
    }
}
