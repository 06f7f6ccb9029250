//! Executor for import plans.

use super::types::*;
use std::collections::HashSet;
use std::fs::{self, File, OpenOptions};
use std::io;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};
use tracing::warn;

/// Executes import plans
pub struct ImportExecutor;

enum Outcome {
    Imported {
        bytes: u64,
        removal_error: Option<io::Error>,
    },
    /// Destination already existed when we tried to create it
    Present,
}

impl ImportExecutor {
    /// Execute every import action of a plan with a progress callback.
    ///
    /// A failing file is recorded and the remaining files are still
    /// imported.
    pub fn execute<F>(plan: &ImportPlan, operation: OperationMode, mut on_progress: F) -> ImportResult
    where
        F: FnMut(usize, usize, &Path),
    {
        let start = Instant::now();
        let mut last_progress = Instant::now();
        const PROGRESS_INTERVAL: Duration = Duration::from_millis(100);

        let total = plan.import_count;
        let mut result = ImportResult::default();
        let mut created_dirs: HashSet<PathBuf> = HashSet::new();

        for (i, action) in plan.imports().enumerate() {
            let now = Instant::now();
            if now.duration_since(last_progress) >= PROGRESS_INTERVAL {
                on_progress(i + 1, total, &action.source);
                last_progress = now;
            }

            // Create the bucket if needed
            if let Some(parent) = action.destination.parent() {
                if !created_dirs.contains(parent) {
                    let existed = parent.is_dir();
                    if let Err(e) = fs::create_dir_all(parent) {
                        result.failures.push(Self::failure(
                            action,
                            format!("Failed to create {}: {}", parent.display(), e),
                        ));
                        continue;
                    }
                    created_dirs.insert(parent.to_path_buf());
                    if !existed {
                        result.folders_created += 1;
                    }
                }
            }

            match Self::import_one(action, operation) {
                Ok(Outcome::Imported {
                    bytes,
                    removal_error,
                }) => {
                    result.files_imported += 1;
                    result.total_size_bytes += bytes;
                    match removal_error {
                        None if operation == OperationMode::Move => result.sources_removed += 1,
                        None => {}
                        Some(e) => {
                            warn!(source = %action.source.display(), "imported but not removed: {}", e);
                            result.failures.push(Self::failure(
                                action,
                                format!("Imported, but failed to remove source: {}", e),
                            ));
                        }
                    }
                }
                Ok(Outcome::Present) => result.already_present += 1,
                Err(e) => {
                    warn!(source = %action.source.display(), "import failed: {}", e);
                    result.failures.push(Self::failure(action, e.to_string()));
                }
            }
        }

        on_progress(total, total, Path::new(""));

        result.duration_ms = start.elapsed().as_millis() as u64;
        result
    }

    fn import_one(action: &ImportAction, operation: OperationMode) -> io::Result<Outcome> {
        let mut source = File::open(&action.source)?;

        // Never overwrite: an existing destination already holds this content
        let mut dest = match OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&action.destination)
        {
            Ok(file) => file,
            Err(e) if e.kind() == io::ErrorKind::AlreadyExists => return Ok(Outcome::Present),
            Err(e) => return Err(e),
        };

        let copied = io::copy(&mut source, &mut dest).and_then(|n| dest.sync_all().map(|_| n));
        drop(dest);
        let bytes = match copied {
            Ok(n) => n,
            Err(e) => {
                let _ = fs::remove_file(&action.destination);
                return Err(e);
            }
        };

        if operation == OperationMode::Copy {
            return Ok(Outcome::Imported {
                bytes,
                removal_error: None,
            });
        }

        // Verify destination size matches source before deleting
        let source_size = source.metadata()?.len();
        let dest_size = fs::metadata(&action.destination)?.len();
        if dest_size != source_size {
            let _ = fs::remove_file(&action.destination);
            return Err(io::Error::new(
                io::ErrorKind::Other,
                format!(
                    "Copy verification failed: source {} bytes, dest {} bytes",
                    source_size, dest_size
                ),
            ));
        }
        drop(source);

        Ok(Outcome::Imported {
            bytes,
            removal_error: fs::remove_file(&action.source).err(),
        })
    }

    fn failure(action: &ImportAction, message: String) -> ImportFailure {
        ImportFailure {
            source: action.source.clone(),
            destination: action.destination.clone(),
            message,
        }
    }
}
