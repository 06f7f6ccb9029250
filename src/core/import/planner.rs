//! Plan generator for import operations.

use super::types::*;
use crate::core::metadata::Metadata;
use crate::core::repository::{DuplicateCheck, Repository};
use crate::error::DedupError;
use crate::events::{null_sender, Event, EventSender, PlanEvent};
use std::collections::HashMap;
use std::fs;
use std::path::Path;
use tracing::warn;
use uuid::Uuid;

/// Decides, per photo, between importing and skipping
pub struct ImportPlanner<'a> {
    repository: &'a Repository,
    index: &'a dyn DuplicateCheck,
}

impl<'a> ImportPlanner<'a> {
    /// Plan against the repository's own contents
    pub fn new(repository: &'a Repository) -> Self {
        Self {
            repository,
            index: repository,
        }
    }

    /// Use a different duplicate index, keeping the repository layout
    pub fn with_index(mut self, index: &'a dyn DuplicateCheck) -> Self {
        self.index = index;
        self
    }

    pub fn plan(&self, metadata: &[Metadata]) -> Result<ImportPlan, DedupError> {
        self.plan_with_events(metadata, &null_sender())
    }

    /// Build the plan in input order.
    ///
    /// Content already claimed earlier in the same run is reported as a
    /// duplicate before the repository is consulted, so identical files
    /// found twice in one run are imported once.
    pub fn plan_with_events(
        &self,
        metadata: &[Metadata],
        events: &EventSender,
    ) -> Result<ImportPlan, DedupError> {
        let mut entries = Vec::with_capacity(metadata.len());
        let mut first_seen: HashMap<&str, &Path> = HashMap::new();
        let mut import_count = 0;
        let mut total_size = 0u64;

        for record in metadata {
            let source = record.file_path();

            let duplicate_of = if let Some(first) = first_seen.get(record.hash()) {
                Some(DuplicateOf::ThisRun {
                    first: first.to_path_buf(),
                })
            } else if self.index.contains(record)? {
                Some(DuplicateOf::Repository)
            } else {
                None
            };
            first_seen.entry(record.hash()).or_insert(source);

            if let Some(duplicate_of) = duplicate_of {
                events.send(Event::Plan(PlanEvent::AlreadyPresent {
                    source: source.to_path_buf(),
                }));
                entries.push(PlanEntry::AlreadyPresent(AlreadyPresent {
                    source: source.to_path_buf(),
                    hash: record.hash().to_string(),
                    duplicate_of,
                }));
                continue;
            }

            let destination = self.repository.destination_for(record);
            let size = match fs::metadata(source) {
                Ok(meta) => meta.len(),
                Err(e) => {
                    warn!(source = %source.display(), "cannot size planned import: {}", e);
                    0
                }
            };
            total_size += size;
            import_count += 1;

            events.send(Event::Plan(PlanEvent::Import {
                source: source.to_path_buf(),
                destination: destination.clone(),
            }));
            entries.push(PlanEntry::Import(ImportAction {
                source: source.to_path_buf(),
                destination,
                hash: record.hash().to_string(),
                date: record.date().to_string(),
                size_bytes: size,
            }));
        }

        Ok(ImportPlan {
            id: Uuid::new_v4().to_string(),
            total_files: entries.len(),
            already_present_count: entries.len() - import_count,
            import_count,
            total_size_bytes: total_size,
            entries,
        })
    }
}
