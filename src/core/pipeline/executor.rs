//! Pipeline execution implementation.

use crate::core::import::{ImportExecutor, ImportPlan, ImportPlanner, ImportResult, OperationMode};
use crate::core::repository::Repository;
use crate::core::scanner::{ScanConfig, SkippedFile, TreeWalker};
use crate::error::{ConfigError, PivotError};
use crate::events::{
    null_sender, Event, EventSender, ImportEvent, PipelineEvent, PipelinePhase, PipelineSummary,
};
use std::path::PathBuf;
use std::time::Instant;
use tracing::info;

/// Result of pipeline execution
#[derive(Debug)]
pub struct PipelineResult {
    /// Decisions for every photo found, in discovery order
    pub plan: ImportPlan,
    /// Outcome of copying; `None` on a dry run
    pub execution: Option<ImportResult>,
    /// Regular files visited
    pub files_scanned: usize,
    /// Files that are not dated TIFFs
    pub skipped: Vec<SkippedFile>,
    /// Tolerated filesystem errors
    pub errors: Vec<String>,
    /// Duration in milliseconds
    pub duration_ms: u64,
}

impl PipelineResult {
    /// Number of imports that did not complete
    pub fn failure_count(&self) -> usize {
        self.execution.as_ref().map_or(0, |e| e.failures.len())
    }
}

/// Configuration for the pipeline
#[derive(Debug, Clone, Default)]
pub struct PipelineConfig {
    /// Source files and directories
    pub roots: Vec<PathBuf>,
    /// Repository root
    pub repository: Option<PathBuf>,
    /// Plan and report without copying
    pub dry_run: bool,
    /// Copy or move
    pub operation: OperationMode,
    /// Traversal configuration
    pub scan_config: ScanConfig,
}

/// Builder for pipeline configuration
#[derive(Default)]
pub struct PipelineBuilder {
    config: PipelineConfig,
}

impl PipelineBuilder {
    /// Create a new pipeline builder
    pub fn new() -> Self {
        Self::default()
    }

    /// Source files and directories to import from
    pub fn roots(mut self, roots: Vec<PathBuf>) -> Self {
        self.config.roots = roots;
        self
    }

    /// Set the repository root
    pub fn repository(mut self, repository: impl Into<PathBuf>) -> Self {
        self.config.repository = Some(repository.into());
        self
    }

    /// Suppress copying and removal
    pub fn dry_run(mut self, dry_run: bool) -> Self {
        self.config.dry_run = dry_run;
        self
    }

    /// Set the operation mode
    pub fn operation(mut self, operation: OperationMode) -> Self {
        self.config.operation = operation;
        self
    }

    /// Follow symbolic links below the roots
    pub fn follow_symlinks(mut self, follow: bool) -> Self {
        self.config.scan_config.follow_symlinks = follow;
        self
    }

    /// Abort on the first filesystem error
    pub fn strict(mut self, strict: bool) -> Self {
        self.config.scan_config.strict = strict;
        self
    }

    /// Validate the configuration and build the pipeline
    pub fn build(self) -> Result<Pipeline, ConfigError> {
        let root = self
            .config
            .repository
            .clone()
            .ok_or(ConfigError::MissingRepository)?;
        if self.config.roots.is_empty() {
            return Err(ConfigError::NoRoots);
        }
        let repository = Repository::open(root)?;

        Ok(Pipeline {
            config: self.config,
            repository,
        })
    }
}

/// The import pipeline
pub struct Pipeline {
    config: PipelineConfig,
    repository: Repository,
}

impl Pipeline {
    /// Create a new pipeline builder
    pub fn builder() -> PipelineBuilder {
        PipelineBuilder::new()
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Run the pipeline without events
    pub fn run(&self) -> Result<PipelineResult, PivotError> {
        self.run_with_events(&null_sender())
    }

    /// Run the pipeline with event reporting
    pub fn run_with_events(&self, events: &EventSender) -> Result<PipelineResult, PivotError> {
        let result = self.run_phases(events);
        if let Err(ref e) = result {
            events.send(Event::Pipeline(PipelineEvent::Error {
                message: e.to_string(),
            }));
        }
        result
    }

    fn run_phases(&self, events: &EventSender) -> Result<PipelineResult, PivotError> {
        let start_time = Instant::now();

        events.send(Event::Pipeline(PipelineEvent::Started));

        // Phase 1: Scanning and extracting
        events.send(Event::Pipeline(PipelineEvent::PhaseChanged {
            phase: PipelinePhase::Scanning,
        }));

        let walker = TreeWalker::new(self.config.scan_config.clone());
        let walk = walker.walk_with_events(&self.config.roots, events)?;
        let errors: Vec<String> = walk.errors.iter().map(|e| e.to_string()).collect();

        info!(
            files = walk.files_visited,
            photos = walk.metadata.len(),
            skipped = walk.skipped.len(),
            "scan complete"
        );

        // Phase 2: Planning
        events.send(Event::Pipeline(PipelineEvent::PhaseChanged {
            phase: PipelinePhase::Planning,
        }));

        let plan = ImportPlanner::new(&self.repository).plan_with_events(&walk.metadata, events)?;

        info!(
            import = plan.import_count,
            present = plan.already_present_count,
            "plan ready"
        );

        // Phase 3: Importing
        let execution = if self.config.dry_run {
            None
        } else {
            events.send(Event::Pipeline(PipelineEvent::PhaseChanged {
                phase: PipelinePhase::Importing,
            }));
            events.send(Event::Import(ImportEvent::Started {
                total: plan.import_count,
            }));

            let result = ImportExecutor::execute(&plan, self.config.operation, |done, total, _| {
                events.send(Event::Import(ImportEvent::Progress {
                    completed: done,
                    total,
                }));
            });

            for failure in &result.failures {
                events.send(Event::Import(ImportEvent::Failed {
                    source: failure.source.clone(),
                    message: failure.message.clone(),
                }));
            }
            events.send(Event::Import(ImportEvent::Completed {
                imported: result.files_imported,
                failed: result.failures.len(),
            }));

            Some(result)
        };

        let duration_ms = start_time.elapsed().as_millis() as u64;

        events.send(Event::Pipeline(PipelineEvent::Completed {
            summary: PipelineSummary {
                files_scanned: walk.files_visited,
                photos_found: walk.metadata.len(),
                to_import: plan.import_count,
                already_present: plan.already_present_count,
                dry_run: self.config.dry_run,
                duration_ms,
            },
        }));

        Ok(PipelineResult {
            plan,
            execution,
            files_scanned: walk.files_visited,
            skipped: walk.skipped,
            errors,
            duration_ms,
        })
    }
}
