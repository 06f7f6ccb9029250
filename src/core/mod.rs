//! # Core Module
//!
//! The import engine, independent of any presentation layer.
//!
//! ## Modules
//! - `tags` - Decodes TIFF tag directories
//! - `metadata` - Builds the import record (capture date + content hash)
//! - `scanner` - Walks source trees and collects records
//! - `repository` - Repository layout and duplicate lookup
//! - `import` - Plans and executes imports
//! - `pipeline` - Orchestrates the full workflow

pub mod import;
pub mod metadata;
pub mod pipeline;
pub mod repository;
pub mod scanner;
pub mod tags;

#[cfg(test)]
pub(crate) mod fixtures;

// Re-export commonly used types
pub use import::{ImportAction, ImportPlan, PlanEntry};
pub use metadata::Metadata;
pub use repository::{DuplicateCheck, Repository};
pub use scanner::WalkResult;
