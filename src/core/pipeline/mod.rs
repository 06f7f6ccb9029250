//! # Pipeline Module
//!
//! Orchestrates a full import run.
//!
//! ## Phases
//! 1. **Scanning** - breadth-first walk, metadata extracted in parallel
//! 2. **Planning** - duplicate check per photo, in discovery order
//! 3. **Importing** - copy (or move) new photos; skipped on a dry run

mod executor;

pub use executor::{Pipeline, PipelineBuilder, PipelineConfig, PipelineResult};
