//! # pivot
//!
//! Imports TIFF photos into a content-addressed repository, never storing
//! the same bytes twice.
//!
//! ## How It Works
//! - Walk the source trees breadth-first
//! - Keep files that are TIFFs with a capture date (tag 306)
//! - Name each photo by the SHA-256 of its bytes
//! - Skip photos whose name already exists in any repository bucket
//! - Copy the rest to `<repo>/images/<YYYYMMDD>/<hash><ext>`
//!
//! ## Architecture
//! - `core` - The import engine
//! - `events` - Progress reporting over channels
//! - `error` - Typed errors for every stage

pub mod core;
pub mod error;
pub mod events;

// Re-export commonly used types at the crate root
pub use error::{PivotError, Result};

/// Initialize tracing for the application.
///
/// `RUST_LOG` takes precedence over `default_directive`. Logs go to
/// stderr so they never mix with the import report.
pub fn init_tracing(default_directive: &str) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_directive));
    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .finish();
    // Already initialised (e.g. by an embedding application)
    let _ = tracing::subscriber::set_global_default(subscriber);
}
