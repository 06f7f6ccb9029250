//! # pivot CLI
//!
//! Command-line interface for the photo importer.
//!
//! ## Usage
//! ```bash
//! pivot --target-directory ~/Pictures/pivot /Volumes/CARD/DCIM
//! PIVOTDIRECTORY=~/Pictures/pivot pivot --test 'scans/*/roll-*'
//! ```

mod cli;

use std::process::ExitCode;

fn main() -> ExitCode {
    match cli::run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{} {}", console::style("error:").red().bold(), e);
            ExitCode::FAILURE
        }
    }
}
