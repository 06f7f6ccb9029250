//! Photo import module.
//!
//! Plans which photos need copying into the repository and carries the
//! plan out.

mod executor;
mod planner;
mod types;

pub use executor::ImportExecutor;
pub use planner::ImportPlanner;
pub use types::*;
