//! Deletion orchestration.
//!
//! Validating -> Sizing -> (DryRunReport | Routing) -> Reporting, where
//! routing prefers the OS trash and falls back to the quarantine per path.

mod deleter;
mod types;


pub use deleter::{Candidate, DeletionPlan, SafeDeleter};
pub use types::{DeletionMethod, DeletionOptions, DeletionResult};
