//! Reclaim: a safe deletion layer for cleanup tools.
//!
//! Deletion requests pass through four stages:
//! - [`safety`] classifies every path and refuses system locations
//! - [`confirm`] builds a prompt and remembers "always" answers per session
//! - [`delete`] sizes the batch and routes it to the OS trash
//! - [`quarantine`] keeps a restorable copy when the trash is unavailable
//!
//! [`context::ReclaimContext`] wires these together from a [`config::Config`]
//! for the running [`platform::Platform`].

pub mod config;
pub mod confirm;
pub mod context;
pub mod delete;
pub mod error;
pub mod exit_codes;
pub mod fs;
pub mod platform;
pub mod quarantine;
pub mod safety;
pub mod trash;

#[cfg(test)]
mod test_support;

pub use context::ReclaimContext;
pub use delete::{DeletionMethod, DeletionOptions, DeletionResult, SafeDeleter};
pub use error::{ReclaimError, Result};
