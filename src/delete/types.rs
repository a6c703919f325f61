//! Request options and result types for the deletion orchestrator.

use serde::Serialize;
use std::fmt;
use std::path::PathBuf;

/// Per-request behavior switches.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DeletionOptions {
    /// Report what would happen without touching anything.
    pub dry_run: bool,
    /// Prefer the OS trash over the quarantine.
    pub use_trash: bool,
    /// Proceed past blocking system paths (they are skipped, never deleted)
    /// and bypass the confirmation callback.
    pub skip_confirmation: bool,
    /// Route through the quarantine even when trash is requested.
    pub retain_in_quarantine: bool,
    /// Ask the confirmation callback before mutating anything.
    pub interactive: bool,
}

impl Default for DeletionOptions {
    fn default() -> Self {
        Self {
            dry_run: false,
            use_trash: true,
            skip_confirmation: false,
            retain_in_quarantine: false,
            interactive: false,
        }
    }
}

impl DeletionOptions {
    /// Where items go when everything works.
    pub fn preferred_method(&self) -> DeletionMethod {
        if self.use_trash && !self.retain_in_quarantine {
            DeletionMethod::Trash
        } else {
            DeletionMethod::Quarantine
        }
    }
}

/// Where deleted items ended up.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DeletionMethod {
    #[default]
    Trash,
    Quarantine,
}

impl DeletionMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            DeletionMethod::Trash => "trash",
            DeletionMethod::Quarantine => "quarantine",
        }
    }
}

impl fmt::Display for DeletionMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Outcome of one orchestrator invocation. Never persisted.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DeletionResult {
    pub success: bool,
    /// Paths (as supplied) that were, or in a dry run would be, removed.
    pub processed_paths: Vec<PathBuf>,
    /// Paths (as supplied) that were skipped or could not be removed.
    pub failed_paths: Vec<PathBuf>,
    /// Bytes of the paths that passed validation.
    pub total_size: u64,
    pub method: DeletionMethod,
    pub dry_run: bool,
    /// The batch was refused because it named system paths.
    pub blocked: bool,
    pub errors: Vec<String>,
    /// Validation warnings for the batch.
    pub warnings: Vec<String>,
    /// Quarantine ids created by this invocation.
    pub quarantine_ids: Vec<String>,
}

impl DeletionResult {
    /// A failed result that touched nothing.
    pub fn rejected(options: &DeletionOptions, errors: Vec<String>) -> Self {
        Self {
            success: false,
            method: options.preferred_method(),
            dry_run: options.dry_run,
            errors,
            ..Default::default()
        }
    }
}
