//! Config struct definition and default implementation.

use super::types::*;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Configuration for reclaim.
///
/// Unknown fields in the YAML are ignored for forward compatibility.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    // =========================================================================
    // Quarantine settings
    // =========================================================================
    /// Quarantine root. Defaults to `<local data dir>/reclaim/quarantine`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub quarantine_dir: Option<PathBuf>,

    /// Days an item stays in quarantine before `cleanup` purges it.
    #[serde(default = "default_retention_days")]
    pub retention_days: u32,

    // =========================================================================
    // Trash settings
    // =========================================================================
    /// Timeout applied to each external trash command invocation.
    #[serde(default = "default_trash_timeout_secs")]
    pub trash_timeout_secs: u64,

    /// Command template overrides per platform.
    #[serde(default)]
    pub trash_commands: TrashCommands,

    // =========================================================================
    // Safety settings
    // =========================================================================
    /// Immediate child count above which a directory gets a cost warning.
    #[serde(default = "default_large_directory_threshold")]
    pub large_directory_threshold: usize,

    /// Total batch size above which the confirmation prompt warns.
    #[serde(default = "default_size_warning_bytes")]
    pub size_warning_bytes: u64,

    /// Additional absolute paths treated as protected system paths.
    #[serde(default)]
    pub extra_system_paths: Vec<PathBuf>,

    /// Additional glob patterns treated as critical user locations.
    #[serde(default)]
    pub extra_critical_patterns: Vec<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            quarantine_dir: None,
            retention_days: default_retention_days(),
            trash_timeout_secs: default_trash_timeout_secs(),
            trash_commands: TrashCommands::default(),
            large_directory_threshold: default_large_directory_threshold(),
            size_warning_bytes: default_size_warning_bytes(),
            extra_system_paths: Vec::new(),
            extra_critical_patterns: Vec::new(),
        }
    }
}
