//! Configuration types and defaults for reclaim.

use serde::{Deserialize, Serialize};

/// Placeholder replaced by the candidate path in trash command templates.
pub const PATH_PLACEHOLDER: &str = "{path}";

/// Per-platform overrides for the external trash commands.
///
/// Each entry is a command template (shell-words parsed, no shell) containing
/// `{path}`. When a list is non-empty it replaces the built-in command
/// strategies for that platform; the manual relocation fallback stays last.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrashCommands {
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub macos: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub linux: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub windows: Vec<String>,
}

impl TrashCommands {
    /// All templates across platforms, for validation.
    pub fn all(&self) -> impl Iterator<Item = &String> {
        self.macos
            .iter()
            .chain(self.linux.iter())
            .chain(self.windows.iter())
    }
}

// Default value functions for serde
pub(crate) fn default_retention_days() -> u32 {
    30
}
pub(crate) fn default_trash_timeout_secs() -> u64 {
    10
}
pub(crate) fn default_large_directory_threshold() -> usize {
    1000
}
pub(crate) fn default_size_warning_bytes() -> u64 {
    1024 * 1024 * 1024
}
