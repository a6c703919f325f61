//! Quarantine index records.
//!
//! The index is a single JSON document per quarantine root. Field names are
//! camelCase on disk; timestamps are RFC 3339 strings parsed back into
//! `DateTime<Utc>` on load.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs::Metadata;
use std::path::PathBuf;

/// What kind of filesystem object was quarantined.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntryKind {
    File,
    Directory,
    Symlink,
    Other,
}

/// Attributes captured just before the object was moved.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EntryMetadata {
    pub kind: EntryKind,
    /// Unix mode bits; `None` where the platform has none.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub permissions: Option<u32>,
    #[serde(default)]
    pub readonly: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_modified: Option<DateTime<Utc>>,
}

impl EntryMetadata {
    pub fn capture(metadata: &Metadata) -> Self {
        let file_type = metadata.file_type();
        let kind = if file_type.is_symlink() {
            EntryKind::Symlink
        } else if file_type.is_dir() {
            EntryKind::Directory
        } else if file_type.is_file() {
            EntryKind::File
        } else {
            EntryKind::Other
        };

        #[cfg(unix)]
        let permissions = {
            use std::os::unix::fs::PermissionsExt;
            Some(metadata.permissions().mode() & 0o7777)
        };
        #[cfg(not(unix))]
        let permissions = None;

        Self {
            kind,
            permissions,
            readonly: metadata.permissions().readonly(),
            last_modified: metadata.modified().ok().map(DateTime::<Utc>::from),
        }
    }
}

/// One quarantined object.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuarantineEntry {
    pub id: String,
    pub original_path: PathBuf,
    pub quarantine_path: PathBuf,
    pub moved_at: DateTime<Utc>,
    /// Bytes, measured after the move.
    pub size: u64,
    pub metadata: EntryMetadata,
}

/// The durable record of everything restorable under one quarantine root.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuarantineIndex {
    pub version: u32,
    #[serde(default)]
    pub entries: BTreeMap<String, QuarantineEntry>,
    pub last_updated: DateTime<Utc>,
}

impl QuarantineIndex {
    /// Format version written by this build.
    pub const CURRENT_VERSION: u32 = 1;

    pub fn empty() -> Self {
        Self {
            version: Self::CURRENT_VERSION,
            entries: BTreeMap::new(),
            last_updated: Utc::now(),
        }
    }

    pub fn insert(&mut self, entry: QuarantineEntry) {
        self.entries.insert(entry.id.clone(), entry);
    }

    pub fn total_size(&self) -> u64 {
        self.entries.values().map(|e| e.size).sum()
    }

    /// Entries oldest first.
    pub fn sorted_entries(&self) -> Vec<QuarantineEntry> {
        let mut entries: Vec<_> = self.entries.values().cloned().collect();
        entries.sort_by(|a, b| a.moved_at.cmp(&b.moved_at).then_with(|| a.id.cmp(&b.id)));
        entries
    }

    /// Stamp the record as current before writing it out.
    pub(crate) fn touch(&mut self) {
        self.version = Self::CURRENT_VERSION.max(self.version);
        self.last_updated = Utc::now();
    }
}

impl Default for QuarantineIndex {
    fn default() -> Self {
        Self::empty()
    }
}
