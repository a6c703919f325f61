//! The quarantine store: relocation into a holding directory plus the index.
//!
//! Layout under the root:
//!
//! ```text
//! <root>/index.json
//! <root>/items/<uuid>_<original name>
//! ```
//!
//! Every structural change loads the whole index, mutates it and writes it
//! back atomically. There is no locking; one process per root is assumed.

use super::types::{EntryMetadata, QuarantineEntry, QuarantineIndex};
use crate::error::{ReclaimError, Result};
use crate::fs::{atomic_write_json, move_path, path_size, remove_path};
use chrono::{DateTime, Duration as ChronoDuration, Utc};
use std::io;
use std::path::{Path, PathBuf};
use uuid::Uuid;

const INDEX_FILE: &str = "index.json";
const ITEMS_DIR: &str = "items";

/// Result of [`QuarantineStore::restore`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RestoreOutcome {
    /// Object moved back; holds the path it landed at.
    Restored(PathBuf),
    /// No entry with that id (already restored, cleared or never existed).
    UnknownId,
    /// The entry exists but its object is gone from the quarantine root.
    MissingObject,
}

impl RestoreOutcome {
    pub fn is_restored(&self) -> bool {
        matches!(self, RestoreOutcome::Restored(_))
    }
}

/// Handle on one quarantine root.
#[derive(Debug, Clone)]
pub struct QuarantineStore {
    root: PathBuf,
}

impl QuarantineStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn items_dir(&self) -> PathBuf {
        self.root.join(ITEMS_DIR)
    }

    pub fn index_path(&self) -> PathBuf {
        self.root.join(INDEX_FILE)
    }

    // =====================================================================
    // Mutations
    // =====================================================================

    /// Move each path into the quarantine and record it.
    ///
    /// Paths that cannot be captured or moved are logged and skipped; the
    /// returned entries cover only what was quarantined. Fails as a whole
    /// only when the items directory cannot be created or the index cannot
    /// be written; in the latter case every object moved by this call is
    /// put back first.
    pub async fn quarantine(&self, paths: &[PathBuf]) -> Result<Vec<QuarantineEntry>> {
        if paths.is_empty() {
            return Ok(Vec::new());
        }

        let items_dir = self.items_dir();
        tokio::fs::create_dir_all(&items_dir)
            .await
            .map_err(|e| ReclaimError::io(&items_dir, e))?;

        let mut index = self.load_for_update().await;
        let mut added = Vec::new();

        for path in paths {
            match self.quarantine_one(path).await {
                Ok(entry) => {
                    tracing::info!(
                        id = %entry.id,
                        path = %path.display(),
                        size = entry.size,
                        "quarantined"
                    );
                    index.insert(entry.clone());
                    added.push(entry);
                }
                Err(e) => {
                    tracing::warn!(path = %path.display(), error = %e, "failed to quarantine, skipping");
                }
            }
        }

        if !added.is_empty()
            && let Err(e) = self.save_index(&mut index).await
        {
            self.roll_back(&added).await;
            return Err(e);
        }
        Ok(added)
    }

    /// Move objects back out of the quarantine after the index could not
    /// record them.
    async fn roll_back(&self, entries: &[QuarantineEntry]) {
        for entry in entries {
            match move_path(&entry.quarantine_path, &entry.original_path).await {
                Ok(()) => {
                    tracing::warn!(id = %entry.id, path = %entry.original_path.display(), "quarantine rolled back");
                }
                Err(e) => {
                    tracing::error!(
                        id = %entry.id,
                        object = %entry.quarantine_path.display(),
                        error = %e,
                        "failed to roll back unindexed quarantine object"
                    );
                }
            }
        }
    }

    async fn quarantine_one(&self, path: &Path) -> Result<QuarantineEntry> {
        let metadata = tokio::fs::symlink_metadata(path)
            .await
            .map_err(|e| ReclaimError::io(path, e))?;
        let captured = EntryMetadata::capture(&metadata);

        let name = path.file_name().ok_or_else(|| {
            ReclaimError::QuarantineError(format!("{} has no file name", path.display()))
        })?;
        let id = Uuid::new_v4().to_string();
        let destination = self
            .items_dir()
            .join(format!("{}_{}", id, name.to_string_lossy()));

        move_path(path, &destination).await?;

        let size = match path_size(destination.clone()).await {
            Ok(size) => size,
            Err(e) => {
                tracing::debug!(path = %destination.display(), error = %e, "cannot size quarantined item");
                0
            }
        };

        Ok(QuarantineEntry {
            id,
            original_path: path.to_path_buf(),
            quarantine_path: destination,
            moved_at: Utc::now(),
            size,
            metadata: captured,
        })
    }

    /// Move a quarantined object back to where it came from.
    ///
    /// When the original location is occupied the object lands at
    /// `<stem>_restored_<N><ext>` for the smallest free N.
    pub async fn restore(&self, id: &str) -> Result<RestoreOutcome> {
        let mut index = self.load_for_update().await;
        let Some(entry) = index.entries.get(id).cloned() else {
            tracing::debug!(id, "restore of unknown quarantine id");
            return Ok(RestoreOutcome::UnknownId);
        };

        if !exists_no_follow(&entry.quarantine_path).await {
            tracing::warn!(
                id,
                path = %entry.quarantine_path.display(),
                "quarantined object is missing"
            );
            return Ok(RestoreOutcome::MissingObject);
        }

        let target = restore_target(&entry.original_path).await?;
        move_path(&entry.quarantine_path, &target).await?;
        apply_permissions(&target, &entry.metadata).await;

        index.entries.remove(id);
        self.save_index(&mut index).await?;

        tracing::info!(id, path = %target.display(), "restored from quarantine");
        Ok(RestoreOutcome::Restored(target))
    }

    /// Permanently delete entries older than `retention_days`.
    pub async fn cleanup(&self, retention_days: u32) -> Result<usize> {
        // A retention reaching before the representable range expires nothing.
        let cutoff = ChronoDuration::try_days(i64::from(retention_days))
            .and_then(|age| Utc::now().checked_sub_signed(age))
            .unwrap_or(DateTime::<Utc>::MIN_UTC);
        self.cleanup_older_than(cutoff).await
    }

    /// Permanently delete every entry moved strictly before `cutoff`.
    pub async fn cleanup_older_than(&self, cutoff: DateTime<Utc>) -> Result<usize> {
        let mut index = self.load_for_update().await;
        let expired: Vec<QuarantineEntry> = index
            .entries
            .values()
            .filter(|entry| entry.moved_at < cutoff)
            .cloned()
            .collect();

        let mut removed = 0;
        for entry in expired {
            if self.purge_object(&entry).await {
                index.entries.remove(&entry.id);
                removed += 1;
            }
        }

        if removed > 0 {
            self.save_index(&mut index).await?;
            tracing::info!(removed, cutoff = %cutoff, "expired quarantine entries deleted");
        }
        Ok(removed)
    }

    /// Permanently delete every quarantined object and empty the index.
    ///
    /// Objects that cannot be removed stay indexed and are not counted.
    pub async fn clear_all(&self) -> Result<usize> {
        let mut index = self.load_for_update().await;
        let entries: Vec<QuarantineEntry> = index.entries.values().cloned().collect();

        let mut cleared = 0;
        for entry in entries {
            if self.purge_object(&entry).await {
                index.entries.remove(&entry.id);
                cleared += 1;
            }
        }

        self.save_index(&mut index).await?;
        tracing::info!(cleared, "quarantine cleared");
        Ok(cleared)
    }

    /// Drop index entries whose object no longer exists.
    pub async fn prune_orphans(&self) -> Result<usize> {
        let mut index = self.load_for_update().await;

        let mut orphans = Vec::new();
        for (id, entry) in &index.entries {
            if !exists_no_follow(&entry.quarantine_path).await {
                orphans.push(id.clone());
            }
        }

        for id in &orphans {
            tracing::warn!(id = %id, "dropping quarantine entry with missing object");
            index.entries.remove(id);
        }

        if !orphans.is_empty() {
            self.save_index(&mut index).await?;
        }
        Ok(orphans.len())
    }

    /// Remove the object behind `entry`. True when it is gone afterwards.
    async fn purge_object(&self, entry: &QuarantineEntry) -> bool {
        match remove_path(&entry.quarantine_path).await {
            Ok(()) => true,
            Err(ReclaimError::Io { source, .. }) if source.kind() == io::ErrorKind::NotFound => true,
            Err(e) => {
                tracing::warn!(id = %entry.id, error = %e, "failed to delete quarantined object");
                false
            }
        }
    }

    // =====================================================================
    // Reads
    // =====================================================================

    /// All entries, oldest first.
    pub async fn list_quarantine(&self) -> Vec<QuarantineEntry> {
        self.load_index().await.sorted_entries()
    }

    pub async fn get_entry(&self, id: &str) -> Option<QuarantineEntry> {
        self.load_index().await.entries.remove(id)
    }

    pub async fn get_total_size(&self) -> u64 {
        self.load_index().await.total_size()
    }

    /// Entries that were quarantined from `original`, oldest first.
    pub async fn find_by_original_path(&self, original: &Path) -> Vec<QuarantineEntry> {
        self.load_index()
            .await
            .sorted_entries()
            .into_iter()
            .filter(|entry| entry.original_path == original)
            .collect()
    }

    // =====================================================================
    // Index persistence
    // =====================================================================

    /// Read the index; absent or unreadable records degrade to empty.
    pub async fn load_index(&self) -> QuarantineIndex {
        match self.read_index().await {
            Ok(Some(index)) => index,
            Ok(None) => QuarantineIndex::empty(),
            Err(e) => {
                tracing::warn!(path = %self.index_path().display(), error = %e, "quarantine index unreadable, treating as empty");
                QuarantineIndex::empty()
            }
        }
    }

    /// Like [`load_index`](Self::load_index), but a corrupt record is moved
    /// aside first so the next write cannot destroy it.
    async fn load_for_update(&self) -> QuarantineIndex {
        match self.read_index().await {
            Ok(Some(index)) => index,
            Ok(None) => QuarantineIndex::empty(),
            Err(e) => {
                let index_path = self.index_path();
                let aside = self.root.join(format!(
                    "index.corrupt-{}.json",
                    Utc::now().format("%Y%m%dT%H%M%S")
                ));
                tracing::warn!(
                    path = %index_path.display(),
                    moved_to = %aside.display(),
                    error = %e,
                    "quarantine index unreadable, starting a new one"
                );
                if let Err(e) = tokio::fs::rename(&index_path, &aside).await {
                    tracing::warn!(error = %e, "failed to set corrupt index aside");
                }
                QuarantineIndex::empty()
            }
        }
    }

    async fn read_index(&self) -> Result<Option<QuarantineIndex>> {
        let path = self.index_path();
        let content = match tokio::fs::read_to_string(&path).await {
            Ok(content) => content,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(ReclaimError::io(&path, e)),
        };

        let index: QuarantineIndex = serde_json::from_str(&content).map_err(|e| {
            ReclaimError::QuarantineError(format!("failed to parse {}: {}", path.display(), e))
        })?;

        if index.version > QuarantineIndex::CURRENT_VERSION {
            tracing::warn!(
                version = index.version,
                supported = QuarantineIndex::CURRENT_VERSION,
                "quarantine index written by a newer version"
            );
        }
        Ok(Some(index))
    }

    /// Stamp and atomically overwrite the index.
    pub(crate) async fn save_index(&self, index: &mut QuarantineIndex) -> Result<()> {
        index.touch();
        let path = self.index_path();
        let snapshot = index.clone();
        tokio::task::spawn_blocking(move || atomic_write_json(&path, &snapshot))
            .await
            .map_err(|e| ReclaimError::QuarantineError(format!("index write task failed: {}", e)))?
    }
}

/// `original` if free, otherwise the first free `_restored_N` variant.
async fn restore_target(original: &Path) -> Result<PathBuf> {
    if !exists_no_follow(original).await {
        return Ok(original.to_path_buf());
    }

    let name = original
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .ok_or_else(|| {
            ReclaimError::QuarantineError(format!("{} has no file name", original.display()))
        })?;
    let (stem, ext) = match name.rfind('.') {
        Some(0) | None => (name.as_str(), ""),
        Some(idx) => name.split_at(idx),
    };

    for n in 1u32.. {
        let candidate = original.with_file_name(format!("{}_restored_{}{}", stem, n, ext));
        if !exists_no_follow(&candidate).await {
            return Ok(candidate);
        }
    }
    Err(ReclaimError::QuarantineError(format!(
        "no free restore name for {}",
        original.display()
    )))
}

async fn exists_no_follow(path: &Path) -> bool {
    tokio::fs::symlink_metadata(path).await.is_ok()
}

/// Re-apply captured mode bits. Best effort: failures are logged.
#[cfg(unix)]
async fn apply_permissions(target: &Path, metadata: &EntryMetadata) {
    use super::types::EntryKind;
    use std::os::unix::fs::PermissionsExt;

    let Some(mode) = metadata.permissions else {
        return;
    };
    if metadata.kind == EntryKind::Symlink {
        return;
    }

    let permissions = std::fs::Permissions::from_mode(mode);
    if let Err(e) = tokio::fs::set_permissions(target, permissions).await {
        tracing::warn!(path = %target.display(), error = %e, "failed to restore permissions");
    }
}

#[cfg(not(unix))]
async fn apply_permissions(target: &Path, metadata: &EntryMetadata) {
    if !metadata.readonly {
        return;
    }
    match tokio::fs::metadata(target).await {
        Ok(current) => {
            let mut permissions = current.permissions();
            permissions.set_readonly(true);
            if let Err(e) = tokio::fs::set_permissions(target, permissions).await {
                tracing::warn!(path = %target.display(), error = %e, "failed to restore permissions");
            }
        }
        Err(e) => tracing::warn!(path = %target.display(), error = %e, "failed to restore permissions"),
    }
}
