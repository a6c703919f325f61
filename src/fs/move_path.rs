//! Relocation helpers.
//!
//! Quarantine, manual trash fallbacks and restore all "move" a file or a whole
//! directory tree. On the same filesystem this is a single `rename(2)`. Trash
//! and quarantine roots can live on another volume than the candidate, which
//! surfaces `EXDEV` ("Invalid cross-device link"); for those cases we fall back
//! to a recursive copy followed by removal of the source.
//!
//! Callers choose a destination that does not exist yet; these helpers never
//! resolve name collisions themselves.

use crate::error::{ReclaimError, Result};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// Move a file, symlink or directory tree from `source` to `destination`.
///
/// - Creates missing parent directories of `destination`.
/// - Tries `rename()` first.
/// - Falls back to copy + delete on EXDEV.
pub async fn move_path(source: &Path, destination: &Path) -> Result<()> {
    if let Some(parent) = destination.parent() {
        tokio::fs::create_dir_all(parent)
            .await
            .map_err(|e| ReclaimError::io(parent, e))?;
    }

    match tokio::fs::rename(source, destination).await {
        Ok(()) => Ok(()),
        Err(e) if is_cross_device_rename(&e) => {
            tracing::debug!(
                source = %source.display(),
                destination = %destination.display(),
                "rename crossed devices, copying instead"
            );
            let source = source.to_path_buf();
            let destination = destination.to_path_buf();
            tokio::task::spawn_blocking(move || move_cross_device(&source, &destination))
                .await
                .map_err(|e| ReclaimError::UserError(format!("copy task failed: {}", e)))?
        }
        Err(e) => Err(ReclaimError::io(source, e)),
    }
}

/// Permanently remove a file, symlink or directory tree.
pub async fn remove_path(path: &Path) -> Result<()> {
    let metadata = tokio::fs::symlink_metadata(path)
        .await
        .map_err(|e| ReclaimError::io(path, e))?;

    let removed = if metadata.is_dir() {
        tokio::fs::remove_dir_all(path).await
    } else {
        tokio::fs::remove_file(path).await
    };
    removed.map_err(|e| ReclaimError::io(path, e))
}

fn move_cross_device(source: &Path, destination: &Path) -> Result<()> {
    if let Err(e) = copy_tree(source, destination) {
        // Leave the source untouched; drop whatever partial copy was made.
        let _ = remove_any(destination);
        return Err(e);
    }

    remove_any(source).map_err(|e| ReclaimError::io(source, e))
}

fn copy_tree(source: &Path, destination: &Path) -> Result<()> {
    for entry in WalkDir::new(source)
        .follow_links(false)
        .follow_root_links(false)
    {
        let entry = entry.map_err(|e| {
            let path = e.path().map(Path::to_path_buf).unwrap_or_else(|| source.to_path_buf());
            ReclaimError::io(path, io::Error::other(e.to_string()))
        })?;
        let relative = entry
            .path()
            .strip_prefix(source)
            .map_err(|e| ReclaimError::UserError(e.to_string()))?;
        let target: PathBuf = if relative.as_os_str().is_empty() {
            destination.to_path_buf()
        } else {
            destination.join(relative)
        };

        let file_type = entry.file_type();
        if file_type.is_dir() {
            fs::create_dir_all(&target).map_err(|e| ReclaimError::io(&target, e))?;
        } else if file_type.is_symlink() {
            copy_symlink(entry.path(), &target)?;
        } else {
            fs::copy(entry.path(), &target).map_err(|e| ReclaimError::io(&target, e))?;
        }
    }
    Ok(())
}

#[cfg(unix)]
fn copy_symlink(link: &Path, target: &Path) -> Result<()> {
    let pointee = fs::read_link(link).map_err(|e| ReclaimError::io(link, e))?;
    std::os::unix::fs::symlink(pointee, target).map_err(|e| ReclaimError::io(target, e))
}

#[cfg(not(unix))]
fn copy_symlink(link: &Path, target: &Path) -> Result<()> {
    fs::copy(link, target)
        .map(|_| ())
        .map_err(|e| ReclaimError::io(target, e))
}

fn remove_any(path: &Path) -> io::Result<()> {
    match fs::symlink_metadata(path) {
        Ok(m) if m.is_dir() => fs::remove_dir_all(path),
        Ok(_) => fs::remove_file(path),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
        Err(e) => Err(e),
    }
}

fn is_cross_device_rename(err: &io::Error) -> bool {
    err.kind() == io::ErrorKind::CrossesDevices || err.raw_os_error() == Some(18)
}
