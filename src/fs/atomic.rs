//! Atomic file writes.
//!
//! The quarantine index is rewritten in full on every structural change, so a
//! crash mid-write must never leave a truncated index behind.
//!
//! # Implementation Strategy
//!
//! 1. Write content to a uniquely named temporary file in the same directory
//! 2. Sync the file to disk (fsync)
//! 3. Rename it over the target
//!
//! `std::fs::rename` replaces an existing destination on both POSIX and
//! Windows, and is atomic when source and destination share a volume, which
//! holds here because the temporary file is a sibling of the target.
//!
//! On crash, a temporary file may remain (named `.{filename}.{uuid}.tmp`).

use crate::error::{ReclaimError, Result};
use serde::Serialize;
use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};
use uuid::Uuid;

/// Atomically write bytes to a file, creating parent directories as needed.
///
/// # Example
///
/// ```no_run
/// use reclaim::fs::atomic_write;
/// use std::path::Path;
///
/// atomic_write(Path::new("index.json"), b"{}")?;
/// # Ok::<(), reclaim::error::ReclaimError>(())
/// ```
pub fn atomic_write<P: AsRef<Path>>(path: P, content: &[u8]) -> Result<()> {
    let path = path.as_ref();

    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
        && !parent.exists()
    {
        fs::create_dir_all(parent).map_err(|e| ReclaimError::io(parent, e))?;
    }

    let temp_path = temp_path_for(path)?;
    write_and_sync(&temp_path, content)?;

    if let Err(e) = fs::rename(&temp_path, path) {
        let _ = fs::remove_file(&temp_path);
        return Err(ReclaimError::io(path, e));
    }

    #[cfg(unix)]
    if let Some(parent) = path.parent()
        && let Ok(dir) = File::open(parent)
    {
        let _ = dir.sync_all();
    }

    Ok(())
}

/// Serialize `value` as pretty JSON and write it atomically.
pub fn atomic_write_json<P: AsRef<Path>, T: Serialize>(path: P, value: &T) -> Result<()> {
    let json = serde_json::to_vec_pretty(value).map_err(|e| {
        ReclaimError::QuarantineError(format!(
            "failed to serialize '{}': {}",
            path.as_ref().display(),
            e
        ))
    })?;
    atomic_write(path, &json)
}

fn temp_path_for(target: &Path) -> Result<PathBuf> {
    let parent = target.parent().unwrap_or(Path::new("."));
    let filename = target
        .file_name()
        .and_then(|n| n.to_str())
        .ok_or_else(|| {
            ReclaimError::UserError(format!("invalid file path: {}", target.display()))
        })?;

    Ok(parent.join(format!(".{}.{}.tmp", filename, Uuid::new_v4().simple())))
}

fn write_and_sync(path: &Path, content: &[u8]) -> Result<()> {
    let mut file = File::create(path).map_err(|e| ReclaimError::io(path, e))?;

    if let Err(e) = file.write_all(content).and_then(|_| file.sync_all()) {
        let _ = fs::remove_file(path);
        return Err(ReclaimError::io(path, e));
    }

    Ok(())
}
