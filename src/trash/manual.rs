//! Last-resort trash strategies that relocate files directly.
//!
//! Used when no desktop utility is installed (headless Linux, a macOS session
//! without Finder automation rights). They write to the same locations the
//! desktop would, so items stay restorable from the platform's own UI.

use super::strategy::TrashStrategy;
use crate::error::{ReclaimError, Result};
use crate::fs::move_path;
use async_trait::async_trait;
use chrono::{DateTime, Local};
use std::ffi::OsStr;
use std::io;
use std::path::{Component, Path, PathBuf};
use tokio::io::AsyncWriteExt;

/// Format of `DeletionDate` in a `.trashinfo` file (local time, no zone).
pub const TRASHINFO_TIME_FORMAT: &str = "%Y-%m-%dT%H:%M:%S";

const MAX_NAME_ATTEMPTS: u32 = 10_000;

/// Split `name` into stem and extension (the extension keeps its dot).
///
/// Dotfiles like `.bashrc` have no extension.
fn split_name(name: &str) -> (&str, &str) {
    match name.rfind('.') {
        Some(0) | None => (name, ""),
        Some(idx) => name.split_at(idx),
    }
}

fn file_name_of(path: &Path) -> Result<String> {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .ok_or_else(|| {
            ReclaimError::TrashError(format!("{} has no file name", path.display()))
        })
}

// =========================================================================
// macOS ~/.Trash
// =========================================================================

/// Moves items into `~/.Trash`, renaming on collision.
#[derive(Debug, Clone)]
pub struct MacTrashDir {
    trash_dir: PathBuf,
}

impl MacTrashDir {
    pub fn new(trash_dir: PathBuf) -> Self {
        Self { trash_dir }
    }

    pub fn trash_dir(&self) -> &Path {
        &self.trash_dir
    }

    /// `name` if free, otherwise `stem timestamp-N.ext` for the first free N.
    async fn free_destination(&self, name: &str, now: DateTime<Local>) -> Result<PathBuf> {
        let plain = self.trash_dir.join(name);
        if !exists_no_follow(&plain).await {
            return Ok(plain);
        }

        let (stem, ext) = split_name(name);
        let stamp = now.format("%Y-%m-%d %H.%M.%S");
        for counter in 1..=MAX_NAME_ATTEMPTS {
            let candidate = self
                .trash_dir
                .join(format!("{} {}-{}{}", stem, stamp, counter, ext));
            if !exists_no_follow(&candidate).await {
                return Ok(candidate);
            }
        }
        Err(ReclaimError::TrashError(format!(
            "no free name for {} in {}",
            name,
            self.trash_dir.display()
        )))
    }
}

#[async_trait]
impl TrashStrategy for MacTrashDir {
    fn name(&self) -> &str {
        "trash-dir"
    }

    async fn is_available(&self) -> bool {
        self.trash_dir
            .parent()
            .is_some_and(|home| home.is_dir())
    }

    async fn trash(&self, path: &Path) -> Result<()> {
        let name = file_name_of(path)?;
        tokio::fs::create_dir_all(&self.trash_dir)
            .await
            .map_err(|e| ReclaimError::io(&self.trash_dir, e))?;
        let destination = self.free_destination(&name, Local::now()).await?;
        move_path(path, &destination).await
    }
}

// =========================================================================
// freedesktop.org home trash
// =========================================================================

/// Writes `files/<name>` plus `info/<name>.trashinfo` under an XDG trash
/// directory (normally `$XDG_DATA_HOME/Trash`).
#[derive(Debug, Clone)]
pub struct XdgTrashDir {
    root: PathBuf,
}

impl XdgTrashDir {
    pub fn new(root: PathBuf) -> Self {
        Self { root }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn files_dir(&self) -> PathBuf {
        self.root.join("files")
    }

    pub fn info_dir(&self) -> PathBuf {
        self.root.join("info")
    }

    /// Reserve a name by creating its `.trashinfo` exclusively.
    ///
    /// The info file is written first so two trashers racing for the same
    /// name cannot both win.
    async fn reserve(&self, original: &Path, now: DateTime<Local>) -> Result<(String, PathBuf)> {
        let name = file_name_of(original)?;
        let (stem, ext) = split_name(&name);
        let contents = trashinfo_contents(original, now);
        let info_dir = self.info_dir();
        let files_dir = self.files_dir();

        for counter in 0..=MAX_NAME_ATTEMPTS {
            let candidate = if counter == 0 {
                name.clone()
            } else {
                format!("{}_{}{}", stem, counter, ext)
            };
            if exists_no_follow(&files_dir.join(&candidate)).await {
                continue;
            }

            let info_path = info_dir.join(format!("{}.trashinfo", candidate));
            match tokio::fs::OpenOptions::new()
                .write(true)
                .create_new(true)
                .open(&info_path)
                .await
            {
                Ok(mut file) => {
                    file.write_all(contents.as_bytes())
                        .await
                        .map_err(|e| ReclaimError::io(&info_path, e))?;
                    file.sync_all()
                        .await
                        .map_err(|e| ReclaimError::io(&info_path, e))?;
                    return Ok((candidate, info_path));
                }
                Err(e) if e.kind() == io::ErrorKind::AlreadyExists => continue,
                Err(e) => return Err(ReclaimError::io(&info_path, e)),
            }
        }

        Err(ReclaimError::TrashError(format!(
            "no free name for {} in {}",
            name,
            self.root.display()
        )))
    }
}

#[async_trait]
impl TrashStrategy for XdgTrashDir {
    fn name(&self) -> &str {
        "xdg-trash"
    }

    async fn is_available(&self) -> bool {
        self.root.parent().is_some_and(|parent| parent.is_dir())
    }

    async fn trash(&self, path: &Path) -> Result<()> {
        for dir in [self.files_dir(), self.info_dir()] {
            tokio::fs::create_dir_all(&dir)
                .await
                .map_err(|e| ReclaimError::io(&dir, e))?;
        }

        let (name, info_path) = self.reserve(path, Local::now()).await?;
        let destination = self.files_dir().join(&name);

        if let Err(e) = move_path(path, &destination).await {
            if let Err(cleanup) = tokio::fs::remove_file(&info_path).await {
                tracing::warn!(
                    path = %info_path.display(),
                    error = %cleanup,
                    "failed to remove orphaned trashinfo"
                );
            }
            return Err(e);
        }
        Ok(())
    }
}

/// Render a `.trashinfo` body for `original` deleted at `deleted_at`.
pub fn trashinfo_contents(original: &Path, deleted_at: DateTime<Local>) -> String {
    format!(
        "[Trash Info]\nPath={}\nDeletionDate={}\n",
        encode_trash_path(original),
        deleted_at.format(TRASHINFO_TIME_FORMAT)
    )
}

/// Percent-encode each path component, keeping the separators.
fn encode_trash_path(path: &Path) -> String {
    let mut encoded = String::new();
    for component in path.components() {
        match component {
            Component::RootDir => encoded.push('/'),
            Component::Normal(part) => {
                if !encoded.is_empty() && !encoded.ends_with('/') {
                    encoded.push('/');
                }
                encoded.push_str(&urlencoding::encode(&lossy(part)));
            }
            _ => {}
        }
    }
    encoded
}

fn lossy(part: &OsStr) -> String {
    part.to_string_lossy().into_owned()
}

async fn exists_no_follow(path: &Path) -> bool {
    tokio::fs::symlink_metadata(path).await.is_ok()
}
