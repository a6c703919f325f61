//! Recursive size computation.

use futures::future::{BoxFuture, FutureExt, join_all};
use std::io;
use std::path::PathBuf;

/// Total size in bytes of a file, symlink or directory tree.
///
/// Directory children are sized concurrently and joined; only the sum
/// matters, so completion order is irrelevant. Symlinks count as their own
/// length and are never followed. Unreadable entries below the top level are
/// skipped; an unreadable top-level path is an error.
pub fn path_size(path: PathBuf) -> BoxFuture<'static, io::Result<u64>> {
    async move {
        let metadata = tokio::fs::symlink_metadata(&path).await?;
        if !metadata.is_dir() {
            return Ok(metadata.len());
        }

        let mut children = Vec::new();
        let mut entries = tokio::fs::read_dir(&path).await?;
        while let Some(entry) = entries.next_entry().await? {
            children.push(path_size(entry.path()));
        }

        let total: u64 = join_all(children)
            .await
            .into_iter()
            .filter_map(|size| match size {
                Ok(bytes) => Some(bytes),
                Err(e) => {
                    tracing::debug!(dir = %path.display(), error = %e, "skipping unreadable entry");
                    None
                }
            })
            .sum();
        Ok(total)
    }
    .boxed()
}
