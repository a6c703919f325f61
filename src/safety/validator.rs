//! Path safety validation.
//!
//! Read-only: the validator stats, lists and opens paths but never changes
//! them. A path that does not exist is a warning, never an error.

use super::policy::{PROJECT_MARKERS, SafetyPolicy};
use super::types::{PathAssessment, PathConcern, ValidationResult};
use std::fs::{self, OpenOptions};
use std::io;
use std::path::{Component, Path, PathBuf};

/// Classifies candidate paths against a `SafetyPolicy`.
#[derive(Debug, Clone)]
pub struct PathValidator {
    policy: SafetyPolicy,
}

impl PathValidator {
    pub fn new(policy: SafetyPolicy) -> Self {
        Self { policy }
    }

    pub fn policy(&self) -> &SafetyPolicy {
        &self.policy
    }

    /// Validate a batch of paths.
    pub fn validate<P: AsRef<Path>>(&self, paths: &[P]) -> ValidationResult {
        let assessments: Vec<PathAssessment> =
            paths.iter().map(|p| self.assess(p.as_ref())).collect();
        ValidationResult::from_assessments(&assessments)
    }

    /// Classify a single path.
    pub fn assess(&self, input: &Path) -> PathAssessment {
        let resolved = resolve_path(input);
        let mut concerns = Vec::new();

        if self.policy.is_system_path(&resolved) {
            concerns.push(PathConcern::System);
        }

        if let Some(reason) = self.policy.critical_reason(&resolved) {
            concerns.push(PathConcern::CriticalUser(reason));
        }

        match fs::symlink_metadata(&resolved) {
            Ok(metadata) if metadata.is_dir() => {
                if let Some(marker) = project_marker(&resolved) {
                    concerns.push(PathConcern::CriticalUser(format!(
                        "{} contains version control data ({})",
                        resolved.display(),
                        marker
                    )));
                }
                let threshold = self.policy.large_directory_threshold();
                if exceeds_child_count(&resolved, threshold) {
                    concerns.push(PathConcern::LargeDirectory { threshold });
                }
            }
            Ok(metadata) if metadata.is_file() => {
                if appears_in_use(&resolved) {
                    concerns.push(PathConcern::InUse);
                }
            }
            Ok(_) => {}
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                concerns.push(PathConcern::Missing);
            }
            Err(e) => {
                tracing::debug!(path = %resolved.display(), error = %e, "cannot stat candidate");
            }
        }

        PathAssessment {
            input: input.to_path_buf(),
            resolved,
            concerns,
        }
    }
}

/// Absolute form of `path` with its parent directory canonicalized.
///
/// The final component is kept as given, so a symlink resolves to the link
/// itself and never to its target. For missing parents the longest existing
/// ancestor is canonicalized and the remainder re-attached after lexical
/// `.`/`..` cleanup, so `/tmp/../etc/x` still resolves under `/etc`.
pub fn resolve_path(path: &Path) -> PathBuf {
    let absolute = if path.is_absolute() {
        path.to_path_buf()
    } else {
        std::env::current_dir()
            .map(|cwd| cwd.join(path))
            .unwrap_or_else(|_| path.to_path_buf())
    };
    let normalized = normalize_lexically(&absolute);

    match (normalized.parent(), normalized.file_name()) {
        (Some(parent), Some(name)) => canonicalize_existing(parent).join(name),
        _ => canonicalize_existing(&normalized),
    }
}

/// Canonicalize the longest existing prefix of `path`.
fn canonicalize_existing(path: &Path) -> PathBuf {
    if let Ok(canonical) = path.canonicalize() {
        return canonical;
    }

    let mut existing = path;
    let mut remainder = Vec::new();
    while let Some(parent) = existing.parent() {
        if let Some(name) = existing.file_name() {
            remainder.push(name.to_os_string());
        }
        existing = parent;
        if let Ok(canonical) = existing.canonicalize() {
            return remainder
                .iter()
                .rev()
                .fold(canonical, |acc, name| acc.join(name));
        }
    }

    path.to_path_buf()
}

fn normalize_lexically(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                out.pop();
            }
            other => out.push(other.as_os_str()),
        }
    }
    out
}

fn project_marker(dir: &Path) -> Option<&'static str> {
    PROJECT_MARKERS
        .iter()
        .copied()
        .find(|marker| dir.join(marker).exists())
}

fn exceeds_child_count(dir: &Path, threshold: usize) -> bool {
    match fs::read_dir(dir) {
        Ok(entries) => entries.take(threshold + 1).count() > threshold,
        Err(_) => false,
    }
}

/// Whether opening `path` for read/write is refused because something else
/// holds it (`ETXTBSY`, `EBUSY`, Windows sharing/lock violations).
fn appears_in_use(path: &Path) -> bool {
    match OpenOptions::new().read(true).write(true).open(path) {
        Ok(_) => false,
        Err(e) => is_busy_error(&e),
    }
}

fn is_busy_error(err: &io::Error) -> bool {
    if matches!(
        err.kind(),
        io::ErrorKind::ResourceBusy | io::ErrorKind::ExecutableFileBusy
    ) {
        return true;
    }
    cfg!(windows) && matches!(err.raw_os_error(), Some(32) | Some(33))
}
