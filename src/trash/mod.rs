//! Moving paths to the operating system's trash.
//!
//! One `TrashProvider` per platform, chosen at startup by [`provider_for`].
//! Each provider is an ordered [`StrategyChain`] of native mechanisms
//! (desktop utilities first, direct relocation into the trash directory
//! last). Failures are reported per path; the orchestrator decides what to
//! do with the paths that could not be trashed.

mod command;
mod manual;
mod strategy;

#[cfg(test)]
mod tests;

pub use command::{CommandStrategy, PathEscape};
pub use manual::{MacTrashDir, TRASHINFO_TIME_FORMAT, XdgTrashDir, trashinfo_contents};
pub use strategy::{StrategyChain, TrashStrategy};

use crate::config::Config;
use crate::fs::path_size;
use crate::platform::Platform;
use async_trait::async_trait;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

/// Per-path outcome of a trash request.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TrashReport {
    /// Paths that are now in the trash.
    pub trashed: Vec<PathBuf>,
    /// Paths that could not be trashed, with the reason.
    pub failed: Vec<(PathBuf, String)>,
}

impl TrashReport {
    /// True when at least one path was trashed.
    pub fn success(&self) -> bool {
        !self.trashed.is_empty()
    }

    pub fn all_trashed(&self) -> bool {
        self.failed.is_empty()
    }

    pub fn failed_paths(&self) -> impl Iterator<Item = &PathBuf> {
        self.failed.iter().map(|(path, _)| path)
    }
}

/// Platform trash facility.
#[async_trait]
pub trait TrashProvider: Send + Sync {
    fn platform(&self) -> Platform;

    /// Move each path to the trash independently. Never fails as a whole.
    async fn move_to_trash(&self, paths: &[PathBuf]) -> TrashReport;

    /// Approximate bytes currently held in the trash; 0 when unknown.
    async fn trash_size(&self) -> u64;

    /// Whether any trash mechanism can run on this system.
    async fn is_supported(&self) -> bool;
}

/// Where [`PlatformTrash::trash_size`] gets its number from.
#[derive(Debug, Clone)]
pub enum TrashSizeSource {
    /// Sum of a trash directory on disk.
    Directory(PathBuf),
    /// Ask the shell for the recycle bin's total size.
    RecycleBinQuery { timeout: Duration },
    Unknown,
}

/// A provider backed by a strategy chain.
pub struct PlatformTrash {
    platform: Platform,
    chain: StrategyChain,
    size_source: TrashSizeSource,
}

impl PlatformTrash {
    pub fn new(platform: Platform, chain: StrategyChain, size_source: TrashSizeSource) -> Self {
        Self {
            platform,
            chain,
            size_source,
        }
    }

    /// Finder, then direct relocation into `~/.Trash`.
    pub fn macos(home: Option<PathBuf>, config: &Config) -> Self {
        let timeout = config.trash_timeout();
        let mut chain = command_chain(&config.trash_commands.macos, timeout)
            .unwrap_or_else(|| StrategyChain::new().then(CommandStrategy::finder(timeout)));

        let size_source = match home {
            Some(home) => {
                let trash_dir = home.join(".Trash");
                chain.push(Box::new(MacTrashDir::new(trash_dir.clone())));
                TrashSizeSource::Directory(trash_dir)
            }
            None => TrashSizeSource::Unknown,
        };
        Self::new(Platform::MacOs, chain, size_source)
    }

    /// `gio trash`, then `trash-put`, then the XDG home trash written directly.
    pub fn linux(data_dir: Option<PathBuf>, config: &Config) -> Self {
        let timeout = config.trash_timeout();
        let mut chain = command_chain(&config.trash_commands.linux, timeout).unwrap_or_else(|| {
            StrategyChain::new()
                .then(CommandStrategy::gio(timeout))
                .then(CommandStrategy::trash_put(timeout))
        });

        let size_source = match data_dir {
            Some(data_dir) => {
                let trash = XdgTrashDir::new(data_dir.join("Trash"));
                let files = trash.files_dir();
                chain.push(Box::new(trash));
                TrashSizeSource::Directory(files)
            }
            None => TrashSizeSource::Unknown,
        };
        Self::new(Platform::Linux, chain, size_source)
    }

    /// Recycle bin through PowerShell, then `nircmd` when installed.
    pub fn windows(config: &Config) -> Self {
        let timeout = config.trash_timeout();
        let chain = command_chain(&config.trash_commands.windows, timeout).unwrap_or_else(|| {
            StrategyChain::new()
                .then(CommandStrategy::powershell_recycle_bin(timeout))
                .then(CommandStrategy::nircmd(timeout))
        });
        Self::new(
            Platform::Windows,
            chain,
            TrashSizeSource::RecycleBinQuery { timeout },
        )
    }

    pub fn strategy_names(&self) -> Vec<&str> {
        self.chain.names()
    }
}

#[async_trait]
impl TrashProvider for PlatformTrash {
    fn platform(&self) -> Platform {
        self.platform
    }

    async fn move_to_trash(&self, paths: &[PathBuf]) -> TrashReport {
        let mut report = TrashReport::default();

        for path in paths {
            match self.chain.run(path).await {
                Ok(strategy) => {
                    tracing::info!(path = %path.display(), strategy = %strategy, "moved to trash");
                    report.trashed.push(path.clone());
                }
                Err(failures) => {
                    report.failed.push((path.clone(), failures.join("; ")));
                }
            }
        }

        report
    }

    async fn trash_size(&self) -> u64 {
        match &self.size_source {
            TrashSizeSource::Directory(dir) => match path_size(dir.clone()).await {
                Ok(size) => size,
                Err(e) => {
                    tracing::debug!(dir = %dir.display(), error = %e, "cannot size trash");
                    0
                }
            },
            TrashSizeSource::RecycleBinQuery { timeout } => recycle_bin_size(*timeout).await,
            TrashSizeSource::Unknown => 0,
        }
    }

    async fn is_supported(&self) -> bool {
        self.chain.any_available().await
    }
}

/// Build the provider for `platform` from the user's directories and config.
pub fn provider_for(platform: Platform, config: &Config) -> Arc<dyn TrashProvider> {
    match platform {
        Platform::MacOs => Arc::new(PlatformTrash::macos(dirs::home_dir(), config)),
        Platform::Linux => Arc::new(PlatformTrash::linux(dirs::data_dir(), config)),
        Platform::Windows => Arc::new(PlatformTrash::windows(config)),
    }
}

/// Strategies from configured templates, or `None` to use the built-ins.
///
/// Templates were checked by `Config::validate`; any that still fail to
/// parse are logged and skipped.
fn command_chain(templates: &[String], timeout: Duration) -> Option<StrategyChain> {
    if templates.is_empty() {
        return None;
    }

    let mut chain = StrategyChain::new();
    for template in templates {
        match CommandStrategy::from_template(template, timeout) {
            Ok(strategy) => chain.push(Box::new(strategy)),
            Err(e) => tracing::warn!(template = %template, error = %e, "ignoring trash command"),
        }
    }
    Some(chain)
}

const RECYCLE_BIN_SIZE_SCRIPT: &str = "$s = 0; \
    (New-Object -ComObject Shell.Application).NameSpace(10).Items() | \
    ForEach-Object { $s += $_.Size }; $s";

async fn recycle_bin_size(timeout: Duration) -> u64 {
    let args = [
        "-NoProfile".to_string(),
        "-NonInteractive".to_string(),
        "-Command".to_string(),
        RECYCLE_BIN_SIZE_SCRIPT.to_string(),
    ];

    match command::run_with_timeout("powershell", &args, timeout).await {
        Ok(output) if output.status.success() => String::from_utf8_lossy(&output.stdout)
            .trim()
            .parse()
            .unwrap_or(0),
        Ok(output) => {
            tracing::debug!(status = %output.status, "recycle bin size query failed");
            0
        }
        Err(e) => {
            tracing::debug!(error = %e, "recycle bin size query failed");
            0
        }
    }
}
