//! Tests for trash providers and the strategy chain.

use super::*;
use crate::error::{ReclaimError, Result};
use std::path::Path;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use tempfile::TempDir;

/// Scripted strategy that records how often it ran.
struct Scripted {
    name: &'static str,
    available: bool,
    succeed: bool,
    calls: Arc<AtomicUsize>,
}

impl Scripted {
    fn new(name: &'static str, available: bool, succeed: bool) -> (Self, Arc<AtomicUsize>) {
        let calls = Arc::new(AtomicUsize::new(0));
        (
            Self {
                name,
                available,
                succeed,
                calls: Arc::clone(&calls),
            },
            calls,
        )
    }
}

#[async_trait]
impl TrashStrategy for Scripted {
    fn name(&self) -> &str {
        self.name
    }

    async fn is_available(&self) -> bool {
        self.available
    }

    async fn trash(&self, _path: &Path) -> Result<()> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.succeed {
            Ok(())
        } else {
            Err(ReclaimError::TrashError(format!("{} refused", self.name)))
        }
    }
}

/// Succeeds only for paths whose name is in the allow-list.
struct Selective {
    allowed: Mutex<Vec<String>>,
}

#[async_trait]
impl TrashStrategy for Selective {
    fn name(&self) -> &str {
        "selective"
    }

    async fn is_available(&self) -> bool {
        true
    }

    async fn trash(&self, path: &Path) -> Result<()> {
        let name = path.file_name().unwrap().to_string_lossy().into_owned();
        if self.allowed.lock().unwrap().contains(&name) {
            Ok(())
        } else {
            Err(ReclaimError::TrashError("not allowed".to_string()))
        }
    }
}

#[tokio::test]
async fn chain_stops_at_first_success() {
    let (first, first_calls) = Scripted::new("first", true, false);
    let (second, second_calls) = Scripted::new("second", true, true);
    let (third, third_calls) = Scripted::new("third", true, true);
    let chain = StrategyChain::new().then(first).then(second).then(third);

    let winner = chain.run(Path::new("/tmp/x")).await.unwrap();

    assert_eq!(winner, "second");
    assert_eq!(first_calls.load(Ordering::SeqCst), 1);
    assert_eq!(second_calls.load(Ordering::SeqCst), 1);
    assert_eq!(third_calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn chain_skips_unavailable_strategies() {
    let (missing, missing_calls) = Scripted::new("missing", false, true);
    let (fallback, _) = Scripted::new("fallback", true, true);
    let chain = StrategyChain::new().then(missing).then(fallback);

    let winner = chain.run(Path::new("/tmp/x")).await.unwrap();

    assert_eq!(winner, "fallback");
    assert_eq!(missing_calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn chain_collects_every_failure_in_order() {
    let (a, _) = Scripted::new("a", true, false);
    let (b, _) = Scripted::new("b", true, false);
    let chain = StrategyChain::new().then(a).then(b);

    let failures = chain.run(Path::new("/tmp/x")).await.unwrap_err();

    assert_eq!(failures.len(), 2);
    assert!(failures[0].starts_with("a: "));
    assert!(failures[1].starts_with("b: "));
}

#[tokio::test]
async fn chain_with_nothing_available_reports_it() {
    let (a, _) = Scripted::new("a", false, true);
    let chain = StrategyChain::new().then(a);

    assert!(!chain.any_available().await);
    let failures = chain.run(Path::new("/tmp/x")).await.unwrap_err();
    assert_eq!(failures, vec!["no trash mechanism is available on this system"]);
}

#[tokio::test]
async fn provider_reports_per_path_outcomes() {
    let chain = StrategyChain::new().then(Selective {
        allowed: Mutex::new(vec!["ok.txt".to_string()]),
    });
    let provider = PlatformTrash::new(Platform::Linux, chain, TrashSizeSource::Unknown);
    let ok = PathBuf::from("/tmp/ok.txt");
    let bad = PathBuf::from("/tmp/bad.txt");

    let report = provider.move_to_trash(&[ok.clone(), bad.clone()]).await;

    assert!(report.success());
    assert!(!report.all_trashed());
    assert_eq!(report.trashed, vec![ok]);
    assert_eq!(report.failed_paths().collect::<Vec<_>>(), vec![&bad]);
    assert!(report.failed[0].1.contains("not allowed"));
}

#[tokio::test]
async fn provider_with_no_successes_is_not_a_success() {
    let (never, _) = Scripted::new("never", true, false);
    let provider = PlatformTrash::new(
        Platform::MacOs,
        StrategyChain::new().then(never),
        TrashSizeSource::Unknown,
    );

    let report = provider.move_to_trash(&[PathBuf::from("/tmp/a")]).await;

    assert!(!report.success());
    assert_eq!(provider.trash_size().await, 0);
}

#[test]
fn linux_default_chain_order() {
    let data = TempDir::new().unwrap();
    let provider = PlatformTrash::linux(Some(data.path().to_path_buf()), &Config::default());

    assert_eq!(provider.strategy_names(), vec!["gio", "trash-put", "xdg-trash"]);
}

#[test]
fn macos_default_chain_order() {
    let home = TempDir::new().unwrap();
    let provider = PlatformTrash::macos(Some(home.path().to_path_buf()), &Config::default());

    assert_eq!(provider.strategy_names(), vec!["finder", "trash-dir"]);
}

#[test]
fn windows_default_chain_order() {
    let provider = PlatformTrash::windows(&Config::default());

    assert_eq!(provider.strategy_names(), vec!["powershell", "nircmd"]);
}

#[test]
fn configured_commands_replace_builtin_utilities() {
    let data = TempDir::new().unwrap();
    let mut config = Config::default();
    config.trash_commands.linux = vec!["kioclient5 move {path} trash:/".to_string()];

    let provider = PlatformTrash::linux(Some(data.path().to_path_buf()), &config);

    assert_eq!(provider.strategy_names(), vec!["kioclient5", "xdg-trash"]);
}

#[tokio::test]
async fn linux_fallback_trashes_into_xdg_directory() {
    let data = TempDir::new().unwrap();
    let work = TempDir::new().unwrap();
    let mut config = Config::default();
    // Force the manual fallback regardless of what is installed on the host.
    config.trash_commands.linux = vec!["reclaim-no-such-trash-tool {path}".to_string()];
    let provider = PlatformTrash::linux(Some(data.path().to_path_buf()), &config);
    let file = work.path().join("old.log");
    std::fs::write(&file, b"0123456789").unwrap();

    let report = provider.move_to_trash(std::slice::from_ref(&file)).await;

    assert!(report.all_trashed());
    assert!(!file.exists());
    assert!(data.path().join("Trash/files/old.log").exists());
    assert!(data.path().join("Trash/info/old.log.trashinfo").exists());
    assert!(provider.is_supported().await);
    assert_eq!(provider.trash_size().await, 10);
}
