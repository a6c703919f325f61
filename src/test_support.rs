use crate::config::Config;
use crate::delete::SafeDeleter;
use crate::platform::Platform;
use crate::quarantine::QuarantineStore;
use crate::safety::{PathValidator, SafetyPolicy};
use crate::trash::{TrashProvider, TrashReport};
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use tempfile::TempDir;

/// Isolated home, work area, trash and quarantine under one temp dir.
pub(crate) struct Sandbox {
    _temp: TempDir,
    pub home: PathBuf,
    pub work: PathBuf,
    pub trash_dir: PathBuf,
    pub quarantine_root: PathBuf,
}

impl Sandbox {
    pub(crate) fn new() -> Self {
        let temp = TempDir::new().unwrap();
        let root = temp.path().canonicalize().unwrap();
        let home = root.join("home");
        let work = home.join("work");
        let trash_dir = root.join("trash");
        std::fs::create_dir_all(&work).unwrap();
        std::fs::create_dir_all(&trash_dir).unwrap();
        Self {
            _temp: temp,
            home,
            work,
            trash_dir,
            quarantine_root: root.join("quarantine"),
        }
    }

    /// Write `bytes` to `work/<relative>`, creating parents.
    pub(crate) fn file(&self, relative: &str, bytes: &[u8]) -> PathBuf {
        let path = self.work.join(relative);
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(&path, bytes).unwrap();
        path
    }

    pub(crate) fn store(&self) -> QuarantineStore {
        QuarantineStore::new(&self.quarantine_root)
    }

    pub(crate) fn deleter(&self, trash: Arc<FakeTrash>) -> SafeDeleter {
        let config = Config::default();
        let policy = SafetyPolicy::new(
            Platform::Linux,
            Some(self.home.clone()),
            std::env::temp_dir(),
            &config,
        )
        .unwrap();
        SafeDeleter::new(
            PathValidator::new(policy),
            trash,
            self.store(),
            config.size_warning_bytes,
        )
    }
}

/// Trash provider that renames into a directory and can refuse by name.
pub(crate) struct FakeTrash {
    dir: PathBuf,
    supported: bool,
    refuse: Vec<String>,
    calls: Mutex<Vec<Vec<PathBuf>>>,
}

impl FakeTrash {
    pub(crate) fn new(dir: &Path) -> Arc<Self> {
        Self::build(dir, true, &[])
    }

    pub(crate) fn unsupported(dir: &Path) -> Arc<Self> {
        Self::build(dir, false, &[])
    }

    /// Fails for any path whose file name is in `names`.
    pub(crate) fn refusing(dir: &Path, names: &[&str]) -> Arc<Self> {
        Self::build(dir, true, names)
    }

    fn build(dir: &Path, supported: bool, names: &[&str]) -> Arc<Self> {
        Arc::new(Self {
            dir: dir.to_path_buf(),
            supported,
            refuse: names.iter().map(|n| n.to_string()).collect(),
            calls: Mutex::new(Vec::new()),
        })
    }

    pub(crate) fn calls(&self) -> Vec<Vec<PathBuf>> {
        self.calls.lock().unwrap().clone()
    }

    pub(crate) fn holds(&self, name: &str) -> bool {
        self.dir.join(name).exists()
    }
}

#[async_trait]
impl TrashProvider for FakeTrash {
    fn platform(&self) -> Platform {
        Platform::Linux
    }

    async fn move_to_trash(&self, paths: &[PathBuf]) -> TrashReport {
        self.calls.lock().unwrap().push(paths.to_vec());
        let mut report = TrashReport::default();
        for path in paths {
            let name = path.file_name().unwrap().to_string_lossy().into_owned();
            if self.refuse.contains(&name) {
                report.failed.push((path.clone(), "refused".to_string()));
                continue;
            }
            match std::fs::rename(path, self.dir.join(&name)) {
                Ok(()) => report.trashed.push(path.clone()),
                Err(e) => report.failed.push((path.clone(), e.to_string())),
            }
        }
        report
    }

    async fn trash_size(&self) -> u64 {
        0
    }

    async fn is_supported(&self) -> bool {
        self.supported
    }
}
