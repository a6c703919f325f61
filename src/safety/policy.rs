//! Deny-lists and allow-roots for path safety decisions.
//!
//! A `SafetyPolicy` is built once per process from the platform, the user's
//! home and temp directories, and the loaded `Config`, then passed by
//! reference to the validator. Nothing in here touches the filesystem.

use crate::config::Config;
use crate::error::{ReclaimError, Result};
use crate::platform::Platform;
use globset::{Glob, GlobSet, GlobSetBuilder};
use std::path::{Component, Path, PathBuf};

/// Directory names that are never a sane single-segment deletion target
/// (`/usr`, `/System`, `C:\Windows`), whatever the platform.
const SYSTEM_DIR_NAMES: &[&str] = &[
    "applications",
    "bin",
    "boot",
    "cores",
    "dev",
    "etc",
    "home",
    "lib",
    "lib32",
    "lib64",
    "libx32",
    "library",
    "media",
    "mnt",
    "opt",
    "private",
    "proc",
    "program files",
    "program files (x86)",
    "programdata",
    "root",
    "run",
    "sbin",
    "snap",
    "srv",
    "sys",
    "system",
    "users",
    "usr",
    "var",
    "volumes",
    "windows",
];

/// Project and IDE markers whose deletion deserves a warning.
const CRITICAL_MARKER_PATTERNS: &[&str] = &[
    "**/.git",
    "**/.git/**",
    "**/.hg",
    "**/.svn",
    "**/.idea",
    "**/.vscode",
    "**/.ssh/**",
    "**/.gnupg/**",
];

/// Marker children that make a directory look like a project checkout.
pub(crate) const PROJECT_MARKERS: &[&str] = &[".git", ".hg", ".svn"];

/// Explicit safety configuration consumed by the validator.
#[derive(Debug, Clone)]
pub struct SafetyPolicy {
    platform: Platform,
    home: Option<PathBuf>,
    /// Exact-match protected paths (filesystem roots).
    protected_exact: Vec<PathBuf>,
    /// Prefix-match protected system directories.
    system_roots: Vec<PathBuf>,
    /// User-writable hierarchies exempt from system-root matching.
    allowed_roots: Vec<PathBuf>,
    /// Home-relative critical directories, already joined onto home.
    critical_dirs: Vec<PathBuf>,
    critical_patterns: Vec<String>,
    critical_globs: GlobSet,
    large_directory_threshold: usize,
}

impl SafetyPolicy {
    /// Build the policy for the running platform and user.
    pub fn from_config(config: &Config) -> Result<Self> {
        Self::new(
            Platform::current(),
            dirs::home_dir(),
            std::env::temp_dir(),
            config,
        )
    }

    /// Build a policy for an explicit platform, home and temp directory.
    pub fn new(
        platform: Platform,
        home: Option<PathBuf>,
        temp_dir: PathBuf,
        config: &Config,
    ) -> Result<Self> {
        // Decisions are made on canonical paths, so compare against canonical home.
        let home = home.map(|h| h.canonicalize().unwrap_or(h));
        let mut system_roots = builtin_system_roots(platform);
        system_roots.extend(config.extra_system_paths.iter().cloned());

        let protected_exact = match platform {
            Platform::Windows => vec![PathBuf::from(format!("{}\\", system_drive()))],
            _ => vec![PathBuf::from("/")],
        };

        let mut allowed_roots = Vec::new();
        allowed_roots.extend(home.iter().cloned());
        allowed_roots.push(temp_dir.clone());
        if let Ok(canonical) = temp_dir.canonicalize() {
            allowed_roots.push(canonical);
        }
        match platform {
            Platform::Linux => {
                allowed_roots.push(PathBuf::from("/tmp"));
                allowed_roots.push(PathBuf::from("/var/tmp"));
            }
            Platform::MacOs => {
                allowed_roots.push(PathBuf::from("/tmp"));
                allowed_roots.push(PathBuf::from("/private/tmp"));
                allowed_roots.push(PathBuf::from("/private/var/folders"));
                allowed_roots.push(PathBuf::from("/var/folders"));
            }
            Platform::Windows => {}
        }
        // A root like "/" would exempt everything.
        allowed_roots.retain(|root| root.components().count() >= 2);

        let critical_dirs = match &home {
            Some(home) => builtin_critical_dirs(platform)
                .iter()
                .map(|relative| home.join(relative))
                .collect(),
            None => Vec::new(),
        };

        let critical_patterns: Vec<String> = CRITICAL_MARKER_PATTERNS
            .iter()
            .map(|p| p.to_string())
            .chain(config.extra_critical_patterns.iter().cloned())
            .collect();
        let critical_globs = build_globset(&critical_patterns)?;

        Ok(Self {
            platform,
            home,
            protected_exact,
            system_roots,
            allowed_roots,
            critical_dirs,
            critical_patterns,
            critical_globs,
            large_directory_threshold: config.large_directory_threshold,
        })
    }

    pub fn platform(&self) -> Platform {
        self.platform
    }

    pub fn large_directory_threshold(&self) -> usize {
        self.large_directory_threshold
    }

    /// Whether `path` (absolute, resolved) is a protected system path.
    pub fn is_system_path(&self, path: &Path) -> bool {
        let key = self.key(path);

        if self.protected_exact.iter().any(|p| self.key(p) == key) {
            return true;
        }

        let under_allowed_root = self
            .allowed_roots
            .iter()
            .any(|root| key.starts_with(self.key(root)));
        if under_allowed_root {
            return false;
        }

        if self
            .system_roots
            .iter()
            .any(|root| key.starts_with(self.key(root)))
        {
            return true;
        }

        self.is_single_system_segment(path)
    }

    /// Why `path` is a critical user location, if it is one.
    pub fn critical_reason(&self, path: &Path) -> Option<String> {
        let key = self.key(path);

        if let Some(home) = &self.home
            && key == self.key(home)
        {
            return Some(format!("{} is the home directory", path.display()));
        }

        if let Some(dir) = self
            .critical_dirs
            .iter()
            .find(|dir| key.starts_with(self.key(dir)))
        {
            return Some(format!(
                "{} is inside critical user directory {}",
                path.display(),
                dir.display()
            ));
        }

        let matches = self.critical_globs.matches(path);
        if let Some(&index) = matches.first() {
            return Some(format!(
                "{} matches protected pattern {}",
                path.display(),
                self.critical_patterns[index]
            ));
        }

        None
    }

    /// `/usr`, `C:\Windows` and friends: a path with exactly one normal
    /// component whose name is a known system directory.
    fn is_single_system_segment(&self, path: &Path) -> bool {
        let normals: Vec<_> = path
            .components()
            .filter_map(|c| match c {
                Component::Normal(name) => Some(name),
                _ => None,
            })
            .collect();

        match normals.as_slice() {
            [name] => {
                let name = name.to_string_lossy().to_lowercase();
                SYSTEM_DIR_NAMES.contains(&name.as_str())
            }
            _ => false,
        }
    }

    /// Comparison key: lowercased on case-insensitive platforms.
    fn key(&self, path: &Path) -> PathBuf {
        if self.platform.case_insensitive_paths() {
            PathBuf::from(path.to_string_lossy().to_lowercase())
        } else {
            path.to_path_buf()
        }
    }
}

fn build_globset(patterns: &[String]) -> Result<GlobSet> {
    let mut builder = GlobSetBuilder::new();
    for pattern in patterns {
        let glob = Glob::new(pattern).map_err(|e| {
            ReclaimError::ConfigError(format!("invalid glob pattern '{}': {}", pattern, e))
        })?;
        builder.add(glob);
    }
    builder
        .build()
        .map_err(|e| ReclaimError::ConfigError(format!("failed to build globset: {}", e)))
}

fn builtin_system_roots(platform: Platform) -> Vec<PathBuf> {
    let roots: Vec<String> = match platform {
        Platform::Linux => [
            "/bin", "/boot", "/dev", "/etc", "/lib", "/lib32", "/lib64", "/libx32", "/proc",
            "/run", "/sbin", "/snap", "/sys", "/usr", "/var/lib", "/var/log", "/var/spool",
        ]
        .iter()
        .map(|s| s.to_string())
        .collect(),
        Platform::MacOs => [
            "/System", "/Library", "/bin", "/sbin", "/usr", "/etc", "/var", "/private", "/dev",
            "/cores", "/Applications/Utilities",
        ]
        .iter()
        .map(|s| s.to_string())
        .collect(),
        Platform::Windows => {
            let drive = system_drive();
            [
                "Windows",
                "Program Files",
                "Program Files (x86)",
                "ProgramData",
                "System Volume Information",
                "$Recycle.Bin",
                "Recovery",
                "Boot",
            ]
            .iter()
            .map(|dir| format!("{}\\{}", drive, dir))
            .collect()
        }
    };
    roots.into_iter().map(PathBuf::from).collect()
}

fn builtin_critical_dirs(platform: Platform) -> &'static [&'static str] {
    match platform {
        Platform::MacOs => &[
            "Documents",
            "Desktop",
            "Pictures",
            "Movies",
            "Music",
            ".ssh",
            ".gnupg",
            ".aws",
            ".kube",
            "Library/Keychains",
            "Library/Mobile Documents",
        ],
        Platform::Linux => &[
            "Documents",
            "Desktop",
            "Pictures",
            "Videos",
            "Music",
            ".ssh",
            ".gnupg",
            ".aws",
            ".kube",
            ".password-store",
            ".local/share/keyrings",
        ],
        Platform::Windows => &[
            "Documents",
            "Desktop",
            "Pictures",
            "Videos",
            "Music",
            ".ssh",
            ".aws",
            ".kube",
            "AppData\\Roaming\\Microsoft\\Credentials",
        ],
    }
}

fn system_drive() -> String {
    std::env::var("SystemDrive").unwrap_or_else(|_| "C:".to_string())
}
