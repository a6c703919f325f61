//! Config loading, validation, and path resolution.

use super::model::Config;
use super::types::PATH_PLACEHOLDER;
use crate::error::{ReclaimError, Result};
use globset::Glob;
use std::path::{Path, PathBuf};
use std::time::Duration;

impl Config {
    /// Default location of the config file, if the platform has a config dir.
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("reclaim").join("config.yaml"))
    }

    /// Load config from a YAML file.
    ///
    /// Unknown fields in the YAML are silently ignored for forward compatibility.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();

        let content = std::fs::read_to_string(path).map_err(|e| {
            ReclaimError::ConfigError(format!(
                "failed to read config file '{}': {}",
                path.display(),
                e
            ))
        })?;

        Self::from_yaml(&content)
    }

    /// Load config from `path`, falling back to defaults when the file is absent.
    ///
    /// A file that exists but fails to parse or validate is still an error.
    pub fn load_or_default<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            tracing::debug!(path = %path.display(), "no config file, using defaults");
            return Ok(Self::default());
        }
        Self::load(path)
    }

    /// Parse config from a YAML string.
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        // serde_yaml rejects an empty document as a struct; treat it as defaults.
        if yaml.trim().is_empty() {
            return Ok(Self::default());
        }

        let config: Config = serde_yaml::from_str(yaml)
            .map_err(|e| ReclaimError::ConfigError(format!("failed to parse config YAML: {}", e)))?;

        config.validate()?;
        Ok(config)
    }

    /// Serialize config to YAML string.
    pub fn to_yaml(&self) -> Result<String> {
        serde_yaml::to_string(self).map_err(|e| {
            ReclaimError::ConfigError(format!("failed to serialize config to YAML: {}", e))
        })
    }

    /// Validate config values and return error on invalid values.
    ///
    /// Validation rules:
    /// - `trash_timeout_secs` must be positive
    /// - `large_directory_threshold` must be positive
    /// - `extra_system_paths` must be absolute
    /// - `extra_critical_patterns` must be valid globs
    /// - `trash_commands` templates must parse and contain `{path}`
    pub fn validate(&self) -> Result<()> {
        if self.trash_timeout_secs == 0 {
            return Err(ReclaimError::ConfigError(
                "trash_timeout_secs must be greater than 0".to_string(),
            ));
        }

        if self.large_directory_threshold == 0 {
            return Err(ReclaimError::ConfigError(
                "large_directory_threshold must be greater than 0".to_string(),
            ));
        }

        for path in &self.extra_system_paths {
            if !path.is_absolute() {
                return Err(ReclaimError::ConfigError(format!(
                    "extra_system_paths entries must be absolute (found '{}')",
                    path.display()
                )));
            }
        }

        for pattern in &self.extra_critical_patterns {
            Glob::new(pattern).map_err(|e| {
                ReclaimError::ConfigError(format!(
                    "invalid glob in extra_critical_patterns '{}': {}",
                    pattern, e
                ))
            })?;
        }

        for template in self.trash_commands.all() {
            let words = shell_words::split(template).map_err(|e| {
                ReclaimError::ConfigError(format!(
                    "failed to parse trash command '{}': {}",
                    template, e
                ))
            })?;
            if words.is_empty() {
                return Err(ReclaimError::ConfigError(
                    "trash command templates must not be empty".to_string(),
                ));
            }
            if !words.iter().any(|w| w.contains(PATH_PLACEHOLDER)) {
                return Err(ReclaimError::ConfigError(format!(
                    "trash command '{}' must contain the {} placeholder",
                    template, PATH_PLACEHOLDER
                )));
            }
        }

        Ok(())
    }

    /// Quarantine root, resolving the platform default when unset.
    pub fn resolved_quarantine_dir(&self) -> PathBuf {
        self.quarantine_dir.clone().unwrap_or_else(|| {
            dirs::data_local_dir()
                .unwrap_or_else(std::env::temp_dir)
                .join("reclaim")
                .join("quarantine")
        })
    }

    /// Timeout for a single external trash command.
    pub fn trash_timeout(&self) -> Duration {
        Duration::from_secs(self.trash_timeout_secs)
    }
}
