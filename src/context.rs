//! Runtime wiring for reclaim.
//!
//! Resolves the config file, then builds the pieces every front end needs
//! (safety policy, trash provider, quarantine store, orchestrator) for the
//! running platform. Front ends should go through here rather than
//! assembling them by hand.

use crate::config::Config;
use crate::delete::SafeDeleter;
use crate::error::{ReclaimError, Result};
use crate::platform::Platform;
use crate::quarantine::QuarantineStore;
use crate::safety::{PathValidator, SafetyPolicy};
use crate::trash::{TrashProvider, provider_for};
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Loaded configuration plus the platform it applies to.
#[derive(Debug, Clone)]
pub struct ReclaimContext {
    pub config: Config,
    /// The file the config came from, if one was read.
    pub config_path: Option<PathBuf>,
    pub platform: Platform,
}

impl ReclaimContext {
    /// Load config from `explicit` or the default location.
    ///
    /// An explicit path must exist; a missing default file means defaults.
    pub fn resolve(explicit: Option<&Path>) -> Result<Self> {
        let (config, config_path) = match explicit {
            Some(path) => {
                if !path.exists() {
                    return Err(ReclaimError::UserError(format!(
                        "config file '{}' does not exist",
                        path.display()
                    )));
                }
                (Config::load(path)?, Some(path.to_path_buf()))
            }
            None => match Config::default_path() {
                Some(path) if path.exists() => (Config::load(&path)?, Some(path)),
                _ => (Config::default(), None),
            },
        };

        Ok(Self::with_config(config, config_path))
    }

    pub fn with_config(config: Config, config_path: Option<PathBuf>) -> Self {
        Self {
            config,
            config_path,
            platform: Platform::current(),
        }
    }

    pub fn validator(&self) -> Result<PathValidator> {
        Ok(PathValidator::new(SafetyPolicy::from_config(&self.config)?))
    }

    pub fn trash(&self) -> Arc<dyn TrashProvider> {
        provider_for(self.platform, &self.config)
    }

    pub fn store(&self) -> QuarantineStore {
        QuarantineStore::new(self.config.resolved_quarantine_dir())
    }

    /// The orchestrator for this platform and config.
    pub fn deleter(&self) -> Result<SafeDeleter> {
        Ok(SafeDeleter::new(
            self.validator()?,
            self.trash(),
            self.store(),
            self.config.size_warning_bytes,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn explicit_config_is_loaded() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("config.yaml");
        let quarantine = temp.path().join("q");
        std::fs::write(
            &path,
            format!(
                "quarantine_dir: {}\nretention_days: 7\n",
                quarantine.display()
            ),
        )
        .unwrap();

        let ctx = ReclaimContext::resolve(Some(&path)).unwrap();

        assert_eq!(ctx.config.retention_days, 7);
        assert_eq!(ctx.config_path, Some(path));
        assert_eq!(ctx.store().root(), quarantine.as_path());
    }

    #[test]
    fn missing_explicit_config_is_a_user_error() {
        let temp = TempDir::new().unwrap();

        let err = ReclaimContext::resolve(Some(&temp.path().join("nope.yaml"))).unwrap_err();

        assert!(matches!(err, ReclaimError::UserError(_)));
    }

    #[test]
    fn invalid_config_is_a_config_error() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("config.yaml");
        std::fs::write(&path, "trash_timeout_secs: 0\n").unwrap();

        let err = ReclaimContext::resolve(Some(&path)).unwrap_err();

        assert!(matches!(err, ReclaimError::ConfigError(_)));
    }

    #[test]
    fn validator_uses_config_for_current_platform() {
        let config = Config {
            large_directory_threshold: 42,
            ..Config::default()
        };
        let ctx = ReclaimContext::with_config(config, None);

        let validator = ctx.validator().unwrap();

        assert_eq!(validator.policy().platform(), Platform::current());
        assert_eq!(validator.policy().large_directory_threshold(), 42);
    }

    #[test]
    fn deleter_builds_for_current_platform() {
        let ctx = ReclaimContext::with_config(Config::default(), None);

        assert!(ctx.deleter().is_ok());
        assert_eq!(ctx.trash().platform(), Platform::current());
    }
}
