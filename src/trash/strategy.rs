//! Ordered fallback strategies.
//!
//! Each platform provider is a list of mechanisms tried in order for every
//! path. The first mechanism that succeeds wins; the failures of the ones
//! tried before it are kept for diagnostics.

use crate::error::Result;
use async_trait::async_trait;
use std::path::Path;

/// One way of moving a path into the trash.
#[async_trait]
pub trait TrashStrategy: Send + Sync {
    /// Short label used in logs and failure messages.
    fn name(&self) -> &str;

    /// Whether the mechanism can run here at all (binary on PATH, trash
    /// directory reachable). Unavailable strategies are skipped.
    async fn is_available(&self) -> bool;

    /// Move a single path into the trash.
    async fn trash(&self, path: &Path) -> Result<()>;
}

/// Ordered list of strategies; first success short-circuits.
#[derive(Default)]
pub struct StrategyChain {
    strategies: Vec<Box<dyn TrashStrategy>>,
}

impl StrategyChain {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a strategy at the lowest priority.
    pub fn then(mut self, strategy: impl TrashStrategy + 'static) -> Self {
        self.strategies.push(Box::new(strategy));
        self
    }

    pub fn push(&mut self, strategy: Box<dyn TrashStrategy>) {
        self.strategies.push(strategy);
    }

    pub fn is_empty(&self) -> bool {
        self.strategies.is_empty()
    }

    pub fn names(&self) -> Vec<&str> {
        self.strategies.iter().map(|s| s.name()).collect()
    }

    /// Whether at least one strategy can run here.
    pub async fn any_available(&self) -> bool {
        for strategy in &self.strategies {
            if strategy.is_available().await {
                return true;
            }
        }
        false
    }

    /// Try each strategy in order on `path`.
    ///
    /// Returns the name of the strategy that succeeded, or every failure
    /// message in the order the strategies were tried.
    pub async fn run(&self, path: &Path) -> std::result::Result<String, Vec<String>> {
        let mut failures = Vec::new();

        for strategy in &self.strategies {
            if !strategy.is_available().await {
                tracing::debug!(strategy = strategy.name(), "strategy unavailable, skipping");
                continue;
            }

            match strategy.trash(path).await {
                Ok(()) => {
                    tracing::debug!(
                        strategy = strategy.name(),
                        path = %path.display(),
                        "trashed"
                    );
                    return Ok(strategy.name().to_string());
                }
                Err(e) => {
                    tracing::warn!(
                        strategy = strategy.name(),
                        path = %path.display(),
                        error = %e,
                        "trash strategy failed, trying next"
                    );
                    failures.push(format!("{}: {}", strategy.name(), e));
                }
            }
        }

        if failures.is_empty() {
            failures.push("no trash mechanism is available on this system".to_string());
        }
        Err(failures)
    }
}
