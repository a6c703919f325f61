//! Confirmation prompt, decision and session types.

use crate::delete::DeletionMethod;
use async_trait::async_trait;
use serde::Serialize;
use std::future::Future;

/// Everything a caller needs to ask for informed consent.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConfirmationPrompt {
    pub message: String,
    /// One line per item, truncated for large batches.
    pub details: Vec<String>,
    pub warnings: Vec<String>,
    pub item_count: usize,
    pub total_size: u64,
    pub method: DeletionMethod,
}

/// The caller's answer to a prompt.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ConfirmationResult {
    pub confirmed: bool,
    /// Stop asking for the rest of the session.
    pub skip_future: bool,
}

impl ConfirmationResult {
    pub fn yes() -> Self {
        Self {
            confirmed: true,
            skip_future: false,
        }
    }

    pub fn always() -> Self {
        Self {
            confirmed: true,
            skip_future: true,
        }
    }

    pub fn no() -> Self {
        Self::default()
    }
}

/// Caller-owned memo of "skip future confirmations".
///
/// Lives as long as the caller wants the answer to stick (one CLI run, one
/// UI session). Never global.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ConfirmationSession {
    skip_confirmations: bool,
}

impl ConfirmationSession {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn skips_confirmations(&self) -> bool {
        self.skip_confirmations
    }

    pub(crate) fn record(&mut self, decision: &ConfirmationResult) {
        if decision.confirmed && decision.skip_future {
            self.skip_confirmations = true;
        }
    }
}

/// Asks the user (or anything standing in for them) to approve a prompt.
#[async_trait]
pub trait Confirmer: Send + Sync {
    async fn confirm(&self, prompt: &ConfirmationPrompt) -> ConfirmationResult;
}

#[async_trait]
impl<F, Fut> Confirmer for F
where
    F: Fn(ConfirmationPrompt) -> Fut + Send + Sync,
    Fut: Future<Output = ConfirmationResult> + Send + 'static,
{
    async fn confirm(&self, prompt: &ConfirmationPrompt) -> ConfirmationResult {
        self(prompt.clone()).await
    }
}
