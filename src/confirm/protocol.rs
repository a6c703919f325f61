//! Prompt rendering and the confirm-then-delete flow.

use super::types::{ConfirmationPrompt, ConfirmationSession, Confirmer};
use crate::delete::{DeletionMethod, DeletionOptions, DeletionResult, SafeDeleter};
use std::path::{Path, PathBuf};

/// Error marker for a declined prompt.
pub const CANCELLED_MESSAGE: &str = "Operation cancelled by user";

/// Message for a batch with nothing left to delete.
pub const NOTHING_TO_DELETE: &str = "Nothing to delete.";

/// Batches up to this size list every item.
const MAX_LISTED: usize = 10;
/// Larger batches list this many, then a "+N more" line.
const LISTED_WHEN_TRUNCATED: usize = 8;

/// Human-readable byte count with binary units.
pub fn format_size(bytes: u64) -> String {
    const UNITS: [&str; 5] = ["B", "KB", "MB", "GB", "TB"];

    if bytes < 1024 {
        return format!("{} B", bytes);
    }
    let mut value = bytes as f64;
    let mut unit = 0;
    while value >= 1024.0 && unit < UNITS.len() - 1 {
        value /= 1024.0;
        unit += 1;
    }
    format!("{:.1} {}", value, UNITS[unit])
}

fn recoverability(method: DeletionMethod) -> &'static str {
    match method {
        DeletionMethod::Trash => "They will be moved to the trash and can be restored from there.",
        DeletionMethod::Quarantine => {
            "They will be moved to quarantine and can be restored with `reclaim restore`."
        }
    }
}

fn display_name(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

impl SafeDeleter {
    /// Build the prompt for deleting `paths` with `options`.
    ///
    /// Runs the same validation and sizing as [`SafeDeleter::safe_delete`].
    pub async fn generate_confirmation_prompt(
        &self,
        paths: &[PathBuf],
        options: &DeletionOptions,
    ) -> ConfirmationPrompt {
        let plan = self.plan(paths).await;
        let method = self.effective_method(options).await;
        let item_count = plan.candidates.len();

        let message = match plan.candidates.as_slice() {
            [] => NOTHING_TO_DELETE.to_string(),
            [only] => format!(
                "Delete \"{}\" ({})? {}",
                display_name(&only.input),
                format_size(only.size),
                recoverability(method)
            ),
            _ => format!(
                "Delete {} items ({})? {}",
                item_count,
                format_size(plan.total_size),
                recoverability(method)
            ),
        };

        let mut details: Vec<String> = if item_count <= MAX_LISTED {
            plan.candidates
                .iter()
                .map(|c| c.input.display().to_string())
                .collect()
        } else {
            plan.candidates
                .iter()
                .take(LISTED_WHEN_TRUNCATED)
                .map(|c| c.input.display().to_string())
                .collect()
        };
        if item_count > MAX_LISTED {
            details.push(format!("+{} more", item_count - LISTED_WHEN_TRUNCATED));
        }

        let mut warnings = plan.validation.warnings.clone();
        if plan.total_size > self.size_warning_bytes() {
            warnings.push(format!(
                "Total size {} exceeds {}",
                format_size(plan.total_size),
                format_size(self.size_warning_bytes())
            ));
        }
        let system_count = plan.validation.system_paths.len();
        if system_count > 0 {
            warnings.push(format!(
                "{} system path{} will be skipped",
                system_count,
                if system_count == 1 { "" } else { "s" }
            ));
        }

        ConfirmationPrompt {
            message,
            details,
            warnings,
            item_count,
            total_size: plan.total_size,
            method,
        }
    }

    /// Ask `confirmer` before deleting, when the request is interactive.
    ///
    /// The confirmer is consulted only if `options.interactive` is set, one
    /// is supplied, and neither the options nor the session already skip
    /// confirmation. A prompt with no items fails without asking. After a
    /// yes, system paths in the batch are skipped rather than rejecting it.
    pub async fn safe_delete_with_confirmation(
        &self,
        paths: &[PathBuf],
        options: DeletionOptions,
        session: &mut ConfirmationSession,
        confirmer: Option<&dyn Confirmer>,
    ) -> DeletionResult {
        let confirmer = match confirmer {
            Some(confirmer)
                if options.interactive
                    && !options.skip_confirmation
                    && !session.skips_confirmations() =>
            {
                confirmer
            }
            _ => {
                let options = DeletionOptions {
                    skip_confirmation: options.skip_confirmation
                        || (options.interactive && session.skips_confirmations()),
                    ..options
                };
                return self.safe_delete(paths, options).await;
            }
        };

        let prompt = self.generate_confirmation_prompt(paths, &options).await;
        if prompt.item_count == 0 {
            let mut result = DeletionResult::rejected(&options, vec![NOTHING_TO_DELETE.to_string()]);
            result.warnings = prompt.warnings;
            return result;
        }

        let decision = confirmer.confirm(&prompt).await;
        if !decision.confirmed {
            tracing::info!(items = prompt.item_count, "deletion declined");
            return DeletionResult::rejected(&options, vec![CANCELLED_MESSAGE.to_string()]);
        }
        session.record(&decision);

        self.safe_delete(
            paths,
            DeletionOptions {
                skip_confirmation: true,
                ..options
            },
        )
        .await
    }
}
