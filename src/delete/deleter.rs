//! The deletion orchestrator.
//!
//! One call to [`SafeDeleter::safe_delete`] walks a batch through
//! validation, sizing, an optional dry-run report, and routing to the trash
//! with the quarantine as fallback. Per-path problems end up in the result;
//! nothing escapes as an error.

use super::types::{DeletionMethod, DeletionOptions, DeletionResult};
use crate::fs::path_size;
use crate::quarantine::QuarantineStore;
use crate::safety::{PathValidator, ValidationResult};
use crate::trash::TrashProvider;
use futures::future::join_all;
use std::collections::HashSet;
use std::io;
use std::path::PathBuf;
use std::sync::Arc;

/// A path that survived validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Candidate {
    /// As supplied by the caller; used in results.
    pub input: PathBuf,
    /// Canonical form; what is actually moved.
    pub resolved: PathBuf,
    pub size: u64,
}

/// Validation plus sizing for a batch, shared by deletion and prompts.
#[derive(Debug, Clone, Default)]
pub struct DeletionPlan {
    pub validation: ValidationResult,
    pub candidates: Vec<Candidate>,
    /// Inputs excluded before routing (system paths, vanished paths).
    pub excluded: Vec<PathBuf>,
    pub total_size: u64,
    pub errors: Vec<String>,
}

impl DeletionPlan {
    pub fn candidate_inputs(&self) -> Vec<PathBuf> {
        self.candidates.iter().map(|c| c.input.clone()).collect()
    }
}

/// Validates, sizes and routes deletion requests.
pub struct SafeDeleter {
    validator: PathValidator,
    trash: Arc<dyn TrashProvider>,
    quarantine: QuarantineStore,
    size_warning_bytes: u64,
}

impl SafeDeleter {
    pub fn new(
        validator: PathValidator,
        trash: Arc<dyn TrashProvider>,
        quarantine: QuarantineStore,
        size_warning_bytes: u64,
    ) -> Self {
        Self {
            validator,
            trash,
            quarantine,
            size_warning_bytes,
        }
    }

    pub fn validator(&self) -> &PathValidator {
        &self.validator
    }

    pub fn trash(&self) -> &Arc<dyn TrashProvider> {
        &self.trash
    }

    pub fn quarantine(&self) -> &QuarantineStore {
        &self.quarantine
    }

    pub fn size_warning_bytes(&self) -> u64 {
        self.size_warning_bytes
    }

    /// Method a request will actually use, given trash availability.
    pub async fn effective_method(&self, options: &DeletionOptions) -> DeletionMethod {
        match options.preferred_method() {
            DeletionMethod::Trash if self.trash.is_supported().await => DeletionMethod::Trash,
            _ => DeletionMethod::Quarantine,
        }
    }

    /// Validate `paths` and size everything that is not a system path.
    ///
    /// Children of directories, and separate candidates, are sized
    /// concurrently. A path that no longer exists is excluded; any other
    /// sizing failure is recorded and the path still proceeds.
    pub async fn plan(&self, paths: &[PathBuf]) -> DeletionPlan {
        let assessments: Vec<_> = paths.iter().map(|p| self.validator.assess(p)).collect();
        let validation = ValidationResult::from_assessments(&assessments);

        let mut plan = DeletionPlan {
            validation,
            ..Default::default()
        };

        let mut seen = HashSet::new();
        let mut survivors = Vec::new();
        for assessment in assessments {
            if assessment.is_system() {
                plan.excluded.push(assessment.input);
                continue;
            }
            if !seen.insert(assessment.resolved.clone()) {
                tracing::debug!(path = %assessment.input.display(), "duplicate path in batch");
                continue;
            }
            survivors.push(assessment);
        }

        let sizes = join_all(
            survivors
                .iter()
                .map(|assessment| path_size(assessment.resolved.clone())),
        )
        .await;

        for (assessment, size) in survivors.into_iter().zip(sizes) {
            match size {
                Ok(size) => {
                    plan.total_size += size;
                    plan.candidates.push(Candidate {
                        input: assessment.input,
                        resolved: assessment.resolved,
                        size,
                    });
                }
                Err(e) if e.kind() == io::ErrorKind::NotFound => {
                    plan.errors
                        .push(format!("Path does not exist: {}", assessment.input.display()));
                    plan.excluded.push(assessment.input);
                }
                Err(e) => {
                    plan.errors.push(format!(
                        "Failed to size {}: {}",
                        assessment.input.display(),
                        e
                    ));
                    plan.candidates.push(Candidate {
                        input: assessment.input,
                        resolved: assessment.resolved,
                        size: 0,
                    });
                }
            }
        }

        plan
    }

    /// Delete a batch of paths safely.
    ///
    /// System paths are never touched. Without `skip_confirmation` their
    /// presence rejects the whole batch; with it they are skipped and
    /// reported in `failed_paths`.
    pub async fn safe_delete(&self, paths: &[PathBuf], options: DeletionOptions) -> DeletionResult {
        if paths.is_empty() {
            return DeletionResult {
                success: true,
                method: options.preferred_method(),
                dry_run: options.dry_run,
                ..Default::default()
            };
        }

        let plan = self.plan(paths).await;

        if !plan.validation.is_valid && !options.skip_confirmation {
            tracing::warn!(
                blocked = plan.validation.system_paths.len(),
                "deletion rejected by validation"
            );
            let mut result = DeletionResult::rejected(&options, plan.validation.blockers.clone());
            result.blocked = true;
            result.failed_paths = plan.validation.system_paths.clone();
            result.warnings = plan.validation.warnings.clone();
            return result;
        }

        let mut result = DeletionResult {
            method: options.preferred_method(),
            dry_run: options.dry_run,
            total_size: plan.total_size,
            failed_paths: plan.excluded.clone(),
            errors: plan.errors.clone(),
            warnings: plan.validation.warnings.clone(),
            ..Default::default()
        };

        if options.dry_run {
            result.method = self.effective_method(&options).await;
            result.processed_paths = plan.candidate_inputs();
            result.success = true;
            tracing::info!(
                paths = result.processed_paths.len(),
                bytes = result.total_size,
                "dry run, nothing changed"
            );
            return result;
        }

        if plan.candidates.is_empty() {
            result.success = result.errors.is_empty();
            return result;
        }

        let method = self.effective_method(&options).await;
        let to_quarantine = match method {
            DeletionMethod::Trash => self.route_to_trash(&plan.candidates, &mut result).await,
            DeletionMethod::Quarantine => plan.candidates.clone(),
        };
        result.method = method;

        if !to_quarantine.is_empty() {
            result.method = DeletionMethod::Quarantine;
            self.route_to_quarantine(&to_quarantine, &mut result).await;
        }

        result.success = !result.processed_paths.is_empty();
        result
    }

    /// Trash what the provider can; return the candidates to fall back on.
    async fn route_to_trash(
        &self,
        candidates: &[Candidate],
        result: &mut DeletionResult,
    ) -> Vec<Candidate> {
        let resolved: Vec<PathBuf> = candidates.iter().map(|c| c.resolved.clone()).collect();
        let report = self.trash.move_to_trash(&resolved).await;

        let trashed: HashSet<&PathBuf> = report.trashed.iter().collect();
        let mut fallback = Vec::new();

        for candidate in candidates {
            if trashed.contains(&candidate.resolved) {
                result.processed_paths.push(candidate.input.clone());
                continue;
            }

            let reason = report
                .failed
                .iter()
                .find(|(path, _)| path == &candidate.resolved)
                .map(|(_, reason)| reason.as_str())
                .unwrap_or("not reported by trash provider");

            // A failed trash attempt can still have moved the object.
            if tokio::fs::symlink_metadata(&candidate.resolved).await.is_err() {
                tracing::warn!(
                    path = %candidate.input.display(),
                    reason,
                    "trash reported failure but path is gone"
                );
                result.processed_paths.push(candidate.input.clone());
                continue;
            }

            tracing::warn!(
                path = %candidate.input.display(),
                reason,
                "trash failed, falling back to quarantine"
            );
            fallback.push(candidate.clone());
        }

        fallback
    }

    async fn route_to_quarantine(&self, candidates: &[Candidate], result: &mut DeletionResult) {
        let resolved: Vec<PathBuf> = candidates.iter().map(|c| c.resolved.clone()).collect();

        let entries = match self.quarantine.quarantine(&resolved).await {
            Ok(entries) => entries,
            Err(e) => {
                tracing::warn!(error = %e, "quarantine failed");
                result.errors.push(e.to_string());
                // The store puts objects back when its index write fails;
                // anything still missing is stranded without an entry.
                for candidate in candidates {
                    if tokio::fs::symlink_metadata(&candidate.resolved).await.is_err() {
                        result.errors.push(format!(
                            "{} is in quarantine without an index entry",
                            candidate.input.display()
                        ));
                    }
                    result.failed_paths.push(candidate.input.clone());
                }
                return;
            }
        };

        for candidate in candidates {
            match entries
                .iter()
                .find(|entry| entry.original_path == candidate.resolved)
            {
                Some(entry) => {
                    result.processed_paths.push(candidate.input.clone());
                    result.quarantine_ids.push(entry.id.clone());
                }
                None => {
                    result.failed_paths.push(candidate.input.clone());
                    result
                        .errors
                        .push(format!("Failed to quarantine {}", candidate.input.display()));
                }
            }
        }
    }
}
