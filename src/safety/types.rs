//! Validation result types.

use serde::Serialize;
use std::path::PathBuf;

/// One reason a path deserves attention before deletion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PathConcern {
    /// Protected system path. Blocking.
    System,
    /// Critical user location (documents, credentials, project data).
    CriticalUser(String),
    /// Directory with more immediate children than the policy threshold.
    LargeDirectory { threshold: usize },
    /// A file that could not be opened for exclusive access.
    InUse,
    /// The path does not exist.
    Missing,
}

impl PathConcern {
    pub fn is_blocking(&self) -> bool {
        matches!(self, PathConcern::System)
    }
}

/// Classification of a single candidate path.
#[derive(Debug, Clone)]
pub struct PathAssessment {
    /// The path exactly as supplied by the caller.
    pub input: PathBuf,
    /// Absolute, canonical (where possible) form used for every decision.
    pub resolved: PathBuf,
    pub concerns: Vec<PathConcern>,
}

impl PathAssessment {
    pub fn is_system(&self) -> bool {
        self.concerns.iter().any(PathConcern::is_blocking)
    }

    /// Human-readable warning lines for every non-blocking concern.
    pub fn warnings(&self) -> Vec<String> {
        let path = self.resolved.display();
        self.concerns
            .iter()
            .filter_map(|concern| match concern {
                PathConcern::System => None,
                PathConcern::CriticalUser(reason) => {
                    Some(format!("Critical location: {}", reason))
                }
                PathConcern::LargeDirectory { threshold } => Some(format!(
                    "Large directory: {} has more than {} entries and may take a while",
                    path, threshold
                )),
                PathConcern::InUse => Some(format!("File may be in use: {}", path)),
                PathConcern::Missing => Some(format!("Path does not exist: {}", path)),
            })
            .collect()
    }
}

/// Aggregate outcome of validating a batch of paths.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidationResult {
    /// False iff at least one blocking system path was found.
    pub is_valid: bool,
    pub warnings: Vec<String>,
    pub blockers: Vec<String>,
    /// System paths, as supplied by the caller.
    pub system_paths: Vec<PathBuf>,
}

impl ValidationResult {
    pub fn from_assessments(assessments: &[PathAssessment]) -> Self {
        let mut result = ValidationResult {
            is_valid: true,
            ..Default::default()
        };

        for assessment in assessments {
            if assessment.is_system() {
                result.is_valid = false;
                result.blockers.push(format!(
                    "System path cannot be deleted: {}",
                    assessment.resolved.display()
                ));
                result.system_paths.push(assessment.input.clone());
            }
            result.warnings.extend(assessment.warnings());
        }

        result
    }
}
