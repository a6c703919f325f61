//! Path safety classification.
//!
//! Decides, without side effects, whether each candidate path is:
//! - a protected system path (blocking)
//! - a critical user location (warning)
//! - a large directory (warning)
//! - a file that is possibly in use (warning)

mod policy;
mod types;
mod validator;


pub use policy::SafetyPolicy;
pub use types::{PathAssessment, PathConcern, ValidationResult};
pub use validator::{PathValidator, resolve_path};
