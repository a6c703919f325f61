//! Exit code constants for the reclaim CLI.
//!
//! - 0: Success
//! - 1: User error (bad args, bad config)
//! - 2: Validation failure (system paths blocked)
//! - 3: Operation failure (delete, quarantine or restore failed)
//! - 4: Cancelled by the user

/// Successful execution.
pub const SUCCESS: i32 = 0;

/// User error: bad arguments, invalid configuration.
pub const USER_ERROR: i32 = 1;

/// Validation failure: one or more paths are protected system paths.
pub const VALIDATION_FAILURE: i32 = 2;

/// Operation failure: at least one path could not be deleted or restored.
pub const OPERATION_FAILURE: i32 = 3;

/// The user declined the confirmation prompt.
pub const CANCELLED: i32 = 4;
