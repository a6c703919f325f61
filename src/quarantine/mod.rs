//! Quarantine: a restorable holding area outside the OS trash.
//!
//! Used when the platform trash is unavailable or fails, or when the caller
//! asks to keep items restorable through reclaim itself.

mod store;
mod types;

#[cfg(test)]
mod tests;

pub use store::{QuarantineStore, RestoreOutcome};
pub use types::{EntryKind, EntryMetadata, QuarantineEntry, QuarantineIndex};
