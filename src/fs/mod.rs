//! Filesystem utilities for reclaim.
//!
//! Atomic writes for the quarantine index, relocation that survives
//! cross-device moves, and concurrent recursive sizing.

pub mod atomic;
mod move_path;
mod size;

pub use atomic::{atomic_write, atomic_write_json};
pub use move_path::{move_path, remove_path};
pub use size::path_size;
