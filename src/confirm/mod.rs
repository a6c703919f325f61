//! Informed consent before deletion.
//!
//! A prompt summarizes what a request would do (items, size, destination,
//! warnings); a [`Confirmer`] answers it. "Skip future confirmations" is kept
//! in a caller-owned [`ConfirmationSession`].

mod protocol;
mod types;


pub use protocol::{CANCELLED_MESSAGE, NOTHING_TO_DELETE, format_size};
pub use types::{ConfirmationPrompt, ConfirmationResult, ConfirmationSession, Confirmer};
