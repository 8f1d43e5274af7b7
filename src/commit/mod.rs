//! Commit message approval and validation.

pub mod session;
pub mod validate;

pub use session::{Action, ApprovalLoop, Outcome};
pub use validate::{SUMMARY_MAX_CHARS, check_message};
