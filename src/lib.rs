//! ez-commit - generate git commit messages with a language model.
//!
//! # Overview
//!
//! ez-commit reads the pending diff (staged changes, else unstaged ones), asks
//! an OpenAI-compatible chat API for a commit message, and lets the user edit,
//! refine through feedback, save, or cancel before anything is committed.

pub mod commands;
pub mod commit;
pub mod config;
pub mod error;
pub mod git;
pub mod llm;
pub mod ui;

// Re-export commonly used types
pub use commit::{ApprovalLoop, Outcome, SUMMARY_MAX_CHARS, check_message};
pub use config::{Config, ConfigStore};
pub use error::{
    AppError, ConfigError, EditorError, ExitStatus, FormatError, GenerationError, GitError,
    UiError,
};
pub use git::{Gateway, GitRepository};
pub use llm::{ChatBackend, ChatMessage, MessageGenerator, OpenAiClient};
pub use ui::{Editor, Prompter, TerminalUi};
