//! Error types for ez-commit modules using thiserror.
//!
//! Every component returns its own enum. [`AppError`] wraps them at the
//! orchestration layer and decides the process exit code from the variant.

use std::path::PathBuf;

use thiserror::Error;

/// Errors from git operations.
#[derive(Error, Debug)]
pub enum GitError {
    #[error("Not a git repository (or any of the parent directories)")]
    NotARepository(#[source] Option<git2::Error>),

    #[error("No changes detected (staged or unstaged)")]
    NoChanges,

    #[error("Binary files detected in diff: {}", .0.join(", "))]
    BinaryContent(Vec<String>),

    #[error("Failed to collect diff: {0}")]
    DiffFailed(#[source] git2::Error),

    #[error("Commit message cannot be empty")]
    EmptyMessage,

    #[error("Nothing to commit (working tree is clean)")]
    NothingToCommit,

    #[error("Failed to stage changes: {0}")]
    StagingFailed(#[source] git2::Error),

    #[error("Failed to create commit: {0}")]
    CommitFailed(#[source] git2::Error),

    #[error("Git config error (missing user.name or user.email): {0}")]
    SignatureMissing(#[source] git2::Error),
}

/// Errors from the text-generation API.
#[derive(Error, Debug)]
pub enum GenerationError {
    #[error(
        "OpenAI API key not found. Set it with 'ez-commit config set-api-key' or the OPENAI_API_KEY environment variable"
    )]
    MissingCredentials,

    #[error("Failed to build HTTP client: {0}")]
    ClientBuild(#[source] reqwest::Error),

    #[error("Generation failed: could not reach the API: {0}")]
    Transport(#[source] reqwest::Error),

    #[error("Generation failed: API returned {status}: {message}")]
    Api { status: u16, message: String },

    #[error("Generation failed: unexpected API response: {0}")]
    InvalidResponse(String),

    #[error("Generation failed: the model returned an empty message")]
    EmptyResponse,
}

/// Errors from configuration operations.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Could not determine the user config directory")]
    NoConfigDir,

    #[error("Failed to read config file '{path}': {source}")]
    ReadFailed {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to write config file '{path}': {source}")]
    WriteFailed {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to serialize config: {0}")]
    SerializeFailed(#[from] toml::ser::Error),

    #[error("Invalid configuration: {0}")]
    Invalid(String),

    #[error("Config file '{path}' was invalid ({reason}); it has been reset to defaults")]
    ResetToDefaults { path: PathBuf, reason: String },

    #[error("{0} cannot be empty")]
    EmptyField(&'static str),

    #[error("Temperature must be between 0.0 and 1.0")]
    TemperatureOutOfRange,

    #[error("Temperature must be a decimal number between 0.0 and 1.0")]
    TemperatureNotDecimal,
}

/// A commit message that breaks the summary-line rule.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FormatError {
    #[error("Invalid commit message format: message is empty")]
    Empty,

    #[error("Invalid commit message format: first line must not be empty")]
    EmptySummary,

    #[error(
        "Invalid commit message format: first line is {len} characters, the limit is {limit}"
    )]
    SummaryTooLong { len: usize, limit: usize },
}

/// Errors from the external editor.
#[derive(Error, Debug)]
pub enum EditorError {
    #[error("Editor '{0}' not found. Set the EDITOR environment variable")]
    NotFound(String),

    #[error("Failed to start editor '{program}': {source}")]
    SpawnFailed {
        program: String,
        source: std::io::Error,
    },

    #[error("Editor '{program}' exited with {}", code.map_or("a signal".to_string(), |c| format!("code {c}")))]
    NonZeroExit { program: String, code: Option<i32> },

    #[error("Failed to prepare file for editing: {0}")]
    ScratchFile(#[source] std::io::Error),
}

/// Errors from terminal interaction.
#[derive(Error, Debug)]
pub enum UiError {
    #[error("Input aborted")]
    Aborted,

    #[error("Terminal I/O failed: {0}")]
    Terminal(#[source] std::io::Error),
}

/// Exit status reported to the invoking shell.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitStatus {
    Success,
    Cancelled,
    VersionControl,
    Generation,
    Config,
    Editor,
    Format,
    Unknown,
}

impl ExitStatus {
    pub fn code(self) -> u8 {
        match self {
            ExitStatus::Success => 0,
            ExitStatus::Cancelled => 1,
            ExitStatus::VersionControl => 2,
            ExitStatus::Generation => 3,
            ExitStatus::Config => 4,
            ExitStatus::Editor => 5,
            ExitStatus::Format => 6,
            ExitStatus::Unknown => 70,
        }
    }
}

/// Top-level error returned by the command handlers.
#[derive(Error, Debug)]
pub enum AppError {
    #[error(transparent)]
    Git(#[from] GitError),

    #[error(transparent)]
    Generation(#[from] GenerationError),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Format(#[from] FormatError),

    #[error(transparent)]
    Editor(#[from] EditorError),

    #[error("Commit cancelled")]
    Cancelled,

    #[error(transparent)]
    Unknown(#[from] anyhow::Error),
}

impl AppError {
    pub fn exit_status(&self) -> ExitStatus {
        match self {
            AppError::Git(_) => ExitStatus::VersionControl,
            AppError::Generation(_) => ExitStatus::Generation,
            AppError::Config(_) => ExitStatus::Config,
            AppError::Format(_) => ExitStatus::Format,
            AppError::Editor(_) => ExitStatus::Editor,
            AppError::Cancelled => ExitStatus::Cancelled,
            AppError::Unknown(_) => ExitStatus::Unknown,
        }
    }
}

impl From<UiError> for AppError {
    fn from(err: UiError) -> Self {
        match err {
            UiError::Aborted => AppError::Cancelled,
            UiError::Terminal(e) => {
                AppError::Unknown(anyhow::Error::new(e).context("terminal interaction failed"))
            }
        }
    }
}
