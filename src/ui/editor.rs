//! External editor invocation.

use std::env;
use std::fs;
use std::path::Path;
use std::process::Command;

use tempfile::Builder;
use tracing::debug;

use crate::error::EditorError;

/// Environment variable naming the editor command.
pub const EDITOR_ENV_VAR: &str = "EDITOR";

#[cfg(windows)]
const DEFAULT_EDITOR: &str = "notepad";
#[cfg(not(windows))]
const DEFAULT_EDITOR: &str = "vim";

/// An editor command line, e.g. `code --wait`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Editor {
    program: String,
    args: Vec<String>,
}

impl Editor {
    /// Parse a command such as `"nvim -u NONE"` into program and arguments.
    ///
    /// Returns `None` for an empty or whitespace-only command.
    pub fn parse(command: &str) -> Option<Self> {
        let mut parts = command.split_whitespace().map(str::to_string);
        let program = parts.next()?;
        Some(Self {
            program,
            args: parts.collect(),
        })
    }

    /// The editor from `EDITOR`, or the platform default.
    pub fn from_env() -> Self {
        env::var(EDITOR_ENV_VAR)
            .ok()
            .and_then(|command| Self::parse(&command))
            .unwrap_or_else(|| Self {
                program: DEFAULT_EDITOR.to_string(),
                args: Vec::new(),
            })
    }

    pub fn program(&self) -> &str {
        &self.program
    }

    /// Open `path` and wait for the editor to exit.
    pub fn open(&self, path: &Path) -> Result<(), EditorError> {
        if which::which(&self.program).is_err() {
            return Err(EditorError::NotFound(self.program.clone()));
        }

        debug!("Opening {} with {}", path.display(), self.program);
        let status = Command::new(&self.program)
            .args(&self.args)
            .arg(path)
            .status()
            .map_err(|source| EditorError::SpawnFailed {
                program: self.program.clone(),
                source,
            })?;

        if !status.success() {
            return Err(EditorError::NonZeroExit {
                program: self.program.clone(),
                code: status.code(),
            });
        }

        Ok(())
    }

    /// Edit `initial` in a scratch file and return the trimmed result.
    ///
    /// The scratch file is removed afterwards whether or not the edit worked.
    pub fn edit_text(&self, initial: &str) -> Result<String, EditorError> {
        let file = Builder::new()
            .prefix("ez-commit-")
            .suffix(".txt")
            .tempfile()
            .map_err(EditorError::ScratchFile)?;
        let path = file.into_temp_path();

        fs::write(&path, initial).map_err(EditorError::ScratchFile)?;
        self.open(&path)?;

        let edited = fs::read_to_string(&path).map_err(EditorError::ScratchFile)?;
        Ok(edited.trim().to_string())
    }
}
