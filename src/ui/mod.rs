//! Terminal interaction and the external editor.

pub mod editor;
pub mod terminal;

use std::path::Path;

use crate::error::{EditorError, UiError};

pub use editor::Editor;
pub use terminal::{TerminalUi, report_error};

/// The user-facing side of the approval loop and config commands.
///
/// [`TerminalUi`] is the real implementation; tests drive the loop with a
/// scripted one.
pub trait Prompter {
    /// Render `message` under `title`.
    fn show_message(&mut self, title: &str, message: &str) -> Result<(), UiError>;

    /// List the available actions.
    fn show_actions(&mut self) -> Result<(), UiError>;

    /// Read a single key press.
    fn read_key(&mut self) -> Result<char, UiError>;

    /// Ask for free-text changes to `current`.
    fn read_feedback(&mut self, current: &str) -> Result<String, UiError>;

    /// Yes/no question.
    fn confirm(&mut self, prompt: &str) -> Result<bool, UiError>;

    /// Edit `initial` in the external editor and return the trimmed result.
    fn edit_text(&mut self, initial: &str) -> Result<String, EditorError>;

    /// Open `path` in the external editor.
    fn edit_file(&mut self, path: &Path) -> Result<(), EditorError>;

    fn info(&mut self, message: &str);
    fn success(&mut self, message: &str);
    fn warning(&mut self, message: &str);
    fn error(&mut self, message: &str);
}
