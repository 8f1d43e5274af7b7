//! Interactive terminal implementation of [`Prompter`].

use std::io;
use std::path::Path;

use console::{Term, style};
use dialoguer::{Confirm, Input};

use crate::error::{EditorError, UiError};

use super::Prompter;
use super::editor::Editor;

/// Program name used to prefix error lines.
pub const PROGRAM: &str = "ez-commit";

const RULE_WIDTH: usize = 50;

/// Prompter backed by the controlling terminal and `$EDITOR`.
pub struct TerminalUi {
    out: Term,
    err: Term,
    editor: Editor,
}

impl TerminalUi {
    pub fn new(editor: Editor) -> Self {
        Self {
            out: Term::stdout(),
            err: Term::stderr(),
            editor,
        }
    }

    pub fn from_env() -> Self {
        Self::new(Editor::from_env())
    }

    fn rule(&self) -> io::Result<()> {
        self.out.write_line(&"-".repeat(RULE_WIDTH))
    }
}

fn terminal_error(err: io::Error) -> UiError {
    match err.kind() {
        io::ErrorKind::Interrupted | io::ErrorKind::UnexpectedEof => UiError::Aborted,
        _ => UiError::Terminal(err),
    }
}

fn prompt_error(err: dialoguer::Error) -> UiError {
    match err {
        dialoguer::Error::IO(err) => terminal_error(err),
    }
}

impl Prompter for TerminalUi {
    fn show_message(&mut self, title: &str, message: &str) -> Result<(), UiError> {
        if self.out.is_term() {
            self.out.clear_screen().map_err(terminal_error)?;
        }
        self.out
            .write_line(&style(title).bold().to_string())
            .map_err(terminal_error)?;
        self.rule().map_err(terminal_error)?;
        self.out.write_line(message).map_err(terminal_error)?;
        self.rule().map_err(terminal_error)
    }

    fn show_actions(&mut self) -> Result<(), UiError> {
        let actions = [
            (style("(e)dit").green(), "Edit the commit message"),
            (style("(c)ancel").red(), "Cancel the commit"),
            (style("(i)nteractive").yellow(), "Provide feedback"),
            (style("(s)ave").blue(), "Save and commit"),
        ];

        self.out.write_line("").map_err(terminal_error)?;
        self.out
            .write_line("Available Actions:")
            .map_err(terminal_error)?;
        for (key, description) in actions {
            self.out
                .write_line(&format!("{key:<24} - {description}"))
                .map_err(terminal_error)?;
        }
        self.out
            .write_str("\nSelect an action: ")
            .map_err(terminal_error)
    }

    fn read_key(&mut self) -> Result<char, UiError> {
        let key = self.out.read_char().map_err(terminal_error)?;
        self.out
            .write_line(&key.to_string())
            .map_err(terminal_error)?;
        Ok(key)
    }

    fn read_feedback(&mut self, current: &str) -> Result<String, UiError> {
        self.show_message("Current commit message", current)?;
        self.out
            .write_line(&style("\nEnter your suggested changes:").yellow().to_string())
            .map_err(terminal_error)?;

        Input::<String>::new()
            .allow_empty(true)
            .interact_text()
            .map_err(prompt_error)
    }

    fn confirm(&mut self, prompt: &str) -> Result<bool, UiError> {
        Confirm::new()
            .with_prompt(prompt)
            .default(false)
            .interact()
            .map_err(prompt_error)
    }

    fn edit_text(&mut self, initial: &str) -> Result<String, EditorError> {
        self.editor.edit_text(initial)
    }

    fn edit_file(&mut self, path: &Path) -> Result<(), EditorError> {
        self.editor.open(path)
    }

    fn info(&mut self, message: &str) {
        let _ = self.out.write_line(&style(message).blue().to_string());
    }

    fn success(&mut self, message: &str) {
        let _ = self.out.write_line(&style(message).green().to_string());
    }

    fn warning(&mut self, message: &str) {
        let _ = self.err.write_line(&style(message).yellow().to_string());
    }

    fn error(&mut self, message: &str) {
        let _ = self.err.write_line(&style(error_line(message)).red().to_string());
    }
}

/// `ez-commit: error: <message>`
pub fn error_line(message: &str) -> String {
    format!("{PROGRAM}: error: {message}")
}

/// Print the single user-facing line for a failed run to stderr.
pub fn report_error(message: &str) {
    let _ = Term::stderr().write_line(&style(error_line(message)).red().to_string());
}
