//! The interactive approval loop.
//!
//! Generate a message for the pending diff, show it, then act on single-key
//! choices until the user saves or cancels:
//!
//! ```text
//! INIT -> DISPLAY -> { edit | feedback | save | cancel } -> DISPLAY | done
//! ```

use tracing::{debug, warn};

use crate::error::AppError;
use crate::git::Gateway;
use crate::llm::{ChatBackend, ChatMessage, MessageGenerator, feedback_turns};
use crate::ui::Prompter;

use super::validate::check_message;

/// A choice made at the action prompt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Edit,
    Feedback,
    Save,
    Cancel,
}

impl Action {
    /// Map a key press to an action, ignoring case.
    pub fn from_key(key: char) -> Option<Self> {
        match key.to_ascii_lowercase() {
            'e' => Some(Action::Edit),
            'i' => Some(Action::Feedback),
            's' => Some(Action::Save),
            'c' => Some(Action::Cancel),
            _ => None,
        }
    }
}

/// How a session that did not fail ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// Preview mode: the message was shown and nothing was committed.
    Previewed { message: String },
    /// The message was committed as `id`.
    Committed { id: String, message: String },
}

/// One run of the approval loop.
pub struct ApprovalLoop<'a, G: ?Sized, B, P: ?Sized> {
    gateway: &'a G,
    generator: &'a MessageGenerator<B>,
    prompter: &'a mut P,
    preview: bool,
}

impl<'a, G, B, P> ApprovalLoop<'a, G, B, P>
where
    G: Gateway + ?Sized,
    B: ChatBackend,
    P: Prompter + ?Sized,
{
    pub fn new(
        gateway: &'a G,
        generator: &'a MessageGenerator<B>,
        prompter: &'a mut P,
        preview: bool,
    ) -> Self {
        Self {
            gateway,
            generator,
            prompter,
            preview,
        }
    }

    /// Run until the message is committed, previewed, or the session ends.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Cancelled`] when the user cancels, and the failing
    /// component's error for anything else. A failed feedback round only ends
    /// the session if the user declines to keep the current message.
    pub async fn run(&mut self) -> Result<Outcome, AppError> {
        let diff = self.gateway.diff()?;
        self.prompter.info("Generating commit message...");
        let mut message = self.generator.generate(self.gateway, Some(&diff), &[]).await?;
        check_message(&message)?;

        let mut history: Vec<ChatMessage> = Vec::new();

        loop {
            self.prompter.show_message("Generated commit message", &message)?;

            if self.preview {
                return Ok(Outcome::Previewed { message });
            }

            match self.next_action()? {
                Action::Edit => {
                    let edited = self.prompter.edit_text(&message)?;
                    let edited = edited.trim();
                    check_message(edited)?;
                    message = edited.to_string();
                }
                Action::Feedback => {
                    self.feedback_round(&diff, &mut history, &mut message).await?;
                }
                Action::Save => {
                    check_message(&message)?;
                    let id = self.gateway.commit(&message)?;
                    self.prompter.success("Changes committed successfully!");
                    return Ok(Outcome::Committed { id, message });
                }
                Action::Cancel => {
                    debug!("Commit cancelled by user");
                    return Err(AppError::Cancelled);
                }
            }
        }
    }

    /// Prompt until a recognised key is pressed.
    fn next_action(&mut self) -> Result<Action, AppError> {
        loop {
            self.prompter.show_actions()?;
            let key = self.prompter.read_key()?;
            match Action::from_key(key) {
                Some(action) => return Ok(action),
                None => self.prompter.warning(
                    "Invalid choice. Please select (e)dit, (c)ancel, (i)nteractive, or (s)ave",
                ),
            }
        }
    }

    /// Regenerate from the original diff plus the accumulated feedback.
    ///
    /// `history` and `message` are only updated when the new message is valid.
    async fn feedback_round(
        &mut self,
        diff: &str,
        history: &mut Vec<ChatMessage>,
        message: &mut String,
    ) -> Result<(), AppError> {
        let suggestion = self.prompter.read_feedback(message)?;
        let suggestion = suggestion.trim();
        if suggestion.is_empty() {
            self.prompter.info("No feedback given, keeping the current message.");
            return Ok(());
        }

        let mut candidate = history.clone();
        candidate.extend(feedback_turns(message, suggestion));

        self.prompter.info("Regenerating commit message...");
        let regenerated = match self
            .generator
            .generate(self.gateway, Some(diff), &candidate)
            .await
        {
            Ok(text) => check_message(&text).map(|()| text).map_err(AppError::from),
            Err(err) => Err(err),
        };

        match regenerated {
            Ok(text) => {
                *history = candidate;
                *message = text;
                Ok(())
            }
            Err(err) => {
                warn!("Feedback regeneration failed: {}", err);
                self.prompter.error(&err.to_string());
                if self
                    .prompter
                    .confirm("Keep the current message and continue?")?
                {
                    Ok(())
                } else {
                    Err(err)
                }
            }
        }
    }
}
