//! Chat prompt construction for commit message generation.

use serde::{Deserialize, Serialize};

/// Author of a chat turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
}

/// One turn of the conversation sent to the model.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: Role,
    pub content: String,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: Role::System,
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            content: content.into(),
        }
    }
}

/// Build the message list: system instruction, the diff request, then any
/// prior feedback turns in order.
pub fn build_prompt(diff: &str, system_prompt: &str, history: &[ChatMessage]) -> Vec<ChatMessage> {
    let mut messages = Vec::with_capacity(2 + history.len());
    messages.push(ChatMessage::system(system_prompt));
    messages.push(ChatMessage::user(format!(
        "Generate a commit message for the following git diff:\n\n{diff}"
    )));
    messages.extend_from_slice(history);
    messages
}

/// The two turns a feedback round appends to the history.
pub fn feedback_turns(previous: &str, suggestion: &str) -> [ChatMessage; 2] {
    [
        ChatMessage::assistant(previous),
        ChatMessage::user(format!("Suggested changes: {suggestion}")),
    ]
}
