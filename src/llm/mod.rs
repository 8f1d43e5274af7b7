//! Language-model backend and prompt construction.

pub mod client;
pub mod generator;
pub mod prompt;

pub use client::{ChatBackend, CompletionRequest, OpenAiClient};
pub use generator::MessageGenerator;
pub use prompt::{ChatMessage, Role, build_prompt, feedback_turns};
