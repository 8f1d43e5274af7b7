//! Commit message generation from a diff.

use tracing::debug;

use crate::config::ConfigStore;
use crate::error::{AppError, GenerationError};
use crate::git::Gateway;

use super::client::{ChatBackend, CompletionRequest};
use super::prompt::{ChatMessage, build_prompt};

/// Generates commit messages with an explicitly owned backend.
pub struct MessageGenerator<B> {
    backend: B,
    store: ConfigStore,
}

impl<B: ChatBackend> MessageGenerator<B> {
    pub fn new(backend: B, store: ConfigStore) -> Self {
        Self { backend, store }
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    /// Generate a message for `diff`, or for the gateway's current diff when
    /// `diff` is `None`.
    ///
    /// The configuration is loaded and validated on every call so that edits
    /// made between runs take effect. The reply is trimmed; an empty reply is
    /// an error.
    pub async fn generate<G>(
        &self,
        gateway: &G,
        diff: Option<&str>,
        history: &[ChatMessage],
    ) -> Result<String, AppError>
    where
        G: Gateway + ?Sized,
    {
        let fetched;
        let diff = match diff {
            Some(diff) => diff,
            None => {
                fetched = gateway.diff()?;
                fetched.as_str()
            }
        };

        let config = self.store.load()?;
        let api_key = self.store.resolve_api_key(&config);
        if api_key.is_empty() {
            return Err(GenerationError::MissingCredentials.into());
        }

        let request = CompletionRequest {
            model: config.generator.model,
            messages: build_prompt(diff, &config.system_prompt, history),
            temperature: config.generator.temperature,
            max_tokens: config.generator.max_tokens,
        };

        let reply = self.backend.complete(&api_key, &request).await?;
        let message = reply.trim();
        if message.is_empty() {
            return Err(GenerationError::EmptyResponse.into());
        }

        debug!("Generated message ({} chars)", message.chars().count());
        Ok(message.to_string())
    }
}
