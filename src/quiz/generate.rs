//! Retry wrapper around nondeterministic generator output.
//!
//! The generator is asked for strict JSON; when it replies with something that
//! does not decode into the expected shape, a fresh generation turn is
//! requested after a short fixed delay, up to a configured ceiling. Transport
//! failures are different: the conversation may already have advanced
//! upstream, so they surface immediately and are never replayed.

use std::sync::Arc;
use std::time::Duration;

use serde::de::DeserializeOwned;
use tokio::time::sleep;
use tracing::warn;

use crate::{
    clients::{ChatModel, Conversation},
    error::QuizError,
};

/// Shape-agnostic generation stage shared by all quiz variants.
#[derive(Clone)]
pub struct RetryingGenerator {
    chat: Arc<dyn ChatModel>,
    max_retries: u32,
    retry_delay: Duration,
}

impl RetryingGenerator {
    /// Wrap a chat model with the given retry ceiling and inter-attempt delay.
    pub fn new(chat: Arc<dyn ChatModel>, max_retries: u32, retry_delay: Duration) -> Self {
        Self {
            chat,
            max_retries: max_retries.max(1),
            retry_delay,
        }
    }

    /// Handle to the underlying chat model.
    pub fn chat(&self) -> &Arc<dyn ChatModel> {
        &self.chat
    }

    /// Send `prompt` on `conversation` and decode the reply into `T`,
    /// re-generating on malformed output until the retry ceiling is hit.
    pub async fn ask<T: DeserializeOwned>(
        &self,
        conversation: &mut Conversation,
        prompt: &str,
    ) -> Result<T, QuizError> {
        let mut last_error = String::new();

        for attempt in 1..=self.max_retries {
            let reply = self.chat.send(conversation, prompt.to_owned()).await?;

            match serde_json::from_str::<T>(reply.trim()) {
                Ok(value) => return Ok(value),
                Err(err) => {
                    warn!(
                        attempt,
                        max_retries = self.max_retries,
                        error = %err,
                        reply,
                        "generator replied in an unexpected format"
                    );
                    last_error = format!("{err} (reply: {reply})");
                    if attempt < self.max_retries {
                        sleep(self.retry_delay).await;
                    }
                }
            }
        }

        Err(QuizError::MalformedOutput(last_error))
    }
}
