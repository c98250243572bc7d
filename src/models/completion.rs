//! AI completion collaborator used for assistant replies

use async_trait::async_trait;
use thiserror::Error;

use crate::types::{Conversation, Message, ModelCapability};

#[derive(Error, Debug)]
pub enum CompletionError {
    #[error("Completion provider unavailable: {0}")]
    Unavailable(String),

    #[error("Completion rejected: {0}")]
    Rejected(String),
}

/// Produces the assistant's reply to a user message
#[async_trait]
pub trait CompletionProvider: Send + Sync {
    async fn complete(
        &self,
        conversation: &Conversation,
        message: &Message,
        model: &ModelCapability,
    ) -> Result<String, CompletionError>;
}

/// Provider answering every message with the same text. Stands in for a
/// hosted model in development and tests.
#[derive(Debug, Clone)]
pub struct CannedCompletion {
    reply: String,
}

impl CannedCompletion {
    pub fn new(reply: impl Into<String>) -> Self {
        Self {
            reply: reply.into(),
        }
    }
}

impl Default for CannedCompletion {
    fn default() -> Self {
        Self::new("Sample response")
    }
}

#[async_trait]
impl CompletionProvider for CannedCompletion {
    async fn complete(
        &self,
        conversation: &Conversation,
        _message: &Message,
        model: &ModelCapability,
    ) -> Result<String, CompletionError> {
        tracing::debug!(
            conversation_id = %conversation.id,
            model = %model.name,
            "Producing canned completion"
        );
        Ok(self.reply.clone())
    }
}
