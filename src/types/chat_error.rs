//! Transient error notifications fanned out to `onError` subscribers

use serde::{Deserialize, Serialize};

/// Error notification. Built whenever a handler fails; never persisted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, async_graphql::SimpleObject)]
#[serde(rename_all = "camelCase")]
pub struct ChatError {
    pub message: String,
    pub code: String,
    pub conversation_id: Option<String>,
}

impl ChatError {
    pub fn new(message: impl Into<String>, code: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            code: code.into(),
            conversation_id: None,
        }
    }

    pub fn with_conversation(mut self, conversation_id: impl Into<String>) -> Self {
        self.conversation_id = Some(conversation_id.into());
        self
    }
}
