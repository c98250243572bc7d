//! Chat message types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Author of a message
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::User => "user",
            Role::Assistant => "assistant",
        }
    }
}

/// A single message in a conversation. Never mutated after creation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Message {
    pub id: String,
    pub content: String,
    pub role: Role,
    pub conversation_id: String,
    pub timestamp: DateTime<Utc>,
}

impl Message {
    /// Create a message with a fresh identifier stamped with the current time
    pub fn new(role: Role, content: impl Into<String>, conversation_id: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            content: content.into(),
            role,
            conversation_id: conversation_id.into(),
            timestamp: Utc::now(),
        }
    }

    pub fn user(content: impl Into<String>, conversation_id: impl Into<String>) -> Self {
        Self::new(Role::User, content, conversation_id)
    }

    pub fn assistant(content: impl Into<String>, conversation_id: impl Into<String>) -> Self {
        Self::new(Role::Assistant, content, conversation_id)
    }
}

/// Input accepted by the send-message mutation
#[derive(Debug, Clone, Serialize, Deserialize, async_graphql::InputObject)]
#[serde(rename_all = "camelCase")]
pub struct SendMessageInput {
    pub content: String,
    pub conversation_id: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_serializes_lowercase() {
        let json = serde_json::to_string(&Role::Assistant).unwrap();
        assert_eq!(json, "\"assistant\"");
        assert_eq!(Role::User.as_str(), "user");
    }

    #[test]
    fn test_new_messages_get_distinct_ids() {
        let a = Message::user("hi", "conv-1");
        let b = Message::user("hi", "conv-1");
        assert!(!a.id.is_empty());
        assert_ne!(a.id, b.id);
        assert_eq!(a.role, Role::User);
    }

    #[test]
    fn test_message_document_uses_camel_case() {
        let msg = Message::assistant("hello", "conv-9");
        let json = serde_json::to_value(&msg).unwrap();
        assert_eq!(json["conversationId"], "conv-9");
        assert_eq!(json["role"], "assistant");
    }
}
