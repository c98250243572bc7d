//! Cloud event publisher collaborator
//!
//! Notifies downstream systems about persisted documents. Independent of the
//! in-process broker: nothing published here reaches GraphQL subscribers.

mod event_grid;

pub use event_grid::{EventGridEvent, EventGridPublisher};

use async_trait::async_trait;
use serde_json::Value;
use thiserror::Error;

use crate::types::{Conversation, Message};

#[derive(Error, Debug)]
pub enum PublishError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Publisher rejected event with status {status}: {body}")]
    Rejected { status: u16, body: String },

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Domain events emitted after a successful write
#[derive(Debug, Clone)]
pub enum ChatEvent {
    MessageSent(Message),
    ConversationStarted(Conversation),
}

impl ChatEvent {
    pub fn event_type(&self) -> &'static str {
        match self {
            ChatEvent::MessageSent(_) => "Chat.MessageSent",
            ChatEvent::ConversationStarted(_) => "Chat.ConversationStarted",
        }
    }

    pub fn subject(&self) -> String {
        match self {
            ChatEvent::MessageSent(m) => {
                format!("conversations/{}/messages/{}", m.conversation_id, m.id)
            }
            ChatEvent::ConversationStarted(c) => format!("conversations/{}", c.id),
        }
    }

    pub fn data(&self) -> Result<Value, serde_json::Error> {
        match self {
            ChatEvent::MessageSent(m) => serde_json::to_value(m),
            ChatEvent::ConversationStarted(c) => serde_json::to_value(c),
        }
    }
}

#[async_trait]
pub trait EventPublisher: Send + Sync {
    async fn publish(&self, event: &ChatEvent) -> Result<(), PublishError>;
}

/// Publisher used when no cloud endpoint is configured
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopPublisher;

#[async_trait]
impl EventPublisher for NoopPublisher {
    async fn publish(&self, event: &ChatEvent) -> Result<(), PublishError> {
        tracing::trace!(event_type = event.event_type(), subject = %event.subject(), "Event not published (no publisher)");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_subjects() {
        let conversation = Conversation::new("gpt-4");
        let event = ChatEvent::ConversationStarted(conversation.clone());
        assert_eq!(event.subject(), format!("conversations/{}", conversation.id));
        assert_eq!(event.event_type(), "Chat.ConversationStarted");

        let message = Message::user("hi", &conversation.id);
        let event = ChatEvent::MessageSent(message.clone());
        assert!(event.subject().ends_with(&format!("/messages/{}", message.id)));
        assert_eq!(event.data().unwrap()["content"], "hi");
    }
}
