//! Real-time fan-out of chat events
//!
//! Bridges mutation completion to active GraphQL subscriptions. Single
//! process only: subscribers attached to another instance never see these
//! messages.

mod topic;

pub use topic::{SubscriberId, Subscription, TopicBroker};

use crate::types::{ChatError, Message};

/// Fixed topic carrying every error raised by a handler
pub const ERRORS_TOPIC: &str = "errors";

/// Message and error brokers shared by handlers and subscription resolvers.
/// Messages are keyed by conversation identifier.
#[derive(Clone, Default)]
pub struct ChatEvents {
    messages: TopicBroker<Message>,
    errors: TopicBroker<ChatError>,
}

impl ChatEvents {
    pub fn new() -> Self {
        Self::default()
    }

    /// Publish a message under its conversation's topic
    pub fn publish_message(&self, message: &Message) -> usize {
        self.messages
            .publish(&message.conversation_id, message.clone())
    }

    pub fn publish_error(&self, error: ChatError) -> usize {
        self.errors.publish(ERRORS_TOPIC, error)
    }

    pub fn subscribe_messages(&self, conversation_id: &str) -> Subscription<Message> {
        self.messages.subscribe(conversation_id)
    }

    pub fn subscribe_errors(&self) -> Subscription<ChatError> {
        self.errors.subscribe(ERRORS_TOPIC)
    }

    pub fn message_subscriber_count(&self, conversation_id: &str) -> usize {
        self.messages.subscriber_count(conversation_id)
    }

    pub fn error_subscriber_count(&self) -> usize {
        self.errors.subscriber_count(ERRORS_TOPIC)
    }

    /// Conversations with at least one live subscriber
    pub fn active_conversations(&self) -> usize {
        self.messages.topic_count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_messages_routed_by_conversation() {
        let events = ChatEvents::new();
        let mut sub = events.subscribe_messages("conv-1");

        events.publish_message(&Message::user("elsewhere", "conv-2"));
        let msg = Message::user("hi", "conv-1");
        assert_eq!(events.publish_message(&msg), 1);

        assert_eq!(sub.try_recv(), Some(msg));
        assert_eq!(sub.try_recv(), None);
    }

    #[test]
    fn test_errors_go_to_fixed_topic() {
        let events = ChatEvents::new();
        let mut sub = events.subscribe_errors();
        assert_eq!(sub.topic(), ERRORS_TOPIC);

        events.publish_error(ChatError::new("boom", "INTERNAL_ERROR"));
        assert_eq!(sub.try_recv().map(|e| e.code), Some("INTERNAL_ERROR".to_string()));
        assert_eq!(events.error_subscriber_count(), 1);
    }
}
