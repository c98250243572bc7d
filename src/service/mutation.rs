//! Write handlers

use crate::error::{ChatResult, ChatServiceError};
use crate::publisher::ChatEvent;
use crate::types::{Conversation, Message, SendMessageInput};

use super::ChatService;

impl ChatService {
    /// Persist a user message and publish it to the conversation's subscribers.
    /// With a completion provider configured, an assistant reply follows.
    pub async fn send_message(&self, input: SendMessageInput) -> ChatResult<Message> {
        let conversation_id = input.conversation_id;
        let context = Some(conversation_id.as_str()).filter(|id| !id.trim().is_empty());
        let result = self.send_message_inner(input.content, &conversation_id).await;
        self.observe(result, context)
    }

    async fn send_message_inner(&self, content: String, conversation_id: &str) -> ChatResult<Message> {
        if content.trim().is_empty() {
            return Err(ChatServiceError::invalid_request("content must not be empty"));
        }
        if conversation_id.trim().is_empty() {
            return Err(ChatServiceError::invalid_request(
                "conversationId must not be empty",
            ));
        }
        tracing::debug!(conversation_id, "Sending message");

        let conversation = self
            .store
            .get_conversation(conversation_id)
            .await?
            .found_or_else(|| ChatServiceError::conversation_not_found(conversation_id))?;

        let message = Message::user(content, conversation_id);
        self.store.save_message(&message).await?;
        let delivered = self.events.publish_message(&message);
        tracing::info!(
            conversation_id,
            message_id = %message.id,
            delivered,
            "Message stored"
        );
        self.notify(ChatEvent::MessageSent(message.clone())).await;

        if self.completion.is_some() {
            self.reply(&conversation, &message).await?;
        }

        Ok(message)
    }

    /// Persist and publish the assistant's answer to `message`
    async fn reply(&self, conversation: &Conversation, message: &Message) -> ChatResult<Message> {
        let Some(completion) = &self.completion else {
            return Err(ChatServiceError::Internal(
                "no completion provider configured".to_string(),
            ));
        };

        let model = self
            .models
            .find(&conversation.model)
            .ok_or_else(|| ChatServiceError::model_not_supported(&conversation.model))?;

        let text = completion.complete(conversation, message, model).await?;
        let answer = Message::assistant(text, &conversation.id);
        self.store.save_message(&answer).await?;
        self.events.publish_message(&answer);
        tracing::info!(
            conversation_id = %conversation.id,
            message_id = %answer.id,
            model = %model.name,
            "Assistant reply stored"
        );
        self.notify(ChatEvent::MessageSent(answer.clone())).await;
        Ok(answer)
    }

    /// Create a conversation bound to a known model
    pub async fn start_conversation(&self, model: &str) -> ChatResult<Conversation> {
        let result = self.start_conversation_inner(model.trim()).await;
        self.observe(result, None)
    }

    async fn start_conversation_inner(&self, model: &str) -> ChatResult<Conversation> {
        if !self.models.is_supported(model) {
            return Err(ChatServiceError::model_not_supported(model));
        }

        let conversation = Conversation::new(model);
        self.store.save_conversation(&conversation).await?;
        tracing::info!(conversation_id = %conversation.id, model, "Conversation started");
        self.notify(ChatEvent::ConversationStarted(conversation.clone()))
            .await;
        Ok(conversation)
    }
}
