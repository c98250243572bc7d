//! Read handlers

use crate::error::{ChatResult, ChatServiceError};
use crate::types::{Conversation, Lookup, Message, ModelCapability};

use super::ChatService;

impl ChatService {
    /// Messages of a conversation, oldest first. Unknown conversations yield
    /// an empty list rather than an error.
    pub async fn get_messages(&self, conversation_id: &str) -> ChatResult<Vec<Message>> {
        tracing::debug!(conversation_id, "Listing messages");
        let result = self
            .store
            .get_messages(conversation_id)
            .await
            .map_err(ChatServiceError::from);
        self.observe(result, Some(conversation_id))
    }

    /// All conversations, newest first
    pub async fn get_conversations(&self) -> ChatResult<Vec<Conversation>> {
        tracing::debug!("Listing conversations");
        let result = self
            .store
            .get_conversations()
            .await
            .map_err(ChatServiceError::from);
        self.observe(result, None)
    }

    pub async fn get_conversation(&self, id: &str) -> ChatResult<Conversation> {
        tracing::debug!(conversation_id = id, "Fetching conversation");
        let result = match self.store.get_conversation(id).await {
            Ok(Lookup::Found(conversation)) => Ok(conversation),
            Ok(Lookup::NotFound) => Err(ChatServiceError::conversation_not_found(id)),
            Err(e) => Err(e.into()),
        };
        self.observe(result, Some(id))
    }

    /// Static model list; never fails
    pub fn model_capabilities(&self) -> Vec<ModelCapability> {
        self.models.all().to_vec()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::broker::ChatEvents;
    use crate::store::MemoryStore;

    #[tokio::test]
    async fn test_get_conversation_not_found_is_reported() {
        let service = ChatService::new(Arc::new(MemoryStore::new()), ChatEvents::new());
        let mut errors = service.subscribe_errors();

        let err = service.get_conversation("missing").await.unwrap_err();
        assert_eq!(err.code(), "CONVERSATION_NOT_FOUND");

        let published = errors.try_recv().unwrap();
        assert_eq!(published.code, "CONVERSATION_NOT_FOUND");
        assert_eq!(published.conversation_id.as_deref(), Some("missing"));
    }

    #[tokio::test]
    async fn test_model_capabilities_from_catalog() {
        let service = ChatService::new(Arc::new(MemoryStore::new()), ChatEvents::new());
        let models = service.model_capabilities();
        assert!(models.iter().any(|m| m.name == "claude-3-opus-20240229"));
    }
}
