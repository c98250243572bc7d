//! Query root

use async_graphql::{Context, Object, ID};

use super::chat_service;
use crate::types::{Conversation, Message, ModelCapability};

#[derive(Default)]
pub struct QueryRoot;

#[Object]
impl QueryRoot {
    /// Messages of a conversation, oldest first
    async fn messages(
        &self,
        ctx: &Context<'_>,
        conversation_id: ID,
    ) -> async_graphql::Result<Vec<Message>> {
        let service = chat_service(ctx)?;
        service
            .get_messages(&conversation_id)
            .await
            .map_err(|e| service.graphql_error(&e, Some(conversation_id.as_str())))
    }

    /// All conversations, newest first
    async fn conversations(&self, ctx: &Context<'_>) -> async_graphql::Result<Vec<Conversation>> {
        let service = chat_service(ctx)?;
        service
            .get_conversations()
            .await
            .map_err(|e| service.graphql_error(&e, None))
    }

    /// A single conversation; unknown ids fail with CONVERSATION_NOT_FOUND
    async fn conversation(
        &self,
        ctx: &Context<'_>,
        id: ID,
    ) -> async_graphql::Result<Option<Conversation>> {
        let service = chat_service(ctx)?;
        service
            .get_conversation(&id)
            .await
            .map(Some)
            .map_err(|e| service.graphql_error(&e, Some(id.as_str())))
    }

    async fn model_capabilities(
        &self,
        ctx: &Context<'_>,
    ) -> async_graphql::Result<Vec<ModelCapability>> {
        Ok(chat_service(ctx)?.model_capabilities())
    }
}
