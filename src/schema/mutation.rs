//! Mutation root

use async_graphql::{Context, Object};

use super::chat_service;
use crate::types::{Conversation, Message, SendMessageInput};

#[derive(Default)]
pub struct MutationRoot;

#[Object]
impl MutationRoot {
    async fn send_message(
        &self,
        ctx: &Context<'_>,
        input: SendMessageInput,
    ) -> async_graphql::Result<Message> {
        let service = chat_service(ctx)?;
        let conversation_id = input.conversation_id.clone();
        service
            .send_message(input)
            .await
            .map_err(|e| service.graphql_error(&e, Some(conversation_id.as_str())))
    }

    async fn start_conversation(
        &self,
        ctx: &Context<'_>,
        model: String,
    ) -> async_graphql::Result<Conversation> {
        let service = chat_service(ctx)?;
        service
            .start_conversation(&model)
            .await
            .map_err(|e| service.graphql_error(&e, None))
    }
}
