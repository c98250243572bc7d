//! Output object resolvers for stored documents

use async_graphql::{Context, Object, ID};

use super::chat_service;
use crate::types::{Conversation, Message};

#[Object]
impl Message {
    async fn id(&self) -> ID {
        ID(self.id.clone())
    }

    async fn content(&self) -> &str {
        &self.content
    }

    async fn role(&self) -> &str {
        self.role.as_str()
    }

    async fn conversation_id(&self) -> &str {
        &self.conversation_id
    }

    /// RFC 3339 creation instant
    async fn timestamp(&self) -> String {
        self.timestamp.to_rfc3339()
    }
}

#[Object]
impl Conversation {
    async fn id(&self) -> ID {
        ID(self.id.clone())
    }

    async fn model(&self) -> &str {
        &self.model
    }

    async fn created_at(&self) -> String {
        self.created_at.to_rfc3339()
    }

    /// Messages of this conversation, oldest first
    async fn messages(&self, ctx: &Context<'_>) -> async_graphql::Result<Vec<Message>> {
        let service = chat_service(ctx)?;
        service
            .get_messages(&self.id)
            .await
            .map_err(|e| service.graphql_error(&e, Some(self.id.as_str())))
    }
}
