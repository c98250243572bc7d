//! GraphQL schema
//!
//! Resolvers are thin: they pull the [`ChatService`] out of the schema data,
//! delegate, and map failures to GraphQL errors with a `code` extension.
//! Failures raised before any resolver runs go through [`ErrorFanOut`].

mod errors;
mod mutation;
mod objects;
mod query;
mod subscription;

pub use errors::ErrorFanOut;
pub use mutation::MutationRoot;
pub use query::QueryRoot;
pub use subscription::SubscriptionRoot;

use std::sync::Arc;

use async_graphql::{Context, Schema};

use crate::service::ChatService;

pub type ChatSchema = Schema<QueryRoot, MutationRoot, SubscriptionRoot>;

/// Build the executable schema around a shared service
pub fn build_schema(service: Arc<ChatService>) -> ChatSchema {
    Schema::build(QueryRoot, MutationRoot, SubscriptionRoot)
        .data(service)
        .extension(ErrorFanOut)
        .finish()
}

pub(crate) fn chat_service<'a>(ctx: &Context<'a>) -> async_graphql::Result<&'a Arc<ChatService>> {
    ctx.data::<Arc<ChatService>>()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::broker::ChatEvents;
    use crate::store::MemoryStore;

    #[test]
    fn test_sdl_exposes_operations() {
        let service = Arc::new(ChatService::new(Arc::new(MemoryStore::new()), ChatEvents::new()));
        let sdl = build_schema(service).sdl();

        for field in [
            "messages(conversationId: ID!): [Message!]!",
            "conversations: [Conversation!]!",
            "conversation(id: ID!): Conversation",
            "modelCapabilities: [ModelCapability!]!",
            "sendMessage(input: SendMessageInput!): Message!",
            "startConversation(model: String!): Conversation!",
            "messageReceived(conversationId: String!): Message",
            "onError: ChatError!",
        ] {
            assert!(sdl.contains(field), "missing `{}` in schema:\n{}", field, sdl);
        }
    }
}
