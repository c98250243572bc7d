//! Subscription root
//!
//! Streams end when the transport drops them, which detaches the underlying
//! broker subscription.

use async_graphql::{Context, Subscription};
use futures::{future, Stream, StreamExt};

use super::chat_service;
use crate::types::{ChatError, Message};

#[derive(Default)]
pub struct SubscriptionRoot;

#[Subscription]
impl SubscriptionRoot {
    /// Messages published to one conversation after subscribing
    async fn message_received(
        &self,
        ctx: &Context<'_>,
        conversation_id: String,
    ) -> async_graphql::Result<impl Stream<Item = Option<Message>>> {
        let subscription = chat_service(ctx)?.subscribe_messages(&conversation_id);
        Ok(subscription
            .filter(move |message| future::ready(message.conversation_id == conversation_id))
            .map(Some))
    }

    /// Every error raised by any handler after subscribing
    async fn on_error(
        &self,
        ctx: &Context<'_>,
    ) -> async_graphql::Result<impl Stream<Item = ChatError>> {
        Ok(chat_service(ctx)?.subscribe_errors())
    }
}
