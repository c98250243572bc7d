//! Chat service - mutation and query handlers
//!
//! Handlers validate input, talk to the store, and publish results to the
//! in-process broker. Every failure is also published on the errors topic
//! before it is returned to the caller.

mod mutation;
mod query;

use std::sync::Arc;

use crate::broker::{ChatEvents, Subscription};
use crate::config::Environment;
use crate::error::ChatServiceError;
use crate::models::{CompletionProvider, ModelCatalog};
use crate::publisher::{ChatEvent, EventPublisher, NoopPublisher};
use crate::store::ChatStore;
use crate::types::{ChatError, Message};

/// Handlers shared by every transport
pub struct ChatService {
    store: Arc<dyn ChatStore>,
    events: ChatEvents,
    models: ModelCatalog,
    publisher: Arc<dyn EventPublisher>,
    completion: Option<Arc<dyn CompletionProvider>>,
    environment: Environment,
}

impl ChatService {
    /// Service with the default model catalog and no cloud publisher
    pub fn new(store: Arc<dyn ChatStore>, events: ChatEvents) -> Self {
        Self {
            store,
            events,
            models: ModelCatalog::default(),
            publisher: Arc::new(NoopPublisher),
            completion: None,
            environment: Environment::default(),
        }
    }

    pub fn with_models(mut self, models: ModelCatalog) -> Self {
        self.models = models;
        self
    }

    pub fn with_publisher(mut self, publisher: Arc<dyn EventPublisher>) -> Self {
        self.publisher = publisher;
        self
    }

    /// Enable the assistant reply branch of `send_message`
    pub fn with_completion(mut self, completion: Arc<dyn CompletionProvider>) -> Self {
        self.completion = Some(completion);
        self
    }

    pub fn with_environment(mut self, environment: Environment) -> Self {
        self.environment = environment;
        self
    }

    pub fn events(&self) -> &ChatEvents {
        &self.events
    }

    pub fn environment(&self) -> Environment {
        self.environment
    }

    /// Internal fault details are only shown to clients in development
    pub fn expose_internal(&self) -> bool {
        self.environment.is_development()
    }

    pub fn subscribe_messages(&self, conversation_id: &str) -> Subscription<Message> {
        tracing::debug!(conversation_id, "Subscribing to messages");
        self.events.subscribe_messages(conversation_id)
    }

    pub fn subscribe_errors(&self) -> Subscription<ChatError> {
        tracing::debug!("Subscribing to errors");
        self.events.subscribe_errors()
    }

    /// Log an error and fan it out to `onError` subscribers
    pub fn report(&self, err: &ChatServiceError, conversation_id: Option<&str>) {
        if err.is_internal() {
            tracing::error!(code = err.code(), conversation_id, error = %err, "Handler failed");
        } else {
            tracing::warn!(code = err.code(), conversation_id, error = %err, "Request rejected");
        }
        self.events
            .publish_error(err.to_chat_error(self.expose_internal(), conversation_id));
    }

    /// GraphQL form of `err`, honoring the environment's masking policy
    pub fn graphql_error(
        &self,
        err: &ChatServiceError,
        conversation_id: Option<&str>,
    ) -> async_graphql::Error {
        err.to_graphql(self.expose_internal(), conversation_id)
    }

    fn observe<T>(
        &self,
        result: Result<T, ChatServiceError>,
        conversation_id: Option<&str>,
    ) -> Result<T, ChatServiceError> {
        if let Err(err) = &result {
            self.report(err, conversation_id);
        }
        result
    }

    /// Forward to the cloud publisher. The document is already persisted, so
    /// a publisher fault is reported but does not fail the request.
    async fn notify(&self, event: ChatEvent) {
        if let Err(e) = self.publisher.publish(&event).await {
            let err = ChatServiceError::from(e);
            let conversation_id = match &event {
                ChatEvent::MessageSent(m) => m.conversation_id.as_str(),
                ChatEvent::ConversationStarted(c) => c.id.as_str(),
            };
            self.report(&err, Some(conversation_id));
        }
    }
}
