//! Chat Relay
//!
//! A GraphQL chat backend: users start conversations bound to a language
//! model, post messages, and receive new messages in real time through
//! in-process publish/subscribe.
//!
//! # Modules
//!
//! - `types`: Core data structures (Message, Conversation, ModelCapability, ChatError)
//! - `error`: Handler error taxonomy and its GraphQL/notification forms
//! - `config`: Environment-driven configuration
//! - `broker`: Topic-keyed in-process publish/subscribe
//! - `store`: Document store trait and its JSONL-backed implementation
//! - `models`: Supported model catalog and assistant completion providers
//! - `publisher`: Cloud event publishing (Event Grid)
//! - `service`: Query and mutation handlers
//! - `schema`: GraphQL schema
//! - `api`: HTTP, WebSocket and SSE transports
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use chat_relay::api::{create_router, AccessGate, AppState};
//! use chat_relay::{ChatEvents, ChatService, MemoryStore};
//!
//! # async fn run() -> std::io::Result<()> {
//! let service = Arc::new(ChatService::new(Arc::new(MemoryStore::new()), ChatEvents::new()));
//! let app = create_router(Arc::new(AppState::new(service, AccessGate::open())));
//! let listener = tokio::net::TcpListener::bind("127.0.0.1:3001").await?;
//! axum::serve(listener, app).await
//! # }
//! ```

pub mod api;
pub mod broker;
pub mod config;
pub mod error;
pub mod models;
pub mod publisher;
pub mod schema;
pub mod service;
pub mod store;
pub mod types;

// Re-export commonly used items at crate root
pub use broker::{ChatEvents, Subscription, TopicBroker};
pub use config::{Config, Environment};
pub use error::{ChatResult, ChatServiceError};
pub use models::ModelCatalog;
pub use schema::{build_schema, ChatSchema};
pub use service::ChatService;
pub use store::{ChatStore, MemoryStore};
pub use types::{ChatError, Conversation, Lookup, Message, ModelCapability, Role, SendMessageInput};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Library name
pub const NAME: &str = env!("CARGO_PKG_NAME");
