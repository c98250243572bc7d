//! Storage collaborator
//!
//! Conversations and messages are documents; the conversation identifier is
//! the join key between them.

mod memory;

pub use memory::MemoryStore;

use async_trait::async_trait;
use thiserror::Error;

use crate::types::{Conversation, Lookup, Message};

/// Storage faults. All of them are unexpected from the caller's point of view.
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Document '{0}' already exists")]
    Conflict(String),
}

/// Document store for conversations and their messages
#[async_trait]
pub trait ChatStore: Send + Sync {
    async fn save_message(&self, message: &Message) -> Result<(), StoreError>;

    async fn save_conversation(&self, conversation: &Conversation) -> Result<(), StoreError>;

    /// Messages of one conversation, oldest first. Unknown ids yield an empty list.
    async fn get_messages(&self, conversation_id: &str) -> Result<Vec<Message>, StoreError>;

    /// All conversations, newest first
    async fn get_conversations(&self) -> Result<Vec<Conversation>, StoreError>;

    async fn get_conversation(&self, id: &str) -> Result<Lookup<Conversation>, StoreError>;
}
