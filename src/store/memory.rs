//! In-memory document store with optional JSONL persistence
//!
//! Every saved document is appended to the file as one JSON line; the file
//! is replayed at startup.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use tokio::io::AsyncWriteExt;
use tokio::sync::Mutex;

use super::{ChatStore, StoreError};
use crate::types::{Conversation, Lookup, Message};

/// One line of the JSONL file
#[derive(Debug, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
enum Document {
    Conversation(Conversation),
    Message(Message),
}

#[derive(Default)]
struct Documents {
    conversations: Vec<Conversation>,
    messages: Vec<Message>,
}

impl Documents {
    fn has_conversation(&self, id: &str) -> bool {
        self.conversations.iter().any(|c| c.id == id)
    }

    fn has_message(&self, id: &str) -> bool {
        self.messages.iter().any(|m| m.id == id)
    }
}

/// Store keeping all documents in memory
pub struct MemoryStore {
    documents: RwLock<Documents>,
    file_path: Option<PathBuf>,
    writer: Option<Mutex<tokio::fs::File>>,
}

impl MemoryStore {
    /// Volatile store, used in development when no store is configured
    pub fn new() -> Self {
        Self {
            documents: RwLock::new(Documents::default()),
            file_path: None,
            writer: None,
        }
    }

    /// Open a store backed by a JSONL file, replaying existing documents
    pub async fn open(path: impl AsRef<Path>) -> Result<Self, StoreError> {
        let path = path.as_ref().to_path_buf();
        let documents = Self::load_from_file(&path).await?;
        tracing::info!(
            path = %path.display(),
            conversations = documents.conversations.len(),
            messages = documents.messages.len(),
            "Document store loaded"
        );

        let file = tokio::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .await?;

        Ok(Self {
            documents: RwLock::new(documents),
            file_path: Some(path),
            writer: Some(Mutex::new(file)),
        })
    }

    /// Open the file store when a path is given, otherwise a volatile one
    pub async fn from_path(path: Option<&Path>) -> Result<Self, StoreError> {
        match path {
            Some(path) => Self::open(path).await,
            None => Ok(Self::new()),
        }
    }

    pub fn file_path(&self) -> Option<&Path> {
        self.file_path.as_deref()
    }

    async fn load_from_file(path: &Path) -> Result<Documents, StoreError> {
        if !tokio::fs::try_exists(path).await? {
            return Ok(Documents::default());
        }

        let content = tokio::fs::read_to_string(path).await?;
        let mut documents = Documents::default();

        for (line_no, line) in content.lines().enumerate() {
            let line = line.trim();
            if line.is_empty() {
                continue;
            }

            match serde_json::from_str::<Document>(line) {
                Ok(Document::Conversation(conversation)) => {
                    if !documents.has_conversation(&conversation.id) {
                        documents.conversations.push(conversation);
                    }
                }
                Ok(Document::Message(message)) => {
                    if !documents.has_message(&message.id) {
                        documents.messages.push(message);
                    }
                }
                Err(e) => {
                    tracing::warn!(line = line_no + 1, error = %e, "Skipping malformed document");
                }
            }
        }

        Ok(documents)
    }

    /// Write one document line before it becomes visible in memory
    async fn append(&self, document: &Document) -> Result<(), StoreError> {
        let Some(writer) = &self.writer else {
            return Ok(());
        };

        let mut line = serde_json::to_string(document)?;
        line.push('\n');

        let mut file = writer.lock().await;
        file.write_all(line.as_bytes()).await?;
        file.flush().await?;
        Ok(())
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ChatStore for MemoryStore {
    async fn save_message(&self, message: &Message) -> Result<(), StoreError> {
        let exists = self.documents.read().has_message(&message.id);
        if exists {
            return Err(StoreError::Conflict(message.id.clone()));
        }

        self.append(&Document::Message(message.clone())).await?;
        self.documents.write().messages.push(message.clone());
        Ok(())
    }

    async fn save_conversation(&self, conversation: &Conversation) -> Result<(), StoreError> {
        let exists = self.documents.read().has_conversation(&conversation.id);
        if exists {
            return Err(StoreError::Conflict(conversation.id.clone()));
        }

        self.append(&Document::Conversation(conversation.clone())).await?;
        self.documents.write().conversations.push(conversation.clone());
        Ok(())
    }

    async fn get_messages(&self, conversation_id: &str) -> Result<Vec<Message>, StoreError> {
        let mut messages: Vec<Message> = self
            .documents
            .read()
            .messages
            .iter()
            .filter(|m| m.conversation_id == conversation_id)
            .cloned()
            .collect();
        // stable sort keeps insertion order for equal timestamps
        messages.sort_by(|a, b| a.timestamp.cmp(&b.timestamp));
        Ok(messages)
    }

    async fn get_conversations(&self) -> Result<Vec<Conversation>, StoreError> {
        let mut conversations = self.documents.read().conversations.clone();
        conversations.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(conversations)
    }

    async fn get_conversation(&self, id: &str) -> Result<Lookup<Conversation>, StoreError> {
        let found = self
            .documents
            .read()
            .conversations
            .iter()
            .find(|c| c.id == id)
            .cloned();
        Ok(found.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, Utc};

    #[tokio::test]
    async fn test_messages_sorted_oldest_first() {
        let store = MemoryStore::new();
        let mut late = Message::user("second", "conv-1");
        let mut early = Message::user("first", "conv-1");
        early.timestamp = Utc::now() - Duration::seconds(10);
        late.timestamp = Utc::now();

        store.save_message(&late).await.unwrap();
        store.save_message(&early).await.unwrap();
        store.save_message(&Message::user("other", "conv-2")).await.unwrap();

        let messages = store.get_messages("conv-1").await.unwrap();
        let contents: Vec<&str> = messages.iter().map(|m| m.content.as_str()).collect();
        assert_eq!(contents, vec!["first", "second"]);
    }

    #[tokio::test]
    async fn test_unknown_conversation_has_no_messages() {
        let store = MemoryStore::new();
        assert!(store.get_messages("no-such-conversation").await.unwrap().is_empty());
        assert_eq!(
            store.get_conversation("no-such-conversation").await.unwrap(),
            Lookup::NotFound
        );
    }

    #[tokio::test]
    async fn test_conversations_newest_first() {
        let store = MemoryStore::new();
        let mut old = Conversation::new("gpt-4");
        old.created_at = Utc::now() - Duration::minutes(5);
        let new = Conversation::new("claude-2");

        store.save_conversation(&old).await.unwrap();
        store.save_conversation(&new).await.unwrap();

        let conversations = store.get_conversations().await.unwrap();
        assert_eq!(conversations[0].id, new.id);
        assert_eq!(conversations[1].id, old.id);
    }

    #[tokio::test]
    async fn test_duplicate_id_rejected() {
        let store = MemoryStore::new();
        let conversation = Conversation::new("gpt-4");
        store.save_conversation(&conversation).await.unwrap();
        let err = store.save_conversation(&conversation).await.unwrap_err();
        assert!(matches!(err, StoreError::Conflict(id) if id == conversation.id));
    }
}
