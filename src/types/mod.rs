//! Data types for the chat service
//!
//! This module contains the documents persisted by the store and the
//! transient values fanned out to subscribers.

mod chat_error;
mod conversation;
mod message;
mod model;

pub use chat_error::ChatError;
pub use conversation::{Conversation, Lookup};
pub use message::{Message, Role, SendMessageInput};
pub use model::ModelCapability;
