//! GraphQL subscriptions over WebSocket
//!
//! Speaks `graphql-transport-ws` and the legacy `graphql-ws` protocol on the
//! same endpoint. Each `subscribe`/`start` runs the operation in its own task;
//! stopping the task drops the stream and its broker subscription.

pub mod events;
pub mod handler;

pub use events::{ClientMessage, ServerMessage, WsProtocol};
pub use handler::serve;
