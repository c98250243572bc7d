//! GraphQL subscriptions over Server-Sent Events
//!
//! `GET /api/graphql/stream?query=...` runs one operation. Each response is
//! sent as a `next` event; a final `complete` event marks the end. Closing the
//! connection drops the operation's stream.

pub mod handler;

pub use handler::graphql_stream;

/// SSE event names
pub const NEXT_EVENT: &str = "next";
pub const COMPLETE_EVENT: &str = "complete";
