//! Subscription socket messages
//!
//! Frames from both supported protocols decode into one [`ClientMessage`];
//! replies are built per protocol through [`WsProtocol`].

use axum::http::{header::SEC_WEBSOCKET_PROTOCOL, HeaderMap};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Sub-protocol negotiated at upgrade time
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WsProtocol {
    /// `graphql-transport-ws`, spoken by the `graphql-ws` npm client
    GraphqlTransportWs,
    /// `graphql-ws`, the legacy subscriptions-transport-ws protocol
    GraphqlWs,
}

impl WsProtocol {
    pub fn as_str(&self) -> &'static str {
        match self {
            WsProtocol::GraphqlTransportWs => "graphql-transport-ws",
            WsProtocol::GraphqlWs => "graphql-ws",
        }
    }

    /// First protocol in the client's list that we speak. Clients that name
    /// none get `graphql-transport-ws`.
    pub fn negotiate(headers: &HeaderMap) -> Self {
        headers
            .get_all(SEC_WEBSOCKET_PROTOCOL)
            .iter()
            .filter_map(|value| value.to_str().ok())
            .flat_map(|value| value.split(','))
            .find_map(|name| match name.trim() {
                "graphql-transport-ws" => Some(WsProtocol::GraphqlTransportWs),
                "graphql-ws" => Some(WsProtocol::GraphqlWs),
                _ => None,
            })
            .unwrap_or(WsProtocol::GraphqlTransportWs)
    }

    /// Whether `msg` belongs to this protocol's vocabulary
    pub fn accepts(&self, msg: &ClientMessage) -> bool {
        match self {
            WsProtocol::GraphqlTransportWs => matches!(
                msg,
                ClientMessage::ConnectionInit { .. }
                    | ClientMessage::Ping { .. }
                    | ClientMessage::Pong { .. }
                    | ClientMessage::Subscribe { .. }
                    | ClientMessage::Complete { .. }
            ),
            WsProtocol::GraphqlWs => matches!(
                msg,
                ClientMessage::ConnectionInit { .. }
                    | ClientMessage::Start { .. }
                    | ClientMessage::Stop { .. }
                    | ClientMessage::ConnectionTerminate
            ),
        }
    }

    pub fn next(&self, id: String, payload: async_graphql::Response) -> ServerMessage {
        match self {
            WsProtocol::GraphqlTransportWs => ServerMessage::Next { id, payload },
            WsProtocol::GraphqlWs => ServerMessage::Data { id, payload },
        }
    }

    /// Operation-level failure. The new protocol sends the error list, the
    /// legacy one a single error object.
    pub fn error(&self, id: String, errors: Vec<async_graphql::ServerError>) -> ServerMessage {
        let payload = match self {
            WsProtocol::GraphqlTransportWs => serde_json::to_value(&errors),
            WsProtocol::GraphqlWs => match errors.first() {
                Some(first) => serde_json::to_value(first),
                None => Ok(Value::Null),
            },
        }
        .unwrap_or(Value::Null);
        ServerMessage::Error { id, payload }
    }
}

/// Operation payload of `subscribe` / `start`
pub type OperationPayload = async_graphql::Request;

/// Every frame a client may send, across both protocols
#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ClientMessage {
    ConnectionInit {
        #[serde(default)]
        payload: Option<Value>,
    },
    Ping {
        #[serde(default)]
        payload: Option<Value>,
    },
    Pong {
        #[serde(default)]
        payload: Option<Value>,
    },
    Subscribe {
        id: String,
        payload: OperationPayload,
    },
    Start {
        id: String,
        payload: OperationPayload,
    },
    Complete {
        id: String,
    },
    Stop {
        id: String,
    },
    ConnectionTerminate,
}

/// Every frame the server sends, across both protocols
#[derive(Debug, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ServerMessage {
    ConnectionAck,
    Pong {
        #[serde(skip_serializing_if = "Option::is_none")]
        payload: Option<Value>,
    },
    Next {
        id: String,
        payload: async_graphql::Response,
    },
    Data {
        id: String,
        payload: async_graphql::Response,
    },
    Error {
        id: String,
        payload: Value,
    },
    Complete {
        id: String,
    },
    #[serde(rename = "ka")]
    KeepAlive,
}

/// Close codes used by the subscription socket
pub mod close_code {
    pub const NORMAL: u16 = 1000;
    pub const BAD_REQUEST: u16 = 4400;
    pub const UNAUTHORIZED: u16 = 4401;
    pub const INIT_TIMEOUT: u16 = 4408;
    pub const DUPLICATE_SUBSCRIBER: u16 = 4409;
    pub const TOO_MANY_INITS: u16 = 4429;
}
