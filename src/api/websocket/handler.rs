//! Subscription socket connection handler

use std::borrow::Cow;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use axum::extract::ws::{CloseFrame, Message, WebSocket};
use futures::{Sink, SinkExt, Stream, StreamExt};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::{interval_at, sleep, Instant};

use super::events::{close_code, ClientMessage, OperationPayload, ServerMessage, WsProtocol};
use crate::api::state::AppState;

/// Time a client has to send `connection_init`
pub const INIT_TIMEOUT: Duration = Duration::from_secs(10);

/// Interval of `ka` frames on the legacy protocol
pub const KEEP_ALIVE_INTERVAL: Duration = Duration::from_secs(15);

/// Traffic from operation tasks back to the connection loop. Frames of an
/// operation the client already stopped are discarded by generation.
enum Outbound {
    Frame {
        id: String,
        generation: u64,
        msg: ServerMessage,
    },
    /// The operation's stream ended on its own; `last` is its closing frame
    Finished {
        id: String,
        generation: u64,
        last: ServerMessage,
    },
}

/// Socket timers
#[derive(Debug, Clone, Copy)]
pub struct SocketTimings {
    pub init_timeout: Duration,
    pub keep_alive: Duration,
}

impl Default for SocketTimings {
    fn default() -> Self {
        Self {
            init_timeout: INIT_TIMEOUT,
            keep_alive: KEEP_ALIVE_INTERVAL,
        }
    }
}

/// Why the loop stopped
struct Close {
    code: u16,
    reason: Cow<'static, str>,
}

impl Close {
    fn new(code: u16, reason: impl Into<Cow<'static, str>>) -> Self {
        Self {
            code,
            reason: reason.into(),
        }
    }
}

struct Operation {
    generation: u64,
    task: JoinHandle<()>,
}

struct Connection {
    state: Arc<AppState>,
    protocol: WsProtocol,
    initialized: bool,
    operations: HashMap<String, Operation>,
    next_generation: u64,
    outbound: mpsc::UnboundedSender<Outbound>,
}

/// Run one subscription socket until either side closes it
pub async fn serve(socket: WebSocket, state: Arc<AppState>, protocol: WsProtocol) {
    let (sink, stream) = socket.split();
    run(sink, stream, state, protocol, SocketTimings::default()).await
}

/// Drive the protocol over any frame sink and source
pub async fn run<Si, St, E>(
    mut sink: Si,
    mut stream: St,
    state: Arc<AppState>,
    protocol: WsProtocol,
    timings: SocketTimings,
) where
    Si: Sink<Message> + Unpin,
    St: Stream<Item = Result<Message, E>> + Unpin,
    E: fmt::Display,
{
    let (tx, mut rx) = mpsc::unbounded_channel();
    let mut conn = Connection {
        state,
        protocol,
        initialized: false,
        operations: HashMap::new(),
        next_generation: 0,
        outbound: tx,
    };

    tracing::debug!(protocol = protocol.as_str(), "Subscription socket opened");

    let init_deadline = sleep(timings.init_timeout);
    tokio::pin!(init_deadline);
    let mut keep_alive = interval_at(Instant::now() + timings.keep_alive, timings.keep_alive);

    let close = loop {
        tokio::select! {
            _ = &mut init_deadline, if !conn.initialized => {
                break Some(Close::new(close_code::INIT_TIMEOUT, "Connection initialisation timeout"));
            }

            _ = keep_alive.tick(), if conn.initialized && protocol == WsProtocol::GraphqlWs => {
                if send(&mut sink, &ServerMessage::KeepAlive).await.is_err() {
                    break None;
                }
            }

            Some(outbound) = rx.recv() => {
                let frame = match outbound {
                    Outbound::Frame { id, generation, msg } => {
                        conn.is_current(&id, generation).then_some(msg)
                    }
                    Outbound::Finished { id, generation, last } => {
                        conn.finished(&id, generation).then_some(last)
                    }
                };
                if let Some(frame) = frame {
                    if send(&mut sink, &frame).await.is_err() {
                        break None;
                    }
                }
            }

            frame = stream.next() => match frame {
                Some(Ok(Message::Text(text))) => match conn.handle_text(&text) {
                    Ok(replies) => {
                        let mut failed = false;
                        for reply in replies {
                            if send(&mut sink, &reply).await.is_err() {
                                failed = true;
                                break;
                            }
                        }
                        if failed {
                            break None;
                        }
                    }
                    Err(close) => break Some(close),
                },
                Some(Ok(Message::Close(_))) | None => break None,
                Some(Ok(_)) => {}
                Some(Err(e)) => {
                    tracing::debug!(error = %e, "Subscription socket error");
                    break None;
                }
            },
        }
    };

    conn.stop_all();

    if let Some(close) = close {
        tracing::debug!(code = close.code, reason = %close.reason, "Closing subscription socket");
        let frame = CloseFrame {
            code: close.code,
            reason: close.reason,
        };
        let _ = sink.send(Message::Close(Some(frame))).await;
    }
    tracing::debug!("Subscription socket closed");
}

async fn send<S>(sink: &mut S, msg: &ServerMessage) -> Result<(), ()>
where
    S: Sink<Message> + Unpin,
{
    let json = serde_json::to_string(msg).map_err(|e| {
        tracing::error!(error = %e, "Failed to encode socket frame");
    })?;
    sink.send(Message::Text(json)).await.map_err(|_| ())
}

impl Connection {
    /// Handle one text frame. Returns frames to send right away, or the
    /// close that ends the connection.
    fn handle_text(&mut self, text: &str) -> Result<Vec<ServerMessage>, Close> {
        let msg: ClientMessage = serde_json::from_str(text).map_err(|e| {
            tracing::debug!(error = %e, "Undecodable socket frame");
            Close::new(close_code::BAD_REQUEST, "Invalid message received")
        })?;
        if !self.protocol.accepts(&msg) {
            return Err(Close::new(close_code::BAD_REQUEST, "Invalid message received"));
        }

        match msg {
            ClientMessage::ConnectionInit { .. } => {
                if self.initialized {
                    return Err(Close::new(
                        close_code::TOO_MANY_INITS,
                        "Too many initialisation requests",
                    ));
                }
                self.initialized = true;
                let mut replies = vec![ServerMessage::ConnectionAck];
                if self.protocol == WsProtocol::GraphqlWs {
                    replies.push(ServerMessage::KeepAlive);
                }
                Ok(replies)
            }
            ClientMessage::Ping { payload } => Ok(vec![ServerMessage::Pong { payload }]),
            ClientMessage::Pong { .. } => Ok(Vec::new()),
            ClientMessage::Subscribe { id, payload } | ClientMessage::Start { id, payload } => {
                if !self.initialized {
                    return Err(Close::new(close_code::UNAUTHORIZED, "Unauthorized"));
                }
                if self.operations.contains_key(&id) {
                    return Err(Close::new(
                        close_code::DUPLICATE_SUBSCRIBER,
                        format!("Subscriber for {} already exists", id),
                    ));
                }
                self.start(id, payload);
                Ok(Vec::new())
            }
            ClientMessage::Complete { id } | ClientMessage::Stop { id } => {
                if let Some(op) = self.operations.remove(&id) {
                    tracing::debug!(operation = %id, "Operation stopped by client");
                    op.task.abort();
                }
                Ok(Vec::new())
            }
            ClientMessage::ConnectionTerminate => {
                Err(Close::new(close_code::NORMAL, "Connection terminated"))
            }
        }
    }

    fn start(&mut self, id: String, payload: OperationPayload) {
        let generation = self.next_generation;
        self.next_generation += 1;

        let schema = self.state.schema.clone();
        let protocol = self.protocol;
        let tx = self.outbound.clone();
        let op_id = id.clone();

        let task = tokio::spawn(async move {
            let mut responses = schema.execute_stream(payload);
            while let Some(response) = responses.next().await {
                if response.is_err() && response.data == async_graphql::Value::Null {
                    // Rejected before producing data, e.g. validation failure
                    let last = protocol.error(op_id.clone(), response.errors);
                    let _ = tx.send(Outbound::Finished { id: op_id, generation, last });
                    return;
                }
                let msg = protocol.next(op_id.clone(), response);
                let frame = Outbound::Frame { id: op_id.clone(), generation, msg };
                if tx.send(frame).is_err() {
                    return;
                }
            }
            let last = ServerMessage::Complete { id: op_id.clone() };
            let _ = tx.send(Outbound::Finished { id: op_id, generation, last });
        });

        tracing::debug!(operation = %id, "Operation started");
        self.operations.insert(id, Operation { generation, task });
    }

    fn is_current(&self, id: &str, generation: u64) -> bool {
        self.operations
            .get(id)
            .is_some_and(|op| op.generation == generation)
    }

    /// Forget an operation whose stream ended. Returns false when the client
    /// already stopped it.
    fn finished(&mut self, id: &str, generation: u64) -> bool {
        let current = self.is_current(id, generation);
        if current {
            self.operations.remove(id);
        }
        current
    }

    /// Abort every running operation, dropping its broker subscription
    fn stop_all(&mut self) {
        for (_, op) in self.operations.drain() {
            op.task.abort();
        }
    }
}
