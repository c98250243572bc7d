//! Shared application state

use std::sync::Arc;

use chrono::{DateTime, Utc};

use super::auth::AccessGate;
use crate::config::Environment;
use crate::schema::{build_schema, ChatSchema};
use crate::service::ChatService;

/// State handed to every route
pub struct AppState {
    /// Executable schema; holds its own handle to the service
    pub schema: ChatSchema,

    pub service: Arc<ChatService>,

    pub gate: AccessGate,

    pub started_at: DateTime<Utc>,
}

impl AppState {
    pub fn new(service: Arc<ChatService>, gate: AccessGate) -> Self {
        Self {
            schema: build_schema(service.clone()),
            service,
            gate,
            started_at: Utc::now(),
        }
    }

    pub fn environment(&self) -> Environment {
        self.service.environment()
    }
}
