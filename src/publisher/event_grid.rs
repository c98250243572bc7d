//! Event Grid topic publisher

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::Value;
use uuid::Uuid;

use super::{ChatEvent, EventPublisher, PublishError};

/// Header carrying the topic access key
const SAS_KEY_HEADER: &str = "aeg-sas-key";

/// Event Grid schema envelope
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EventGridEvent {
    pub id: String,
    pub event_type: String,
    pub subject: String,
    pub event_time: DateTime<Utc>,
    pub data: Value,
    pub data_version: String,
}

impl EventGridEvent {
    pub fn from_event(event: &ChatEvent) -> Result<Self, PublishError> {
        Ok(Self {
            id: Uuid::new_v4().to_string(),
            event_type: event.event_type().to_string(),
            subject: event.subject(),
            event_time: Utc::now(),
            data: event.data()?,
            data_version: "1.0".to_string(),
        })
    }
}

/// Posts events to an Event Grid topic endpoint
pub struct EventGridPublisher {
    client: reqwest::Client,
    endpoint: String,
    key: String,
}

impl EventGridPublisher {
    pub fn new(endpoint: impl Into<String>, key: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            endpoint: endpoint.into(),
            key: key.into(),
        }
    }
}

#[async_trait]
impl EventPublisher for EventGridPublisher {
    async fn publish(&self, event: &ChatEvent) -> Result<(), PublishError> {
        let envelope = EventGridEvent::from_event(event)?;
        tracing::debug!(
            event_type = %envelope.event_type,
            subject = %envelope.subject,
            "Publishing event"
        );

        let response = self
            .client
            .post(&self.endpoint)
            .header(SAS_KEY_HEADER, &self.key)
            .json(&[envelope])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(PublishError::Rejected {
                status: status.as_u16(),
                body,
            });
        }
        Ok(())
    }
}
