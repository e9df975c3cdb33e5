// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! PagerDuty custom incident action callbacks.
//!
//! PagerDuty posts a batch of messages to the extension's endpoint URL. Each
//! message names the incident it was triggered on; the action itself is
//! identified by which endpoint was called.

use serde::Deserialize;
use thiserror::Error;

use crate::id::IncidentId;

/// Event type PagerDuty uses for custom incident actions.
pub const CUSTOM_ACTION_EVENT: &str = "incident.custom";

#[derive(Debug, Error)]
pub enum PayloadError {
    #[error("invalid webhook payload: {0}")]
    Json(#[from] serde_json::Error),

    #[error("webhook payload has no messages")]
    Empty,
}

/// Body of a PagerDuty v2 webhook callback.
#[derive(Debug, Clone, Deserialize)]
pub struct WebhookPayload {
    #[serde(default)]
    pub messages: Vec<WebhookMessage>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct WebhookMessage {
    #[serde(default)]
    pub id: String,
    pub event: String,
    #[serde(default)]
    pub incident: WebhookIncident,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct WebhookIncident {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub incident_key: Option<String>,
}

impl WebhookPayload {
    pub fn parse(body: &[u8]) -> Result<Self, PayloadError> {
        let payload: WebhookPayload = serde_json::from_slice(body)?;
        if payload.messages.is_empty() {
            return Err(PayloadError::Empty);
        }
        Ok(payload)
    }

    /// Split the batch into one action per message.
    pub fn into_actions(self, name: &str, http_request_id: &str) -> Vec<WebhookAction> {
        self.messages
            .into_iter()
            .map(|msg| WebhookAction {
                http_request_id: http_request_id.to_string(),
                message_id: msg.id,
                event: msg.event,
                incident_id: IncidentId::new(msg.incident.id),
                incident_key: msg.incident.incident_key.unwrap_or_default(),
                name: name.to_string(),
            })
            .collect()
    }
}

/// A single operator action delivered through the webhook listener.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WebhookAction {
    pub http_request_id: String,
    pub message_id: String,
    pub event: String,
    pub incident_id: IncidentId,
    pub incident_key: String,
    /// Action endpoint name, e.g. `approve`.
    pub name: String,
}

impl WebhookAction {
    pub fn is_custom_action(&self) -> bool {
        self.event == CUSTOM_ACTION_EVENT
    }
}

#[cfg(test)]
#[path = "webhook_tests.rs"]
mod tests;
