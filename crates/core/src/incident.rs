// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Incident naming: incident keys, custom action names, and incident text.

use std::fmt;

use crate::id::RequestId;
use crate::plugin_data::{RequestData, Resolution};
use crate::request::RequestState;

/// Prefix of every incident key this integration creates.
pub const INCIDENT_KEY_PREFIX: &str = "teleport-access-request";

/// RFC 822 layout used when rendering request timestamps.
const RFC822: &str = "%d %b %y %H:%M %Z";

/// Incident key `"<prefix>/<request-id>"` embedded in each incident.
///
/// Webhook callbacks carry only the incident, so this key is how a callback
/// finds its way back to the request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IncidentKey {
    request_id: RequestId,
}

impl IncidentKey {
    pub fn new(request_id: RequestId) -> Self {
        Self { request_id }
    }

    /// Parse an incident key. Returns `None` for keys this integration did
    /// not create.
    pub fn parse(key: &str) -> Option<Self> {
        let mut parts = key.split('/');
        match (parts.next(), parts.next(), parts.next()) {
            (Some(INCIDENT_KEY_PREFIX), Some(id), None) if !id.is_empty() => {
                Some(Self::new(RequestId::new(id)))
            }
            _ => None,
        }
    }

    pub fn into_request_id(self) -> RequestId {
        self.request_id
    }
}

impl fmt::Display for IncidentKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", INCIDENT_KEY_PREFIX, self.request_id)
    }
}

/// Custom incident actions offered to PagerDuty operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ActionName {
    Approve,
    Deny,
}

crate::simple_display! {
    ActionName {
        Approve => "approve",
        Deny => "deny",
    }
}

impl ActionName {
    pub const ALL: [ActionName; 2] = [ActionName::Approve, ActionName::Deny];

    pub fn parse(name: &str) -> Option<Self> {
        match name {
            "approve" => Some(ActionName::Approve),
            "deny" => Some(ActionName::Deny),
            _ => None,
        }
    }

    /// Extension label shown in the PagerDuty UI.
    pub fn label(self) -> &'static str {
        match self {
            ActionName::Approve => "Approve Request",
            ActionName::Deny => "Deny Request",
        }
    }

    /// State the request is moved to when an operator picks this action.
    pub fn target_state(self) -> RequestState {
        match self {
            ActionName::Approve => RequestState::Approved,
            ActionName::Deny => RequestState::Denied,
        }
    }

    pub fn resolution(self) -> Resolution {
        match self {
            ActionName::Approve => Resolution::Approved,
            ActionName::Deny => Resolution::Denied,
        }
    }
}

/// Callback endpoints for each custom action, as published by the listener.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActionCallbacks {
    pub approve: String,
    pub deny: String,
}

impl ActionCallbacks {
    pub fn url(&self, action: ActionName) -> &str {
        match action {
            ActionName::Approve => &self.approve,
            ActionName::Deny => &self.deny,
        }
    }
}

pub fn incident_title(data: &RequestData) -> String {
    format!("Access request from {}", data.user)
}

/// Render the incident body shown to the on-call operator.
pub fn incident_body(data: &RequestData) -> String {
    format!(
        "{} requested permissions for roles {} on Teleport at {}. \
         To approve or deny the request, please use Special Actions on this incident.\n",
        data.user,
        data.roles.join(", "),
        data.created.format(RFC822),
    )
}

/// Note appended to an incident right before it is resolved.
pub fn resolution_note(resolution: Resolution) -> String {
    format!("Access request has been {}", resolution)
}

#[cfg(test)]
#[path = "incident_tests.rs"]
mod tests;
