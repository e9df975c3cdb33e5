// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Cross-reference record stored by the access plane on our behalf.
//!
//! The access plane persists plugin data as a flat string map per request.
//! This record is the only link between a request and its incident.

use std::collections::HashMap;

use chrono::{DateTime, Utc};

use crate::id::IncidentId;
use crate::request::Request;

/// Wire form of plugin data.
pub type PluginDataMap = HashMap<String, String>;

const KEY_INCIDENT_ID: &str = "incident_id";
const KEY_USER: &str = "user";
const KEY_ROLES: &str = "roles";
const KEY_CREATED: &str = "created";
const KEY_RESOLUTION: &str = "resolution";

/// The parts of a request captured when its incident is created.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestData {
    pub user: String,
    pub roles: Vec<String>,
    pub created: DateTime<Utc>,
}

impl From<&Request> for RequestData {
    fn from(req: &Request) -> Self {
        Self { user: req.user.clone(), roles: req.roles.clone(), created: req.created }
    }
}

/// Reference to the PagerDuty incident opened for a request.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PagerdutyData {
    pub id: IncidentId,
}

/// How a request left the pending state, as reported on its incident.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resolution {
    Approved,
    Denied,
    Expired,
}

crate::simple_display! {
    Resolution {
        Approved => "approved",
        Denied => "denied",
        Expired => "expired",
    }
}

impl Resolution {
    fn parse(s: &str) -> Option<Self> {
        match s {
            "approved" => Some(Resolution::Approved),
            "denied" => Some(Resolution::Denied),
            "expired" => Some(Resolution::Expired),
            _ => None,
        }
    }
}

/// Decoded plugin data for one request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PluginData {
    pub request: RequestData,
    pub incident: PagerdutyData,
    /// Set once the incident has been resolved.
    pub resolution: Option<Resolution>,
}

impl PluginData {
    pub fn new(request: RequestData, incident: PagerdutyData) -> Self {
        Self { request, incident, resolution: None }
    }

    /// Copy of this record with a resolution tag.
    pub fn resolved(&self, resolution: Resolution) -> Self {
        Self { resolution: Some(resolution), ..self.clone() }
    }

    pub fn encode(&self) -> PluginDataMap {
        let mut map = PluginDataMap::new();
        map.insert(KEY_INCIDENT_ID.to_string(), self.incident.id.to_string());
        map.insert(KEY_USER.to_string(), self.request.user.clone());
        map.insert(KEY_ROLES.to_string(), self.request.roles.join(","));
        map.insert(KEY_CREATED.to_string(), self.request.created.timestamp().to_string());
        map.insert(
            KEY_RESOLUTION.to_string(),
            self.resolution.map(|r| r.to_string()).unwrap_or_default(),
        );
        map
    }

    /// Decode a plugin data map. Missing or malformed fields decode to
    /// their empty values rather than failing.
    pub fn decode(map: &PluginDataMap) -> Self {
        let field = |key: &str| map.get(key).map(String::as_str).unwrap_or_default();

        let roles = match field(KEY_ROLES) {
            "" => Vec::new(),
            roles => roles.split(',').map(str::to_string).collect(),
        };
        let created = field(KEY_CREATED)
            .parse::<i64>()
            .ok()
            .and_then(|secs| DateTime::from_timestamp(secs, 0))
            .unwrap_or(DateTime::<Utc>::UNIX_EPOCH);

        Self {
            request: RequestData { user: field(KEY_USER).to_string(), roles, created },
            incident: PagerdutyData { id: IncidentId::new(field(KEY_INCIDENT_ID)) },
            resolution: Resolution::parse(field(KEY_RESOLUTION)),
        }
    }
}

#[cfg(test)]
#[path = "plugin_data_tests.rs"]
mod tests;
