// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! PagerDuty REST API v2 resources, limited to the fields this bridge uses.

use serde::{Deserialize, Serialize};

/// `{ "id": ..., "type": ... }` reference to another resource.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiReference {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: String,
}

impl ApiReference {
    pub fn new(kind: &str, id: impl Into<String>) -> Self {
        Self { id: id.into(), kind: kind.to_string() }
    }

    pub fn service(id: impl Into<String>) -> Self {
        Self::new("service_reference", id)
    }

    pub fn extension_schema(id: impl Into<String>) -> Self {
        Self::new("extension_schema_reference", id)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Service {
    pub id: String,
    #[serde(default)]
    pub name: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtensionSchema {
    pub id: String,
    #[serde(default)]
    pub key: String,
}

/// A service extension. Custom incident actions are extensions whose schema
/// is the `custom_webhook` schema.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Extension {
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub id: String,
    pub name: String,
    pub endpoint_url: String,
    pub extension_schema: ApiReference,
    #[serde(default)]
    pub extension_objects: Vec<ApiReference>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Incident {
    pub id: String,
    #[serde(default)]
    pub incident_key: Option<String>,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub status: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IncidentBody {
    #[serde(rename = "type")]
    pub kind: String,
    pub details: String,
}

/// Payload of `POST /incidents`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewIncident {
    #[serde(rename = "type")]
    pub kind: String,
    pub title: String,
    pub service: ApiReference,
    pub incident_key: String,
    pub body: IncidentBody,
}

impl NewIncident {
    pub fn new(title: String, service_id: &str, incident_key: String, details: String) -> Self {
        Self {
            kind: "incident".to_string(),
            title,
            service: ApiReference::service(service_id),
            incident_key,
            body: IncidentBody { kind: "incident_body".to_string(), details },
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct IncidentNote {
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub id: String,
    pub content: String,
}

/// One entry of `PUT /incidents`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ManageIncident {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub status: String,
}

impl ManageIncident {
    pub fn resolve(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            kind: "incident_reference".to_string(),
            status: "resolved".to_string(),
        }
    }
}

// Request/response envelopes. PagerDuty wraps every resource in an object
// keyed by its singular or plural name.

#[derive(Debug, Serialize, Deserialize)]
pub(crate) struct ServiceEnvelope {
    pub service: Service,
}

#[derive(Debug, Serialize, Deserialize)]
pub(crate) struct UserEnvelope {
    pub user: User,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ExtensionEnvelope {
    pub extension: Extension,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct IncidentEnvelope<T> {
    pub incident: T,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct NoteEnvelope {
    pub note: IncidentNote,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct IncidentsEnvelope<T> {
    pub incidents: Vec<T>,
}

#[derive(Debug, Serialize, Deserialize)]
pub(crate) struct ExtensionSchemaList {
    #[serde(default)]
    pub extension_schemas: Vec<ExtensionSchema>,
    #[serde(default)]
    pub more: bool,
}

#[derive(Debug, Serialize, Deserialize)]
pub(crate) struct ExtensionList {
    #[serde(default)]
    pub extensions: Vec<Extension>,
    #[serde(default)]
    pub more: bool,
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct ErrorEnvelope {
    #[serde(default)]
    pub error: ErrorBody,
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct ErrorBody {
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub errors: Vec<String>,
}
