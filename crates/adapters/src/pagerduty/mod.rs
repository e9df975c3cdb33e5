// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! PagerDuty REST API client.

mod pager;
mod types;

pub use pager::{Page, PageRequest, Pager, LIST_LIMIT};
pub use types::{
    ApiReference, Extension, ExtensionEnvelope, ExtensionSchema, Incident, IncidentBody,
    IncidentEnvelope, IncidentNote, IncidentsEnvelope, ManageIncident, NewIncident, NoteEnvelope,
    Service, User,
};

use std::time::Duration;

use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, AUTHORIZATION, CONTENT_TYPE};
use reqwest::{Method, RequestBuilder};
use serde::de::DeserializeOwned;
use thiserror::Error;

use types::{ErrorEnvelope, ExtensionList, ExtensionSchemaList, ServiceEnvelope, UserEnvelope};

// Test support - only compiled for tests or when explicitly requested
#[cfg(any(test, feature = "test-support"))]
mod fake;
#[cfg(any(test, feature = "test-support"))]
pub use fake::{FakePagerduty, PdRoute, RecordedCall};

pub const DEFAULT_API_ENDPOINT: &str = "https://api.pagerduty.com";

const ACCEPT_V2: &str = "application/vnd.pagerduty+json;version=2";
const HTTP_TIMEOUT: Duration = Duration::from_secs(10);
const MAX_IDLE_PER_HOST: usize = 100;

/// Errors from PagerDuty API calls
#[derive(Debug, Error)]
pub enum PagerdutyError {
    #[error("invalid pagerduty client configuration: {0}")]
    InvalidConfig(String),
    #[error("pagerduty {operation} request failed: {source}")]
    Transport {
        operation: &'static str,
        #[source]
        source: reqwest::Error,
    },
    #[error("pagerduty {operation} failed with status {status}: {message}")]
    Api { operation: &'static str, status: u16, message: String },
}

impl PagerdutyError {
    /// HTTP status returned by the API, if the call got that far.
    pub fn status(&self) -> Option<u16> {
        match self {
            PagerdutyError::Api { status, .. } => Some(*status),
            _ => None,
        }
    }
}

/// Thin typed wrapper over the PagerDuty REST API.
#[derive(Clone, Debug)]
pub struct PagerdutyClient {
    http: reqwest::Client,
    api_base: String,
    from: String,
}

impl PagerdutyClient {
    /// Build a client authenticated with `api_key`.
    ///
    /// `from` is the email sent as the `From` header on calls that act on
    /// incidents. An empty `api_endpoint` selects the public API.
    pub fn new(api_endpoint: &str, api_key: &str, from: &str) -> Result<Self, PagerdutyError> {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static(ACCEPT_V2));
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        let token = HeaderValue::from_str(&format!("Token token={}", api_key))
            .map_err(|_| PagerdutyError::InvalidConfig("api key is not a valid header".into()))?;
        headers.insert(AUTHORIZATION, token);
        HeaderValue::from_str(from)
            .map_err(|_| PagerdutyError::InvalidConfig("user email is not a valid header".into()))?;

        let http = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(HTTP_TIMEOUT)
            .pool_max_idle_per_host(MAX_IDLE_PER_HOST)
            .build()
            .map_err(|e| PagerdutyError::InvalidConfig(e.to_string()))?;

        let api_base = match api_endpoint.trim() {
            "" => DEFAULT_API_ENDPOINT,
            endpoint => endpoint,
        };
        Ok(Self {
            http,
            api_base: api_base.trim_end_matches('/').to_string(),
            from: from.to_string(),
        })
    }

    pub fn api_base(&self) -> &str {
        &self.api_base
    }

    pub async fn get_service(&self, id: &str) -> Result<Service, PagerdutyError> {
        let resp: ServiceEnvelope =
            self.send("get service", self.request(Method::GET, &format!("services/{}", id))).await?;
        Ok(resp.service)
    }

    pub async fn get_user(&self, id: &str) -> Result<User, PagerdutyError> {
        let resp: UserEnvelope =
            self.send("get user", self.request(Method::GET, &format!("users/{}", id))).await?;
        Ok(resp.user)
    }

    pub async fn list_extension_schemas(
        &self,
        page: PageRequest,
    ) -> Result<Page<ExtensionSchema>, PagerdutyError> {
        let req = self
            .request(Method::GET, "extension_schemas")
            .query(&[("offset", page.offset), ("limit", page.limit)]);
        let resp: ExtensionSchemaList = self.send("list extension schemas", req).await?;
        Ok(Page { items: resp.extension_schemas, more: resp.more })
    }

    /// List extensions of `schema_id` attached to `object_id`.
    pub async fn list_extensions(
        &self,
        page: PageRequest,
        object_id: &str,
        schema_id: &str,
    ) -> Result<Page<Extension>, PagerdutyError> {
        let req = self.request(Method::GET, "extensions").query(&[
            ("extension_object_id", object_id.to_string()),
            ("extension_schema_id", schema_id.to_string()),
            ("offset", page.offset.to_string()),
            ("limit", page.limit.to_string()),
        ]);
        let resp: ExtensionList = self.send("list extensions", req).await?;
        Ok(Page { items: resp.extensions, more: resp.more })
    }

    pub async fn create_extension(&self, ext: &Extension) -> Result<Extension, PagerdutyError> {
        let body = ExtensionEnvelope { extension: ext.clone() };
        let req = self.request(Method::POST, "extensions").json(&body);
        let resp: ExtensionEnvelope = self.send("create extension", req).await?;
        Ok(resp.extension)
    }

    pub async fn update_extension(
        &self,
        id: &str,
        ext: &Extension,
    ) -> Result<Extension, PagerdutyError> {
        let body = ExtensionEnvelope { extension: ext.clone() };
        let req = self.request(Method::PUT, &format!("extensions/{}", id)).json(&body);
        let resp: ExtensionEnvelope = self.send("update extension", req).await?;
        Ok(resp.extension)
    }

    pub async fn create_incident(&self, incident: &NewIncident) -> Result<Incident, PagerdutyError> {
        let req = self.acting(Method::POST, "incidents").json(&IncidentEnvelope { incident });
        let resp: IncidentEnvelope<Incident> = self.send("create incident", req).await?;
        Ok(resp.incident)
    }

    pub async fn create_incident_note(
        &self,
        incident_id: &str,
        content: &str,
    ) -> Result<IncidentNote, PagerdutyError> {
        let body = NoteEnvelope {
            note: IncidentNote { id: String::new(), content: content.to_string() },
        };
        let req = self.acting(Method::POST, &format!("incidents/{}/notes", incident_id)).json(&body);
        let resp: NoteEnvelope = self.send("create incident note", req).await?;
        Ok(resp.note)
    }

    pub async fn manage_incidents(
        &self,
        updates: &[ManageIncident],
    ) -> Result<Vec<Incident>, PagerdutyError> {
        let body = IncidentsEnvelope { incidents: updates.to_vec() };
        let req = self.acting(Method::PUT, "incidents").json(&body);
        let resp: IncidentsEnvelope<Incident> = self.send("manage incidents", req).await?;
        Ok(resp.incidents)
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        self.http.request(method, format!("{}/{}", self.api_base, path))
    }

    /// Request on behalf of the configured user.
    fn acting(&self, method: Method, path: &str) -> RequestBuilder {
        self.request(method, path).header("From", &self.from)
    }

    async fn send<T: DeserializeOwned>(
        &self,
        operation: &'static str,
        req: RequestBuilder,
    ) -> Result<T, PagerdutyError> {
        let resp = req
            .send()
            .await
            .map_err(|source| PagerdutyError::Transport { operation, source })?;
        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(PagerdutyError::Api {
                operation,
                status: status.as_u16(),
                message: error_message(&body),
            });
        }
        resp.json::<T>().await.map_err(|source| PagerdutyError::Transport { operation, source })
    }
}

/// Pull the human-readable message out of an API error body.
fn error_message(body: &str) -> String {
    let parsed: ErrorEnvelope = serde_json::from_str(body).unwrap_or_default();
    let mut parts = Vec::new();
    if !parsed.error.message.is_empty() {
        parts.push(parsed.error.message);
    }
    parts.extend(parsed.error.errors);
    if parts.is_empty() {
        body.trim().to_string()
    } else {
        parts.join(": ")
    }
}

#[cfg(test)]
#[path = "client_tests.rs"]
mod tests;
