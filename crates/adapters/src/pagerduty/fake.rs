// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! In-process PagerDuty API double for tests.
#![cfg_attr(coverage_nightly, coverage(off))]

use std::collections::HashMap;
use std::sync::Arc;

use axum::extract::{Path, Query, State};
use axum::http::{HeaderMap, Method, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post, put};
use axum::{Json, Router};
use parking_lot::Mutex;
use serde_json::json;
use tokio::task::JoinHandle;

use super::types::{ExtensionList, ExtensionSchemaList, ServiceEnvelope, UserEnvelope};
use super::{
    Extension, ExtensionEnvelope, ExtensionSchema, Incident, IncidentEnvelope, IncidentNote,
    IncidentsEnvelope, ManageIncident, NewIncident, NoteEnvelope, Service, User,
};

/// Routes of the fake API, used to select calls for failure injection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PdRoute {
    GetService,
    GetUser,
    ListExtensionSchemas,
    ListExtensions,
    CreateExtension,
    UpdateExtension,
    CreateIncident,
    CreateNote,
    ManageIncidents,
}

/// One request received by the fake.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedCall {
    pub route: PdRoute,
    pub method: Method,
    pub path: String,
    pub from: Option<String>,
    pub authorization: Option<String>,
}

#[derive(Default)]
struct FakePdState {
    services: Vec<Service>,
    users: Vec<User>,
    schemas: Vec<ExtensionSchema>,
    extensions: Vec<Extension>,
    incidents: Vec<(Incident, NewIncident)>,
    notes: Vec<(String, String)>,
    failures: HashMap<PdRoute, u16>,
    calls: Vec<RecordedCall>,
    next_id: u64,
}

impl FakePdState {
    fn next_id(&mut self, prefix: &str) -> String {
        self.next_id += 1;
        format!("{}{}", prefix, self.next_id)
    }
}

type Shared = Arc<Mutex<FakePdState>>;

/// Fake PagerDuty service listening on an ephemeral localhost port.
pub struct FakePagerduty {
    url: String,
    state: Shared,
    server: JoinHandle<()>,
}

impl FakePagerduty {
    pub async fn start() -> std::io::Result<Self> {
        let state = Shared::default();
        let router = Router::new()
            .route("/services/{id}", get(get_service))
            .route("/users/{id}", get(get_user))
            .route("/extension_schemas", get(list_schemas))
            .route("/extensions", get(list_extensions).post(create_extension))
            .route("/extensions/{id}", put(update_extension))
            .route("/incidents", post(create_incident).put(manage_incidents))
            .route("/incidents/{id}/notes", post(create_note))
            .with_state(state.clone());

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await?;
        let url = format!("http://{}", listener.local_addr()?);
        let server = tokio::spawn(async move {
            if let Err(e) = axum::serve(listener, router).await {
                tracing::warn!(error = %e, "fake pagerduty server stopped");
            }
        });
        Ok(Self { url, state, server })
    }

    /// Base URL to use as the client's API endpoint.
    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn add_service(&self, id: &str) {
        self.state.lock().services.push(Service { id: id.to_string(), name: id.to_string() });
    }

    pub fn add_user(&self, id: &str, name: &str, email: &str) {
        self.state.lock().users.push(User {
            id: id.to_string(),
            name: name.to_string(),
            email: email.to_string(),
        });
    }

    pub fn add_schema(&self, id: &str, key: &str) {
        self.state
            .lock()
            .schemas
            .push(ExtensionSchema { id: id.to_string(), key: key.to_string() });
    }

    /// Add an existing extension. An empty `id` is assigned one.
    pub fn add_extension(&self, mut ext: Extension) -> String {
        let mut state = self.state.lock();
        if ext.id.is_empty() {
            ext.id = state.next_id("PEXT");
        }
        let id = ext.id.clone();
        state.extensions.push(ext);
        id
    }

    pub fn extensions(&self) -> Vec<Extension> {
        self.state.lock().extensions.clone()
    }

    /// Incidents created through the API, with the payload that created them.
    pub fn incidents(&self) -> Vec<(Incident, NewIncident)> {
        self.state.lock().incidents.clone()
    }

    pub fn incident(&self, id: &str) -> Option<Incident> {
        let state = self.state.lock();
        state.incidents.iter().find(|(inc, _)| inc.id == id).map(|(inc, _)| inc.clone())
    }

    /// `(incident id, content)` of every note created.
    pub fn notes(&self) -> Vec<(String, String)> {
        self.state.lock().notes.clone()
    }

    pub fn calls(&self) -> Vec<RecordedCall> {
        self.state.lock().calls.clone()
    }

    pub fn calls_to(&self, route: PdRoute) -> Vec<RecordedCall> {
        self.calls().into_iter().filter(|c| c.route == route).collect()
    }

    /// Answer every call to `route` with `status` until cleared.
    pub fn fail(&self, route: PdRoute, status: u16) {
        self.state.lock().failures.insert(route, status);
    }

    pub fn clear_failure(&self, route: PdRoute) {
        self.state.lock().failures.remove(&route);
    }
}

impl Drop for FakePagerduty {
    fn drop(&mut self) {
        self.server.abort();
    }
}

fn api_error(status: StatusCode, message: &str) -> Response {
    (status, Json(json!({ "error": { "message": message, "code": 2001 } }))).into_response()
}

/// Record the call and return the injected failure, if any.
fn enter(
    state: &Shared,
    route: PdRoute,
    method: Method,
    path: String,
    headers: &HeaderMap,
) -> Option<Response> {
    let header = |name: &str| headers.get(name).and_then(|v| v.to_str().ok()).map(str::to_string);
    let mut state = state.lock();
    state.calls.push(RecordedCall {
        route,
        method,
        path,
        from: header("from"),
        authorization: header("authorization"),
    });
    let status = state.failures.get(&route).copied()?;
    let status = StatusCode::from_u16(status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    Some(api_error(status, "injected failure"))
}

fn paginate<T: Clone>(items: &[T], query: &HashMap<String, String>) -> (Vec<T>, bool) {
    let param = |name: &str, default: usize| {
        query.get(name).and_then(|v| v.parse::<usize>().ok()).unwrap_or(default)
    };
    let offset = param("offset", 0).min(items.len());
    let end = (offset + param("limit", 25)).min(items.len());
    (items[offset..end].to_vec(), end < items.len())
}

async fn get_service(
    State(state): State<Shared>,
    Path(id): Path<String>,
    headers: HeaderMap,
) -> Response {
    let path = format!("/services/{}", id);
    if let Some(resp) = enter(&state, PdRoute::GetService, Method::GET, path, &headers) {
        return resp;
    }
    let found = state.lock().services.iter().find(|s| s.id == id).cloned();
    match found {
        Some(service) => Json(ServiceEnvelope { service }).into_response(),
        None => api_error(StatusCode::NOT_FOUND, "Not Found"),
    }
}

async fn get_user(
    State(state): State<Shared>,
    Path(id): Path<String>,
    headers: HeaderMap,
) -> Response {
    let path = format!("/users/{}", id);
    if let Some(resp) = enter(&state, PdRoute::GetUser, Method::GET, path, &headers) {
        return resp;
    }
    let found = state.lock().users.iter().find(|u| u.id == id).cloned();
    match found {
        Some(user) => Json(UserEnvelope { user }).into_response(),
        None => api_error(StatusCode::NOT_FOUND, "Not Found"),
    }
}

async fn list_schemas(
    State(state): State<Shared>,
    Query(query): Query<HashMap<String, String>>,
    headers: HeaderMap,
) -> Response {
    let path = "/extension_schemas".to_string();
    if let Some(resp) = enter(&state, PdRoute::ListExtensionSchemas, Method::GET, path, &headers) {
        return resp;
    }
    let (extension_schemas, more) = paginate(&state.lock().schemas, &query);
    Json(ExtensionSchemaList { extension_schemas, more }).into_response()
}

async fn list_extensions(
    State(state): State<Shared>,
    Query(query): Query<HashMap<String, String>>,
    headers: HeaderMap,
) -> Response {
    let path = "/extensions".to_string();
    if let Some(resp) = enter(&state, PdRoute::ListExtensions, Method::GET, path, &headers) {
        return resp;
    }
    let object_id = query.get("extension_object_id").cloned().unwrap_or_default();
    let schema_id = query.get("extension_schema_id").cloned().unwrap_or_default();
    let matching: Vec<Extension> = state
        .lock()
        .extensions
        .iter()
        .filter(|e| schema_id.is_empty() || e.extension_schema.id == schema_id)
        .filter(|e| object_id.is_empty() || e.extension_objects.iter().any(|o| o.id == object_id))
        .cloned()
        .collect();
    let (extensions, more) = paginate(&matching, &query);
    Json(ExtensionList { extensions, more }).into_response()
}

async fn create_extension(
    State(state): State<Shared>,
    headers: HeaderMap,
    Json(body): Json<ExtensionEnvelope>,
) -> Response {
    let path = "/extensions".to_string();
    if let Some(resp) = enter(&state, PdRoute::CreateExtension, Method::POST, path, &headers) {
        return resp;
    }
    let mut state = state.lock();
    let mut extension = body.extension;
    extension.id = state.next_id("PEXT");
    state.extensions.push(extension.clone());
    (StatusCode::CREATED, Json(ExtensionEnvelope { extension })).into_response()
}

async fn update_extension(
    State(state): State<Shared>,
    Path(id): Path<String>,
    headers: HeaderMap,
    Json(body): Json<ExtensionEnvelope>,
) -> Response {
    let path = format!("/extensions/{}", id);
    if let Some(resp) = enter(&state, PdRoute::UpdateExtension, Method::PUT, path, &headers) {
        return resp;
    }
    let mut state = state.lock();
    let Some(existing) = state.extensions.iter_mut().find(|e| e.id == id) else {
        return api_error(StatusCode::NOT_FOUND, "Not Found");
    };
    *existing = Extension { id: id.clone(), ..body.extension };
    let extension = existing.clone();
    Json(ExtensionEnvelope { extension }).into_response()
}

async fn create_incident(
    State(state): State<Shared>,
    headers: HeaderMap,
    Json(body): Json<IncidentEnvelope<NewIncident>>,
) -> Response {
    let path = "/incidents".to_string();
    if let Some(resp) = enter(&state, PdRoute::CreateIncident, Method::POST, path, &headers) {
        return resp;
    }
    let mut state = state.lock();
    let incident = Incident {
        id: state.next_id("PINC"),
        incident_key: Some(body.incident.incident_key.clone()),
        title: body.incident.title.clone(),
        status: "triggered".to_string(),
    };
    state.incidents.push((incident.clone(), body.incident));
    (StatusCode::CREATED, Json(IncidentEnvelope { incident })).into_response()
}

async fn create_note(
    State(state): State<Shared>,
    Path(id): Path<String>,
    headers: HeaderMap,
    Json(body): Json<NoteEnvelope>,
) -> Response {
    let path = format!("/incidents/{}/notes", id);
    if let Some(resp) = enter(&state, PdRoute::CreateNote, Method::POST, path, &headers) {
        return resp;
    }
    let mut state = state.lock();
    if !state.incidents.iter().any(|(inc, _)| inc.id == id) {
        return api_error(StatusCode::NOT_FOUND, "Incident Not Found");
    }
    let note = IncidentNote { id: state.next_id("PNOTE"), content: body.note.content };
    state.notes.push((id, note.content.clone()));
    (StatusCode::CREATED, Json(NoteEnvelope { note })).into_response()
}

async fn manage_incidents(
    State(state): State<Shared>,
    headers: HeaderMap,
    Json(body): Json<IncidentsEnvelope<ManageIncident>>,
) -> Response {
    let path = "/incidents".to_string();
    if let Some(resp) = enter(&state, PdRoute::ManageIncidents, Method::PUT, path, &headers) {
        return resp;
    }
    let mut state = state.lock();
    let mut updated = Vec::new();
    for change in body.incidents {
        let Some((incident, _)) = state.incidents.iter_mut().find(|(inc, _)| inc.id == change.id)
        else {
            return api_error(StatusCode::NOT_FOUND, "Incident Not Found");
        };
        incident.status = change.status;
        updated.push(incident.clone());
    }
    Json(IncidentsEnvelope { incidents: updated }).into_response()
}
