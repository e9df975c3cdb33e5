// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Recording incident adapter for tests.
#![cfg_attr(coverage_nightly, coverage(off))]

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::Mutex;
use tpd_core::{ActionCallbacks, IncidentId, PagerdutyData, RequestData, RequestId, Resolution};

use super::{IncidentAdapter, IncidentError};

/// Recorded incident adapter call
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IncidentCall {
    HealthCheck,
    Setup(ActionCallbacks),
    CreateIncident { request_id: RequestId, data: RequestData },
    ResolveIncident { request_id: RequestId, incident_id: IncidentId, resolution: Resolution },
}

/// Method selector for failure injection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IncidentMethod {
    HealthCheck,
    Setup,
    CreateIncident,
    ResolveIncident,
}

#[derive(Default)]
struct FakeIncidentState {
    calls: Vec<IncidentCall>,
    failures: HashMap<IncidentMethod, String>,
    next_id: u64,
}

/// Fake incident adapter. Incidents are numbered `INC1`, `INC2`, ...
#[derive(Clone, Default)]
pub struct FakeIncidentAdapter {
    inner: Arc<Mutex<FakeIncidentState>>,
}

impl FakeIncidentAdapter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn calls(&self) -> Vec<IncidentCall> {
        self.inner.lock().calls.clone()
    }

    pub fn clear_calls(&self) {
        self.inner.lock().calls.clear();
    }

    /// Incidents opened so far, in order.
    pub fn created(&self) -> Vec<(RequestId, RequestData)> {
        self.calls()
            .into_iter()
            .filter_map(|call| match call {
                IncidentCall::CreateIncident { request_id, data } => Some((request_id, data)),
                _ => None,
            })
            .collect()
    }

    /// Incidents resolved so far, in order.
    pub fn resolved(&self) -> Vec<(IncidentId, Resolution)> {
        self.calls()
            .into_iter()
            .filter_map(|call| match call {
                IncidentCall::ResolveIncident { incident_id, resolution, .. } => {
                    Some((incident_id, resolution))
                }
                _ => None,
            })
            .collect()
    }

    /// Make every call to `method` fail with `message` until cleared.
    pub fn fail(&self, method: IncidentMethod, message: &str) {
        self.inner.lock().failures.insert(method, message.to_string());
    }

    pub fn clear_failure(&self, method: IncidentMethod) {
        self.inner.lock().failures.remove(&method);
    }

    fn record(&self, call: IncidentCall, method: IncidentMethod) -> Result<(), IncidentError> {
        let mut inner = self.inner.lock();
        inner.calls.push(call);
        match inner.failures.get(&method) {
            Some(message) => Err(IncidentError::Other(message.clone())),
            None => Ok(()),
        }
    }
}

#[async_trait]
impl IncidentAdapter for FakeIncidentAdapter {
    async fn health_check(&self) -> Result<(), IncidentError> {
        self.record(IncidentCall::HealthCheck, IncidentMethod::HealthCheck)
    }

    async fn setup(&self, callbacks: &ActionCallbacks) -> Result<(), IncidentError> {
        self.record(IncidentCall::Setup(callbacks.clone()), IncidentMethod::Setup)
    }

    async fn create_incident(
        &self,
        request_id: &RequestId,
        data: &RequestData,
    ) -> Result<PagerdutyData, IncidentError> {
        self.record(
            IncidentCall::CreateIncident { request_id: request_id.clone(), data: data.clone() },
            IncidentMethod::CreateIncident,
        )?;
        let mut inner = self.inner.lock();
        inner.next_id += 1;
        Ok(PagerdutyData { id: IncidentId::new(format!("INC{}", inner.next_id)) })
    }

    async fn resolve_incident(
        &self,
        request_id: &RequestId,
        incident: &PagerdutyData,
        resolution: Resolution,
    ) -> Result<(), IncidentError> {
        self.record(
            IncidentCall::ResolveIncident {
                request_id: request_id.clone(),
                incident_id: incident.id.clone(),
                resolution,
            },
            IncidentMethod::ResolveIncident,
        )
    }
}
