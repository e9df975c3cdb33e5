// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Incident adapter: the operations the bridge needs from the incident
//! service.

mod pagerduty;

pub use pagerduty::{PagerdutyBot, CUSTOM_WEBHOOK_SCHEMA};

use async_trait::async_trait;
use thiserror::Error;
use tpd_core::{ActionCallbacks, PagerdutyData, RequestData, RequestId, Resolution};

use crate::pagerduty::PagerdutyError;

// Test support - only compiled for tests or when explicitly requested
#[cfg(any(test, feature = "test-support"))]
mod fake;
#[cfg(any(test, feature = "test-support"))]
pub use fake::{FakeIncidentAdapter, IncidentCall, IncidentMethod};

/// Errors from incident operations
#[derive(Debug, Error)]
pub enum IncidentError {
    #[error("{0}")]
    NotFound(String),
    #[error(transparent)]
    Pagerduty(#[from] PagerdutyError),
    #[error("{0}")]
    Other(String),
}

/// Adapter for the incident service
#[async_trait]
pub trait IncidentAdapter: Send + Sync + 'static {
    /// Fail fast on bad credentials or an unknown service.
    async fn health_check(&self) -> Result<(), IncidentError>;

    /// Register the approve and deny actions so they call back `callbacks`.
    ///
    /// Running this repeatedly converges on the same two extensions.
    async fn setup(&self, callbacks: &ActionCallbacks) -> Result<(), IncidentError>;

    /// Open an incident for a pending request.
    async fn create_incident(
        &self,
        request_id: &RequestId,
        data: &RequestData,
    ) -> Result<PagerdutyData, IncidentError>;

    /// Annotate the incident with `resolution`, then resolve it.
    ///
    /// The annotation is best effort; only a failed resolve is an error.
    async fn resolve_incident(
        &self,
        request_id: &RequestId,
        incident: &PagerdutyData,
        resolution: Resolution,
    ) -> Result<(), IncidentError>;
}
