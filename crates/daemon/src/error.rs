// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Error types for the service and for event handling.

use std::sync::Arc;

use thiserror::Error;
use tpd_adapters::{AccessError, IncidentError, PagerdutyError};
use tpd_core::{IncidentId, RequestId, RequestState, VersionError, MIN_SERVER_VERSION};

use crate::config::ConfigError;
use crate::listener::TlsError;

/// Errors that end a job or the whole service.
#[derive(Debug, Error)]
pub enum AppError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Tls(#[from] TlsError),

    #[error(transparent)]
    Pagerduty(#[from] PagerdutyError),

    #[error("pagerduty api health check failed: {0}")]
    HealthCheck(#[source] IncidentError),

    #[error("failed to set up webhook extensions: {0}")]
    Setup(#[source] IncidentError),

    #[error("{context}: {source}")]
    Access {
        context: &'static str,
        #[source]
        source: AccessError,
    },

    #[error("server version must be at least {}", MIN_SERVER_VERSION)]
    ServerTooOld,

    #[error(transparent)]
    Version(#[from] VersionError),

    #[error("{0} timed out")]
    Timeout(&'static str),

    #[error("webhook listener failed: {0}")]
    Listener(#[source] std::io::Error),

    #[error("request watch stream closed")]
    WatchClosed,

    #[error("canceled")]
    Canceled,

    #[error("{}", join_errors(.0))]
    Aggregate(Vec<Arc<AppError>>),
}

impl AppError {
    /// Combine terminal errors. A single error is returned as is.
    pub fn aggregate(errors: impl IntoIterator<Item = Arc<AppError>>) -> Option<Arc<AppError>> {
        let mut errors: Vec<_> = errors.into_iter().collect();
        match errors.len() {
            0 => None,
            1 => errors.pop(),
            _ => Some(Arc::new(AppError::Aggregate(errors))),
        }
    }
}

fn join_errors(errors: &[Arc<AppError>]) -> String {
    errors.iter().map(|e| e.to_string()).collect::<Vec<_>>().join(", ")
}

/// Classification of event handling failures, used for HTTP status mapping.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    BadParameter,
    Unauthorized,
    Conflict,
    Internal,
}

/// Errors from reconciling one event.
#[derive(Debug, Error)]
pub enum BridgeError {
    #[error("{context}: {source}")]
    Access {
        context: &'static str,
        #[source]
        source: AccessError,
    },

    #[error(transparent)]
    Incident(#[from] IncidentError),

    #[error("cannot process not pending request {request_id} in state {state}")]
    NotPending { request_id: RequestId, state: RequestState },

    #[error("incident_id from request's plugin_data does not match")]
    IncidentMismatch { request_id: RequestId, stored: IncidentId, received: IncidentId },

    #[error("unknown action: {0:?}")]
    UnknownAction(String),
}

impl BridgeError {
    pub(crate) fn access(context: &'static str) -> impl FnOnce(AccessError) -> Self {
        move |source| BridgeError::Access { context, source }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            BridgeError::UnknownAction(_) => ErrorKind::BadParameter,
            BridgeError::IncidentMismatch { .. } => ErrorKind::Unauthorized,
            BridgeError::NotPending { .. } => ErrorKind::Conflict,
            BridgeError::Access { source: AccessError::BadParameter(_), .. } => {
                ErrorKind::BadParameter
            }
            BridgeError::Access { .. } | BridgeError::Incident(_) => ErrorKind::Internal,
        }
    }
}

#[cfg(test)]
#[path = "error_tests.rs"]
mod tests;
