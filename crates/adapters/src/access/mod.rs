// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Access plane adapter.
//!
//! The access plane owns access requests and stores plugin data on our
//! behalf. Its transport is supplied by the embedding program; everything in
//! this crate talks to it through [`AccessClient`].

use async_trait::async_trait;
use thiserror::Error;
use tokio::sync::mpsc;
use tpd_core::{Pong, PluginDataMap, Request, RequestId, RequestState, WatchEvent, WatchFilter};

// Test support - only compiled for tests or when explicitly requested
#[cfg(any(test, feature = "test-support"))]
mod fake;
#[cfg(any(test, feature = "test-support"))]
pub use fake::{AccessCall, AccessMethod, FakeAccessClient};

/// Errors from access plane operations
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum AccessError {
    #[error("not found: {0}")]
    NotFound(String),
    #[error("not implemented: {0}")]
    NotImplemented(String),
    #[error("bad parameter: {0}")]
    BadParameter(String),
    #[error("compare failed: {0}")]
    CompareFailed(String),
    #[error("connection error: {0}")]
    Connection(String),
}

impl AccessError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, AccessError::NotFound(_))
    }

    pub fn is_not_implemented(&self) -> bool {
        matches!(self, AccessError::NotImplemented(_))
    }
}

/// Live subscription to request changes.
///
/// The first item is always [`WatchEvent::Init`]. `None` means the access
/// plane closed the stream.
#[derive(Debug)]
pub struct RequestWatch {
    rx: mpsc::Receiver<Result<WatchEvent, AccessError>>,
}

impl RequestWatch {
    pub fn new(rx: mpsc::Receiver<Result<WatchEvent, AccessError>>) -> Self {
        Self { rx }
    }

    pub async fn next(&mut self) -> Option<Result<WatchEvent, AccessError>> {
        self.rx.recv().await
    }
}

/// Client for the access plane's plugin API.
#[async_trait]
pub trait AccessClient: Send + Sync + 'static {
    /// Server identity and version.
    async fn ping(&self) -> Result<Pong, AccessError>;

    async fn get_request(&self, id: &RequestId) -> Result<Request, AccessError>;

    async fn set_request_state(
        &self,
        id: &RequestId,
        state: RequestState,
    ) -> Result<(), AccessError>;

    /// Plugin data stored for a request. `NotFound` when none was stored.
    async fn get_plugin_data(&self, id: &RequestId) -> Result<PluginDataMap, AccessError>;

    /// Merge `set` into a request's plugin data. Empty values delete keys.
    ///
    /// When `expect` is given the update is applied atomically only if every
    /// expected key currently holds the expected value (a missing key counts
    /// as empty); otherwise `CompareFailed` is returned.
    async fn update_plugin_data(
        &self,
        id: &RequestId,
        set: PluginDataMap,
        expect: Option<PluginDataMap>,
    ) -> Result<(), AccessError>;

    /// Subscribe to request changes matching `filter`.
    async fn watch(&self, filter: WatchFilter) -> Result<RequestWatch, AccessError>;
}
