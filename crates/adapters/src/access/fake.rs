// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! In-memory access plane for tests.
#![cfg_attr(coverage_nightly, coverage(off))]

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::Mutex;
use tokio::sync::mpsc;
use tpd_core::{Pong, PluginDataMap, Request, RequestId, RequestState, WatchEvent, WatchFilter};

use super::{AccessClient, AccessError, RequestWatch};

/// Recorded access plane call
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AccessCall {
    Ping,
    GetRequest(RequestId),
    SetRequestState(RequestId, RequestState),
    GetPluginData(RequestId),
    UpdatePluginData(RequestId, PluginDataMap),
    Watch(WatchFilter),
}

/// Method selector for failure injection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AccessMethod {
    Ping,
    GetRequest,
    SetRequestState,
    GetPluginData,
    UpdatePluginData,
    Watch,
}

struct FakeAccessState {
    pong: Pong,
    requests: HashMap<RequestId, Request>,
    plugin_data: HashMap<RequestId, PluginDataMap>,
    failures: HashMap<AccessMethod, AccessError>,
    calls: Vec<AccessCall>,
    watch_tx: Option<mpsc::Sender<Result<WatchEvent, AccessError>>>,
    watch_filter: WatchFilter,
    backlog: Vec<Result<WatchEvent, AccessError>>,
}

/// Fake access plane with call recording and failure injection.
#[derive(Clone)]
pub struct FakeAccessClient {
    inner: Arc<Mutex<FakeAccessState>>,
}

impl Default for FakeAccessClient {
    fn default() -> Self {
        Self {
            inner: Arc::new(Mutex::new(FakeAccessState {
                pong: Pong {
                    server_version: tpd_core::MIN_SERVER_VERSION.to_string(),
                    cluster_name: "local".to_string(),
                },
                requests: HashMap::new(),
                plugin_data: HashMap::new(),
                failures: HashMap::new(),
                calls: Vec::new(),
                watch_tx: None,
                watch_filter: WatchFilter::default(),
                backlog: Vec::new(),
            })),
        }
    }
}

impl FakeAccessClient {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_pong(&self, pong: Pong) {
        self.inner.lock().pong = pong;
    }

    pub fn insert_request(&self, req: Request) {
        self.inner.lock().requests.insert(req.id.clone(), req);
    }

    pub fn remove_request(&self, id: &str) {
        self.inner.lock().requests.remove(id);
    }

    pub fn request(&self, id: &str) -> Option<Request> {
        self.inner.lock().requests.get(id).cloned()
    }

    pub fn plugin_data(&self, id: &str) -> Option<PluginDataMap> {
        self.inner.lock().plugin_data.get(id).cloned()
    }

    pub fn set_plugin_data(&self, id: &str, data: PluginDataMap) {
        self.inner.lock().plugin_data.insert(RequestId::new(id), data);
    }

    /// Make every call to `method` fail with `err` until cleared.
    pub fn fail(&self, method: AccessMethod, err: AccessError) {
        self.inner.lock().failures.insert(method, err);
    }

    pub fn clear_failure(&self, method: AccessMethod) {
        self.inner.lock().failures.remove(&method);
    }

    /// Deliver a watch event. Events pushed before `watch()` is called are
    /// delivered right after `Init`. `Put` events that fail the watch filter
    /// are dropped, as the server would.
    pub fn push_event(&self, event: WatchEvent) {
        self.push(Ok(event));
    }

    /// Break the watch stream with an error.
    pub fn push_watch_error(&self, err: AccessError) {
        self.push(Err(err));
    }

    /// Close the watch stream from the server side.
    pub fn close_watch(&self) {
        self.inner.lock().watch_tx = None;
    }

    pub fn calls(&self) -> Vec<AccessCall> {
        self.inner.lock().calls.clone()
    }

    pub fn clear_calls(&self) {
        self.inner.lock().calls.clear();
    }

    fn push(&self, item: Result<WatchEvent, AccessError>) {
        let mut inner = self.inner.lock();
        match &inner.watch_tx {
            Some(_) if !passes(&inner.watch_filter, &item) => {}
            Some(tx) => {
                if tx.try_send(item).is_err() {
                    tracing::warn!("fake watch channel full or closed, dropping event");
                }
            }
            None => inner.backlog.push(item),
        }
    }

    fn record(&self, call: AccessCall, method: AccessMethod) -> Result<(), AccessError> {
        let mut inner = self.inner.lock();
        inner.calls.push(call);
        match inner.failures.get(&method) {
            Some(err) => Err(err.clone()),
            None => Ok(()),
        }
    }
}

#[async_trait]
impl AccessClient for FakeAccessClient {
    async fn ping(&self) -> Result<Pong, AccessError> {
        self.record(AccessCall::Ping, AccessMethod::Ping)?;
        Ok(self.inner.lock().pong.clone())
    }

    async fn get_request(&self, id: &RequestId) -> Result<Request, AccessError> {
        self.record(AccessCall::GetRequest(id.clone()), AccessMethod::GetRequest)?;
        self.inner
            .lock()
            .requests
            .get(id)
            .cloned()
            .ok_or_else(|| AccessError::NotFound(format!("access request {} not found", id)))
    }

    async fn set_request_state(
        &self,
        id: &RequestId,
        state: RequestState,
    ) -> Result<(), AccessError> {
        self.record(AccessCall::SetRequestState(id.clone(), state), AccessMethod::SetRequestState)?;
        let mut inner = self.inner.lock();
        let req = inner
            .requests
            .get_mut(id)
            .ok_or_else(|| AccessError::NotFound(format!("access request {} not found", id)))?;
        req.state = state;
        Ok(())
    }

    async fn get_plugin_data(&self, id: &RequestId) -> Result<PluginDataMap, AccessError> {
        self.record(AccessCall::GetPluginData(id.clone()), AccessMethod::GetPluginData)?;
        self.inner
            .lock()
            .plugin_data
            .get(id)
            .cloned()
            .ok_or_else(|| AccessError::NotFound(format!("plugin data for {} not found", id)))
    }

    async fn update_plugin_data(
        &self,
        id: &RequestId,
        set: PluginDataMap,
        expect: Option<PluginDataMap>,
    ) -> Result<(), AccessError> {
        self.record(
            AccessCall::UpdatePluginData(id.clone(), set.clone()),
            AccessMethod::UpdatePluginData,
        )?;
        let mut inner = self.inner.lock();
        let current = inner.plugin_data.entry(id.clone()).or_default();
        if let Some(expect) = expect {
            let matches = expect.iter().all(|(key, value)| {
                current.get(key).map(String::as_str).unwrap_or_default() == value
            });
            if !matches {
                return Err(AccessError::CompareFailed(format!(
                    "plugin data for {} was concurrently modified",
                    id
                )));
            }
        }
        for (key, value) in set {
            if value.is_empty() {
                current.remove(&key);
            } else {
                current.insert(key, value);
            }
        }
        Ok(())
    }

    async fn watch(&self, filter: WatchFilter) -> Result<RequestWatch, AccessError> {
        self.record(AccessCall::Watch(filter), AccessMethod::Watch)?;
        let (tx, rx) = mpsc::channel(64);
        let mut inner = self.inner.lock();
        let _ = tx.try_send(Ok(WatchEvent::Init));
        for item in inner.backlog.drain(..).filter(|item| passes(&filter, item)) {
            let _ = tx.try_send(item);
        }
        inner.watch_filter = filter;
        inner.watch_tx = Some(tx);
        Ok(RequestWatch::new(rx))
    }
}

fn passes(filter: &WatchFilter, item: &Result<WatchEvent, AccessError>) -> bool {
    match item {
        Ok(WatchEvent::Put(req)) => filter.matches(req),
        _ => true,
    }
}

#[cfg(test)]
#[path = "fake_tests.rs"]
mod tests;
