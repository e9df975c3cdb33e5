// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Readiness-gated job state.
//!
//! A job signals readiness once, after whatever initialization can fail,
//! and finishes once with an optional terminal error. Both signals are
//! latched: later calls are ignored.

use std::sync::Arc;

use tokio::sync::watch;
use tokio_util::sync::CancellationToken;

use crate::error::AppError;

/// Terminal outcome of a job. `Ok` means a graceful stop.
pub type JobResult = Result<(), Arc<AppError>>;

struct JobState {
    name: &'static str,
    ready: watch::Sender<Option<bool>>,
    done: watch::Sender<Option<JobResult>>,
}

/// Shared handle to one job's readiness and completion signals.
#[derive(Clone)]
pub struct ServiceJob {
    inner: Arc<JobState>,
}

impl std::fmt::Debug for ServiceJob {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ServiceJob")
            .field("name", &self.inner.name)
            .field("ready", &*self.inner.ready.borrow())
            .field("done", &self.is_done())
            .finish()
    }
}

impl ServiceJob {
    pub fn new(name: &'static str) -> Self {
        let (ready, _) = watch::channel(None);
        let (done, _) = watch::channel(None);
        Self { inner: Arc::new(JobState { name, ready, done }) }
    }

    pub fn name(&self) -> &'static str {
        self.inner.name
    }

    /// Report readiness. Only the first call has an effect.
    pub fn set_ready(&self, ready: bool) {
        self.inner.ready.send_if_modified(|current| match current {
            Some(_) => false,
            None => {
                *current = Some(ready);
                true
            }
        });
    }

    /// Readiness, if already reported.
    pub fn is_ready(&self) -> Option<bool> {
        *self.inner.ready.borrow()
    }

    /// Wait for readiness to be reported, or for `cancel`.
    pub async fn wait_ready(&self, cancel: &CancellationToken) -> Result<bool, AppError> {
        let mut rx = self.inner.ready.subscribe();
        tokio::select! {
            ready = rx.wait_for(Option::is_some) => {
                Ok(ready.map(|r| (*r).unwrap_or(false)).unwrap_or(false))
            }
            _ = cancel.cancelled() => Err(AppError::Canceled),
        }
    }

    /// Record the terminal outcome. Only the first call has an effect.
    ///
    /// A job that finishes before reporting readiness is not ready.
    pub fn finish(&self, result: JobResult) {
        let recorded = self.inner.done.send_if_modified(|current| match current {
            Some(_) => false,
            None => {
                *current = Some(result);
                true
            }
        });
        if recorded {
            self.set_ready(false);
        }
    }

    pub fn is_done(&self) -> bool {
        self.inner.done.borrow().is_some()
    }

    /// Wait until the job has finished.
    pub async fn done(&self) {
        let mut rx = self.inner.done.subscribe();
        let _ = rx.wait_for(Option::is_some).await;
    }

    /// Terminal error, if the job finished with one.
    pub fn err(&self) -> Option<Arc<AppError>> {
        match &*self.inner.done.borrow() {
            Some(Err(e)) => Some(Arc::clone(e)),
            _ => None,
        }
    }
}

#[cfg(test)]
#[path = "job_tests.rs"]
mod tests;
