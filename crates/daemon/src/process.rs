// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Process supervisor for critical jobs.
//!
//! All jobs share one cancellable lifetime. A critical job that fails
//! cancels that lifetime, which stops every other job.

use std::future::Future;
use std::sync::Arc;

use parking_lot::Mutex;
use tokio_util::sync::CancellationToken;
use tokio_util::task::TaskTracker;
use tracing::{debug, error};

use crate::error::AppError;
use crate::job::ServiceJob;

/// Owner of the service lifetime and its critical jobs.
#[derive(Clone)]
pub struct Process {
    cancel: CancellationToken,
    tracker: TaskTracker,
    jobs: Arc<Mutex<Vec<ServiceJob>>>,
}

impl Process {
    /// Create a process whose lifetime ends when `parent` is canceled.
    pub fn new(parent: &CancellationToken) -> Self {
        Self {
            cancel: parent.child_token(),
            tracker: TaskTracker::new(),
            jobs: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub fn cancel_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    /// Spawn a job whose failure terminates the process.
    ///
    /// `run` receives the job handle, on which it reports readiness, and
    /// the process cancellation token.
    pub fn spawn_critical_job<F, Fut, E>(&self, name: &'static str, run: F) -> ServiceJob
    where
        F: FnOnce(ServiceJob, CancellationToken) -> Fut,
        Fut: Future<Output = Result<(), E>> + Send + 'static,
        E: Into<Arc<AppError>>,
    {
        let job = ServiceJob::new(name);
        self.spawn_critical(&job, run);
        job
    }

    /// Spawn `run` as the body of an existing job handle.
    pub fn spawn_critical<F, Fut, E>(&self, job: &ServiceJob, run: F)
    where
        F: FnOnce(ServiceJob, CancellationToken) -> Fut,
        Fut: Future<Output = Result<(), E>> + Send + 'static,
        E: Into<Arc<AppError>>,
    {
        self.jobs.lock().push(job.clone());

        let fut = run(job.clone(), self.cancel.clone());
        let cancel = self.cancel.clone();
        let handle = job.clone();
        let name = job.name();
        self.tracker.spawn(async move {
            let result = fut.await.map_err(Into::into);
            match &result {
                Ok(()) => debug!(job = name, "job stopped"),
                Err(e) => {
                    error!(job = name, error = %e, "critical job failed, stopping");
                    cancel.cancel();
                }
            }
            handle.finish(result);
        });
    }

    /// Cancel the process lifetime.
    pub fn shutdown(&self) {
        self.cancel.cancel();
    }

    /// Wait until the lifetime is canceled and every job has stopped.
    pub async fn done(&self) {
        self.cancel.cancelled().await;
        self.tracker.close();
        self.tracker.wait().await;
    }

    /// Combined terminal errors of all critical jobs.
    pub fn err(&self) -> Option<Arc<AppError>> {
        let jobs = self.jobs.lock().clone();
        AppError::aggregate(jobs.iter().filter_map(ServiceJob::err))
    }
}

#[cfg(test)]
#[path = "process_tests.rs"]
mod tests;
