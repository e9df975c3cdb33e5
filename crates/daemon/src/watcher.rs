// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Watcher job: feeds access request events into the bridge.

use std::sync::Arc;

use tokio_util::sync::CancellationToken;
use tpd_adapters::AccessClient;
use tpd_core::{WatchEvent, WatchFilter};
use tracing::{debug, info};

use crate::bridge::Bridge;
use crate::error::AppError;
use crate::job::ServiceJob;

pub struct Watcher {
    access: Arc<dyn AccessClient>,
    bridge: Arc<Bridge>,
    filter: WatchFilter,
}

impl Watcher {
    pub fn new(access: Arc<dyn AccessClient>, bridge: Arc<Bridge>, filter: WatchFilter) -> Self {
        Self { access, bridge, filter }
    }

    /// Consume the watch stream until `cancel`.
    ///
    /// Ready once the stream delivers `Init`. Events are handled one at a
    /// time; a failed event is logged by the bridge and does not stop the
    /// loop. The stream closing or breaking ends the job with an error.
    pub async fn run(self, job: ServiceJob, cancel: CancellationToken) -> Result<(), AppError> {
        let mut watch = self
            .access
            .watch(self.filter)
            .await
            .map_err(|source| AppError::Access { context: "failed to watch requests", source })?;

        loop {
            let next = tokio::select! {
                _ = cancel.cancelled() => {
                    debug!("request watcher stopping");
                    return Ok(());
                }
                next = watch.next() => next,
            };
            match next {
                None => return Err(AppError::WatchClosed),
                Some(Err(source)) => {
                    return Err(AppError::Access { context: "request watch failed", source })
                }
                Some(Ok(WatchEvent::Init)) => {
                    info!("request watcher ready");
                    job.set_ready(true);
                }
                Some(Ok(event)) => {
                    let _ = self.bridge.on_watcher_event(event).await;
                }
            }
        }
    }
}

#[cfg(test)]
#[path = "watcher_tests.rs"]
mod tests;
