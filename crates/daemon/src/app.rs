// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Service composition: startup checks, then the listener and watcher jobs
//! under one process.

use std::future::Future;
use std::sync::Arc;

use parking_lot::Mutex;
use tokio_util::sync::CancellationToken;
use tpd_adapters::{AccessClient, IncidentAdapter, PagerdutyBot, PagerdutyClient};
use tpd_core::WatchFilter;
use tracing::{debug, error, info};
use url::Url;

use crate::bridge::Bridge;
use crate::config::Config;
use crate::env;
use crate::error::AppError;
use crate::job::ServiceJob;
use crate::listener::WebhookServer;
use crate::process::Process;
use crate::watcher::Watcher;

/// The bridge service.
pub struct App {
    config: Config,
    access: Arc<dyn AccessClient>,
    incidents: Arc<dyn IncidentAdapter>,
    main_job: ServiceJob,
    server: Mutex<Option<Arc<WebhookServer>>>,
}

impl App {
    pub fn new(
        config: Config,
        access: Arc<dyn AccessClient>,
        incidents: Arc<dyn IncidentAdapter>,
    ) -> Self {
        Self { config, access, incidents, main_job: ServiceJob::new("main"), server: Mutex::new(None) }
    }

    /// Build the service against the PagerDuty API named in `config`.
    pub fn from_config(config: Config, access: Arc<dyn AccessClient>) -> Result<Self, AppError> {
        let bot = pagerduty_bot(&config)?;
        Ok(Self::new(config, access, Arc::new(bot)))
    }

    /// Run until `cancel` or until a critical job fails.
    ///
    /// Returns the main job's terminal error, which includes the errors of
    /// the listener and watcher jobs.
    pub async fn run(self: &Arc<Self>, cancel: CancellationToken) -> Result<(), Arc<AppError>> {
        let process = Process::new(&cancel);
        let app = Arc::clone(self);
        let proc = process.clone();
        process.spawn_critical(&self.main_job, move |job, cancel| async move {
            app.run_main(proc, job, cancel).await
        });
        process.done().await;
        match self.main_job.err() {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }

    /// Wait until startup has finished. `false` means it did not succeed.
    pub async fn wait_ready(&self, cancel: &CancellationToken) -> Result<bool, AppError> {
        self.main_job.wait_ready(cancel).await
    }

    /// Base URL of the listener, once the service is ready.
    pub fn public_url(&self) -> Option<Url> {
        if self.main_job.is_ready() != Some(true) {
            return None;
        }
        self.server.lock().as_ref().map(|server| server.base_url())
    }

    async fn run_main(
        self: Arc<Self>,
        process: Process,
        job: ServiceJob,
        cancel: CancellationToken,
    ) -> Result<(), Arc<AppError>> {
        let mut jobs = Vec::new();
        let started = self.start(&process, &job, &cancel, &mut jobs).await;
        if started.is_err() {
            process.shutdown();
        }
        for job in &jobs {
            job.done().await;
        }

        let job_errors: Vec<_> = jobs.iter().filter_map(ServiceJob::err).collect();
        let start_error = match started {
            Ok(()) => None,
            // A failed job canceled startup; its own error is the cause.
            Err(AppError::Canceled) if !job_errors.is_empty() => None,
            Err(e) => Some(Arc::new(e)),
        };
        match AppError::aggregate(start_error.into_iter().chain(job_errors)) {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }

    /// Startup sequence. Spawned jobs are pushed to `jobs` as they start.
    ///
    /// Every step gives up with [`AppError::Canceled`] once `cancel` fires.
    async fn start(
        &self,
        process: &Process,
        job: &ServiceJob,
        cancel: &CancellationToken,
        jobs: &mut Vec<ServiceJob>,
    ) -> Result<(), AppError> {
        info!(version = env::VERSION, "starting teleport pagerduty plugin");

        let bridge = Arc::new(Bridge::new(Arc::clone(&self.access), Arc::clone(&self.incidents)));
        let server = Arc::new(WebhookServer::new(&self.config.http, bridge.clone())?);
        *self.server.lock() = Some(Arc::clone(&server));

        until_canceled(cancel, self.check_server_version()).await??;

        debug!("starting pagerduty api health check");
        if let Err(e) = until_canceled(cancel, self.incidents.health_check()).await? {
            error!(error = %e, "pagerduty api health check failed");
            return Err(AppError::HealthCheck(e));
        }
        debug!("pagerduty api health check finished ok");

        server.ensure_cert()?;

        let listener = Arc::clone(&server);
        let http = process.spawn_critical_job("webhook listener", move |job, cancel| {
            listener.run(job, cancel)
        });
        jobs.push(http.clone());
        let mut ready = http.wait_ready(cancel).await.unwrap_or(false);

        if ready {
            let callbacks = server.action_callbacks();
            until_canceled(cancel, self.incidents.setup(&callbacks))
                .await?
                .map_err(AppError::Setup)?;

            let watcher = Watcher::new(Arc::clone(&self.access), bridge, WatchFilter::pending());
            let watch =
                process.spawn_critical_job("request watcher", move |job, cancel| watcher.run(job, cancel));
            jobs.push(watch.clone());
            ready = watch.wait_ready(cancel).await.unwrap_or(false);
        }

        job.set_ready(ready);
        if ready {
            info!(public_url = %server.base_url(), "plugin is ready");
        } else {
            debug!("plugin startup did not complete");
        }
        Ok(())
    }

    async fn check_server_version(&self) -> Result<(), AppError> {
        debug!("checking teleport server version");
        let pong = match tokio::time::timeout(env::version_check_timeout(), self.access.ping()).await {
            Err(_) => return Err(AppError::Timeout("server version check")),
            Ok(Err(e)) if e.is_not_implemented() => return Err(AppError::ServerTooOld),
            Ok(Err(source)) => {
                error!(error = %source, "unable to get teleport server version");
                return Err(AppError::Access { context: "failed to ping teleport", source });
            }
            Ok(Ok(pong)) => pong,
        };
        pong.assert_server_version()?;
        info!(
            cluster = %pong.cluster_name,
            server_version = %pong.server_version,
            "connected to teleport"
        );
        Ok(())
    }
}

async fn until_canceled<F: Future>(
    cancel: &CancellationToken,
    fut: F,
) -> Result<F::Output, AppError> {
    tokio::select! {
        _ = cancel.cancelled() => Err(AppError::Canceled),
        out = fut => Ok(out),
    }
}

/// PagerDuty incident adapter configured from `config`.
pub fn pagerduty_bot(config: &Config) -> Result<PagerdutyBot, AppError> {
    let pd = &config.pagerduty;
    let client = PagerdutyClient::new(&pd.api_endpoint, &pd.api_key, &pd.user_email)?;
    Ok(PagerdutyBot::new(client, pd.service_id.clone()))
}

#[cfg(test)]
#[path = "app_tests.rs"]
mod tests;
