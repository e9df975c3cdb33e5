// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! HTTPS listener for PagerDuty custom action callbacks.
//!
//! Each custom action calls back `POST /<action>` with a webhook payload.
//! The listener authenticates and parses the payload, hands every action
//! to an [`ActionHandler`], and maps the outcome to an HTTP status.

mod tls;

pub use tls::{ensure_cert, server_config, TlsError};

use std::net::{IpAddr, SocketAddr, ToSocketAddrs};
use std::path::PathBuf;
use std::sync::Arc;

use async_trait::async_trait;
use axum::body::Bytes;
use axum::extract::{Path, State};
use axum::http::{header, HeaderMap, StatusCode};
use axum::routing::{get, post};
use axum::Router;
use axum_server::tls_rustls::RustlsConfig;
use axum_server::Handle;
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use parking_lot::Mutex;
use subtle::ConstantTimeEq;
use tokio_util::sync::CancellationToken;
use tpd_core::{ActionCallbacks, ActionName, WebhookAction, WebhookPayload};
use tracing::{debug, error, info, warn};
use url::Url;

use crate::bridge::ActionOutcome;
use crate::config::{BasicAuth, ConfigError, HttpConfig};
use crate::env;
use crate::error::{AppError, BridgeError, ErrorKind};
use crate::job::ServiceJob;

/// Receiver of parsed custom action callbacks.
#[async_trait]
pub trait ActionHandler: Send + Sync + 'static {
    async fn on_action(&self, action: WebhookAction) -> Result<ActionOutcome, BridgeError>;
}

/// Webhook listener. Created from config, then served as a job.
pub struct WebhookServer {
    listen_addr: SocketAddr,
    public_url: Url,
    /// The public address named a port, so the listener port is not substituted.
    public_port_explicit: bool,
    cert_file: PathBuf,
    key_file: PathBuf,
    basic_auth: Option<BasicAuth>,
    handler: Arc<dyn ActionHandler>,
    handle: Handle<SocketAddr>,
    bound: Mutex<Option<SocketAddr>>,
}

#[derive(Clone)]
struct ListenerState {
    handler: Arc<dyn ActionHandler>,
    basic_auth: Option<Arc<str>>,
}

impl WebhookServer {
    pub fn new(config: &HttpConfig, handler: Arc<dyn ActionHandler>) -> Result<Self, ConfigError> {
        Ok(Self {
            listen_addr: parse_listen_addr(&config.listen_addr)?,
            public_url: parse_public_addr(&config.public_addr)?,
            public_port_explicit: has_explicit_port(&config.public_addr),
            cert_file: config.https_cert_file.clone(),
            key_file: config.https_key_file.clone(),
            basic_auth: config.basic_auth.clone(),
            handler,
            handle: Handle::new(),
            bound: Mutex::new(None),
        })
    }

    /// Provision the certificate if it does not exist yet.
    pub fn ensure_cert(&self) -> Result<(), TlsError> {
        ensure_cert(&self.cert_file, &self.key_file, &cert_hosts(self.listen_addr, &self.public_url))?;
        Ok(())
    }

    /// Address the listener is bound to, once serving.
    pub fn local_addr(&self) -> Option<SocketAddr> {
        *self.bound.lock()
    }

    /// Externally reachable base URL. A public address without a port
    /// takes the listener's port.
    pub fn base_url(&self) -> Url {
        let mut url = self.public_url.clone();
        if !self.public_port_explicit {
            let port = self.local_addr().unwrap_or(self.listen_addr).port();
            // Only fails for URLs that cannot carry a port, which parsing rejects.
            let _ = url.set_port(Some(port));
        }
        url
    }

    pub fn action_url(&self, action: ActionName) -> String {
        format!("{}/{}", self.base_url().as_str().trim_end_matches('/'), action)
    }

    pub fn action_callbacks(&self) -> ActionCallbacks {
        ActionCallbacks {
            approve: self.action_url(ActionName::Approve),
            deny: self.action_url(ActionName::Deny),
        }
    }

    pub(crate) fn router(&self) -> Router {
        let basic_auth = self.basic_auth.as_ref().map(|auth| {
            let token = STANDARD.encode(format!("{}:{}", auth.user, auth.password));
            Arc::from(format!("Basic {}", token))
        });
        Router::new()
            .route("/status", get(status))
            .route("/{action}", post(on_action))
            .with_state(ListenerState { handler: Arc::clone(&self.handler), basic_auth })
    }

    /// Serve until `cancel`, reporting ready once the socket is bound.
    ///
    /// The certificate must already exist.
    pub async fn run(self: Arc<Self>, job: ServiceJob, cancel: CancellationToken) -> Result<(), AppError> {
        let tls = RustlsConfig::from_config(server_config(&self.cert_file, &self.key_file)?);
        let handle = self.handle.clone();
        let server = axum_server::bind_rustls(self.listen_addr, tls)
            .handle(handle.clone())
            .serve(self.router().into_make_service());
        tokio::pin!(server);

        let listening = tokio::select! {
            res = &mut server => {
                res.map_err(AppError::Listener)?;
                return Err(AppError::Listener(std::io::Error::other("listener stopped before serving")));
            }
            addr = handle.listening() => addr,
            _ = cancel.cancelled() => {
                handle.shutdown();
                return Ok(());
            }
        };
        let Some(addr) = listening else {
            server.await.map_err(AppError::Listener)?;
            return Err(AppError::Listener(std::io::Error::other("listener failed to bind")));
        };

        *self.bound.lock() = Some(addr);
        info!(%addr, base_url = %self.base_url(), "webhook listener serving");
        job.set_ready(true);

        tokio::select! {
            res = &mut server => return res.map_err(AppError::Listener),
            _ = cancel.cancelled() => {}
        }
        debug!("shutting down webhook listener");
        handle.graceful_shutdown(Some(env::shutdown_grace()));
        server.await.map_err(AppError::Listener)
    }
}

async fn status() -> StatusCode {
    StatusCode::OK
}

async fn on_action(
    State(state): State<ListenerState>,
    Path(name): Path<String>,
    headers: HeaderMap,
    body: Bytes,
) -> StatusCode {
    if let Some(expected) = &state.basic_auth {
        let provided = headers.get(header::AUTHORIZATION).and_then(|v| v.to_str().ok());
        let matches =
            provided.is_some_and(|p| bool::from(p.as_bytes().ct_eq(expected.as_bytes())));
        if !matches {
            warn!(action = %name, "rejecting unauthenticated callback");
            return StatusCode::UNAUTHORIZED;
        }
    }

    let http_request_id = headers
        .get("x-request-id")
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
        .to_string();
    let payload = match WebhookPayload::parse(&body) {
        Ok(payload) => payload,
        Err(e) => {
            warn!(pd_http_id = %http_request_id, error = %e, "failed to parse webhook payload");
            return StatusCode::BAD_REQUEST;
        }
    };

    for action in payload.into_actions(&name, &http_request_id) {
        let message_id = action.message_id.clone();
        if let Err(e) = state.handler.on_action(action).await {
            error!(
                pd_http_id = %http_request_id,
                pd_msg_id = %message_id,
                action = %name,
                error = %e,
                "failed to process webhook action"
            );
            debug!(error = ?e, "webhook action failure detail");
            return status_for(e.kind());
        }
    }
    StatusCode::NO_CONTENT
}

fn status_for(kind: ErrorKind) -> StatusCode {
    match kind {
        ErrorKind::BadParameter => StatusCode::BAD_REQUEST,
        ErrorKind::Unauthorized => StatusCode::FORBIDDEN,
        ErrorKind::Conflict => StatusCode::CONFLICT,
        ErrorKind::Internal => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

/// Provision the listener certificate named in `config` without serving.
///
/// Returns whether a new self-signed pair was written.
pub fn provision_cert(config: &HttpConfig) -> Result<bool, AppError> {
    let listen = parse_listen_addr(&config.listen_addr)?;
    let public = parse_public_addr(&config.public_addr)?;
    let created =
        ensure_cert(&config.https_cert_file, &config.https_key_file, &cert_hosts(listen, &public))?;
    Ok(created)
}

/// Names the self-signed certificate is valid for.
fn cert_hosts(listen: SocketAddr, public: &Url) -> Vec<String> {
    let mut hosts = vec!["localhost".to_string()];
    let mut add = |host: String| {
        if !hosts.contains(&host) {
            hosts.push(host);
        }
    };
    if let Some(host) = public.host_str() {
        add(host.trim_matches(|c| c == '[' || c == ']').to_string());
    }
    let ip = listen.ip();
    if !ip.is_unspecified() {
        add(ip.to_string());
    }
    hosts
}

/// Whether the authority of `addr` carries a `:port`, including one equal
/// to the scheme default.
fn has_explicit_port(addr: &str) -> bool {
    let addr = addr.trim();
    let rest = addr.split_once("://").map_or(addr, |(_, rest)| rest);
    let authority = rest.split(['/', '?', '#']).next().unwrap_or_default();
    let host_port = authority.rsplit_once('@').map_or(authority, |(_, host)| host);
    match host_port.rsplit_once(']') {
        Some((_, after)) => after.starts_with(':'),
        None => host_port.contains(':'),
    }
}

/// Parse `[host]:port`. An empty host listens on all interfaces.
pub fn parse_listen_addr(addr: &str) -> Result<SocketAddr, ConfigError> {
    let invalid = |message: String| ConfigError::Invalid { key: "http.listen_addr", message };
    let addr = addr.trim();
    let full = match addr.strip_prefix(':') {
        Some(port) => format!("{}:{}", IpAddr::from([0, 0, 0, 0]), port),
        None => addr.to_string(),
    };
    if let Ok(parsed) = full.parse::<SocketAddr>() {
        return Ok(parsed);
    }
    full.to_socket_addrs()
        .map_err(|e| invalid(format!("{:?}: {}", addr, e)))?
        .next()
        .ok_or_else(|| invalid(format!("{:?} does not resolve", addr)))
}

/// Parse the public address. The scheme defaults to https.
pub fn parse_public_addr(addr: &str) -> Result<Url, ConfigError> {
    let invalid = |message: String| ConfigError::Invalid { key: "http.public_addr", message };
    let addr = addr.trim();
    let full = if addr.contains("://") { addr.to_string() } else { format!("https://{}", addr) };
    let url = Url::parse(&full).map_err(|e| invalid(format!("{:?}: {}", addr, e)))?;
    if url.host_str().is_none_or(str::is_empty) {
        return Err(invalid(format!("{:?} has no host", addr)));
    }
    Ok(url)
}

#[cfg(test)]
#[path = "mod_tests.rs"]
mod tests;
