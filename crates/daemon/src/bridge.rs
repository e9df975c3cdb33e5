// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Reconciliation between access requests and their incidents.
//!
//! Two independent sources feed the bridge: request watch events and
//! PagerDuty action callbacks. Each event is handled to completion, and
//! every decision re-reads authoritative state. Races between the two
//! sources are settled by the pending-state check on actions and by the
//! resolution tag on plugin data.

use std::sync::Arc;

use async_trait::async_trait;
use tpd_adapters::{AccessClient, IncidentAdapter};
use tpd_core::{
    ActionName, IncidentKey, PluginData, PluginDataMap, Request, RequestData, RequestId,
    Resolution, WatchEvent, WebhookAction,
};
use tracing::{debug, error, info, warn};

use crate::error::BridgeError;
use crate::listener::ActionHandler;

/// Result of handling one action callback.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActionOutcome {
    /// Not a callback this integration handles.
    Ignored,
    /// The request no longer exists.
    Expired,
    /// The request was approved or denied and its incident resolved.
    Resolved,
}

pub struct Bridge {
    access: Arc<dyn AccessClient>,
    incidents: Arc<dyn IncidentAdapter>,
}

impl Bridge {
    pub fn new(access: Arc<dyn AccessClient>, incidents: Arc<dyn IncidentAdapter>) -> Self {
        Self { access, incidents }
    }

    /// Handle one watch event. Failures are logged here and returned.
    pub async fn on_watcher_event(&self, event: WatchEvent) -> Result<(), BridgeError> {
        match event {
            WatchEvent::Init => Ok(()),
            WatchEvent::Put(req) => {
                if !req.state.is_pending() {
                    warn!(request_id = %req.id, state = %req.state, "non-pending request event");
                    return Ok(());
                }
                self.on_pending_request(&req).await.inspect_err(|e| {
                    error!(request_id = %req.id, error = %e, "failed to process pending request");
                    debug!(request_id = %req.id, error = ?e, "pending request failure detail");
                })
            }
            WatchEvent::Delete(id) => self.on_deleted_request(&id).await.inspect_err(|e| {
                error!(request_id = %id, error = %e, "failed to process deleted request");
                debug!(request_id = %id, error = ?e, "deleted request failure detail");
            }),
        }
    }

    /// Open an incident for a pending request and record the cross-reference.
    ///
    /// If the incident is created but the plugin data write fails, the
    /// incident is left orphaned and the error is returned.
    pub async fn on_pending_request(&self, req: &Request) -> Result<(), BridgeError> {
        let data = RequestData::from(req);
        let incident = self.incidents.create_incident(&req.id, &data).await?;
        info!(request_id = %req.id, pd_incident_id = %incident.id, "incident created");

        let record = PluginData::new(data, incident);
        self.access
            .update_plugin_data(&req.id, record.encode(), None)
            .await
            .map_err(BridgeError::access("failed to store plugin data"))?;
        Ok(())
    }

    /// Resolve the incident of a deleted or expired request.
    pub async fn on_deleted_request(&self, id: &RequestId) -> Result<(), BridgeError> {
        let stored = match self.access.get_plugin_data(id).await {
            Ok(stored) => stored,
            Err(e) if e.is_not_found() => {
                warn!(request_id = %id, "cannot expire unknown request");
                return Ok(());
            }
            Err(e) => return Err(BridgeError::access("failed to fetch plugin data")(e)),
        };
        let record = PluginData::decode(&stored);
        if record.incident.id.is_empty() {
            warn!(request_id = %id, "plugin data has no incident, cannot expire request");
            return Ok(());
        }
        if let Some(resolution) = record.resolution {
            info!(
                request_id = %id,
                pd_incident_id = %record.incident.id,
                %resolution,
                "incident already resolved"
            );
            return Ok(());
        }

        self.incidents.resolve_incident(id, &record.incident, Resolution::Expired).await?;
        info!(request_id = %id, pd_incident_id = %record.incident.id, "incident expired");
        self.tag_resolution(id, &record, stored, Resolution::Expired).await;
        Ok(())
    }

    /// Apply an operator's approve or deny action.
    pub async fn on_pagerduty_action(
        &self,
        action: WebhookAction,
    ) -> Result<ActionOutcome, BridgeError> {
        if !action.is_custom_action() {
            debug!(pd_msg_id = %action.message_id, event = %action.event, "ignoring event");
            return Ok(ActionOutcome::Ignored);
        }
        let Some(key) = IncidentKey::parse(&action.incident_key) else {
            debug!(
                pd_msg_id = %action.message_id,
                incident_key = %action.incident_key,
                "ignoring unsupported incident key"
            );
            return Ok(ActionOutcome::Ignored);
        };
        let request_id = key.into_request_id();

        let req = match self.access.get_request(&request_id).await {
            Ok(req) => req,
            Err(e) if e.is_not_found() => {
                warn!(
                    request_id = %request_id,
                    pd_http_id = %action.http_request_id,
                    pd_msg_id = %action.message_id,
                    error = %e,
                    "cannot process expired request"
                );
                return Ok(ActionOutcome::Expired);
            }
            Err(e) => return Err(BridgeError::access("failed to fetch request")(e)),
        };
        if !req.state.is_pending() {
            return Err(BridgeError::NotPending { request_id, state: req.state });
        }

        let stored = match self.access.get_plugin_data(&request_id).await {
            Ok(stored) => stored,
            Err(e) if e.is_not_found() => PluginDataMap::new(),
            Err(e) => return Err(BridgeError::access("failed to fetch plugin data")(e)),
        };
        let record = PluginData::decode(&stored);
        if record.incident.id.is_empty() || record.incident.id != action.incident_id {
            debug!(
                request_id = %request_id,
                pd_incident_id = %action.incident_id,
                plugin_data_incident_id = %record.incident.id,
                "plugin data incident does not match callback"
            );
            return Err(BridgeError::IncidentMismatch {
                request_id,
                stored: record.incident.id,
                received: action.incident_id,
            });
        }

        let Some(name) = ActionName::parse(&action.name) else {
            return Err(BridgeError::UnknownAction(action.name));
        };
        let resolution = name.resolution();

        self.access
            .set_request_state(&request_id, name.target_state())
            .await
            .map_err(BridgeError::access("failed to update request state"))?;
        info!(
            request_id = %request_id,
            pd_incident_id = %action.incident_id,
            pd_http_id = %action.http_request_id,
            pd_msg_id = %action.message_id,
            action = %name,
            "pagerduty user {} the request",
            resolution
        );

        self.incidents.resolve_incident(&request_id, &record.incident, resolution).await?;
        info!(request_id = %request_id, pd_incident_id = %action.incident_id, "incident resolved");
        self.tag_resolution(&request_id, &record, stored, resolution).await;
        Ok(ActionOutcome::Resolved)
    }

    /// Record the resolution on the plugin data, if nobody changed it since
    /// `read` was fetched.
    async fn tag_resolution(
        &self,
        id: &RequestId,
        record: &PluginData,
        read: PluginDataMap,
        resolution: Resolution,
    ) {
        let tagged = record.resolved(resolution).encode();
        if let Err(e) = self.access.update_plugin_data(id, tagged, Some(read)).await {
            warn!(request_id = %id, %resolution, error = %e, "failed to record incident resolution");
        }
    }
}

#[async_trait]
impl ActionHandler for Bridge {
    async fn on_action(&self, action: WebhookAction) -> Result<ActionOutcome, BridgeError> {
        self.on_pagerduty_action(action).await
    }
}

#[cfg(test)]
#[path = "bridge_tests.rs"]
mod tests;
