// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! PagerDuty-backed incident adapter.

use std::ops::ControlFlow;

use async_trait::async_trait;
use tpd_core::{
    incident_body, incident_title, resolution_note, ActionCallbacks, ActionName, IncidentId,
    IncidentKey, PagerdutyData, RequestData, RequestId, Resolution,
};

use super::{IncidentAdapter, IncidentError};
use crate::pagerduty::{
    ApiReference, Extension, ManageIncident, NewIncident, Pager, PagerdutyClient, User,
};

/// Schema key of PagerDuty's "Custom Incident Action" extension type.
pub const CUSTOM_WEBHOOK_SCHEMA: &str = "custom_webhook";

/// Incident adapter bound to one PagerDuty service.
#[derive(Clone, Debug)]
pub struct PagerdutyBot {
    client: PagerdutyClient,
    service_id: String,
}

impl PagerdutyBot {
    pub fn new(client: PagerdutyClient, service_id: impl Into<String>) -> Self {
        Self { client, service_id: service_id.into() }
    }

    pub fn service_id(&self) -> &str {
        &self.service_id
    }

    pub async fn get_user(&self, id: &str) -> Result<User, IncidentError> {
        Ok(self.client.get_user(id).await?)
    }

    async fn find_webhook_schema(&self) -> Result<String, IncidentError> {
        let client = &self.client;
        let mut schemas = Pager::new(|page| client.list_extension_schemas(page));
        let found = schemas
            .scan(|schema| {
                if schema.key == CUSTOM_WEBHOOK_SCHEMA {
                    ControlFlow::Break(schema.id)
                } else {
                    ControlFlow::Continue(())
                }
            })
            .await?;
        found.ok_or_else(|| {
            IncidentError::NotFound(
                r#"failed to find "Custom Incident Action" extension type"#.to_string(),
            )
        })
    }

    /// Existing extension IDs for each action, by label.
    ///
    /// Duplicate labels resolve to the last one listed. Paging stops after
    /// the first page on which both actions have been seen.
    async fn find_action_extensions(
        &self,
        schema_id: &str,
    ) -> Result<[Option<String>; 2], IncidentError> {
        let client = &self.client;
        let service_id = self.service_id.as_str();
        let mut extensions =
            Pager::new(|page| client.list_extensions(page, service_id, schema_id));

        let mut found: [Option<String>; 2] = [None, None];
        while !found.iter().all(Option::is_some) {
            let Some(page) = extensions.next_page().await? else {
                break;
            };
            for ext in page {
                for (slot, action) in found.iter_mut().zip(ActionName::ALL) {
                    if ext.name == action.label() {
                        *slot = Some(ext.id.clone());
                    }
                }
            }
        }
        Ok(found)
    }

    async fn upsert_action(
        &self,
        existing: Option<&str>,
        schema_id: &str,
        action: ActionName,
        url: &str,
    ) -> Result<(), IncidentError> {
        let ext = Extension {
            id: String::new(),
            name: action.label().to_string(),
            endpoint_url: url.to_string(),
            extension_schema: ApiReference::extension_schema(schema_id),
            extension_objects: vec![ApiReference::service(&self.service_id)],
        };
        match existing {
            Some(id) => {
                tracing::debug!(%action, extension_id = id, "updating custom action");
                self.client.update_extension(id, &ext).await?;
            }
            None => {
                tracing::info!(%action, "creating custom action");
                self.client.create_extension(&ext).await?;
            }
        }
        Ok(())
    }
}

#[async_trait]
impl IncidentAdapter for PagerdutyBot {
    async fn health_check(&self) -> Result<(), IncidentError> {
        self.client.get_service(&self.service_id).await.map_err(|e| {
            IncidentError::Other(format!("failed to fetch pagerduty service info: {}", e))
        })?;
        Ok(())
    }

    async fn setup(&self, callbacks: &ActionCallbacks) -> Result<(), IncidentError> {
        let schema_id = self.find_webhook_schema().await?;
        let existing = self.find_action_extensions(&schema_id).await?;
        for (action, id) in ActionName::ALL.into_iter().zip(existing.iter()) {
            self.upsert_action(id.as_deref(), &schema_id, action, callbacks.url(action)).await?;
        }
        Ok(())
    }

    async fn create_incident(
        &self,
        request_id: &RequestId,
        data: &RequestData,
    ) -> Result<PagerdutyData, IncidentError> {
        let incident = NewIncident::new(
            incident_title(data),
            &self.service_id,
            IncidentKey::new(request_id.clone()).to_string(),
            incident_body(data),
        );
        let created = self.client.create_incident(&incident).await?;
        Ok(PagerdutyData { id: IncidentId::new(created.id) })
    }

    async fn resolve_incident(
        &self,
        request_id: &RequestId,
        incident: &PagerdutyData,
        resolution: Resolution,
    ) -> Result<(), IncidentError> {
        let note = resolution_note(resolution);
        if let Err(e) = self.client.create_incident_note(incident.id.as_str(), &note).await {
            tracing::warn!(
                request_id = %request_id,
                pd_incident_id = %incident.id,
                error = %e,
                "failed to add resolution note"
            );
        }
        self.client.manage_incidents(&[ManageIncident::resolve(incident.id.as_str())]).await?;
        Ok(())
    }
}

#[cfg(test)]
#[path = "pagerduty_tests.rs"]
mod tests;
