// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! tpd-core: domain types shared by the access plane and PagerDuty sides of
//! the bridge.

pub mod macros;

pub mod id;
pub mod incident;
pub mod plugin_data;
pub mod request;
pub mod version;
pub mod webhook;

pub use id::{IncidentId, RequestId};
pub use incident::{
    incident_body, incident_title, resolution_note, ActionCallbacks, ActionName, IncidentKey,
    INCIDENT_KEY_PREFIX,
};
pub use plugin_data::{PagerdutyData, PluginData, PluginDataMap, RequestData, Resolution};
#[cfg(any(test, feature = "test-support"))]
pub use request::RequestBuilder;
pub use request::{Request, RequestState, WatchEvent, WatchFilter};
pub use version::{Pong, ServerVersion, VersionError, MIN_SERVER_VERSION};
pub use webhook::{PayloadError, WebhookAction, WebhookPayload, CUSTOM_ACTION_EVENT};
