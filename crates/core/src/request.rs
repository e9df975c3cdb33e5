// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Access requests as seen through the access plane's plugin API.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::id::RequestId;

/// Lifecycle state of an access request.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum RequestState {
    #[default]
    None,
    Pending,
    Approved,
    Denied,
}

crate::simple_display! {
    RequestState {
        None => "NONE",
        Pending => "PENDING",
        Approved => "APPROVED",
        Denied => "DENIED",
    }
}

impl RequestState {
    pub fn is_pending(self) -> bool {
        self == RequestState::Pending
    }
}

/// Snapshot of an access request.
///
/// Owned by the access plane; the bridge only reads it and asks for state
/// transitions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Request {
    pub id: RequestId,
    pub user: String,
    pub roles: Vec<String>,
    pub created: DateTime<Utc>,
    pub state: RequestState,
}

crate::builder! {
    pub struct RequestBuilder => Request {
        into {
            id: RequestId = "R1",
            user: String = "alice",
        }
        set {
            roles: Vec<String> = vec!["admin".to_string()],
            created: DateTime<Utc> = DateTime::<Utc>::UNIX_EPOCH,
            state: RequestState = RequestState::Pending,
        }
    }
}

/// A single notification from the access plane's request watch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WatchEvent {
    /// The subscription is established; always delivered first.
    Init,
    /// A request matching the filter was created or updated.
    Put(Request),
    /// A request was deleted or expired. Only the identity survives deletion.
    Delete(RequestId),
}

/// Server-side filter applied to a request watch.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WatchFilter {
    pub state: Option<RequestState>,
}

impl WatchFilter {
    pub fn pending() -> Self {
        Self { state: Some(RequestState::Pending) }
    }

    pub fn matches(&self, req: &Request) -> bool {
        self.state.is_none_or(|state| state == req.state)
    }
}

#[cfg(test)]
#[path = "request_tests.rs"]
mod tests;
