// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! tpd-adapters: clients for the access plane and the incident service.

pub mod access;
pub mod incident;
pub mod pagerduty;

pub use access::{AccessClient, AccessError, RequestWatch};
pub use incident::{IncidentAdapter, IncidentError, PagerdutyBot};
pub use pagerduty::{PagerdutyClient, PagerdutyError};

// Test support
#[cfg(any(test, feature = "test-support"))]
pub use access::{AccessCall, AccessMethod, FakeAccessClient};
#[cfg(any(test, feature = "test-support"))]
pub use incident::{FakeIncidentAdapter, IncidentCall, IncidentMethod};
#[cfg(any(test, feature = "test-support"))]
pub use pagerduty::{FakePagerduty, PdRoute};
