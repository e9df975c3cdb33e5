// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Teleport access request bridge to PagerDuty.
//!
//! Opens a PagerDuty incident for every pending access request, resolves
//! the request from the incident's custom actions, and closes incidents of
//! requests that expire.

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

pub mod app;
pub mod bridge;
pub mod config;
pub mod env;
pub mod error;
pub mod job;
pub mod listener;
pub mod logging;
pub mod process;
pub mod watcher;

pub use app::{pagerduty_bot, App};
pub use bridge::{ActionOutcome, Bridge};
pub use config::{Config, ConfigError};
pub use error::{AppError, BridgeError, ErrorKind};
pub use job::{JobResult, ServiceJob};
pub use listener::{ActionHandler, WebhookServer};
pub use process::Process;
pub use watcher::Watcher;
