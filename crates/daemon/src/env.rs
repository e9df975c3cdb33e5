// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Centralized environment variable access for the daemon crate.

use std::path::PathBuf;
use std::time::Duration;

/// Version reported by the binary (from Cargo.toml)
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Config file used when neither `--config` nor `TPD_CONFIG` is given.
pub const DEFAULT_CONFIG_PATH: &str = "/etc/teleport-pagerduty.toml";

/// Resolve config path: explicit > TPD_CONFIG > default
pub fn config_path(explicit: Option<PathBuf>) -> PathBuf {
    explicit
        .or_else(|| std::env::var("TPD_CONFIG").ok().filter(|s| !s.is_empty()).map(PathBuf::from))
        .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_PATH))
}

/// Deadline for the startup server version check (default 5s, configurable
/// via `TPD_VERSION_CHECK_TIMEOUT_MS`).
pub fn version_check_timeout() -> Duration {
    std::env::var("TPD_VERSION_CHECK_TIMEOUT_MS")
        .ok()
        .and_then(|s| s.parse::<u64>().ok())
        .map(Duration::from_millis)
        .unwrap_or(Duration::from_secs(5))
}

/// Bound on graceful listener shutdown.
pub fn shutdown_grace() -> Duration {
    Duration::from_secs(5)
}

#[cfg(test)]
#[path = "env_tests.rs"]
mod tests;
