// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Access plane server version gate.

use std::cmp::Ordering;
use std::fmt;

use thiserror::Error;

/// Oldest access plane release with the plugin data and watch APIs we rely on.
pub const MIN_SERVER_VERSION: &str = "4.3.0";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum VersionError {
    #[error("invalid server version {0:?}")]
    Invalid(String),

    #[error("server version {actual} is too old, must be at least {minimum}")]
    TooOld { actual: ServerVersion, minimum: ServerVersion },
}

/// `major.minor.patch` with any pre-release or build suffix ignored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ServerVersion {
    pub major: u64,
    pub minor: u64,
    pub patch: u64,
}

impl ServerVersion {
    pub fn parse(s: &str) -> Result<Self, VersionError> {
        let invalid = || VersionError::Invalid(s.to_string());
        let core = s.trim().trim_start_matches('v');
        let core = core.split(['-', '+']).next().unwrap_or_default();
        let mut parts = core.split('.').map(|p| p.parse::<u64>().map_err(|_| invalid()));
        let major = parts.next().ok_or_else(invalid)??;
        let minor = parts.next().unwrap_or(Ok(0))?;
        let patch = parts.next().unwrap_or(Ok(0))?;
        if parts.next().is_some() {
            return Err(invalid());
        }
        Ok(Self { major, minor, patch })
    }

    fn key(&self) -> (u64, u64, u64) {
        (self.major, self.minor, self.patch)
    }
}

impl PartialOrd for ServerVersion {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for ServerVersion {
    fn cmp(&self, other: &Self) -> Ordering {
        self.key().cmp(&other.key())
    }
}

impl fmt::Display for ServerVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}.{}", self.major, self.minor, self.patch)
    }
}

/// Reply to a ping against the access plane.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Pong {
    pub server_version: String,
    pub cluster_name: String,
}

impl Pong {
    /// Fail unless the server is at least [`MIN_SERVER_VERSION`].
    pub fn assert_server_version(&self) -> Result<(), VersionError> {
        let actual = ServerVersion::parse(&self.server_version)?;
        let minimum = ServerVersion::parse(MIN_SERVER_VERSION)?;
        if actual < minimum {
            return Err(VersionError::TooOld { actual, minimum });
        }
        Ok(())
    }
}

#[cfg(test)]
#[path = "version_tests.rs"]
mod tests;
