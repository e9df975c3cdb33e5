// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Tracing subscriber setup from the `[log]` config section.

use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::fmt::writer::BoxMakeWriter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter};

use crate::config::LogConfig;

#[derive(Debug, Error)]
pub enum LogError {
    #[error("invalid log output {0:?}")]
    InvalidOutput(String),

    #[error("failed to open log file {}: {source}", path.display())]
    File {
        path: PathBuf,
        #[source]
        source: tracing_appender::rolling::InitError,
    },

    #[error("failed to install log subscriber: {0}")]
    Init(#[from] tracing_subscriber::util::TryInitError),
}

/// Where log lines go.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LogTarget {
    Stderr,
    Stdout,
    File(PathBuf),
}

impl LogTarget {
    /// `stderr`, `stdout`, or a file path.
    pub fn parse(output: &str) -> Result<Self, LogError> {
        match output.trim() {
            "" | "stderr" => Ok(LogTarget::Stderr),
            "stdout" => Ok(LogTarget::Stdout),
            path => {
                let path = PathBuf::from(path);
                if path.file_name().is_none() {
                    return Err(LogError::InvalidOutput(output.to_string()));
                }
                Ok(LogTarget::File(path))
            }
        }
    }
}

/// Level filter for `severity`. `RUST_LOG` takes precedence when set.
pub fn env_filter(severity: &str) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(severity))
}

/// Install the global subscriber.
///
/// File output goes through a background writer; the returned guard must
/// be held until exit so buffered lines are flushed.
pub fn init(config: &LogConfig) -> Result<Option<WorkerGuard>, LogError> {
    let (writer, guard) = match LogTarget::parse(&config.output)? {
        LogTarget::Stderr => (BoxMakeWriter::new(std::io::stderr), None),
        LogTarget::Stdout => (BoxMakeWriter::new(std::io::stdout), None),
        LogTarget::File(path) => {
            let appender = file_appender(&path)?;
            let (writer, guard) = tracing_appender::non_blocking(appender);
            (BoxMakeWriter::new(writer), Some(guard))
        }
    };

    tracing_subscriber::registry()
        .with(env_filter(&config.severity))
        .with(fmt::layer().with_writer(writer))
        .try_init()?;
    Ok(guard)
}

fn file_appender(path: &Path) -> Result<RollingFileAppender, LogError> {
    let file_name = path
        .file_name()
        .ok_or_else(|| LogError::InvalidOutput(path.display().to_string()))?;
    let dir = match path.parent() {
        Some(dir) if !dir.as_os_str().is_empty() => dir,
        _ => Path::new("."),
    };
    RollingFileAppender::builder()
        .rotation(Rotation::NEVER)
        .filename_prefix(file_name.to_string_lossy())
        .build(dir)
        .map_err(|source| LogError::File { path: path.to_path_buf(), source })
}

#[cfg(test)]
#[path = "logging_tests.rs"]
mod tests;
