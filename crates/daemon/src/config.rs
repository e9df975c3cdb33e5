// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Service configuration, loaded from a TOML file.

use std::path::{Path, PathBuf};

use serde::Deserialize;
use thiserror::Error;

pub const DEFAULT_LISTEN_ADDR: &str = ":8081";
pub const DEFAULT_KEY_FILE: &str = "/var/lib/teleport/plugins/pagerduty/server.key";
pub const DEFAULT_CERT_FILE: &str = "/var/lib/teleport/plugins/pagerduty/server.crt";

/// Errors from loading configuration
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse config {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
    #[error("missing required value {0}")]
    Missing(&'static str),
    #[error("invalid value for {key}: {message}")]
    Invalid { key: &'static str, message: String },
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    #[serde(default)]
    pub pagerduty: PagerdutyConfig,
    #[serde(default)]
    pub http: HttpConfig,
    #[serde(default)]
    pub log: LogConfig,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PagerdutyConfig {
    /// Empty means the public API.
    #[serde(default)]
    pub api_endpoint: String,
    #[serde(default)]
    pub api_key: String,
    #[serde(default)]
    pub user_email: String,
    #[serde(default)]
    pub service_id: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct HttpConfig {
    #[serde(default)]
    pub listen_addr: String,
    /// Address PagerDuty uses to reach the listener.
    #[serde(default)]
    pub public_addr: String,
    #[serde(default)]
    pub https_key_file: PathBuf,
    #[serde(default)]
    pub https_cert_file: PathBuf,
    #[serde(default)]
    pub basic_auth: Option<BasicAuth>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct BasicAuth {
    pub user: String,
    pub password: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LogConfig {
    /// `stderr`, `stdout`, or a file path.
    #[serde(default = "default_log_output")]
    pub output: String,
    #[serde(default = "default_log_severity")]
    pub severity: String,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self { output: default_log_output(), severity: default_log_severity() }
    }
}

fn default_log_output() -> String {
    "stderr".to_string()
}

fn default_log_severity() -> String {
    "info".to_string()
}

impl Config {
    /// Read, parse, and validate a config file.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)
            .map_err(|source| ConfigError::Read { path: path.to_path_buf(), source })?;
        let mut config = Self::parse(path, &content)?;
        config.check_and_set_defaults()?;
        Ok(config)
    }

    fn parse(path: &Path, content: &str) -> Result<Self, ConfigError> {
        toml::from_str(content)
            .map_err(|source| ConfigError::Parse { path: path.to_path_buf(), source })
    }

    /// Validate required values and fill in defaults.
    pub fn check_and_set_defaults(&mut self) -> Result<(), ConfigError> {
        let pd = &self.pagerduty;
        require(&pd.api_key, "pagerduty.api_key")?;
        require(&pd.user_email, "pagerduty.user_email")?;
        require(&pd.service_id, "pagerduty.service_id")?;

        let http = &mut self.http;
        require(&http.public_addr, "http.public_addr")?;
        if http.listen_addr.is_empty() {
            http.listen_addr = DEFAULT_LISTEN_ADDR.to_string();
        }
        if http.https_key_file.as_os_str().is_empty() {
            http.https_key_file = PathBuf::from(DEFAULT_KEY_FILE);
        }
        if http.https_cert_file.as_os_str().is_empty() {
            http.https_cert_file = PathBuf::from(DEFAULT_CERT_FILE);
        }
        if let Some(auth) = &http.basic_auth {
            require(&auth.user, "http.basic_auth.user")?;
            require(&auth.password, "http.basic_auth.password")?;
        }

        let log = &mut self.log;
        if log.output.is_empty() {
            log.output = default_log_output();
        }
        log.severity = match log.severity.trim().to_ascii_lowercase().as_str() {
            "" => default_log_severity(),
            s @ ("trace" | "debug" | "info" | "warn" | "error") => s.to_string(),
            "warning" => "warn".to_string(),
            other => {
                return Err(ConfigError::Invalid {
                    key: "log.severity",
                    message: format!("unknown severity {:?}", other),
                })
            }
        };
        Ok(())
    }

    /// Sample configuration printed by `configure`.
    pub fn example() -> &'static str {
        EXAMPLE
    }
}

fn require(value: &str, key: &'static str) -> Result<(), ConfigError> {
    if value.trim().is_empty() {
        return Err(ConfigError::Missing(key));
    }
    Ok(())
}

const EXAMPLE: &str = r#"# example teleport-pagerduty configuration TOML file
[pagerduty]
api_key = "key"               # PagerDuty API Key
user_email = "me@example.com" # PagerDuty bot user email (Could be admin email)
service_id = "PIJ90N7"        # PagerDuty service id

[http]
public_addr = "example.com" # URL on which callback server is accessible externally, e.g. [https://]teleport-pagerduty.example.com
# listen_addr = ":8081" # Network address in format [addr]:port on which callback server listens, e.g. 0.0.0.0:8081
https_key_file = "/var/lib/teleport/plugins/pagerduty/server.key"  # TLS private key
https_cert_file = "/var/lib/teleport/plugins/pagerduty/server.crt" # TLS certificate
# [http.basic_auth]
# user = "user"
# password = "password" # If you prefer to use basic auth for PagerDuty Webhooks authentication, use this section to store user and password

[log]
output = "stderr" # Logger output. Could be "stdout", "stderr" or "/var/lib/teleport/pagerduty.log"
severity = "INFO" # Logger severity. Could be "INFO", "ERROR", "DEBUG" or "WARN".
"#;

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;
