//! Helpers for running the `teleport-pagerduty` binary.

use std::path::{Path, PathBuf};
use std::process::Output;

use assert_cmd::Command;
use tempfile::TempDir;

pub const BIN: &str = "teleport-pagerduty";

pub fn cli() -> CliBuilder {
    CliBuilder { args: Vec::new(), envs: Vec::new() }
}

pub struct CliBuilder {
    args: Vec<String>,
    envs: Vec<(String, String)>,
}

impl CliBuilder {
    pub fn args(mut self, args: &[&str]) -> Self {
        self.args.extend(args.iter().map(|s| s.to_string()));
        self
    }

    pub fn env(mut self, key: &str, value: impl AsRef<str>) -> Self {
        self.envs.push((key.to_string(), value.as_ref().to_string()));
        self
    }

    fn run(self) -> Output {
        let mut cmd = Command::cargo_bin(BIN).unwrap();
        cmd.args(&self.args).env_remove("TPD_CONFIG").env_remove("RUST_LOG");
        for (key, value) in &self.envs {
            cmd.env(key, value);
        }
        cmd.output().unwrap()
    }

    /// Run and assert a zero exit status.
    pub fn passes(self) -> RunAssert {
        let output = self.run();
        let run = RunAssert { output };
        assert!(run.output.status.success(), "expected success\n{}", run.describe());
        run
    }

    /// Run and assert a non-zero exit status.
    pub fn fails(self) -> RunAssert {
        let output = self.run();
        let run = RunAssert { output };
        assert!(!run.output.status.success(), "expected failure\n{}", run.describe());
        run
    }
}

pub struct RunAssert {
    output: Output,
}

impl RunAssert {
    pub fn stdout(&self) -> String {
        String::from_utf8_lossy(&self.output.stdout).into_owned()
    }

    pub fn stderr(&self) -> String {
        String::from_utf8_lossy(&self.output.stderr).into_owned()
    }

    pub fn stdout_has(self, expected: &str) -> Self {
        assert!(self.stdout().contains(expected), "stdout lacks {:?}\n{}", expected, self.describe());
        self
    }

    pub fn stdout_eq(self, expected: &str) -> Self {
        assert_eq!(self.stdout(), expected);
        self
    }

    pub fn stderr_has(self, expected: &str) -> Self {
        assert!(self.stderr().contains(expected), "stderr lacks {:?}\n{}", expected, self.describe());
        self
    }

    fn describe(&self) -> String {
        format!("status: {}\nstdout:\n{}\nstderr:\n{}", self.output.status, self.stdout(), self.stderr())
    }
}

/// Scratch directory holding a config file and TLS material.
pub struct Project {
    dir: TempDir,
}

impl Project {
    pub fn empty() -> Self {
        Self { dir: tempfile::tempdir().unwrap() }
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    pub fn file(&self, rel: &str, contents: &str) -> PathBuf {
        let path = self.dir.path().join(rel);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).unwrap();
        }
        std::fs::write(&path, contents).unwrap();
        path
    }

    /// Config pointing the PagerDuty API at `api_endpoint` with TLS files
    /// under `tls/`.
    pub fn config(&self, api_endpoint: &str) -> PathBuf {
        let tls = self.path().join("tls");
        self.file(
            "teleport-pagerduty.toml",
            &format!(
                r#"[pagerduty]
api_endpoint = "{}"
api_key = "key"
user_email = "bot@example.com"
service_id = "PSVC1"

[http]
listen_addr = "127.0.0.1:0"
public_addr = "127.0.0.1"
https_key_file = "{}"
https_cert_file = "{}"

[log]
severity = "debug"
"#,
                api_endpoint,
                tls.join("server.key").display(),
                tls.join("server.crt").display(),
            ),
        )
    }
}
